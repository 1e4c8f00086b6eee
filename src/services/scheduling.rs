//! Scheduling orchestration: duration estimation, conflict-checked block
//! placement, and the paired stage update treated as one logical
//! transaction with compensating rollback.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::metrics;
use crate::models::{CalendarBlock, Pump, PumpStage};
use crate::scheduling::estimator::estimate_duration_days;
use crate::scheduling::store::{BlockStoreError, CalendarBlockStore};
use crate::services::pumps::PumpStore;

/// Result of a successful placement: the committed block and the pump
/// with its stage advanced.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScheduleOutcome {
    pub block: CalendarBlock,
    pub pump: Pump,
}

/// Service placing pumps onto the shared production calendar
#[derive(Clone)]
pub struct SchedulingService {
    pumps: Arc<dyn PumpStore>,
    blocks: Arc<dyn CalendarBlockStore>,
    event_sender: EventSender,
}

impl SchedulingService {
    pub fn new(
        pumps: Arc<dyn PumpStore>,
        blocks: Arc<dyn CalendarBlockStore>,
        event_sender: EventSender,
    ) -> Self {
        Self {
            pumps,
            blocks,
            event_sender,
        }
    }

    fn parse_instant(field: &str, value: Option<&str>) -> Result<DateTime<Utc>, ServiceError> {
        let raw = value
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ServiceError::InvalidDates(format!("{} is required", field)))?;
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                ServiceError::InvalidDates(format!("{} is not a valid RFC 3339 instant: {}", field, e))
            })
    }

    /// Resolves the requested interval. `start` is required; a missing
    /// `end` is derived from the model's estimated duration.
    fn resolve_interval(
        pump: &Pump,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), ServiceError> {
        let start = Self::parse_instant("start", start)?;
        let end = match end.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Self::parse_instant("end", Some(raw))?,
            None => start + Duration::days(estimate_duration_days(&pump.model)),
        };
        Ok((start, end))
    }

    /// Places a pump onto the calendar and advances it to `scheduled`.
    ///
    /// Block creation and the stage update are one logical transaction:
    /// if the stage update cannot be confirmed, the freshly created
    /// block is removed again before the error is surfaced.
    #[instrument(skip(self))]
    pub async fn schedule(
        &self,
        pump_id: Uuid,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<ScheduleOutcome, ServiceError> {
        metrics::SCHEDULE_ATTEMPTS.inc();

        let pump = self
            .pumps
            .get(pump_id)
            .await?
            .ok_or_else(|| ServiceError::pump_not_found(pump_id))?;
        let (start, end) = Self::resolve_interval(&pump, start, end)?;

        let block = match self.blocks.try_create_block(pump_id, start, end).await {
            Ok(block) => block,
            Err(err) => {
                if matches!(err, BlockStoreError::Conflict { .. }) {
                    metrics::SCHEDULE_CONFLICTS.inc();
                }
                return Err(err.into());
            }
        };

        let pump = match self.pumps.set_stage(pump_id, PumpStage::Scheduled).await {
            Ok(pump) => pump,
            Err(stage_err) => {
                // Compensating action: an orphaned block with the pump
                // still unscheduled must never remain visible.
                if let Err(undo_err) = self.blocks.remove_block(block.id).await {
                    error!(
                        block_id = %block.id,
                        "Failed to roll back calendar block after stage update failure: {}",
                        undo_err
                    );
                }
                return Err(stage_err.into());
            }
        };

        metrics::SCHEDULE_SUCCESSES.inc();
        self.emit(Event::PumpScheduled {
            pump_id,
            block_id: block.id,
            start,
            end,
        })
        .await;

        Ok(ScheduleOutcome { block, pump })
    }

    /// Removes a block and reverts the pump to the backlog. Removing an
    /// unknown block is a no-op; the stage revert still runs. If the
    /// stage revert fails, the removed block is re-inserted best-effort.
    #[instrument(skip(self))]
    pub async fn unschedule(&self, block_id: Uuid, pump_id: Uuid) -> Result<Pump, ServiceError> {
        let removed = self.blocks.remove_block(block_id).await?;

        match self.pumps.set_stage(pump_id, PumpStage::Unscheduled).await {
            Ok(pump) => {
                self.emit(Event::PumpUnscheduled { pump_id, block_id }).await;
                Ok(pump)
            }
            Err(stage_err) => {
                if let Some(block) = removed {
                    if let Err(undo_err) = self
                        .blocks
                        .try_create_block(block.pump_id, block.start, block.end)
                        .await
                    {
                        error!(
                            block_id = %block.id,
                            "Failed to restore calendar block after stage revert failure: {}",
                            undo_err
                        );
                    }
                }
                Err(stage_err.into())
            }
        }
    }

    /// Moves an existing block to a new interval. Validation runs before
    /// any removal: a conflicting target leaves the original placement
    /// untouched. The pump stays `scheduled` throughout.
    #[instrument(skip(self))]
    pub async fn reschedule(
        &self,
        block_id: Uuid,
        pump_id: Uuid,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<ScheduleOutcome, ServiceError> {
        metrics::SCHEDULE_ATTEMPTS.inc();

        let pump = self
            .pumps
            .get(pump_id)
            .await?
            .ok_or_else(|| ServiceError::pump_not_found(pump_id))?;
        let (start, end) = Self::resolve_interval(&pump, start, end)?;

        let block = match self.blocks.try_move_block(block_id, start, end).await {
            Ok(block) => block,
            Err(err) => {
                if matches!(err, BlockStoreError::Conflict { .. }) {
                    metrics::SCHEDULE_CONFLICTS.inc();
                }
                return Err(err.into());
            }
        };

        metrics::SCHEDULE_SUCCESSES.inc();
        self.emit(Event::PumpRescheduled {
            pump_id,
            old_block_id: block_id,
            new_block_id: block.id,
        })
        .await;

        Ok(ScheduleOutcome { block, pump })
    }

    /// Current calendar snapshot.
    #[instrument(skip(self))]
    pub async fn calendar(&self) -> Result<Vec<CalendarBlock>, ServiceError> {
        Ok(self.blocks.list_blocks().await?)
    }

    async fn emit(&self, event: Event) {
        if let Err(e) = self.event_sender.send(event).await {
            warn!("Failed to emit scheduling event: {}", e);
        }
    }
}
