//! Fleet KPI aggregation: a single pass over all pumps, bucketed by
//! schedule-relevant stage, with a bounded-staleness cache.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::instrument;
use utoipa::ToSchema;

use crate::errors::ServiceError;
use crate::metrics;
use crate::models::{Pump, PumpStage};
use crate::services::pumps::PumpStore;

/// Point-in-time aggregate of the fleet by schedule-related status.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct KpiSnapshot {
    pub unscheduled: i64,
    pub scheduled: i64,
    pub in_process: i64,
    /// Sum of quantities over all pumps regardless of stage (quantity
    /// defaults to 1 when absent)
    pub total_on_order: i64,
    /// Absent when no capacity data was supplied. Consumers must render
    /// "N/A" rather than "0%"; no data and zero utilization are
    /// different signals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utilization_pct: Option<f64>,
    pub computed_at: DateTime<Utc>,
}

/// Computes a snapshot from the current pump collection. Pure: does not
/// mutate its inputs and is safe to call concurrently.
pub fn compute_snapshot(pumps: &[Pump], utilization_pct: Option<f64>) -> KpiSnapshot {
    let mut unscheduled = 0i64;
    let mut scheduled = 0i64;
    let mut in_process = 0i64;
    let mut total_on_order = 0i64;

    for pump in pumps {
        match pump.stage {
            PumpStage::Unscheduled => unscheduled += 1,
            PumpStage::Scheduled => scheduled += 1,
            PumpStage::InProcess => in_process += 1,
            // Later stages count toward the fleet total only
            PumpStage::Finishing | PumpStage::Testing | PumpStage::Shipped => {}
        }
        total_on_order += i64::from(pump.quantity.unwrap_or(1));
    }

    KpiSnapshot {
        unscheduled,
        scheduled,
        in_process,
        total_on_order,
        utilization_pct,
        computed_at: Utc::now(),
    }
}

/// Crew/capacity-derived utilization. Owned by an external collaborator;
/// the aggregator only surfaces the value when a source is wired in.
#[async_trait]
pub trait UtilizationSource: Send + Sync {
    async fn utilization_pct(&self) -> Option<f64>;
}

/// Service producing KPI snapshots with bounded staleness.
#[derive(Clone)]
pub struct KpiService {
    pumps: Arc<dyn PumpStore>,
    utilization: Option<Arc<dyn UtilizationSource>>,
    max_staleness: Duration,
    cache: Arc<RwLock<Option<KpiSnapshot>>>,
}

impl KpiService {
    pub fn new(
        pumps: Arc<dyn PumpStore>,
        utilization: Option<Arc<dyn UtilizationSource>>,
        max_staleness: std::time::Duration,
    ) -> Self {
        Self {
            pumps,
            utilization,
            max_staleness: Duration::from_std(max_staleness).unwrap_or(Duration::seconds(30)),
            cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns the cached snapshot if it is fresh enough, recomputing
    /// otherwise. Staleness is bounded by `kpi_max_staleness_secs`.
    #[instrument(skip(self))]
    pub async fn snapshot(&self) -> Result<KpiSnapshot, ServiceError> {
        {
            let cache = self.cache.read().await;
            if let Some(snapshot) = cache.as_ref() {
                if Utc::now() - snapshot.computed_at < self.max_staleness {
                    return Ok(snapshot.clone());
                }
            }
        }
        self.refresh().await
    }

    /// Re-scans all pumps and replaces the cached snapshot.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<KpiSnapshot, ServiceError> {
        let pumps = self.pumps.list().await?;
        let utilization = match &self.utilization {
            Some(source) => source.utilization_pct().await,
            None => None,
        };

        let snapshot = compute_snapshot(&pumps, utilization);
        metrics::KPI_REFRESHES.inc();
        *self.cache.write().await = Some(snapshot.clone());
        Ok(snapshot)
    }

    /// Drops the cached snapshot so the next read re-scans.
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }
}
