//! Work-item access: the `PumpStore` collaborator seam plus the service
//! enforcing stage-transition rules.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::{Pump, PumpPriority, PumpStage};

#[derive(Debug, Error)]
pub enum PumpStoreError {
    #[error("pump {0} not found")]
    NotFound(Uuid),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<PumpStoreError> for ServiceError {
    fn from(err: PumpStoreError) -> Self {
        match err {
            PumpStoreError::NotFound(id) => ServiceError::pump_not_found(id),
            PumpStoreError::Storage(msg) => ServiceError::TransactionError(msg),
        }
    }
}

/// Narrow interface over the work-item collection. The persistence layer
/// owns pumps; the core only reads them and requests stage updates.
#[async_trait]
pub trait PumpStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Pump>, PumpStoreError>;
    async fn get(&self, id: Uuid) -> Result<Option<Pump>, PumpStoreError>;
    async fn insert(&self, pump: Pump) -> Result<(), PumpStoreError>;
    async fn update(&self, pump: Pump) -> Result<Pump, PumpStoreError>;
    async fn set_stage(&self, id: Uuid, stage: PumpStage) -> Result<Pump, PumpStoreError>;
}

/// In-memory pump collection for single-process deployments and tests.
#[derive(Debug, Default)]
pub struct InMemoryPumpStore {
    pumps: DashMap<Uuid, Pump>,
}

impl InMemoryPumpStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PumpStore for InMemoryPumpStore {
    async fn list(&self) -> Result<Vec<Pump>, PumpStoreError> {
        Ok(self.pumps.iter().map(|entry| entry.value().clone()).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Pump>, PumpStoreError> {
        Ok(self.pumps.get(&id).map(|entry| entry.value().clone()))
    }

    async fn insert(&self, pump: Pump) -> Result<(), PumpStoreError> {
        self.pumps.insert(pump.id, pump);
        Ok(())
    }

    async fn update(&self, pump: Pump) -> Result<Pump, PumpStoreError> {
        let mut entry = self
            .pumps
            .get_mut(&pump.id)
            .ok_or(PumpStoreError::NotFound(pump.id))?;
        *entry.value_mut() = pump.clone();
        Ok(pump)
    }

    async fn set_stage(&self, id: Uuid, stage: PumpStage) -> Result<Pump, PumpStoreError> {
        let mut entry = self.pumps.get_mut(&id).ok_or(PumpStoreError::NotFound(id))?;
        let pump = entry.value_mut();
        pump.stage = stage;
        pump.updated_at = Utc::now();
        Ok(pump.clone())
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePump {
    #[validate(length(min = 1, max = 120))]
    pub model: String,
    #[validate(length(min = 1, max = 120))]
    pub customer: String,
    #[validate(length(min = 1, max = 60))]
    pub po_number: String,
    pub serial_number: Option<String>,
    pub finish_vendor: Option<String>,
    pub finish_color: Option<String>,
    #[serde(default)]
    pub priority: PumpPriority,
    #[validate(range(min = 1))]
    pub quantity: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePump {
    #[validate(length(min = 1, max = 120))]
    pub model: Option<String>,
    #[validate(length(min = 1, max = 120))]
    pub customer: Option<String>,
    #[validate(length(min = 1, max = 60))]
    pub po_number: Option<String>,
    pub serial_number: Option<String>,
    pub finish_vendor: Option<String>,
    pub finish_color: Option<String>,
    pub priority: Option<PumpPriority>,
    #[validate(range(min = 1))]
    pub quantity: Option<i32>,
    pub notes: Option<String>,
}

/// Service for managing pumps on the workflow board
#[derive(Clone)]
pub struct PumpService {
    store: Arc<dyn PumpStore>,
    event_sender: EventSender,
}

impl PumpService {
    pub fn new(store: Arc<dyn PumpStore>, event_sender: EventSender) -> Self {
        Self { store, event_sender }
    }

    #[instrument(skip(self))]
    pub async fn list_pumps(
        &self,
        stage: Option<PumpStage>,
        priority: Option<PumpPriority>,
    ) -> Result<Vec<Pump>, ServiceError> {
        let mut pumps = self.store.list().await?;
        if let Some(stage) = stage {
            pumps.retain(|p| p.stage == stage);
        }
        if let Some(priority) = priority {
            pumps.retain(|p| p.priority == priority);
        }
        pumps.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(pumps)
    }

    #[instrument(skip(self))]
    pub async fn get_pump(&self, id: Uuid) -> Result<Pump, ServiceError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::pump_not_found(id))
    }

    #[instrument(skip(self, cmd))]
    pub async fn create_pump(&self, cmd: CreatePump) -> Result<Pump, ServiceError> {
        cmd.validate()?;

        let mut pump = Pump::new(cmd.model, cmd.customer, cmd.po_number);
        pump.serial_number = cmd.serial_number;
        pump.finish_vendor = cmd.finish_vendor;
        pump.finish_color = cmd.finish_color;
        pump.priority = cmd.priority;
        pump.quantity = cmd.quantity;
        pump.notes = cmd.notes;

        self.store.insert(pump.clone()).await?;
        self.emit(Event::PumpCreated(pump.id)).await;
        Ok(pump)
    }

    #[instrument(skip(self, cmd))]
    pub async fn update_pump(&self, id: Uuid, cmd: UpdatePump) -> Result<Pump, ServiceError> {
        cmd.validate()?;

        let mut pump = self.get_pump(id).await?;
        if let Some(model) = cmd.model {
            pump.model = model;
        }
        if let Some(customer) = cmd.customer {
            pump.customer = customer;
        }
        if let Some(po_number) = cmd.po_number {
            pump.po_number = po_number;
        }
        if cmd.serial_number.is_some() {
            pump.serial_number = cmd.serial_number;
        }
        if cmd.finish_vendor.is_some() {
            pump.finish_vendor = cmd.finish_vendor;
        }
        if cmd.finish_color.is_some() {
            pump.finish_color = cmd.finish_color;
        }
        if let Some(priority) = cmd.priority {
            pump.priority = priority;
        }
        if cmd.quantity.is_some() {
            pump.quantity = cmd.quantity;
        }
        if cmd.notes.is_some() {
            pump.notes = cmd.notes;
        }
        pump.updated_at = Utc::now();

        let pump = self.store.update(pump).await?;
        self.emit(Event::PumpUpdated(pump.id)).await;
        Ok(pump)
    }

    /// Moves a pump to a new stage, enforcing attribute requirements of
    /// the target stage (finishing requires vendor and color).
    #[instrument(skip(self))]
    pub async fn set_stage(&self, id: Uuid, stage: PumpStage) -> Result<Pump, ServiceError> {
        let pump = self.get_pump(id).await?;
        if pump.stage == stage {
            return Ok(pump);
        }
        if stage.requires_finish_details() && !pump.has_finish_details() {
            return Err(ServiceError::InvalidOperation(format!(
                "Pump {} requires finish vendor and finish color before entering {}",
                id, stage
            )));
        }

        let old_stage = pump.stage;
        let pump = self.store.set_stage(id, stage).await?;
        self.emit(Event::PumpStageChanged {
            pump_id: id,
            old_stage,
            new_stage: stage,
        })
        .await;
        Ok(pump)
    }

    async fn emit(&self, event: Event) {
        if let Err(e) = self.event_sender.send(event).await {
            warn!("Failed to emit pump event: {}", e);
        }
    }
}
