use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

/// Workflow stage of a pump on the production board.
///
/// The order of variants mirrors the order of the board columns. KPI
/// aggregation buckets the first three stages; later stages only count
/// toward the fleet total.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PumpStage {
    Unscheduled,
    Scheduled,
    InProcess,
    Finishing,
    Testing,
    Shipped,
}

impl PumpStage {
    /// Stages that require finish vendor and color before a pump may enter them.
    pub fn requires_finish_details(&self) -> bool {
        matches!(self, PumpStage::Finishing)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PumpPriority {
    #[default]
    Normal,
    High,
    Urgent,
}

/// One unit of production tracked through the workflow stages.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Pump {
    pub id: Uuid,
    /// Pump model / category, open-ended business data (drives duration estimates)
    pub model: String,
    pub customer: String,
    pub po_number: String,
    pub stage: PumpStage,
    pub serial_number: Option<String>,
    pub finish_vendor: Option<String>,
    pub finish_color: Option<String>,
    pub priority: PumpPriority,
    /// Units on order; KPI totals default this to 1 when absent
    pub quantity: Option<i32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Pump {
    /// Creates a pump in the initial unscheduled stage.
    pub fn new(
        model: impl Into<String>,
        customer: impl Into<String>,
        po_number: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            model: model.into(),
            customer: customer.into(),
            po_number: po_number.into(),
            stage: PumpStage::Unscheduled,
            serial_number: None,
            finish_vendor: None,
            finish_color: None,
            priority: PumpPriority::default(),
            quantity: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_finish_details(&self) -> bool {
        self.finish_vendor.is_some() && self.finish_color.is_some()
    }
}
