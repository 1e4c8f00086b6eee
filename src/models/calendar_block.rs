use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A committed placement of a pump on the shared production calendar.
///
/// The interval is half-open `[start, end)`: blocks that touch at a
/// boundary instant do not collide. Block ids are independent of pump
/// ids; a reschedule reissues the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CalendarBlock {
    pub id: Uuid,
    /// Non-owning reference to the scheduled pump
    pub pump_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl CalendarBlock {
    pub fn new(pump_id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            pump_id,
            start,
            end,
            created_at: Utc::now(),
        }
    }
}
