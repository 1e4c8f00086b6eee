use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::{CalendarBlock, Pump};
use crate::services::scheduling::ScheduleOutcome;
use crate::{ApiResponse, AppState};

/// Build the scheduling Router scoped under `/api/v1/scheduling`.
pub fn scheduling_routes() -> Router<AppState> {
    Router::new()
        .route("/schedule", post(schedule_pump))
        .route("/unschedule", post(unschedule_pump))
        .route("/reschedule", post(reschedule_pump))
        .route("/calendar", get(get_calendar))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SchedulePumpRequest {
    pub pump_id: Uuid,
    /// RFC 3339 start instant
    pub start: Option<String>,
    /// RFC 3339 end instant; derived from the model's estimated duration when absent
    pub end: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UnschedulePumpRequest {
    pub block_id: Uuid,
    pub pump_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReschedulePumpRequest {
    pub block_id: Uuid,
    pub pump_id: Uuid,
    /// RFC 3339 start instant
    pub start: Option<String>,
    /// RFC 3339 end instant; derived from the model's estimated duration when absent
    pub end: Option<String>,
}

/// Place a pump onto the shared production calendar
#[utoipa::path(
    post,
    path = "/api/v1/scheduling/schedule",
    request_body = SchedulePumpRequest,
    responses(
        (status = 201, description = "Pump scheduled", body = ApiResponse<ScheduleOutcome>),
        (status = 400, description = "Missing or invalid dates", body = crate::errors::ErrorResponse),
        (status = 404, description = "Pump not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Interval overlaps an existing block", body = crate::errors::ErrorResponse)
    ),
    tag = "scheduling"
)]
pub async fn schedule_pump(
    State(state): State<AppState>,
    Json(req): Json<SchedulePumpRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let outcome = state
        .services
        .scheduling
        .schedule(req.pump_id, req.start.as_deref(), req.end.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(outcome))))
}

/// Return a pump to the backlog, removing its calendar block
#[utoipa::path(
    post,
    path = "/api/v1/scheduling/unschedule",
    request_body = UnschedulePumpRequest,
    responses(
        (status = 200, description = "Pump unscheduled (idempotent on missing block)", body = ApiResponse<Pump>),
        (status = 404, description = "Pump not found", body = crate::errors::ErrorResponse)
    ),
    tag = "scheduling"
)]
pub async fn unschedule_pump(
    State(state): State<AppState>,
    Json(req): Json<UnschedulePumpRequest>,
) -> Result<Json<ApiResponse<Pump>>, ServiceError> {
    let pump = state
        .services
        .scheduling
        .unschedule(req.block_id, req.pump_id)
        .await?;
    Ok(Json(ApiResponse::success(pump)))
}

/// Move an existing calendar block to a new interval
#[utoipa::path(
    post,
    path = "/api/v1/scheduling/reschedule",
    request_body = ReschedulePumpRequest,
    responses(
        (status = 200, description = "Block moved", body = ApiResponse<ScheduleOutcome>),
        (status = 400, description = "Missing or invalid dates", body = crate::errors::ErrorResponse),
        (status = 404, description = "Pump or block not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Interval overlaps another block", body = crate::errors::ErrorResponse)
    ),
    tag = "scheduling"
)]
pub async fn reschedule_pump(
    State(state): State<AppState>,
    Json(req): Json<ReschedulePumpRequest>,
) -> Result<Json<ApiResponse<ScheduleOutcome>>, ServiceError> {
    let outcome = state
        .services
        .scheduling
        .reschedule(
            req.block_id,
            req.pump_id,
            req.start.as_deref(),
            req.end.as_deref(),
        )
        .await?;
    Ok(Json(ApiResponse::success(outcome)))
}

/// Current calendar blocks
#[utoipa::path(
    get,
    path = "/api/v1/scheduling/calendar",
    responses(
        (status = 200, description = "Active calendar blocks", body = ApiResponse<Vec<CalendarBlock>>)
    ),
    tag = "scheduling"
)]
pub async fn get_calendar(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CalendarBlock>>>, ServiceError> {
    let blocks = state.services.scheduling.calendar().await?;
    Ok(Json(ApiResponse::success(blocks)))
}
