use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::{Pump, PumpPriority, PumpStage};
use crate::services::pumps::{CreatePump, UpdatePump};
use crate::{ApiResponse, AppState};

/// Build the pumps Router scoped under `/api/v1/pumps`.
pub fn pump_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_pumps).post(create_pump))
        .route("/:id", get(get_pump).put(update_pump))
        .route("/:id/stage", put(set_pump_stage))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PumpFilters {
    /// Restrict to a single workflow stage
    pub stage: Option<PumpStage>,
    /// Restrict to a single priority
    pub priority: Option<PumpPriority>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetStageRequest {
    pub stage: PumpStage,
}

/// List pumps with optional filtering
#[utoipa::path(
    get,
    path = "/api/v1/pumps",
    params(PumpFilters),
    responses(
        (status = 200, description = "List pumps", body = ApiResponse<Vec<Pump>>)
    ),
    tag = "pumps"
)]
pub async fn list_pumps(
    State(state): State<AppState>,
    Query(filters): Query<PumpFilters>,
) -> Result<Json<ApiResponse<Vec<Pump>>>, ServiceError> {
    let pumps = state
        .services
        .pumps
        .list_pumps(filters.stage, filters.priority)
        .await?;
    Ok(Json(ApiResponse::success(pumps)))
}

/// Get a pump by id
#[utoipa::path(
    get,
    path = "/api/v1/pumps/{id}",
    params(("id" = Uuid, Path, description = "Pump id")),
    responses(
        (status = 200, description = "Pump found", body = ApiResponse<Pump>),
        (status = 404, description = "Pump not found", body = crate::errors::ErrorResponse)
    ),
    tag = "pumps"
)]
pub async fn get_pump(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Pump>>, ServiceError> {
    let pump = state.services.pumps.get_pump(id).await?;
    Ok(Json(ApiResponse::success(pump)))
}

/// Create a pump in the initial unscheduled stage
#[utoipa::path(
    post,
    path = "/api/v1/pumps",
    request_body = CreatePump,
    responses(
        (status = 201, description = "Pump created", body = ApiResponse<Pump>),
        (status = 400, description = "Validation failed", body = crate::errors::ErrorResponse)
    ),
    tag = "pumps"
)]
pub async fn create_pump(
    State(state): State<AppState>,
    Json(cmd): Json<CreatePump>,
) -> Result<impl IntoResponse, ServiceError> {
    let pump = state.services.pumps.create_pump(cmd).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(pump))))
}

/// Update pump fields
#[utoipa::path(
    put,
    path = "/api/v1/pumps/{id}",
    params(("id" = Uuid, Path, description = "Pump id")),
    request_body = UpdatePump,
    responses(
        (status = 200, description = "Pump updated", body = ApiResponse<Pump>),
        (status = 400, description = "Validation failed", body = crate::errors::ErrorResponse),
        (status = 404, description = "Pump not found", body = crate::errors::ErrorResponse)
    ),
    tag = "pumps"
)]
pub async fn update_pump(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(cmd): Json<UpdatePump>,
) -> Result<Json<ApiResponse<Pump>>, ServiceError> {
    let pump = state.services.pumps.update_pump(id, cmd).await?;
    Ok(Json(ApiResponse::success(pump)))
}

/// Move a pump to a new workflow stage
#[utoipa::path(
    put,
    path = "/api/v1/pumps/{id}/stage",
    params(("id" = Uuid, Path, description = "Pump id")),
    request_body = SetStageRequest,
    responses(
        (status = 200, description = "Stage updated", body = ApiResponse<Pump>),
        (status = 400, description = "Stage requirements not met", body = crate::errors::ErrorResponse),
        (status = 404, description = "Pump not found", body = crate::errors::ErrorResponse)
    ),
    tag = "pumps"
)]
pub async fn set_pump_stage(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetStageRequest>,
) -> Result<Json<ApiResponse<Pump>>, ServiceError> {
    let pump = state.services.pumps.set_stage(id, req.stage).await?;
    Ok(Json(ApiResponse::success(pump)))
}
