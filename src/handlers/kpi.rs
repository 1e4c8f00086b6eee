use axum::{
    extract::State,
    response::Json,
};

use crate::errors::ServiceError;
use crate::services::kpi::KpiSnapshot;
use crate::{ApiResponse, AppState};

/// Fleet KPI snapshot, recomputed when the cached value is stale
#[utoipa::path(
    get,
    path = "/api/v1/kpi",
    responses(
        (status = 200, description = "Current KPI snapshot", body = ApiResponse<KpiSnapshot>)
    ),
    tag = "kpi"
)]
pub async fn get_kpi_snapshot(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<KpiSnapshot>>, ServiceError> {
    let snapshot = state.services.kpi.snapshot().await?;
    Ok(Json(ApiResponse::success(snapshot)))
}
