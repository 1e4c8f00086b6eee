use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PumpFlow API",
        version = "0.1.0",
        description = r#"
# PumpFlow Production Tracker API

Tracks pump work-items through production stages, schedules them onto a
shared calendar without time-range conflicts, and aggregates fleet KPIs.

## Scheduling semantics

Calendar blocks are half-open intervals `[start, end)` on one shared
production line. Placements that touch end-to-start are legal;
overlapping placements are rejected with `409 Conflict`. When `end` is
omitted, it is derived from the pump model's estimated duration.

## Error Handling

Consistent error response format with appropriate HTTP status codes:

```json
{
  "error": "Conflict",
  "message": "Schedule conflict: requested interval overlaps calendar block ...",
  "timestamp": "2025-06-09T10:30:00Z"
}
```
        "#,
        contact(
            name = "PumpFlow Support",
            email = "eng@pumpflow.io"
        ),
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "pumps", description = "Pump workflow endpoints"),
        (name = "scheduling", description = "Calendar scheduling endpoints"),
        (name = "kpi", description = "Fleet KPI endpoints")
    ),
    paths(
        // Pumps
        crate::handlers::pumps::list_pumps,
        crate::handlers::pumps::get_pump,
        crate::handlers::pumps::create_pump,
        crate::handlers::pumps::update_pump,
        crate::handlers::pumps::set_pump_stage,
        // Scheduling
        crate::handlers::scheduling::schedule_pump,
        crate::handlers::scheduling::unschedule_pump,
        crate::handlers::scheduling::reschedule_pump,
        crate::handlers::scheduling::get_calendar,
        // KPIs
        crate::handlers::kpi::get_kpi_snapshot,
    ),
    components(schemas(
        crate::models::Pump,
        crate::models::PumpStage,
        crate::models::PumpPriority,
        crate::models::CalendarBlock,
        crate::services::pumps::CreatePump,
        crate::services::pumps::UpdatePump,
        crate::services::scheduling::ScheduleOutcome,
        crate::services::kpi::KpiSnapshot,
        crate::handlers::pumps::SetStageRequest,
        crate::handlers::scheduling::SchedulePumpRequest,
        crate::handlers::scheduling::UnschedulePumpRequest,
        crate::handlers::scheduling::ReschedulePumpRequest,
        crate::errors::ErrorResponse,
    ))
)]
pub struct ApiDoc;

/// Swagger UI mounted at `/docs`, serving the document at `/api-docs/openapi.json`.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_builds() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("/api/v1/scheduling/schedule"));
        assert!(json.contains("KpiSnapshot"));
    }
}
