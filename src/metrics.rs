//! Prometheus metrics for the scheduling core, exposed at `/metrics`.

use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, Registry, TextEncoder};
use tracing::debug;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref SCHEDULE_ATTEMPTS: IntCounter = IntCounter::new(
        "pumpflow_schedule_attempts_total",
        "Schedule and reschedule attempts"
    )
    .expect("metric can be created");
    pub static ref SCHEDULE_CONFLICTS: IntCounter = IntCounter::new(
        "pumpflow_schedule_conflicts_total",
        "Placements rejected because the interval overlapped an existing block"
    )
    .expect("metric can be created");
    pub static ref SCHEDULE_SUCCESSES: IntCounter = IntCounter::new(
        "pumpflow_schedule_successes_total",
        "Committed calendar placements"
    )
    .expect("metric can be created");
    pub static ref KPI_REFRESHES: IntCounter = IntCounter::new(
        "pumpflow_kpi_refreshes_total",
        "KPI snapshot recomputations"
    )
    .expect("metric can be created");
}

/// Registers all collectors. Safe to call more than once; repeated
/// registrations are reported at debug level only.
pub fn register_metrics() {
    for collector in [
        &*SCHEDULE_ATTEMPTS,
        &*SCHEDULE_CONFLICTS,
        &*SCHEDULE_SUCCESSES,
        &*KPI_REFRESHES,
    ] {
        if let Err(e) = REGISTRY.register(Box::new(collector.clone())) {
            debug!("metric already registered: {}", e);
        }
    }
}

/// Renders the registry in Prometheus text exposition format.
pub fn metrics_handler() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
