pub mod kpi;
pub mod pumps;
pub mod scheduling;

use std::sync::Arc;
use std::time::Duration;

use crate::events::EventSender;
use crate::scheduling::store::{CalendarBlockStore, InMemoryCalendarBlockStore};
use kpi::{KpiService, UtilizationSource};
use pumps::{InMemoryPumpStore, PumpService, PumpStore};
use scheduling::SchedulingService;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub pumps: Arc<PumpService>,
    pub scheduling: Arc<SchedulingService>,
    pub kpi: Arc<KpiService>,
}

impl AppServices {
    pub fn new(
        pump_store: Arc<dyn PumpStore>,
        block_store: Arc<dyn CalendarBlockStore>,
        event_sender: EventSender,
        kpi_max_staleness: Duration,
        utilization: Option<Arc<dyn UtilizationSource>>,
    ) -> Self {
        let pumps = Arc::new(PumpService::new(pump_store.clone(), event_sender.clone()));
        let scheduling = Arc::new(SchedulingService::new(
            pump_store.clone(),
            block_store,
            event_sender,
        ));
        let kpi = Arc::new(KpiService::new(pump_store, utilization, kpi_max_staleness));

        Self {
            pumps,
            scheduling,
            kpi,
        }
    }

    /// In-memory wiring for single-process deployments and tests.
    pub fn in_memory(event_sender: EventSender, kpi_max_staleness: Duration) -> Self {
        Self::new(
            Arc::new(InMemoryPumpStore::new()),
            Arc::new(InMemoryCalendarBlockStore::new()),
            event_sender,
            kpi_max_staleness,
            None,
        )
    }
}
