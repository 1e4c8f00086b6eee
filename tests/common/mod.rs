use std::time::Duration;

use pumpflow_api::config::AppConfig;
use pumpflow_api::events::{process_events, EventSender};
use pumpflow_api::models::Pump;
use pumpflow_api::services::pumps::CreatePump;
use pumpflow_api::services::AppServices;
use pumpflow_api::AppState;
use tokio::sync::mpsc;

/// Builds an in-memory app state with a zero KPI staleness bound so
/// every KPI read re-scans, and a running event processor.
pub fn test_state() -> AppState {
    let (tx, rx) = mpsc::channel(256);
    let event_sender = EventSender::new(tx);
    let services = AppServices::in_memory(event_sender.clone(), Duration::from_secs(0));
    tokio::spawn(process_events(rx, Some(services.kpi.as_ref().clone())));

    AppState {
        config: AppConfig::default(),
        event_sender,
        services,
    }
}

pub async fn seed_pump(state: &AppState, model: &str) -> Pump {
    state
        .services
        .pumps
        .create_pump(CreatePump {
            model: model.into(),
            customer: "Acme Water".into(),
            po_number: "PO-1001".into(),
            serial_number: None,
            finish_vendor: None,
            finish_color: None,
            priority: Default::default(),
            quantity: None,
            notes: None,
        })
        .await
        .expect("seed pump")
}
