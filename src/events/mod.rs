use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

use crate::models::PumpStage;
use crate::services::kpi::KpiService;

/// Events emitted by the workflow and scheduling services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    PumpCreated(Uuid),
    PumpUpdated(Uuid),
    PumpStageChanged {
        pump_id: Uuid,
        old_stage: PumpStage,
        new_stage: PumpStage,
    },
    PumpScheduled {
        pump_id: Uuid,
        block_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    PumpUnscheduled {
        pump_id: Uuid,
        block_id: Uuid,
    },
    PumpRescheduled {
        pump_id: Uuid,
        old_block_id: Uuid,
        new_block_id: Uuid,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Consumes the event channel: logs each event and invalidates the KPI
/// cache, since every event mutates work-item state the KPI scan reads.
pub async fn process_events(mut rx: mpsc::Receiver<Event>, kpi: Option<KpiService>) {
    info!("Event processor started");
    while let Some(event) = rx.recv().await {
        info!(event = ?event, "Processing event");
        if let Some(kpi) = &kpi {
            kpi.invalidate().await;
        }
    }
    info!("Event processor stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_round_trip_through_the_channel() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);

        let pump_id = Uuid::new_v4();
        sender.send(Event::PumpCreated(pump_id)).await.unwrap();

        match rx.recv().await {
            Some(Event::PumpCreated(id)) => assert_eq!(id, pump_id),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_reports_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        assert!(sender.send(Event::PumpUpdated(Uuid::new_v4())).await.is_err());
    }
}
