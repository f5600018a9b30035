use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Domain events emitted after a successful commit. Events are
/// observational only: no core invariant depends on their delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    ItemCreated(Uuid),
    ItemUpdated(Uuid),
    ItemDeleted(Uuid),
    StockAdjusted {
        item_id: Uuid,
        delta: Decimal,
        new_level: Decimal,
    },
    KitTemplateCreated(Uuid),
    KitTemplateUpdated(Uuid),
    KitTemplateDeactivated(Uuid),
    KitsAssembled {
        assembly_id: Uuid,
        kit_template_id: Uuid,
        kit_item_id: Uuid,
        quantity: i32,
    },
    ProductionRecorded {
        production_id: Uuid,
        item_id: Uuid,
        quantity: Decimal,
    },
    PurchaseRecorded {
        purchase_id: Uuid,
        line_count: usize,
    },
    DistributionRecorded {
        distribution_id: Uuid,
        line_count: usize,
    },
    RecipientCreated(Uuid),
    RecipientUpdated(Uuid),
    UserRegistered(Uuid),
}

/// Cloneable handle for emitting events into the processing loop.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("failed to send event: {}", e))
    }

    /// Emits an event, logging instead of failing when the receiver is gone.
    /// Used on post-commit paths where the operation already succeeded.
    pub async fn emit(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("event dropped: {}", e);
        }
    }
}

/// Background loop draining the event channel. Currently events are logged;
/// this is the seam where notifications or projections would hang off.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::KitsAssembled {
                assembly_id,
                kit_template_id,
                quantity,
                ..
            } => {
                info!(
                    assembly_id = %assembly_id,
                    kit_template_id = %kit_template_id,
                    quantity,
                    "kits assembled"
                );
            }
            Event::StockAdjusted {
                item_id,
                delta,
                new_level,
            } => {
                info!(item_id = %item_id, %delta, %new_level, "stock adjusted");
            }
            other => info!(event = ?other, "event"),
        }
    }

    info!("event channel closed, stopping event loop");
}

/// Convenience constructor wiring a sender to a spawned processing loop.
pub fn channel(buffer: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(buffer);
    (EventSender::new(tx), rx)
}
