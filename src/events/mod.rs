use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
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

    /// Sends an event, logging a warning instead of failing the caller when
    /// the channel is closed or full.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Event delivery failed: {}", e);
        }
    }
}

// Define the various events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Cart events
    CartCreated(Uuid),
    CartItemAdded { cart_id: Uuid, item_id: String },
    CartItemUpdated { cart_id: Uuid, item_id: String },
    CartItemRemoved { cart_id: Uuid, item_id: String },
    CartCleared(Uuid),

    // Order events
    OrderCreated(Uuid),
    OrderStatusChanged {
        order_id: Uuid,
        old_status: String,
        new_status: String,
    },

    // Preference events
    PreferencesSaved(String),
}

/// Consumes events from the channel and logs them. Runs until the channel
/// closes, i.e. until every `EventSender` has been dropped.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::CartCreated(cart_id) => {
                info!(%cart_id, "Cart created");
            }
            Event::CartItemAdded { cart_id, item_id } => {
                info!(%cart_id, %item_id, "Cart item added");
            }
            Event::CartItemUpdated { cart_id, item_id } => {
                info!(%cart_id, %item_id, "Cart item quantity updated");
            }
            Event::CartItemRemoved { cart_id, item_id } => {
                info!(%cart_id, %item_id, "Cart item removed");
            }
            Event::CartCleared(cart_id) => {
                info!(%cart_id, "Cart cleared");
            }
            Event::OrderCreated(order_id) => {
                info!(%order_id, "Order created");
            }
            Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            } => {
                info!(%order_id, %old_status, %new_status, "Order status changed");
            }
            Event::PreferencesSaved(owner_id) => {
                info!(%owner_id, "User preferences saved");
            }
        }
    }
    info!("Event channel closed, stopping event processor");
}
