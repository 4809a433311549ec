use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Domain events emitted after successful state changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Order events
    OrderCreated(i32),
    OrderDeleted(i32),
    OrderStatusChanged {
        order_id: i32,
        old_status: String,
        new_status: String,
    },
    MechanicAssigned {
        order_id: i32,
        mechanic_id: String,
    },
    CommentAdded {
        order_id: i32,
        comment_id: i32,
    },

    // Task events
    TaskAdded {
        order_id: i32,
        task_id: i32,
    },
    TaskCompleted(i32),
    TaskDeleted(i32),

    // Inventory events
    UsedPartRecorded {
        task_id: i32,
        part_id: i32,
        quantity: i32,
        remaining_stock: Option<i32>,
    },
    StockAdjusted {
        part_id: i32,
        delta: i32,
        new_quantity: i32,
    },
    LowStock {
        part_id: i32,
        remaining: i32,
    },
}

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
}

/// Consumes events off the channel and logs them. Runs until the channel
/// closes; downstream consumers (webhooks, notifications) would hang off this
/// loop.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::LowStock { part_id, remaining } => {
                warn!(part_id = %part_id, remaining = %remaining, "Part stock is low");
            }
            other => {
                info!(event = ?other, "Domain event");
            }
        }
    }
    info!("Event channel closed; event processor shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_event() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);

        sender
            .send(Event::OrderCreated(7))
            .await
            .expect("send should succeed");

        match rx.recv().await {
            Some(Event::OrderCreated(id)) => assert_eq!(id, 7),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_fails_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);

        assert!(sender.send(Event::TaskCompleted(1)).await.is_err());
    }
}
