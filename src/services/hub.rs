//! In-process fan-out for upload status events.
//!
//! Every socket attached to `/ws` gets its own receiver; an event published by
//! one peer is delivered to all others. Nothing is buffered beyond the channel
//! capacity and nothing is persisted.

use crate::models::UploadEvent;
use tokio::sync::broadcast;
use uuid::Uuid;

/// An event tagged with the connection that sent it
#[derive(Debug, Clone)]
pub struct RelayedEvent {
    pub origin: Uuid,
    pub event: UploadEvent,
}

#[derive(Debug, Clone)]
pub struct NotificationHub {
    tx: broadcast::Sender<RelayedEvent>,
}

impl NotificationHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RelayedEvent> {
        self.tx.subscribe()
    }

    /// Returns how many subscribers the event was handed to, the sender included.
    pub fn publish(&self, origin: Uuid, event: UploadEvent) -> usize {
        tracing::debug!("Relaying {} for {}", event.kind(), event.filename());
        // No subscribers is not an error for a fire-and-forget relay
        self.tx.send(RelayedEvent { origin, event }).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let hub = NotificationHub::new(8);
        let mut rx = hub.subscribe();
        let origin = Uuid::new_v4();

        let delivered = hub.publish(
            origin,
            UploadEvent::UploadStart {
                filename: "jan.pdf".to_string(),
            },
        );
        assert_eq!(delivered, 1);

        let relayed = rx.recv().await.unwrap();
        assert_eq!(relayed.origin, origin);
        assert_eq!(relayed.event.kind(), "upload_start");
    }

    #[test]
    fn test_publish_without_subscribers() {
        let hub = NotificationHub::new(0);
        assert_eq!(hub.subscriber_count(), 0);
        let delivered = hub.publish(
            Uuid::new_v4(),
            UploadEvent::UploadComplete {
                filename: "jan.pdf".to_string(),
            },
        );
        assert_eq!(delivered, 0);
    }
}
