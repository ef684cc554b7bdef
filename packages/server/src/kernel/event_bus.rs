//! In-process fan-out of lifecycle facts.
//!
//! Every committed transition publishes one [`ListingEvent`]; an external
//! pub/sub collaborator (websocket gateway, message broker bridge) consumes
//! them via [`EventBus::subscribe`]. Publishing with no subscribers is a
//! no-op — the core produces events deterministically but does not own
//! delivery.

use tokio::sync::broadcast;

use crate::domains::listings::events::ListingEvent;

const CHANNEL_CAPACITY: usize = 256;

/// Cloneable broadcast handle.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ListingEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publishes a fact. Send errors (no active receivers) are ignored.
    pub fn publish(&self, event: ListingEvent) {
        let _ = self.tx.send(event);
    }

    /// Opens a subscription from this point onward.
    pub fn subscribe(&self) -> broadcast::Receiver<ListingEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
