//! In-process broadcast of ledger events.
//!
//! Subscribers receive every event sent after they subscribe. Sending with no
//! subscribers is not an error; slow subscribers see `Lagged` and skip ahead.

use tokio::sync::broadcast;
use tracing::trace;

use crate::port::outbound::notifier::{StatsEvent, StatsNotifier};

/// Default number of buffered events per subscriber.
pub const DEFAULT_CAPACITY: usize = 64;

/// Publishes events on a `tokio` broadcast channel.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<StatsEvent>,
}

impl BroadcastNotifier {
    /// Create a notifier and its first receiver.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, broadcast::Receiver<StatsEvent>) {
        let (tx, rx) = broadcast::channel(capacity);
        (Self { tx }, rx)
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StatsEvent> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY).0
    }
}

impl StatsNotifier for BroadcastNotifier {
    fn notify(&self, event: &StatsEvent) {
        // No receivers is fine.
        if let Ok(receivers) = self.tx.send(event.clone()) {
            trace!(receivers, "Broadcast stats event");
        }
    }
}
