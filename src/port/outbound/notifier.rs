//! Notifier port for ledger events.
//!
//! Events are emitted after the change that caused them has been committed,
//! so subscribers never see counts from a rolled-back update.

use serde::Serialize;

/// Events published by the statistics ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StatsEvent {
    /// Active order aggregates were recomputed after a cancellation change.
    OrderStatsUpdated(OrderStatsEvent),
}

/// Recomputed active order aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderStatsEvent {
    /// The order whose status change triggered the refresh.
    pub order_id: i64,
    /// Sum of item quantities across active orders.
    pub order_count: i64,
    /// Sum of order totals across active orders, in whole currency units.
    pub sales: i64,
}

/// Trait for event subscribers.
///
/// `notify` runs on the caller's thread and should return quickly.
pub trait StatsNotifier: Send + Sync {
    fn notify(&self, event: &StatsEvent);
}

/// Fans events out to every registered notifier.
#[derive(Default)]
pub struct NotifierRegistry {
    notifiers: Vec<Box<dyn StatsNotifier>>,
}

impl NotifierRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, notifier: Box<dyn StatsNotifier>) {
        self.notifiers.push(notifier);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl StatsNotifier for NotifierRegistry {
    fn notify(&self, event: &StatsEvent) {
        for notifier in &self.notifiers {
            notifier.notify(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct Recording(Arc<Mutex<Vec<StatsEvent>>>);

    impl StatsNotifier for Recording {
        fn notify(&self, event: &StatsEvent) {
            self.0.lock().push(event.clone());
        }
    }

    #[test]
    fn registry_fans_out_to_all() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut registry = NotifierRegistry::new();
        registry.register(Box::new(Recording(seen.clone())));
        registry.register(Box::new(Recording(seen.clone())));
        assert_eq!(registry.len(), 2);

        let event = StatsEvent::OrderStatsUpdated(OrderStatsEvent {
            order_id: 7,
            order_count: 3,
            sales: 120,
        });
        registry.notify(&event);

        assert_eq!(seen.lock().len(), 2);
        assert_eq!(seen.lock()[0], event);
    }

    #[test]
    fn event_serializes_with_tag() {
        let event = StatsEvent::OrderStatsUpdated(OrderStatsEvent {
            order_id: 1,
            order_count: 2,
            sales: 3,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "order_stats_updated");
        assert_eq!(json["sales"], 3);
    }
}
