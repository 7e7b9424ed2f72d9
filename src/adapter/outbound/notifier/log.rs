//! Notifier that writes events to the tracing log.

use tracing::info;

use crate::port::outbound::notifier::{StatsEvent, StatsNotifier};

/// Logs every event at `info` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl StatsNotifier for LogNotifier {
    fn notify(&self, event: &StatsEvent) {
        match event {
            StatsEvent::OrderStatsUpdated(e) => {
                info!(
                    order_id = e.order_id,
                    order_count = e.order_count,
                    sales = e.sales,
                    "Order stats updated"
                );
            }
        }
    }
}
