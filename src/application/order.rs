//! Order status use case.
//!
//! Updates an order's status with the stats trigger attached, and publishes
//! the refreshed aggregates once the update has committed.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::adapter::outbound::sqlite::SqliteOrderStore;
use crate::application::stats::trigger::{OrderStatsRefresh, OrderStatsTrigger};
use crate::domain::order::{NewOrder, Order, OrderStatus};
use crate::error::{Error, Result};
use crate::port::outbound::notifier::{OrderStatsEvent, StatsEvent, StatsNotifier};

/// Result of a status update.
#[derive(Debug, Clone, Serialize)]
pub struct OrderStatusUpdate {
    pub order: Order,
    /// Aggregates recorded by the trigger, if the change touched `cancelled`.
    pub refresh: Option<OrderStatsRefresh>,
}

pub struct OrderService {
    store: SqliteOrderStore,
    trigger: OrderStatsTrigger,
    notifier: Arc<dyn StatsNotifier>,
}

impl OrderService {
    #[must_use]
    pub fn new(store: SqliteOrderStore, trigger: OrderStatsTrigger, notifier: Arc<dyn StatsNotifier>) -> Self {
        Self {
            store,
            trigger,
            notifier,
        }
    }

    /// Persist a new order with its items.
    pub fn create(&self, order: &NewOrder) -> Result<Order> {
        let order = self.store.create(order)?;
        info!(
            order_id = order.id,
            order_number = %order.order_number,
            total_amount = %order.total_amount,
            "Order created"
        );
        Ok(order)
    }

    /// Load an order, including soft-deleted ones.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] when no order has `id`.
    pub fn get(&self, id: i64) -> Result<Order> {
        self.store
            .find(id)?
            .ok_or(Error::NotFound { entity: "order", id })
    }

    /// Change an order's status.
    ///
    /// The stats trigger runs inside the update's transaction; if it fails
    /// the status change is rolled back and the error returned. Listeners are
    /// notified only after commit.
    pub fn update_status(&self, id: i64, status: OrderStatus) -> Result<OrderStatusUpdate> {
        let (order, refresh) = self
            .store
            .update_status(id, status, |conn, change| {
                self.trigger.on_order_updated(conn, change)
            })
            .inspect_err(|_| {
                // The cached count may have been read inside the rolled-back
                // transaction.
                self.trigger.invalidate();
            })?;

        if let Some(refresh) = refresh {
            self.notifier
                .notify(&StatsEvent::OrderStatsUpdated(OrderStatsEvent {
                    order_id: order.id,
                    order_count: refresh.order_count,
                    sales: refresh.sales,
                }));
        }

        Ok(OrderStatusUpdate { order, refresh })
    }

    /// Soft-delete an order. Does not refresh stats.
    pub fn soft_delete(&self, id: i64) -> Result<bool> {
        self.store.soft_delete(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use rust_decimal_macros::dec;

    use crate::adapter::outbound::notifier::BroadcastNotifier;
    use crate::domain::stats::MetricType;
    use crate::port::outbound::lock::LockProvider;
    use crate::testkit::domain::order_with_items;
    use crate::testkit::ledger::TempLedger;

    fn service(ledger: &TempLedger) -> (OrderService, tokio::sync::broadcast::Receiver<StatsEvent>) {
        let (notifier, rx) = BroadcastNotifier::new(8);
        (ledger.order_service(Arc::new(notifier)), rx)
    }

    #[test]
    fn cancelling_records_each_metric_once_and_notifies() {
        let ledger = TempLedger::new();
        let (orders, mut rx) = service(&ledger);
        let keep = orders
            .create(&order_with_items(OrderStatus::Pending, &[(1, 3, dec!(20.00))]))
            .unwrap();
        let cancel = orders
            .create(&order_with_items(OrderStatus::Pending, &[(2, 2, dec!(7.25))]))
            .unwrap();

        let update = orders.update_status(cancel.id, OrderStatus::Cancelled).unwrap();

        assert_eq!(update.order.status, OrderStatus::Cancelled);
        let refresh = update.refresh.unwrap();
        assert_eq!(refresh.order_count, 3);
        assert_eq!(refresh.sales, 60);

        let stats = ledger.stats_store();
        assert_eq!(stats.history(&MetricType::order_count(), 10).unwrap().len(), 1);
        assert_eq!(stats.history(&MetricType::sales(), 10).unwrap().len(), 1);

        assert_eq!(
            rx.try_recv().unwrap(),
            StatsEvent::OrderStatsUpdated(OrderStatsEvent {
                order_id: cancel.id,
                order_count: 3,
                sales: 60,
            })
        );
        assert_eq!(orders.get(keep.id).unwrap().status, OrderStatus::Pending);
    }

    #[test]
    fn non_cancellation_transition_records_nothing() {
        let ledger = TempLedger::new();
        let (orders, mut rx) = service(&ledger);
        let order = orders
            .create(&order_with_items(OrderStatus::Pending, &[(1, 1, dec!(5.00))]))
            .unwrap();

        let update = orders.update_status(order.id, OrderStatus::Processing).unwrap();

        assert_eq!(update.order.status, OrderStatus::Processing);
        assert!(update.refresh.is_none());
        assert_eq!(ledger.stats_store().count().unwrap(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn restoring_a_cancelled_order_refreshes() {
        let ledger = TempLedger::new();
        let (orders, _rx) = service(&ledger);
        let order = orders
            .create(&order_with_items(OrderStatus::Cancelled, &[(1, 4, dec!(2.50))]))
            .unwrap();

        let refresh = orders
            .update_status(order.id, OrderStatus::Pending)
            .unwrap()
            .refresh
            .unwrap();
        assert_eq!(refresh.order_count, 4);
        assert_eq!(refresh.sales, 10);
    }

    #[test]
    fn unchanged_status_does_not_trigger() {
        let ledger = TempLedger::new();
        let (orders, _rx) = service(&ledger);
        let order = orders
            .create(&order_with_items(OrderStatus::Cancelled, &[(1, 1, dec!(1.00))]))
            .unwrap();

        let update = orders.update_status(order.id, OrderStatus::Cancelled).unwrap();
        assert!(update.refresh.is_none());
        assert_eq!(ledger.stats_store().count().unwrap(), 0);
    }

    #[test]
    fn stats_failure_rolls_back_status_change() {
        let ledger = TempLedger::with_lock_wait(Duration::from_millis(50));
        let (orders, mut rx) = service(&ledger);
        let order = orders
            .create(&order_with_items(OrderStatus::Pending, &[(1, 1, dec!(9.99))]))
            .unwrap();
        let _sales_lock = ledger
            .locks()
            .try_acquire(&MetricType::sales().lock_key(), Duration::from_secs(10))
            .unwrap()
            .unwrap();

        let err = orders.update_status(order.id, OrderStatus::Cancelled).unwrap_err();

        assert!(err.is_lock_timeout());
        assert_eq!(orders.get(order.id).unwrap().status, OrderStatus::Pending);
        // The order_count append ran before the failure and was rolled back with it.
        assert_eq!(ledger.stats_store().count().unwrap(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn missing_order_is_not_found() {
        let ledger = TempLedger::new();
        let (orders, _rx) = service(&ledger);
        let err = orders.update_status(404, OrderStatus::Cancelled).unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "order", id: 404 }));
    }

    #[test]
    fn soft_deleted_order_leaves_active_aggregates() {
        let ledger = TempLedger::new();
        let (orders, _rx) = service(&ledger);
        let deleted = orders
            .create(&order_with_items(OrderStatus::Pending, &[(1, 10, dec!(100.00))]))
            .unwrap();
        let cancelled = orders
            .create(&order_with_items(OrderStatus::Pending, &[(1, 1, dec!(1.00))]))
            .unwrap();
        orders
            .create(&order_with_items(OrderStatus::Pending, &[(1, 2, dec!(3.00))]))
            .unwrap();

        assert!(orders.soft_delete(deleted.id).unwrap());
        assert_eq!(ledger.stats_store().count().unwrap(), 0);

        let refresh = orders
            .update_status(cancelled.id, OrderStatus::Cancelled)
            .unwrap()
            .refresh
            .unwrap();
        assert_eq!(refresh.order_count, 2);
        assert_eq!(refresh.sales, 6);
    }
}
