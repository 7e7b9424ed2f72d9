//! Order status trigger.
//!
//! Recomputes the active order aggregates whenever an order moves into or
//! out of `cancelled`, and appends them to the ledger. Runs on the
//! connection of the order update that fired it, so the aggregates include
//! the new status and a failure here rolls the order update back.

use std::sync::Arc;
use std::time::Duration;

use diesel::SqliteConnection;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{error, info};

use crate::adapter::outbound::sqlite::SqliteOrderStore;
use crate::application::stats::service::StatsService;
use crate::domain::error::DomainError;
use crate::domain::order::StatusChange;
use crate::domain::stats::MetricType;
use crate::error::Result;
use crate::port::outbound::cache::Cache;
use crate::port::outbound::lock::LockProvider;

/// Lock serialising aggregate recomputation across all orders.
pub const ORDER_STATS_LOCK: &str = "order_stats_update_lock";

/// Cache key of the active item quantity.
pub const ACTIVE_ORDER_COUNT_KEY: &str = "active_order_count";

/// Aggregates written by one refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderStatsRefresh {
    pub order_count: i64,
    pub sales: i64,
}

/// Keeps the `order_count` and `sales` metrics in step with order status.
#[derive(Clone)]
pub struct OrderStatsTrigger {
    stats: StatsService,
    orders: SqliteOrderStore,
    locks: Arc<dyn LockProvider>,
    cache: Arc<dyn Cache>,
    aggregate_ttl: Duration,
}

impl OrderStatsTrigger {
    #[must_use]
    pub fn new(
        stats: StatsService,
        orders: SqliteOrderStore,
        locks: Arc<dyn LockProvider>,
        cache: Arc<dyn Cache>,
        aggregate_ttl: Duration,
    ) -> Self {
        Self {
            stats,
            orders,
            locks,
            cache,
            aggregate_ttl,
        }
    }

    /// Hook for every persisted order update.
    ///
    /// Returns `None` when the change does not touch `cancelled`.
    ///
    /// # Errors
    /// Lock timeouts and storage failures are logged and returned; the caller
    /// is expected to abort its transaction.
    pub fn on_order_updated(
        &self,
        conn: &mut SqliteConnection,
        change: &StatusChange,
    ) -> Result<Option<OrderStatsRefresh>> {
        if !change.affects_active_orders() {
            return Ok(None);
        }

        match self.refresh(conn) {
            Ok(refresh) => {
                info!(
                    order_id = change.order_id,
                    from = %change.original,
                    to = %change.current,
                    order_count = refresh.order_count,
                    sales = refresh.sales,
                    "Order stats refreshed"
                );
                Ok(Some(refresh))
            }
            Err(e) => {
                error!(
                    order_id = change.order_id,
                    from = %change.original,
                    to = %change.current,
                    error = %e,
                    "Failed to refresh order stats"
                );
                Err(e)
            }
        }
    }

    /// Recompute both aggregates and record them under the order stats lock.
    pub fn refresh(&self, conn: &mut SqliteConnection) -> Result<OrderStatsRefresh> {
        let _guard = self.locks.lock(ORDER_STATS_LOCK, self.stats.timeouts())?;

        let order_count = self.cache.remember(ACTIVE_ORDER_COUNT_KEY, self.aggregate_ttl, || {
            self.orders.active_item_quantity_with_conn(conn)
        })?;
        let sales = whole_units(self.orders.active_total_amount_with_conn(conn)?)?;

        self.stats
            .update_stats_with_conn(conn, &MetricType::order_count(), order_count)?;
        self.stats
            .update_stats_with_conn(conn, &MetricType::sales(), sales)?;

        Ok(OrderStatsRefresh { order_count, sales })
    }

    /// Drop the cached active order count.
    pub fn invalidate(&self) {
        self.cache.forget(ACTIVE_ORDER_COUNT_KEY);
    }
}

/// Truncate toward zero to whole currency units.
fn whole_units(amount: Decimal) -> Result<i64> {
    amount.trunc().to_i64().ok_or_else(|| {
        DomainError::InvalidAmount {
            value: amount.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::domain::order::OrderStatus;
    use crate::testkit::domain::order_with_items;
    use crate::testkit::ledger::TempLedger;

    fn change(original: OrderStatus, current: OrderStatus) -> StatusChange {
        StatusChange {
            order_id: 1,
            original,
            current,
        }
    }

    #[test]
    fn whole_units_truncates_toward_zero() {
        assert_eq!(whole_units(dec!(1099.99)).unwrap(), 1099);
        assert_eq!(whole_units(dec!(-5.5)).unwrap(), -5);
        assert_eq!(whole_units(Decimal::ZERO).unwrap(), 0);
    }

    #[test]
    fn transitions_not_touching_cancelled_are_ignored() {
        let ledger = TempLedger::new();
        let trigger = ledger.trigger();
        let mut conn = ledger.pool().get().unwrap();

        let outcome = trigger
            .on_order_updated(&mut conn, &change(OrderStatus::Pending, OrderStatus::Processing))
            .unwrap();
        assert!(outcome.is_none());

        let outcome = trigger
            .on_order_updated(&mut conn, &change(OrderStatus::Cancelled, OrderStatus::Cancelled))
            .unwrap();
        assert!(outcome.is_none());
        assert_eq!(ledger.stats_store().count().unwrap(), 0);
    }

    #[test]
    fn cancellation_records_both_metrics() {
        let ledger = TempLedger::new();
        let trigger = ledger.trigger();
        let orders = ledger.order_store();
        orders
            .create(&order_with_items(OrderStatus::Pending, &[(1, 2, dec!(10.50)), (2, 1, dec!(4.00))]))
            .unwrap();
        orders
            .create(&order_with_items(OrderStatus::Processing, &[(3, 5, dec!(100.00))]))
            .unwrap();

        let mut conn = ledger.pool().get().unwrap();
        let refresh = trigger
            .on_order_updated(&mut conn, &change(OrderStatus::Pending, OrderStatus::Cancelled))
            .unwrap()
            .unwrap();

        // Nothing is cancelled in storage yet, so every order counts.
        assert_eq!(refresh.order_count, 8);
        assert_eq!(refresh.sales, 525);

        let stats = ledger.stats_store();
        assert_eq!(stats.latest(&MetricType::order_count()).unwrap().unwrap().current_value, 8);
        assert_eq!(stats.latest(&MetricType::sales()).unwrap().unwrap().current_value, 525);
    }

    #[test]
    fn order_count_is_served_from_cache_within_ttl() {
        let ledger = TempLedger::new();
        let trigger = ledger.trigger();
        let orders = ledger.order_store();
        orders
            .create(&order_with_items(OrderStatus::Pending, &[(1, 2, dec!(1.00))]))
            .unwrap();

        let mut conn = ledger.pool().get().unwrap();
        assert_eq!(trigger.refresh(&mut conn).unwrap().order_count, 2);

        orders
            .create(&order_with_items(OrderStatus::Pending, &[(1, 3, dec!(1.00))]))
            .unwrap();
        let cached = trigger.refresh(&mut conn).unwrap();
        assert_eq!(cached.order_count, 2);
        assert_eq!(cached.sales, 5);

        trigger.invalidate();
        assert_eq!(trigger.refresh(&mut conn).unwrap().order_count, 5);
    }

    #[test]
    fn busy_order_stats_lock_fails_the_refresh() {
        let ledger = TempLedger::new();
        let trigger = ledger.trigger_with_wait(Duration::from_millis(50));
        let _held = ledger
            .locks()
            .try_acquire(ORDER_STATS_LOCK, Duration::from_secs(10))
            .unwrap()
            .unwrap();

        let mut conn = ledger.pool().get().unwrap();
        let err = trigger
            .on_order_updated(&mut conn, &change(OrderStatus::Cancelled, OrderStatus::Pending))
            .unwrap_err();
        assert!(err.is_lock_timeout());
        assert_eq!(ledger.stats_store().count().unwrap(), 0);
    }
}
