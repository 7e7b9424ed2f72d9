//! SQLite order store.
//!
//! Persists orders and their items and hosts the update hook: a status update
//! runs its `on_updated` callback on the same connection, inside the same
//! transaction, so a failing callback rolls the update back.

use std::str::FromStr;

use chrono::Utc;
use diesel::prelude::*;
use diesel::OptionalExtension;
use diesel::SqliteConnection;
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::adapter::outbound::sqlite::database::model::{
    last_insert_rowid, parse_db_decimal, to_db_timestamp, NewOrderItemRow, NewOrderRow,
    OrderItemRow, OrderRow,
};
use crate::adapter::outbound::sqlite::database::schema::{order_items, orders};
use crate::domain::order::{NewOrder, Order, OrderStatus, StatusChange};
use crate::error::{Error, Result};

/// SQLite-backed order store.
#[derive(Clone)]
pub struct SqliteOrderStore {
    /// Database connection pool.
    pool: DbPool,
}

impl SqliteOrderStore {
    /// Create a new order store with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Insert an order and its items in one transaction.
    pub fn create(&self, order: &NewOrder) -> Result<Order> {
        let now = to_db_timestamp(Utc::now());
        let row = NewOrderRow {
            order_number: new_order_number(),
            customer_id: order.customer_id,
            status: order.status.as_str().to_string(),
            total_amount: order.total_amount()?.to_string(),
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        let mut conn = self.pool.get()?;
        let id = conn.immediate_transaction(|conn| {
            diesel::insert_into(orders::table)
                .values(&row)
                .execute(conn)?;
            let id = last_insert_rowid(conn)?;

            let items: Vec<NewOrderItemRow> = order
                .items
                .iter()
                .map(|item| NewOrderItemRow {
                    order_id: id,
                    product_id: item.product_id,
                    quantity: item.quantity,
                    unit_price: item.unit_price.to_string(),
                    created_at: now.clone(),
                })
                .collect();
            diesel::insert_into(order_items::table)
                .values(&items)
                .execute(conn)?;

            Ok::<i64, diesel::result::Error>(id)
        })?;

        debug!(order_id = id, order_number = %row.order_number, "Created order");
        self.find_with_conn(&mut conn, id)?
            .ok_or(Error::NotFound { entity: "order", id })
    }

    /// Load an order with its items, including soft-deleted orders.
    pub fn find(&self, id: i64) -> Result<Option<Order>> {
        let mut conn = self.pool.get()?;
        self.find_with_conn(&mut conn, id)
    }

    pub fn find_with_conn(&self, conn: &mut SqliteConnection, id: i64) -> Result<Option<Order>> {
        let Some(row) = orders::table
            .find(id)
            .select(OrderRow::as_select())
            .first(conn)
            .optional()?
        else {
            return Ok(None);
        };
        let items = OrderItemRow::belonging_to(&row)
            .select(OrderItemRow::as_select())
            .order(order_items::id.asc())
            .load(conn)?;
        row.into_order(items).map(Some)
    }

    /// Active orders (not cancelled, not soft-deleted), oldest first.
    pub fn list_active(&self) -> Result<Vec<Order>> {
        let mut conn = self.pool.get()?;
        let rows: Vec<OrderRow> = orders::table
            .filter(orders::status.ne(OrderStatus::Cancelled.as_str()))
            .filter(orders::deleted_at.is_null())
            .order(orders::id.asc())
            .select(OrderRow::as_select())
            .load(&mut conn)?;
        let items: Vec<OrderItemRow> = OrderItemRow::belonging_to(&rows)
            .select(OrderItemRow::as_select())
            .order(order_items::id.asc())
            .load(&mut conn)?;

        items
            .grouped_by(&rows)
            .into_iter()
            .zip(rows)
            .map(|(items, row)| row.into_order(items))
            .collect()
    }

    /// Change an order's status and run `on_updated` inside the same transaction.
    ///
    /// The status column is only written when it changes. `on_updated` runs
    /// for every persisted update, dirty or not, and sees the new status on
    /// `conn`; an error from it rolls the whole update back.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] for a missing order, or the callback's error.
    pub fn update_status<T, F>(&self, id: i64, status: OrderStatus, on_updated: F) -> Result<(Order, T)>
    where
        F: FnOnce(&mut SqliteConnection, &StatusChange) -> Result<T>,
    {
        let mut conn = self.pool.get()?;
        conn.immediate_transaction(|conn| {
            let current: OrderRow = orders::table
                .find(id)
                .select(OrderRow::as_select())
                .first(conn)
                .optional()?
                .ok_or(Error::NotFound { entity: "order", id })?;

            let change = StatusChange {
                order_id: id,
                original: OrderStatus::from_str(&current.status)?,
                current: status,
            };

            if change.is_dirty() {
                diesel::update(orders::table.find(id))
                    .set((
                        orders::status.eq(status.as_str()),
                        orders::updated_at.eq(to_db_timestamp(Utc::now())),
                    ))
                    .execute(conn)?;
                debug!(
                    order_id = id,
                    from = %change.original,
                    to = %change.current,
                    "Order status changed"
                );
            }

            let outcome = on_updated(conn, &change)?;
            let order = self
                .find_with_conn(conn, id)?
                .ok_or(Error::NotFound { entity: "order", id })?;
            Ok((order, outcome))
        })
    }

    /// Mark an order deleted without removing it.
    ///
    /// Soft deletion does not run the status update hook.
    pub fn soft_delete(&self, id: i64) -> Result<bool> {
        let mut conn = self.pool.get()?;
        let now = to_db_timestamp(Utc::now());
        let updated = diesel::update(
            orders::table
                .find(id)
                .filter(orders::deleted_at.is_null()),
        )
        .set((orders::deleted_at.eq(&now), orders::updated_at.eq(&now)))
        .execute(&mut conn)?;
        Ok(updated > 0)
    }

    /// Sum of item quantities across active orders.
    pub fn active_item_quantity_with_conn(&self, conn: &mut SqliteConnection) -> Result<i64> {
        let total: Option<i64> = order_items::table
            .inner_join(orders::table)
            .filter(orders::status.ne(OrderStatus::Cancelled.as_str()))
            .filter(orders::deleted_at.is_null())
            .select(diesel::dsl::sum(order_items::quantity))
            .first(conn)?;
        Ok(total.unwrap_or(0))
    }

    /// Sum of order totals across active orders.
    pub fn active_total_amount_with_conn(&self, conn: &mut SqliteConnection) -> Result<Decimal> {
        let totals: Vec<String> = orders::table
            .filter(orders::status.ne(OrderStatus::Cancelled.as_str()))
            .filter(orders::deleted_at.is_null())
            .select(orders::total_amount)
            .load(conn)?;
        totals
            .iter()
            .map(|total| parse_db_decimal(total))
            .sum::<Result<Decimal>>()
    }
}

fn new_order_number() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("ORD-{}-{}", Utc::now().format("%Y%m%d"), &suffix[..8].to_uppercase())
}
