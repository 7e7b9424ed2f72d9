//! Database model types for Diesel ORM.
//!
//! Timestamps are stored as RFC 3339 UTC text with a fixed microsecond
//! precision so that lexical order matches chronological order. Decimal
//! values are stored as canonical decimal text.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use rust_decimal::Decimal;

use super::schema::{order_items, orders, stats_logs};
use crate::domain::order::{Order, OrderItem, OrderStatus};
use crate::domain::stats::{to_rate_scale, MetricType, NewSnapshot, StatsLogEntry};
use crate::error::{Error, Result};

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    #[diesel(column_name = "id")]
    id: i64,
}

/// Row id assigned by the most recent insert on `conn`.
///
/// # Errors
/// Returns the underlying query error.
pub fn last_insert_rowid(conn: &mut SqliteConnection) -> QueryResult<i64> {
    diesel::sql_query("SELECT last_insert_rowid() AS id")
        .get_result::<LastInsertRowId>(conn)
        .map(|row| row.id)
}

/// Format a timestamp for storage.
#[must_use]
pub fn to_db_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp.
///
/// # Errors
/// Returns [`Error::Parse`] for text that is not RFC 3339.
pub fn parse_db_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Parse(format!("timestamp '{value}': {e}")))
}

/// Parse a stored decimal.
///
/// # Errors
/// Returns [`Error::Parse`] for text that is not a decimal number.
pub fn parse_db_decimal(value: &str) -> Result<Decimal> {
    Decimal::from_str(value).map_err(|e| Error::Parse(format!("decimal '{value}': {e}")))
}

/// Database row for a ledger snapshot (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = stats_logs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StatsLogRow {
    pub id: i64,
    pub metric_type: String,
    pub current_value: i64,
    pub previous_value: i64,
    pub change_rate: String,
    pub recorded_at: String,
    pub created_at: String,
    pub updated_at: String,
}

impl StatsLogRow {
    /// Convert to the domain entry.
    ///
    /// # Errors
    /// Returns an error if a stored column fails to parse.
    pub fn into_entry(self) -> Result<StatsLogEntry> {
        Ok(StatsLogEntry {
            id: self.id,
            metric_type: MetricType::try_new(self.metric_type)?,
            current_value: self.current_value,
            previous_value: self.previous_value,
            change_rate: parse_db_decimal(&self.change_rate)?,
            recorded_at: parse_db_timestamp(&self.recorded_at)?,
        })
    }
}

/// Database row for a ledger snapshot (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = stats_logs)]
pub struct NewStatsLogRow {
    pub metric_type: String,
    pub current_value: i64,
    pub previous_value: i64,
    pub change_rate: String,
    pub recorded_at: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&NewSnapshot> for NewStatsLogRow {
    fn from(snapshot: &NewSnapshot) -> Self {
        let now = to_db_timestamp(Utc::now());
        Self {
            metric_type: snapshot.metric_type.to_string(),
            current_value: snapshot.current_value,
            previous_value: snapshot.previous_value,
            change_rate: to_rate_scale(snapshot.change_rate).to_string(),
            recorded_at: to_db_timestamp(snapshot.recorded_at),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Database row for an order (queryable).
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OrderRow {
    pub id: i64,
    pub order_number: String,
    pub customer_id: i64,
    pub status: String,
    pub total_amount: String,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
}

impl OrderRow {
    /// Convert to the domain order with its items.
    ///
    /// # Errors
    /// Returns an error if a stored column fails to parse.
    pub fn into_order(self, items: Vec<OrderItemRow>) -> Result<Order> {
        let items = items
            .into_iter()
            .map(OrderItemRow::into_item)
            .collect::<Result<Vec<_>>>()?;
        Ok(Order {
            id: self.id,
            order_number: self.order_number,
            customer_id: self.customer_id,
            status: self.status.parse::<OrderStatus>()?,
            total_amount: parse_db_decimal(&self.total_amount)?,
            items,
            created_at: parse_db_timestamp(&self.created_at)?,
            updated_at: parse_db_timestamp(&self.updated_at)?,
            deleted_at: self
                .deleted_at
                .as_deref()
                .map(parse_db_timestamp)
                .transpose()?,
        })
    }
}

/// Database row for an order (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub order_number: String,
    pub customer_id: i64,
    pub status: String,
    pub total_amount: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Database row for an order item (queryable).
#[derive(Queryable, Selectable, Identifiable, Associations, Debug, Clone)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OrderItemRow {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: String,
    pub created_at: String,
}

impl OrderItemRow {
    fn into_item(self) -> Result<OrderItem> {
        Ok(OrderItem {
            id: self.id,
            product_id: self.product_id,
            quantity: self.quantity,
            unit_price: parse_db_decimal(&self.unit_price)?,
        })
    }
}

/// Database row for an order item (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow {
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: String,
    pub created_at: String,
}
