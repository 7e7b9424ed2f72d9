//! Order domain types.
//!
//! Only the attributes the statistics trigger depends on are modelled:
//! status, total amount, items and the soft-delete marker.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::error::DomainError;

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Processing,
        Self::Confirmed,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Confirmed => "confirmed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    #[must_use]
    pub const fn is_cancelled(self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| DomainError::UnknownOrderStatus {
                value: s.to_string(),
            })
    }
}

/// A persisted status change of one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub order_id: i64,
    pub original: OrderStatus,
    pub current: OrderStatus,
}

impl StatusChange {
    /// Whether the status column actually changed.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.original != self.current
    }

    /// Whether this change moves the order into or out of cancellation,
    /// which changes the set of active orders.
    #[must_use]
    pub fn affects_active_orders(&self) -> bool {
        self.is_dirty() && (self.original.is_cancelled() || self.current.is_cancelled())
    }
}

/// A line item of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: i64,
    pub order_number: String,
    pub customer_id: i64,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Order {
    #[must_use]
    pub fn item_quantity(&self) -> i64 {
        self.items.iter().map(|item| i64::from(item.quantity)).sum()
    }
}

/// Line item of an order about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl NewOrderItem {
    /// # Errors
    /// Returns [`DomainError::NonPositiveQuantity`] for a zero or negative quantity
    /// and [`DomainError::AmountOverflow`] when the line total does not fit.
    pub fn try_new(product_id: i64, quantity: i32, unit_price: Decimal) -> Result<Self, DomainError> {
        if quantity <= 0 {
            return Err(DomainError::NonPositiveQuantity { quantity });
        }
        let item = Self {
            product_id,
            quantity,
            unit_price,
        };
        item.line_total()?;
        Ok(item)
    }

    /// # Errors
    /// Returns [`DomainError::AmountOverflow`] when the product does not fit.
    pub fn line_total(&self) -> Result<Decimal, DomainError> {
        self.unit_price
            .checked_mul(Decimal::from(self.quantity))
            .ok_or(DomainError::AmountOverflow)
    }
}

impl FromStr for NewOrderItem {
    type Err = DomainError;

    /// Parse `PRODUCT:QTY:PRICE`, e.g. `42:2:19.99`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidAmount {
            value: s.to_string(),
        };
        let mut parts = s.split(':');
        let (Some(product), Some(quantity), Some(price), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        let product_id = product.trim().parse().map_err(|_| invalid())?;
        let quantity = quantity.trim().parse().map_err(|_| invalid())?;
        let unit_price = Decimal::from_str(price.trim()).map_err(|_| invalid())?;
        Self::try_new(product_id, quantity, unit_price)
    }
}

/// Order about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_id: i64,
    pub status: OrderStatus,
    pub items: Vec<NewOrderItem>,
}

impl NewOrder {
    /// # Errors
    /// Returns [`DomainError::EmptyOrder`] when no items are given and
    /// [`DomainError::AmountOverflow`] when the total does not fit.
    pub fn try_new(
        customer_id: i64,
        status: OrderStatus,
        items: Vec<NewOrderItem>,
    ) -> Result<Self, DomainError> {
        if items.is_empty() {
            return Err(DomainError::EmptyOrder);
        }
        let order = Self {
            customer_id,
            status,
            items,
        };
        order.total_amount()?;
        Ok(order)
    }

    /// Sum of line totals, rounded to cents.
    ///
    /// # Errors
    /// Returns [`DomainError::AmountOverflow`] when the sum does not fit.
    pub fn total_amount(&self) -> Result<Decimal, DomainError> {
        self.items
            .iter()
            .try_fold(Decimal::ZERO, |total, item| {
                total
                    .checked_add(item.line_total()?)
                    .ok_or(DomainError::AmountOverflow)
            })
            .map(|total| total.round_dp(2))
    }
}
