//! Domain builders for tests.

use rust_decimal::Decimal;

use crate::domain::order::{NewOrder, NewOrderItem, OrderStatus};

/// Customer id used by [`order_with_items`].
pub const TEST_CUSTOMER_ID: i64 = 1;

/// Build an order from `(product_id, quantity, unit_price)` triples.
///
/// # Panics
/// Panics if `items` is empty or a quantity is not positive.
#[must_use]
pub fn order_with_items(status: OrderStatus, items: &[(i64, i32, Decimal)]) -> NewOrder {
    let items = items
        .iter()
        .map(|&(product_id, quantity, unit_price)| {
            NewOrderItem::try_new(product_id, quantity, unit_price).expect("valid test item")
        })
        .collect();
    NewOrder::try_new(TEST_CUSTOMER_ID, status, items).expect("valid test order")
}
