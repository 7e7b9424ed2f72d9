//! Domain validation errors.
//!
//! Returned by constructors and parsers that guard ledger and order
//! invariants.
//!
//! ```
//! use shopledger::domain::error::DomainError;
//! use shopledger::domain::order::OrderStatus;
//!
//! let result: Result<OrderStatus, _> = "refunded".parse();
//! assert!(matches!(result, Err(DomainError::UnknownOrderStatus { .. })));
//! ```

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Metric type tags must be non-empty and fit the `stats_logs` column.
    #[error("invalid metric type '{value}': {reason}")]
    InvalidMetricType {
        /// The rejected tag.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Order status text did not match a known status.
    #[error("unknown order status '{value}'")]
    UnknownOrderStatus {
        /// The unrecognised status text.
        value: String,
    },

    /// Order items must carry a positive quantity.
    #[error("item quantity must be positive, got {quantity}")]
    NonPositiveQuantity {
        /// The invalid quantity.
        quantity: i32,
    },

    /// An order needs at least one item.
    #[error("order must contain at least one item")]
    EmptyOrder,

    /// A line or order total does not fit a decimal.
    #[error("order amount overflows")]
    AmountOverflow,

    /// A monetary amount failed to parse.
    #[error("invalid amount '{value}'")]
    InvalidAmount {
        /// The text that failed to parse.
        value: String,
    },
}
