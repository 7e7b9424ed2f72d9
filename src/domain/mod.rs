//! Domain types shared by every layer.
//!
//! - [`stats`] - Metric types, ledger snapshots and change-rate arithmetic
//! - [`order`] - Order status, transitions and line items
//! - [`error`] - Validation errors for both

pub mod error;
pub mod order;
pub mod stats;
