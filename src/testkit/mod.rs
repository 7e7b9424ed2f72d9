//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`ledger`]: [`TempLedger`](ledger::TempLedger): a migrated temp-file
//!   database with services wired to in-memory locks and cache.
//! - [`domain`]: builders for orders and items.

pub mod domain;
pub mod ledger;
