//! SQLite persistence adapters.
//!
//! Provides the statistics ledger, the order store and a cache-table lock
//! provider using Diesel ORM.
//!
//! The ledger and order stores expose `*_with_conn` operations that take a
//! caller-owned connection. The order trigger relies on this: its aggregate
//! reads and ledger appends must see, and roll back with, the order update
//! that fired it.

pub mod database;
pub mod lock;
pub mod order;
pub mod stats_log;

pub use database::connection::{create_pool, open, run_migrations, DbPool};
pub use lock::SqliteLockProvider;
pub use order::SqliteOrderStore;
pub use stats_log::SqliteStatsLogStore;
