//! Shopledger - order statistics ledger.
//!
//! Keeps an append-only, per-metric time series of snapshots of active order
//! aggregates. Each snapshot records its value, the previous snapshot's
//! value and the percentage change between them.
//!
//! # Architecture
//!
//! - **`domain`** - Metric types, snapshots, change rate, orders
//! - **`port`** - Lock, cache and notifier seams
//! - **`adapter`** - SQLite (Diesel) stores and locks, in-memory locks and
//!   cache, log and broadcast notifiers
//! - **`application`** - `StatsService`, the order status trigger, retention
//!   cleanup and its scheduler, the order status service
//! - **`infrastructure`** - Configuration, logging and wiring
//! - **`cli`** - `shopledger` command tree
//!
//! # Example
//!
//! ```no_run
//! use shopledger::domain::stats::MetricType;
//! use shopledger::infrastructure::bootstrap::Ledger;
//! use shopledger::infrastructure::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ledger = Ledger::build(&Config::default())?;
//!     let update = ledger.stats.update_stats(&MetricType::sales(), 1100)?;
//!     println!("{} -> {} ({}%)", update.previous_value, update.current_value, update.change_rate);
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
