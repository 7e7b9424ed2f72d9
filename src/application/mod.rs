//! Application services (use cases).
//!
//! These services orchestrate domain logic and coordinate adapters
//! to implement the ledger's use cases.

pub mod order;
pub mod stats;

pub use order::{OrderService, OrderStatusUpdate};
pub use stats::{CleanupScheduler, OrderStatsRefresh, OrderStatsTrigger, RetentionJob, StatsService};
