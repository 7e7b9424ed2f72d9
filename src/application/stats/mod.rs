//! Statistics ledger use cases.

pub mod retention;
pub mod scheduler;
pub mod service;
pub mod trigger;

pub use retention::RetentionJob;
pub use scheduler::CleanupScheduler;
pub use service::StatsService;
pub use trigger::{OrderStatsRefresh, OrderStatsTrigger};
