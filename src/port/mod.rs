//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the seams the application services are written against.
//! Adapters implement them for concrete infrastructure.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!                    │                         │
//!     ┌──────────────┤  Domain + Port          ├──────────────┐
//!     │              │                         │              │
//!     │              └─────────────────────────┘              │
//!     │                         │                             │
//!     ▼                         ▼                             ▼
//! ┌─────────┐            ┌─────────────┐              ┌───────────┐
//! │  Lock   │            │   Cache     │              │ Notifier  │
//! │ Adapter │            │   Adapter   │              │  Adapter  │
//! └─────────┘            └─────────────┘              └───────────┘
//! ```
//!
//! The ledger and order stores are SQLite-specific because the order
//! trigger must run on the connection that holds the order's transaction;
//! see [`crate::adapter::outbound::sqlite`].

pub mod outbound;

pub use outbound::cache::Cache;
pub use outbound::lock::{LockGuard, LockProvider, LockTimeouts, LockToken};
pub use outbound::notifier::{NotifierRegistry, OrderStatsEvent, StatsEvent, StatsNotifier};
