//! Process-local adapters for single-instance deployments and tests.

pub mod cache;
pub mod lock;

pub use cache::MemoryCache;
pub use lock::MemoryLockProvider;
