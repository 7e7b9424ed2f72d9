//! Statistics ledger configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::application::stats::retention::DEFAULT_RETENTION_DAYS;
use crate::application::stats::scheduler::DEFAULT_CLEANUP_INTERVAL;

/// Retention and aggregate caching settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StatsConfig {
    /// Snapshots older than this many days are deleted by cleanup (default: 30).
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    /// How long the active order count is cached, in seconds (default: 60).
    /// Zero disables caching.
    #[serde(default = "default_aggregate_cache_ttl_secs")]
    pub aggregate_cache_ttl_secs: u64,
    /// Seconds between scheduled cleanups (default: one day).
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

const fn default_retention_days() -> u32 {
    DEFAULT_RETENTION_DAYS
}

const fn default_aggregate_cache_ttl_secs() -> u64 {
    60
}

const fn default_cleanup_interval_secs() -> u64 {
    DEFAULT_CLEANUP_INTERVAL.as_secs()
}

impl StatsConfig {
    #[must_use]
    pub const fn aggregate_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.aggregate_cache_ttl_secs)
    }

    #[must_use]
    pub const fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
            aggregate_cache_ttl_secs: default_aggregate_cache_ttl_secs(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}
