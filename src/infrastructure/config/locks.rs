//! Named lock configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::port::outbound::lock::LockTimeouts;

/// Where named locks live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockBackend {
    /// In-process locks; only safe with a single writer process.
    #[default]
    Memory,
    /// A `cache_locks` table in a separate SQLite file shared between processes.
    Sqlite,
}

/// Lock backend and timeouts.
#[derive(Debug, Clone, Deserialize)]
pub struct LocksConfig {
    #[serde(default)]
    pub backend: LockBackend,
    /// Lock database path for the `sqlite` backend.
    #[serde(default = "default_database")]
    pub database: String,
    /// Seconds to wait for a busy lock before failing (default: 5).
    #[serde(default = "default_wait_secs")]
    pub wait_secs: u64,
    /// Seconds a lock stays valid if never released (default: 10).
    #[serde(default = "default_hold_secs")]
    pub hold_secs: u64,
    /// Milliseconds between acquisition attempts (default: 250).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_database() -> String {
    "shopledger-locks.db".to_string()
}

const fn default_wait_secs() -> u64 {
    5
}

const fn default_hold_secs() -> u64 {
    10
}

const fn default_poll_interval_ms() -> u64 {
    250
}

impl LocksConfig {
    #[must_use]
    pub const fn timeouts(&self) -> LockTimeouts {
        LockTimeouts {
            wait: Duration::from_secs(self.wait_secs),
            hold: Duration::from_secs(self.hold_secs),
        }
    }

    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for LocksConfig {
    fn default() -> Self {
        Self {
            backend: LockBackend::default(),
            database: default_database(),
            wait_secs: default_wait_secs(),
            hold_secs: default_hold_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}
