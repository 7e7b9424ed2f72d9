//! Temp-file ledger database for tests.
//!
//! In-memory SQLite gives every pooled connection its own database, so the
//! fixture uses a uniquely named file in the system temp dir and removes it
//! (with its WAL side files) on drop.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::adapter::outbound::memory::{MemoryCache, MemoryLockProvider};
use crate::adapter::outbound::sqlite::{open, DbPool, SqliteOrderStore, SqliteStatsLogStore};
use crate::application::order::OrderService;
use crate::application::stats::{OrderStatsTrigger, StatsService};
use crate::domain::stats::{MetricType, NewSnapshot, StatsLogEntry};
use crate::port::outbound::lock::LockTimeouts;
use crate::port::outbound::notifier::StatsNotifier;

/// Aggregate cache TTL used by fixture triggers.
pub const TEST_AGGREGATE_TTL: Duration = Duration::from_secs(60);

/// A migrated ledger database that is deleted on drop.
pub struct TempLedger {
    path: PathBuf,
    pool: DbPool,
    locks: Arc<MemoryLockProvider>,
    cache: Arc<MemoryCache>,
    timeouts: LockTimeouts,
}

impl TempLedger {
    /// # Panics
    /// Panics if the database cannot be created or migrated.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeouts(LockTimeouts::default())
    }

    /// Fixture whose services give up on busy locks after `wait`.
    #[must_use]
    pub fn with_lock_wait(wait: Duration) -> Self {
        Self::with_timeouts(LockTimeouts {
            wait,
            ..LockTimeouts::default()
        })
    }

    /// # Panics
    /// Panics if the database cannot be created or migrated.
    #[must_use]
    pub fn with_timeouts(timeouts: LockTimeouts) -> Self {
        let path = std::env::temp_dir().join(format!("shopledger_test_{}.db", uuid::Uuid::new_v4()));
        let pool = open(&path.display().to_string()).expect("temp ledger should open");
        Self {
            path,
            pool,
            locks: Arc::new(MemoryLockProvider::new()),
            cache: Arc::new(MemoryCache::new()),
            timeouts,
        }
    }

    #[must_use]
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// The lock provider shared by every service built from this fixture.
    #[must_use]
    pub fn locks(&self) -> Arc<MemoryLockProvider> {
        Arc::clone(&self.locks)
    }

    #[must_use]
    pub fn stats_store(&self) -> SqliteStatsLogStore {
        SqliteStatsLogStore::new(self.pool.clone())
    }

    #[must_use]
    pub fn order_store(&self) -> SqliteOrderStore {
        SqliteOrderStore::new(self.pool.clone())
    }

    #[must_use]
    pub fn stats_service(&self) -> StatsService {
        StatsService::new(self.stats_store(), self.locks(), self.timeouts)
    }

    #[must_use]
    pub fn trigger(&self) -> OrderStatsTrigger {
        self.trigger_with_timeouts(self.timeouts)
    }

    /// Trigger whose lock waits are bounded by `wait`.
    #[must_use]
    pub fn trigger_with_wait(&self, wait: Duration) -> OrderStatsTrigger {
        self.trigger_with_timeouts(LockTimeouts {
            wait,
            ..self.timeouts
        })
    }

    fn trigger_with_timeouts(&self, timeouts: LockTimeouts) -> OrderStatsTrigger {
        OrderStatsTrigger::new(
            StatsService::new(self.stats_store(), self.locks(), timeouts),
            self.order_store(),
            self.locks(),
            self.cache.clone(),
            TEST_AGGREGATE_TTL,
        )
    }

    #[must_use]
    pub fn order_service(&self, notifier: Arc<dyn StatsNotifier>) -> OrderService {
        OrderService::new(self.order_store(), self.trigger(), notifier)
    }

    /// Append a snapshot with an explicit `recorded_at`, bypassing locks.
    ///
    /// # Panics
    /// Panics on storage errors.
    pub fn seed(&self, metric: &MetricType, value: i64, recorded_at: DateTime<Utc>) -> StatsLogEntry {
        let store = self.stats_store();
        let mut conn = self.pool.get().expect("pool connection");
        let latest = store.latest_with_conn(&mut conn, metric).expect("latest snapshot");
        let snapshot = NewSnapshot::following(metric.clone(), latest.as_ref(), value, recorded_at);
        store.append_with_conn(&mut conn, &snapshot).expect("append snapshot")
    }
}

impl Default for TempLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TempLedger {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
        let _ = std::fs::remove_file(self.path.with_extension("db-wal"));
        let _ = std::fs::remove_file(self.path.with_extension("db-shm"));
    }
}
