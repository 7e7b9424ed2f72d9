//! Statistics ledger service.
//!
//! Appends snapshots to the per-metric chain. Writers of one metric are
//! serialised by the `stats_{metric}_lock` named lock, so the read of the
//! latest snapshot and the append that follows it cannot interleave with
//! another writer of the same metric.

use std::sync::Arc;

use chrono::Utc;
use diesel::SqliteConnection;
use tracing::{debug, error, info};

use crate::adapter::outbound::sqlite::SqliteStatsLogStore;
use crate::domain::stats::{MetricType, NewSnapshot, StatsLogEntry, StatsUpdate};
use crate::error::Result;
use crate::port::outbound::lock::{LockProvider, LockTimeouts};

/// Appends and reads ledger snapshots.
#[derive(Clone)]
pub struct StatsService {
    store: SqliteStatsLogStore,
    locks: Arc<dyn LockProvider>,
    timeouts: LockTimeouts,
}

impl StatsService {
    #[must_use]
    pub fn new(store: SqliteStatsLogStore, locks: Arc<dyn LockProvider>, timeouts: LockTimeouts) -> Self {
        Self {
            store,
            locks,
            timeouts,
        }
    }

    #[must_use]
    pub fn store(&self) -> &SqliteStatsLogStore {
        &self.store
    }

    #[must_use]
    pub fn timeouts(&self) -> LockTimeouts {
        self.timeouts
    }

    /// Record `current_value` for `metric` in its own write transaction.
    ///
    /// Skips the write when the value equals the latest snapshot's and
    /// returns that snapshot's values instead.
    ///
    /// # Errors
    /// Returns [`Error::LockTimeout`](crate::error::Error::LockTimeout) when
    /// the metric lock stays busy for the configured wait, or a storage error.
    pub fn update_stats(&self, metric: &MetricType, current_value: i64) -> Result<StatsUpdate> {
        let mut conn = self.store.pool().get()?;
        // The write transaction is taken before the metric lock. Callers that
        // already hold a transaction use `update_stats_with_conn` directly.
        conn.immediate_transaction(|conn| self.update_stats_with_conn(conn, metric, current_value))
    }

    /// Record `current_value` for `metric` on a caller-owned connection.
    ///
    /// The append joins whatever transaction is open on `conn`.
    pub fn update_stats_with_conn(
        &self,
        conn: &mut SqliteConnection,
        metric: &MetricType,
        current_value: i64,
    ) -> Result<StatsUpdate> {
        let result = self
            .locks
            .lock(&metric.lock_key(), self.timeouts)
            .and_then(|_guard| self.append_if_changed(conn, metric, current_value));
        if let Err(e) = &result {
            error!(metric = %metric, current_value, error = %e, "Failed to update stats");
        }
        result
    }

    fn append_if_changed(
        &self,
        conn: &mut SqliteConnection,
        metric: &MetricType,
        current_value: i64,
    ) -> Result<StatsUpdate> {
        let latest = self.store.latest_with_conn(conn, metric)?;

        if let Some(entry) = latest.as_ref().filter(|e| e.current_value == current_value) {
            debug!(metric = %metric, current_value, "Stats unchanged, skipping");
            return Ok(StatsUpdate::skipped(entry));
        }

        let snapshot = NewSnapshot::following(metric.clone(), latest.as_ref(), current_value, Utc::now());
        let entry = self.store.append_with_conn(conn, &snapshot)?;
        info!(
            metric = %metric,
            id = entry.id,
            current_value = entry.current_value,
            previous_value = entry.previous_value,
            change_rate = %entry.change_rate,
            "Stats recorded"
        );
        Ok(StatsUpdate::written(&snapshot))
    }

    /// Latest snapshot of `metric`, read from storage.
    pub fn latest(&self, metric: &MetricType) -> Result<Option<StatsLogEntry>> {
        self.store.latest(metric)
    }

    /// Latest snapshot of every metric present in the ledger, plus the
    /// well-known metrics even when they have no rows yet.
    pub fn latest_all(&self) -> Result<Vec<(MetricType, Option<StatsLogEntry>)>> {
        let mut metrics: Vec<MetricType> = MetricType::known().into_iter().collect();
        for metric in self.store.metric_types()? {
            if !metrics.contains(&metric) {
                metrics.push(metric);
            }
        }
        metrics.sort();

        metrics
            .into_iter()
            .map(|metric| {
                let latest = self.store.latest(&metric)?;
                Ok((metric, latest))
            })
            .collect()
    }

    /// Most recent `limit` snapshots of `metric`, newest first.
    pub fn history(&self, metric: &MetricType, limit: usize) -> Result<Vec<StatsLogEntry>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.store.history(metric, limit)
    }
}
