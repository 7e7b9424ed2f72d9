//! Ledger retention.
//!
//! Deletes snapshots older than a retention window. The counts and the
//! delete run in one write transaction so the report is consistent.

use chrono::{Duration, Utc};
use tracing::{error, info};

use crate::adapter::outbound::sqlite::SqliteStatsLogStore;
use crate::domain::stats::CleanupReport;
use crate::error::{ConfigError, Result};

/// Retention window used when none is configured.
pub const DEFAULT_RETENTION_DAYS: u32 = 30;

/// Removes expired ledger rows.
#[derive(Clone)]
pub struct RetentionJob {
    store: SqliteStatsLogStore,
}

impl RetentionJob {
    #[must_use]
    pub fn new(store: SqliteStatsLogStore) -> Self {
        Self { store }
    }

    /// Delete every snapshot recorded more than `days` days ago.
    ///
    /// # Errors
    /// Rejects `days == 0` as a configuration error; storage failures are
    /// logged and returned.
    pub fn cleanup(&self, days: u32) -> Result<CleanupReport> {
        if days == 0 {
            error!(days, "Stats cleanup rejected: retention must be at least one day");
            return Err(ConfigError::InvalidValue {
                field: "days",
                reason: "must be at least 1".into(),
            }
            .into());
        }

        let cutoff = Utc::now() - Duration::days(i64::from(days));
        let result = self.delete_before(cutoff);

        match &result {
            Ok(report) => info!(
                days,
                cutoff = %report.cutoff,
                before = report.before_count,
                after = report.after_count,
                deleted = report.deleted_count,
                "Stats cleanup completed"
            ),
            Err(e) => error!(days, cutoff = %cutoff, error = %e, "Stats cleanup failed"),
        }
        result
    }

    fn delete_before(&self, cutoff: chrono::DateTime<Utc>) -> Result<CleanupReport> {
        let mut conn = self.store.pool().get()?;
        conn.immediate_transaction(|conn| {
            let before_count = self.store.count_with_conn(conn)?;
            let deleted_count = self.store.delete_recorded_before_with_conn(conn, cutoff)?;
            let after_count = self.store.count_with_conn(conn)?;
            Ok(CleanupReport {
                before_count,
                after_count,
                deleted_count,
                cutoff,
            })
        })
    }
}
