//! SQLite statistics ledger store.
//!
//! Append-only access to `stats_logs`. Every write goes through a
//! caller-supplied connection so that appends can join the transaction that
//! triggered them; the pool-backed helpers are for reads and standalone use.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::OptionalExtension;
use diesel::SqliteConnection;

use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::adapter::outbound::sqlite::database::model::{
    last_insert_rowid, to_db_timestamp, NewStatsLogRow, StatsLogRow,
};
use crate::adapter::outbound::sqlite::database::schema::stats_logs;
use crate::domain::stats::{MetricType, NewSnapshot, StatsLogEntry};
use crate::error::Result;

/// SQLite-backed statistics ledger.
#[derive(Clone)]
pub struct SqliteStatsLogStore {
    /// Database connection pool.
    pool: DbPool,
}

impl SqliteStatsLogStore {
    /// Create a new ledger store with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Latest snapshot of a metric, by `recorded_at` then `id`.
    pub fn latest_with_conn(
        &self,
        conn: &mut SqliteConnection,
        metric: &MetricType,
    ) -> Result<Option<StatsLogEntry>> {
        stats_logs::table
            .filter(stats_logs::metric_type.eq(metric.as_str()))
            .order((stats_logs::recorded_at.desc(), stats_logs::id.desc()))
            .select(StatsLogRow::as_select())
            .first(conn)
            .optional()?
            .map(StatsLogRow::into_entry)
            .transpose()
    }

    /// Append a snapshot and return it with its assigned id.
    pub fn append_with_conn(
        &self,
        conn: &mut SqliteConnection,
        snapshot: &NewSnapshot,
    ) -> Result<StatsLogEntry> {
        let row = NewStatsLogRow::from(snapshot);
        diesel::insert_into(stats_logs::table)
            .values(&row)
            .execute(conn)?;

        let id = last_insert_rowid(conn)?;

        Ok(StatsLogEntry {
            id,
            metric_type: snapshot.metric_type.clone(),
            current_value: snapshot.current_value,
            previous_value: snapshot.previous_value,
            change_rate: snapshot.change_rate,
            recorded_at: snapshot.recorded_at,
        })
    }

    /// Number of ledger rows across all metrics.
    pub fn count_with_conn(&self, conn: &mut SqliteConnection) -> Result<i64> {
        Ok(stats_logs::table.count().get_result(conn)?)
    }

    /// Delete rows recorded strictly before `cutoff`. Returns the number deleted.
    pub fn delete_recorded_before_with_conn(
        &self,
        conn: &mut SqliteConnection,
        cutoff: DateTime<Utc>,
    ) -> Result<usize> {
        let cutoff = to_db_timestamp(cutoff);
        Ok(
            diesel::delete(stats_logs::table.filter(stats_logs::recorded_at.lt(cutoff)))
                .execute(conn)?,
        )
    }

    /// Latest snapshot of a metric.
    pub fn latest(&self, metric: &MetricType) -> Result<Option<StatsLogEntry>> {
        let mut conn = self.pool.get()?;
        self.latest_with_conn(&mut conn, metric)
    }

    /// Most recent `limit` snapshots of a metric, newest first.
    pub fn history(&self, metric: &MetricType, limit: i64) -> Result<Vec<StatsLogEntry>> {
        let mut conn = self.pool.get()?;
        stats_logs::table
            .filter(stats_logs::metric_type.eq(metric.as_str()))
            .order((stats_logs::recorded_at.desc(), stats_logs::id.desc()))
            .limit(limit)
            .select(StatsLogRow::as_select())
            .load(&mut conn)?
            .into_iter()
            .map(StatsLogRow::into_entry)
            .collect()
    }

    /// Distinct metric types present in the ledger, sorted.
    pub fn metric_types(&self) -> Result<Vec<MetricType>> {
        let mut conn = self.pool.get()?;
        stats_logs::table
            .select(stats_logs::metric_type)
            .distinct()
            .order(stats_logs::metric_type.asc())
            .load::<String>(&mut conn)?
            .into_iter()
            .map(|tag| MetricType::try_new(tag).map_err(Into::into))
            .collect()
    }

    /// Number of ledger rows across all metrics.
    pub fn count(&self) -> Result<i64> {
        let mut conn = self.pool.get()?;
        self.count_with_conn(&mut conn)
    }
}
