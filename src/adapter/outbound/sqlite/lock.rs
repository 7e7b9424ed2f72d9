//! Cache-table lock provider.
//!
//! Locks live in a `cache_locks` table (`key`, `owner`, `expiration`) in a
//! dedicated SQLite file, shared by every process that points at it. The
//! file is kept apart from the main database so that lock traffic never
//! contends with an open ledger write transaction.

use std::time::Duration;

use chrono::Utc;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::adapter::outbound::sqlite::database::connection::{create_pool, DbPool};
use crate::adapter::outbound::sqlite::database::schema::cache_locks;
use crate::error::Result;
use crate::port::outbound::lock::{LockProvider, LockToken, DEFAULT_POLL_INTERVAL};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS cache_locks (
    key TEXT PRIMARY KEY NOT NULL,
    owner TEXT NOT NULL,
    expiration BIGINT NOT NULL
)";

#[derive(Insertable)]
#[diesel(table_name = cache_locks)]
struct NewLockRow<'a> {
    key: &'a str,
    owner: String,
    expiration: i64,
}

/// [`LockProvider`] backed by a SQLite table, usable across processes.
pub struct SqliteLockProvider {
    pool: DbPool,
    poll_interval: Duration,
}

impl SqliteLockProvider {
    /// Open (or create) the lock database at `database_url`.
    ///
    /// # Errors
    /// Returns an error if the pool cannot be created or the table cannot be
    /// created.
    pub fn open(database_url: &str) -> Result<Self> {
        let pool = create_pool(database_url)?;
        Self::with_pool(pool)
    }

    /// Use an existing pool, creating the lock table if needed.
    ///
    /// # Errors
    /// Returns an error if the table cannot be created.
    pub fn with_pool(pool: DbPool) -> Result<Self> {
        let mut conn = pool.get()?;
        diesel::sql_query(CREATE_TABLE).execute(&mut conn)?;
        Ok(Self {
            pool,
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Delete every expired lock row. Returns the number removed.
    pub fn prune_expired(&self) -> Result<usize> {
        let mut conn = self.pool.get()?;
        let now = Utc::now().timestamp();
        Ok(
            diesel::delete(cache_locks::table.filter(cache_locks::expiration.le(now)))
                .execute(&mut conn)?,
        )
    }
}

fn expiration_after(hold: Duration) -> i64 {
    let hold_secs = i64::try_from(hold.as_secs()).unwrap_or(i64::MAX);
    // Round sub-second holds up so a lock is never born expired.
    let hold_secs = if hold.subsec_nanos() > 0 {
        hold_secs.saturating_add(1)
    } else {
        hold_secs
    };
    Utc::now().timestamp().saturating_add(hold_secs)
}

impl LockProvider for SqliteLockProvider {
    fn try_acquire(&self, key: &str, hold: Duration) -> Result<Option<LockToken>> {
        let mut conn = self.pool.get()?;
        let token = LockToken::new(key);
        let row = NewLockRow {
            key,
            owner: token.owner().to_string(),
            expiration: expiration_after(hold),
        };

        match diesel::insert_into(cache_locks::table)
            .values(&row)
            .execute(&mut conn)
        {
            Ok(_) => return Ok(Some(token)),
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {}
            Err(e) => return Err(e.into()),
        }

        // Key exists: take it over only if the current holder has expired.
        let now = Utc::now().timestamp();
        let taken = diesel::update(
            cache_locks::table
                .filter(cache_locks::key.eq(key))
                .filter(cache_locks::expiration.le(now)),
        )
        .set((
            cache_locks::owner.eq(&row.owner),
            cache_locks::expiration.eq(row.expiration),
        ))
        .execute(&mut conn)?;

        Ok((taken > 0).then_some(token))
    }

    fn release(&self, token: &LockToken) -> Result<bool> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(
            cache_locks::table
                .filter(cache_locks::key.eq(token.key()))
                .filter(cache_locks::owner.eq(token.owner().to_string())),
        )
        .execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}
