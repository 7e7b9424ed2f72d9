//! Key-value cache port with per-entry time-to-live.

use std::time::Duration;

use crate::error::Result;

/// Port for a TTL cache of integer values.
///
/// Implementations must be thread-safe; entries past their TTL are treated
/// as absent.
pub trait Cache: Send + Sync {
    /// Get a live entry.
    fn get(&self, key: &str) -> Option<i64>;

    /// Store `value` for `ttl`. A zero TTL stores nothing.
    fn put(&self, key: &str, value: i64, ttl: Duration);

    /// Drop an entry. Returns `true` if a live entry was removed.
    fn forget(&self, key: &str) -> bool;
}

impl<'c> dyn Cache + 'c {
    /// Return the cached value for `key`, or compute, store and return it.
    ///
    /// # Errors
    /// Propagates the error from `compute`; nothing is cached in that case.
    pub fn remember<F>(&self, key: &str, ttl: Duration, compute: F) -> Result<i64>
    where
        F: FnOnce() -> Result<i64>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = compute()?;
        self.put(key, value, ttl);
        Ok(value)
    }
}
