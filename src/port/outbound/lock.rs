//! Named lock port.
//!
//! A lock provider hands out owner tokens for string keys. A token is only
//! valid until its hold timeout elapses, after which another caller may take
//! the key over even if the original holder never released it. Releasing
//! checks ownership, so a holder whose lock expired and was retaken cannot
//! release the new holder's lock.

use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Default delay between acquisition attempts while blocking.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Proof of ownership of a named lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockToken {
    key: String,
    owner: Uuid,
}

impl LockToken {
    /// Create a token with a fresh owner id.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            owner: Uuid::new_v4(),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub const fn owner(&self) -> Uuid {
        self.owner
    }
}

/// Wait and hold bounds applied to every blocking acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockTimeouts {
    /// How long a caller blocks before giving up.
    pub wait: Duration,
    /// How long a lock stays valid if its holder never releases it.
    pub hold: Duration,
}

impl Default for LockTimeouts {
    fn default() -> Self {
        Self {
            wait: Duration::from_secs(5),
            hold: Duration::from_secs(10),
        }
    }
}

/// Port for named mutual exclusion.
///
/// Implementations may be process-local or shared between processes.
pub trait LockProvider: Send + Sync {
    /// Try to take `key` without waiting.
    ///
    /// Returns `Ok(None)` when another owner holds an unexpired lock.
    fn try_acquire(&self, key: &str, hold: Duration) -> Result<Option<LockToken>>;

    /// Release a lock if `token` still owns it.
    ///
    /// Returns `Ok(false)` when the lock expired or changed hands.
    fn release(&self, token: &LockToken) -> Result<bool>;

    /// Delay between attempts in [`LockProvider::acquire_blocking`].
    fn poll_interval(&self) -> Duration {
        DEFAULT_POLL_INTERVAL
    }

    /// Take `key`, retrying until `wait` elapses.
    ///
    /// # Errors
    /// Returns [`Error::LockTimeout`] if the key stays busy for the whole wait.
    fn acquire_blocking(&self, key: &str, hold: Duration, wait: Duration) -> Result<LockToken> {
        let started = Instant::now();
        loop {
            if let Some(token) = self.try_acquire(key, hold)? {
                return Ok(token);
            }
            let elapsed = started.elapsed();
            if elapsed >= wait {
                return Err(Error::LockTimeout {
                    key: key.to_string(),
                    waited: wait,
                });
            }
            thread::sleep(self.poll_interval().min(wait - elapsed));
        }
    }
}

impl<'p> dyn LockProvider + 'p {
    /// Block for `key` and return a guard that releases it on drop.
    ///
    /// # Errors
    /// Returns [`Error::LockTimeout`] when the wait bound elapses.
    pub fn lock(&self, key: &str, timeouts: LockTimeouts) -> Result<LockGuard<'_>> {
        let token = self.acquire_blocking(key, timeouts.hold, timeouts.wait)?;
        debug!(key, "Lock acquired");
        Ok(LockGuard::new(self, token))
    }

    /// Take `key` if it is free, returning a releasing guard.
    pub fn try_lock(&self, key: &str, hold: Duration) -> Result<Option<LockGuard<'_>>> {
        Ok(self
            .try_acquire(key, hold)?
            .map(|token| LockGuard::new(self, token)))
    }
}

/// Releases its lock when dropped.
pub struct LockGuard<'a> {
    provider: &'a dyn LockProvider,
    token: LockToken,
}

impl<'a> LockGuard<'a> {
    fn new(provider: &'a dyn LockProvider, token: LockToken) -> Self {
        Self { provider, token }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        self.token.key()
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        match self.provider.release(&self.token) {
            Ok(true) => debug!(key = self.token.key(), "Lock released"),
            Ok(false) => warn!(
                key = self.token.key(),
                "Lock expired before release; another owner may hold it"
            ),
            Err(e) => warn!(key = self.token.key(), error = %e, "Failed to release lock"),
        }
    }
}
