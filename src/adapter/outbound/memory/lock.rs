//! In-process named lock provider.
//!
//! Suitable for a single server process. Holders are tracked in a map behind
//! a `parking_lot` mutex; blocked callers sleep on a condition variable and
//! are woken on every release, or when the earliest hold timeout passes.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::port::outbound::lock::{LockProvider, LockToken};

#[derive(Debug, Clone, Copy)]
struct Holder {
    owner: Uuid,
    expires_at: Instant,
}

/// Process-local [`LockProvider`].
#[derive(Debug, Default)]
pub struct MemoryLockProvider {
    holders: Mutex<HashMap<String, Holder>>,
    released: Condvar,
}

impl MemoryLockProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held and unexpired.
    #[must_use]
    pub fn held_count(&self) -> usize {
        let now = Instant::now();
        self.holders
            .lock()
            .values()
            .filter(|holder| holder.expires_at > now)
            .count()
    }

    fn take(holders: &mut HashMap<String, Holder>, key: &str, hold: Duration) -> Option<LockToken> {
        let now = Instant::now();
        if let Some(holder) = holders.get(key) {
            if holder.expires_at > now {
                return None;
            }
        }
        let token = LockToken::new(key);
        holders.insert(
            key.to_string(),
            Holder {
                owner: token.owner(),
                expires_at: now + hold,
            },
        );
        Some(token)
    }
}

impl LockProvider for MemoryLockProvider {
    fn try_acquire(&self, key: &str, hold: Duration) -> Result<Option<LockToken>> {
        Ok(Self::take(&mut self.holders.lock(), key, hold))
    }

    fn release(&self, token: &LockToken) -> Result<bool> {
        let mut holders = self.holders.lock();
        let owned = holders
            .get(token.key())
            .is_some_and(|holder| holder.owner == token.owner() && holder.expires_at > Instant::now());
        if owned {
            holders.remove(token.key());
            drop(holders);
            self.released.notify_all();
        }
        Ok(owned)
    }

    fn acquire_blocking(&self, key: &str, hold: Duration, wait: Duration) -> Result<LockToken> {
        let deadline = Instant::now() + wait;
        let mut holders = self.holders.lock();
        loop {
            if let Some(token) = Self::take(&mut holders, key, hold) {
                return Ok(token);
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(Error::LockTimeout {
                    key: key.to_string(),
                    waited: wait,
                });
            }
            // Wake early if the current holder's lock expires before the deadline.
            let wake_at = holders
                .get(key)
                .map_or(deadline, |holder| holder.expires_at.min(deadline));
            self.released.wait_until(&mut holders, wake_at);
        }
    }
}
