//! In-process TTL cache.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::port::outbound::cache::Cache;

#[derive(Debug, Clone, Copy)]
struct Entry {
    value: i64,
    expires_at: Instant,
}

/// [`Cache`] backed by a concurrent map. Expired entries are dropped lazily.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, Entry>,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every expired entry. Returns the number removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before - self.entries.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Option<i64> {
        let now = Instant::now();
        let value = self
            .entries
            .get(key)
            .map(|entry| (entry.value, entry.expires_at > now))?;
        match value {
            (value, true) => Some(value),
            (_, false) => {
                self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
                None
            }
        }
    }

    fn put(&self, key: &str, value: i64, ttl: Duration) {
        if ttl.is_zero() {
            self.entries.remove(key);
            return;
        }
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    fn forget(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries
            .remove(key)
            .is_some_and(|(_, entry)| entry.expires_at > now)
    }
}
