//! Infrastructure bootstrap helpers for runtime wiring.

use std::sync::Arc;

use tracing::{debug, info};

use crate::adapter::outbound::memory::{MemoryCache, MemoryLockProvider};
use crate::adapter::outbound::notifier::{BroadcastNotifier, LogNotifier};
use crate::adapter::outbound::sqlite::{
    open, DbPool, SqliteLockProvider, SqliteOrderStore, SqliteStatsLogStore,
};
use crate::application::order::OrderService;
use crate::application::stats::{CleanupScheduler, OrderStatsTrigger, RetentionJob, StatsService};
use crate::error::Result;
use crate::infrastructure::config::locks::{LockBackend, LocksConfig};
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::cache::Cache;
use crate::port::outbound::lock::LockProvider;
use crate::port::outbound::notifier::NotifierRegistry;

/// Build the configured lock provider.
pub fn build_lock_provider(config: &LocksConfig) -> Result<Arc<dyn LockProvider>> {
    match config.backend {
        LockBackend::Memory => {
            debug!("Using in-process locks");
            Ok(Arc::new(MemoryLockProvider::new()))
        }
        LockBackend::Sqlite => {
            debug!(database = %config.database, "Using SQLite cache-table locks");
            let provider = SqliteLockProvider::open(&config.database)?
                .with_poll_interval(config.poll_interval());
            let pruned = provider.prune_expired()?;
            if pruned > 0 {
                debug!(pruned, "Pruned expired locks");
            }
            Ok(Arc::new(provider))
        }
    }
}

/// Build the notifier registry: log output plus an in-process broadcast.
pub fn build_notifier_registry() -> (NotifierRegistry, BroadcastNotifier) {
    let broadcast = BroadcastNotifier::default();
    let mut registry = NotifierRegistry::new();
    registry.register(Box::new(LogNotifier));
    registry.register(Box::new(broadcast.clone()));
    (registry, broadcast)
}

/// Wired ledger services sharing one pool, lock provider and cache.
pub struct Ledger {
    pub pool: DbPool,
    pub locks: Arc<dyn LockProvider>,
    pub stats: StatsService,
    pub trigger: OrderStatsTrigger,
    pub orders: OrderService,
    pub retention: RetentionJob,
    /// Subscribe here to receive refresh events.
    pub events: BroadcastNotifier,
}

impl Ledger {
    /// Open the database, run migrations and wire every service.
    pub fn build(config: &Config) -> Result<Self> {
        let pool = open(&config.database)?;
        info!(database = %config.database, "Ledger database ready");

        let locks = build_lock_provider(&config.locks)?;
        let cache: Arc<dyn Cache> = Arc::new(MemoryCache::new());
        let (registry, events) = build_notifier_registry();

        let stats_store = SqliteStatsLogStore::new(pool.clone());
        let order_store = SqliteOrderStore::new(pool.clone());

        let stats = StatsService::new(stats_store.clone(), Arc::clone(&locks), config.locks.timeouts());
        let trigger = OrderStatsTrigger::new(
            stats.clone(),
            order_store.clone(),
            Arc::clone(&locks),
            cache,
            config.stats.aggregate_cache_ttl(),
        );
        let orders = OrderService::new(order_store, trigger.clone(), Arc::new(registry));

        Ok(Self {
            pool,
            locks,
            stats,
            trigger,
            orders,
            retention: RetentionJob::new(stats_store),
            events,
        })
    }

    /// Scheduler running the retention job at the configured interval.
    #[must_use]
    pub fn cleanup_scheduler(&self, config: &Config) -> CleanupScheduler {
        CleanupScheduler::new(
            self.retention.clone(),
            Arc::clone(&self.locks),
            config.stats.retention_days,
            config.stats.cleanup_interval(),
        )
    }
}
