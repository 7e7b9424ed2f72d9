//! Periodic retention runner.
//!
//! Runs [`RetentionJob::cleanup`] on a fixed interval. Each run takes the
//! `stats_cleanup_lock` without waiting, so when several processes share a
//! lock backend only one of them cleans up per interval.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::application::stats::retention::RetentionJob;
use crate::domain::stats::CleanupReport;
use crate::error::Result;
use crate::port::outbound::lock::LockProvider;

/// Lock preventing overlapping cleanup runs.
pub const CLEANUP_LOCK: &str = "stats_cleanup_lock";

/// Upper bound on how long one cleanup run holds [`CLEANUP_LOCK`].
pub const CLEANUP_LOCK_HOLD: Duration = Duration::from_secs(3600);

/// Default interval between cleanup runs.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

pub struct CleanupScheduler {
    job: RetentionJob,
    locks: Arc<dyn LockProvider>,
    retention_days: u32,
    interval: Duration,
}

impl CleanupScheduler {
    #[must_use]
    pub fn new(
        job: RetentionJob,
        locks: Arc<dyn LockProvider>,
        retention_days: u32,
        interval: Duration,
    ) -> Self {
        Self {
            job,
            locks,
            retention_days,
            interval,
        }
    }

    /// Run one cleanup unless another run holds the cleanup lock.
    ///
    /// Returns `Ok(None)` when the run was skipped. Failures are logged
    /// before they are returned.
    pub fn run_once(&self) -> Result<Option<CleanupReport>> {
        let guard = self
            .locks
            .try_lock(CLEANUP_LOCK, CLEANUP_LOCK_HOLD)
            .inspect_err(|e| error!(key = CLEANUP_LOCK, error = %e, "Failed to take cleanup lock"))?;
        let Some(_guard) = guard else {
            info!(key = CLEANUP_LOCK, "Cleanup already running elsewhere, skipping");
            return Ok(None);
        };
        self.job.cleanup(self.retention_days).map(Some)
    }

    /// Run cleanups until `shutdown` resolves. The first run starts immediately.
    ///
    /// Failed runs are logged and retried at the next tick.
    pub async fn run<S>(self: Arc<Self>, shutdown: S)
    where
        S: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(
            interval_secs = self.interval.as_secs(),
            retention_days = self.retention_days,
            "Cleanup scheduler started"
        );

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    info!("Cleanup scheduler stopped");
                    return;
                }
                _ = ticker.tick() => {
                    let scheduler = Arc::clone(&self);
                    match tokio::task::spawn_blocking(move || scheduler.run_once()).await {
                        // Logged inside run_once.
                        Ok(_) => {}
                        Err(e) => error!(error = %e, "Cleanup task panicked"),
                    }
                }
            }
        }
    }
}
