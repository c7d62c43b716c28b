// Package refresher drives the periodic refresh cycle of the cache manager.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::manager::{CacheManager, RefreshOutcome};

pub const SVC_REFRESHER: &str = "wrk-refresher";

/// Single-task scheduler calling `periodic_update_caches` on a fixed interval.
///
/// Ticks missed while a cycle is running are skipped, so cycles never
/// overlap and never pile up.
pub struct Refresher {
    shutdown_token: CancellationToken,
    manager: Arc<CacheManager>,
    every: Duration,
}

impl Refresher {
    /// Creates a refresher ticking on the manager's configured interval.
    pub fn new(shutdown_token: CancellationToken, manager: Arc<CacheManager>) -> Self {
        let every = manager.refresh_interval();
        Self::with_interval(shutdown_token, manager, every)
    }

    pub fn with_interval(
        shutdown_token: CancellationToken,
        manager: Arc<CacheManager>,
        every: Duration,
    ) -> Self {
        Self {
            shutdown_token,
            manager,
            every,
        }
    }

    /// Spawns the refresh loop onto the current runtime.
    pub fn start(self) -> JoinHandle<()> {
        tokio::task::spawn(async move { self.run().await })
    }

    /// Runs until cancelled, then applies whatever is still pending.
    pub async fn run(&self) {
        let mut ticker = interval(self.every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(svc = SVC_REFRESHER, every = ?self.every, "refresher started");

        loop {
            tokio::select! {
                _ = self.shutdown_token.cancelled() => {
                    self.tick("final");
                    tracing::info!(svc = SVC_REFRESHER, "refresher stopped");
                    return;
                }
                _ = ticker.tick() => {
                    self.tick("periodic");
                }
            }
        }
    }

    fn tick(&self, kind: &str) {
        match self.manager.periodic_update_caches() {
            RefreshOutcome::Completed(report) if report.dropped > 0 => {
                tracing::warn!(
                    svc = SVC_REFRESHER,
                    kind,
                    applied = report.applied,
                    dropped = report.dropped,
                    "refresh dropped unroutable updates"
                );
            }
            RefreshOutcome::Completed(_) => {}
            RefreshOutcome::Skipped => {
                tracing::debug!(svc = SVC_REFRESHER, kind, "tick skipped, refresh in flight");
            }
        }
    }
}
