// Telemetry for the cache manager.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;

use crate::metrics;

use super::manager::CacheManager;

/// Periodically logs and exports manager stats until cancelled.
pub async fn logger(shutdown_token: CancellationToken, manager: Arc<CacheManager>, each: Duration) {
    let mut ticker = interval(each);
    let counters = manager.counters();

    loop {
        tokio::select! {
            _ = shutdown_token.cancelled() => {
                tracing::debug!(component = "telemetry", "logger stopped");
                return;
            }
            _ = ticker.tick() => {
                let snap = counters.reset();
                let pending = manager.pending_len();
                metrics::set_pending_length(pending);

                tracing::info!(
                    cycles = snap.cycles,
                    skipped = snap.skipped,
                    applied = snap.applied,
                    dropped = snap.dropped,
                    evicted = snap.evicted,
                    callbacks_queued = snap.callbacks_queued,
                    callbacks_ignored = snap.callbacks_ignored,
                    pending = pending,
                    "cache manager stats"
                );

                for stat in manager.stats() {
                    metrics::set_cache_length(&stat.worker, stat.len);
                    tracing::info!(
                        target: "storage",
                        worker = %stat.worker,
                        entries = stat.len,
                        capacity = stat.capacity,
                        "worker cache stats"
                    );
                }
            }
        }
    }
}
