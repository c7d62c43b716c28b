// Cache manager: per-worker LRU caches fed by parser callbacks.

use parking_lot::{Mutex, MutexGuard};
use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ConfigTrait;
use crate::db::{LruCache, PendingUpdate, PendingUpdateQueue};
use crate::dedlog;
use crate::metrics;
use crate::parser::{CallbackMessage, DelimitedDecoder, PayloadDecoder};
use crate::routing::{new_router, KeyRouter};

use super::counters::Counters;
use super::error::CacheError;

const COMPONENT: &str = "manager";

/// One configured cache, guarded by its own lock.
struct NamedCache {
    name: String,
    cache: Mutex<LruCache>,
}

/// Result of one refresh cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Updates taken off the pending queue.
    pub drained: usize,
    pub applied: usize,
    /// Unroutable updates discarded.
    pub dropped: usize,
    /// Entries evicted from caches while applying.
    pub evicted: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Completed(RefreshReport),
    /// Another refresh was still running; nothing was drained.
    Skipped,
}

/// Size of one worker cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub worker: String,
    pub len: usize,
    pub capacity: usize,
}

/// Owns one LRU cache per configured worker and the pending update queue.
///
/// The set of caches is fixed at construction. Parser callbacks only touch
/// the queue; `periodic_update_caches` is the single writer that moves
/// staged updates into the caches.
pub struct CacheManager {
    caches: Vec<NamedCache>,
    index: HashMap<String, usize>,
    pending: PendingUpdateQueue,
    decoder: Arc<dyn PayloadDecoder>,
    router: Arc<dyn KeyRouter>,
    refresh_gate: Mutex<()>,
    refresh_interval: Duration,
    counters: Arc<Counters>,
}

impl CacheManager {
    /// Builds a manager with the decoder and router described by `cfg`.
    pub fn new(cfg: &impl ConfigTrait) -> Self {
        let decoder = Arc::new(DelimitedDecoder::from_config(cfg.callbacks()));
        let router = new_router(cfg.routing());
        Self::with_strategies(cfg, decoder, router)
    }

    /// Builds a manager with caller-supplied decoding and routing.
    pub fn with_strategies(
        cfg: &impl ConfigTrait,
        decoder: Arc<dyn PayloadDecoder>,
        router: Arc<dyn KeyRouter>,
    ) -> Self {
        let mut caches = Vec::with_capacity(cfg.workers().len());
        let mut index = HashMap::with_capacity(cfg.workers().len());

        for worker in cfg.workers() {
            if index.contains_key(&worker.name) {
                warn!(
                    component = COMPONENT,
                    event = "duplicate_worker",
                    worker = %worker.name,
                    "worker configured twice, keeping the first cache"
                );
                continue;
            }
            index.insert(worker.name.clone(), caches.len());
            caches.push(NamedCache {
                name: worker.name.clone(),
                cache: Mutex::new(LruCache::new(worker.capacity)),
            });
        }

        debug!(
            component = COMPONENT,
            event = "initialized",
            workers = caches.len(),
            "cache manager ready"
        );

        Self {
            caches,
            index,
            pending: PendingUpdateQueue::new(),
            decoder,
            router,
            refresh_gate: Mutex::new(()),
            refresh_interval: cfg.refresh_interval(),
            counters: Arc::new(Counters::new()),
        }
    }

    /// Locks and returns the cache of `worker`.
    ///
    /// Never creates a cache: unknown names fail with `UnknownWorker`.
    pub fn key_cache(&self, worker: &str) -> Result<MutexGuard<'_, LruCache>, CacheError> {
        self.index
            .get(worker)
            .map(|&i| self.caches[i].cache.lock())
            .ok_or_else(|| CacheError::UnknownWorker(worker.to_string()))
    }

    /// Stages the update carried by a parser callback.
    ///
    /// Only touches the pending queue. Returns whether an update was queued;
    /// unrecognized or malformed messages are logged and ignored.
    pub fn handle_parsers_callback(&self, msg: &CallbackMessage) -> bool {
        match self.decoder.decode(msg) {
            Ok(update) => {
                self.pending.push(update);
                self.counters.callbacks_queued.fetch_add(1, Ordering::Relaxed);
                metrics::add_callback("queued");
                true
            }
            Err(e) => {
                self.counters.callbacks_ignored.fetch_add(1, Ordering::Relaxed);
                metrics::add_callback(e.kind());
                match e {
                    CacheError::UnrecognizedCallback(msgtype) => {
                        debug!(
                            component = COMPONENT,
                            event = "callback_ignored",
                            msgtype,
                            "unrecognized callback msgtype"
                        );
                    }
                    _ => dedlog::err(
                        e.kind(),
                        Some(&e as &dyn std::error::Error),
                        None,
                        "parser callback ignored",
                    ),
                }
                false
            }
        }
    }

    /// Drains the pending queue once and applies every update in FIFO order.
    ///
    /// Overlapping calls do not run in parallel: the late one returns
    /// `Skipped` and leaves the queue for the next tick. Unroutable updates
    /// are dropped without stopping the cycle.
    pub fn periodic_update_caches(&self) -> RefreshOutcome {
        let Some(_gate) = self.refresh_gate.try_lock() else {
            self.counters.skipped.fetch_add(1, Ordering::Relaxed);
            metrics::add_refresh_skipped();
            debug!(
                component = COMPONENT,
                event = "refresh_skipped",
                "previous refresh still running"
            );
            return RefreshOutcome::Skipped;
        };

        let batch = self.pending.drain_all();
        let mut report = RefreshReport {
            drained: batch.len(),
            ..RefreshReport::default()
        };

        for update in batch {
            match self.apply(update) {
                Ok(evicted) => {
                    report.applied += 1;
                    if evicted {
                        report.evicted += 1;
                    }
                }
                Err(e) => {
                    report.dropped += 1;
                    if let CacheError::UnroutableUpdate { key } = &e {
                        dedlog::err(
                            e.kind(),
                            Some(&e as &dyn std::error::Error),
                            Some(key),
                            "pending update dropped",
                        );
                    }
                }
            }
        }

        self.counters.cycles.fetch_add(1, Ordering::Relaxed);
        self.counters.applied.fetch_add(report.applied as u64, Ordering::Relaxed);
        self.counters.dropped.fetch_add(report.dropped as u64, Ordering::Relaxed);
        self.counters.evicted.fetch_add(report.evicted as u64, Ordering::Relaxed);
        metrics::add_refresh_stat_counters(
            report.applied as u64,
            report.dropped as u64,
            report.evicted as u64,
        );

        if report.drained > 0 {
            debug!(
                component = COMPONENT,
                event = "refresh_done",
                drained = report.drained,
                applied = report.applied,
                dropped = report.dropped,
                evicted = report.evicted,
                "caches refreshed"
            );
        }

        RefreshOutcome::Completed(report)
    }

    /// Routes one update and writes it; returns whether it evicted an entry.
    fn apply(&self, update: PendingUpdate) -> Result<bool, CacheError> {
        let route = self
            .router
            .route(&update.key)
            .ok_or_else(|| CacheError::UnroutableUpdate {
                key: update.key.clone(),
            })?;

        let Some(&i) = self.index.get(&route.worker) else {
            return Err(CacheError::UnroutableUpdate { key: update.key });
        };

        let evicted = self.caches[i].cache.lock().put(route.key, update.value);
        Ok(evicted.is_some())
    }

    /// Mutable view over staged, not yet applied updates.
    ///
    /// Meant for diagnostics; the refresher and producers wait while the
    /// guard is held.
    pub fn pending_updates(&self) -> MutexGuard<'_, Vec<PendingUpdate>> {
        self.pending.lock()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Worker names in configuration order.
    pub fn worker_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.caches.iter().map(|c| c.name.as_str())
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Per-worker sizes in configuration order.
    pub fn stats(&self) -> Vec<CacheStats> {
        self.caches
            .iter()
            .map(|c| {
                let cache = c.cache.lock();
                CacheStats {
                    worker: c.name.clone(),
                    len: cache.size(),
                    capacity: cache.capacity(),
                }
            })
            .collect()
    }

    pub fn counters(&self) -> Arc<Counters> {
        self.counters.clone()
    }
}
