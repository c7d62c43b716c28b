// Counters for the cache manager.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for callback intake and refresh cycles.
pub struct Counters {
    /// Callbacks that staged an update.
    pub callbacks_queued: AtomicU64,
    /// Callbacks ignored (unknown msgtype or malformed payload).
    pub callbacks_ignored: AtomicU64,
    /// Updates written into a cache.
    pub applied: AtomicU64,
    /// Updates dropped because they could not be routed.
    pub dropped: AtomicU64,
    /// Entries pushed out of a cache by an applied update.
    pub evicted: AtomicU64,
    /// Completed refresh cycles.
    pub cycles: AtomicU64,
    /// Refresh calls skipped because another one was in flight.
    pub skipped: AtomicU64,
}

/// Values taken by [`Counters::reset`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountersSnapshot {
    pub callbacks_queued: u64,
    pub callbacks_ignored: u64,
    pub applied: u64,
    pub dropped: u64,
    pub evicted: u64,
    pub cycles: u64,
    pub skipped: u64,
}

impl Counters {
    pub fn new() -> Self {
        Self {
            callbacks_queued: AtomicU64::new(0),
            callbacks_ignored: AtomicU64::new(0),
            applied: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            evicted: AtomicU64::new(0),
            cycles: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
        }
    }

    /// Resets all counters and returns their previous values.
    pub fn reset(&self) -> CountersSnapshot {
        CountersSnapshot {
            callbacks_queued: self.callbacks_queued.swap(0, Ordering::Relaxed),
            callbacks_ignored: self.callbacks_ignored.swap(0, Ordering::Relaxed),
            applied: self.applied.swap(0, Ordering::Relaxed),
            dropped: self.dropped.swap(0, Ordering::Relaxed),
            evicted: self.evicted.swap(0, Ordering::Relaxed),
            cycles: self.cycles.swap(0, Ordering::Relaxed),
            skipped: self.skipped.swap(0, Ordering::Relaxed),
        }
    }
}

impl Default for Counters {
    fn default() -> Self {
        Self::new()
    }
}
