// Metric name constants
pub const UPDATES_APPLIED: &str = "workercache_updates_applied_total";
pub const UPDATES_DROPPED: &str = "workercache_updates_dropped_total";
pub const UPDATES_EVICTED: &str = "workercache_evictions_total";
pub const CALLBACKS: &str = "workercache_callbacks_total";
pub const REFRESH_CYCLES: &str = "workercache_refresh_cycles_total";
pub const REFRESH_SKIPPED: &str = "workercache_refresh_skipped_total";
pub const PENDING_LENGTH: &str = "workercache_pending_length";
pub const CACHE_LENGTH: &str = "workercache_cache_length";

/// Records the outcome of one refresh cycle.
pub fn add_refresh_stat_counters(applied: u64, dropped: u64, evicted: u64) {
    metrics::counter!(REFRESH_CYCLES).increment(1);
    metrics::counter!(UPDATES_APPLIED).increment(applied);
    metrics::counter!(UPDATES_DROPPED).increment(dropped);
    metrics::counter!(UPDATES_EVICTED).increment(evicted);
}

/// Counts a refresh tick that found another refresh in flight.
pub fn add_refresh_skipped() {
    metrics::counter!(REFRESH_SKIPPED).increment(1);
}

/// Counts a parser callback by outcome (`queued` or an error kind).
pub fn add_callback(outcome: &'static str) {
    metrics::counter!(CALLBACKS, "outcome" => outcome).increment(1);
}

/// Sets the pending queue length.
pub fn set_pending_length(len: usize) {
    metrics::gauge!(PENDING_LENGTH).set(len as f64);
}

/// Sets the entry count of one worker cache.
pub fn set_cache_length(worker: &str, len: usize) {
    metrics::gauge!(CACHE_LENGTH, "worker" => worker.to_string()).set(len as f64);
}
