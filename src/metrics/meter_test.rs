//! Tests for the metric helpers.

#[cfg(test)]
mod tests {
    use super::super::meter::*;

    #[test]
    fn test_helpers_without_recorder_are_noops() {
        add_refresh_stat_counters(3, 1, 2);
        add_refresh_skipped();
        add_callback("queued");
        add_callback("malformed_payload");
        set_pending_length(7);
        set_cache_length("A", 2);
    }

    #[test]
    fn test_metric_names_are_unique_and_prefixed() {
        let names = [
            UPDATES_APPLIED,
            UPDATES_DROPPED,
            UPDATES_EVICTED,
            CALLBACKS,
            REFRESH_CYCLES,
            REFRESH_SKIPPED,
            PENDING_LENGTH,
            CACHE_LENGTH,
        ];
        let unique: std::collections::HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
        assert!(names.iter().all(|n| n.starts_with("workercache_")));
    }
}
