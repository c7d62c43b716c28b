//! Tests for the deduplicated error logger.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    use super::super::log_entry::{new_entry, run, FlushStats, LogEntry, Window};
    use super::super::{err, is_running};
    use crate::manager::CacheError;

    const DROPPED: &str = "pending update dropped";

    fn unroutable(key: &str) -> CacheError {
        CacheError::UnroutableUpdate {
            key: key.to_string(),
        }
    }

    fn sample(e: &CacheError, extra: Option<&str>, reason: &str) -> LogEntry {
        new_entry(e.kind(), Some(e as &dyn std::error::Error), extra, reason)
    }

    #[test]
    fn test_same_reason_and_kind_collapse_across_keys() {
        let window = Window::default();
        for key in ["x", "y", "z"] {
            window.record(sample(&unroutable(key), Some(key), DROPPED));
        }

        assert_eq!(window.len(), 1);
        assert_eq!(window.count(DROPPED, "unroutable_update"), 3);
        assert_eq!(window.flush(), 1);
    }

    #[test]
    fn test_distinct_reasons_and_kinds_stay_apart() {
        let window = Window::default();
        let malformed = CacheError::MalformedPayload {
            msgtype: 1,
            payload: "garbage".to_string(),
        };

        window.record(sample(&unroutable("x"), Some("x"), DROPPED));
        window.record(sample(&malformed, None, DROPPED));
        window.record(sample(&malformed, None, "parser callback ignored"));
        window.record(new_entry(malformed.kind(), None, None, "parser callback ignored"));

        assert_eq!(window.len(), 3);
        assert_eq!(window.count(DROPPED, "unroutable_update"), 1);
        assert_eq!(window.count(DROPPED, "malformed_payload"), 1);
        assert_eq!(window.count("parser callback ignored", "malformed_payload"), 2);
    }

    #[test]
    fn test_err_is_noop_without_running_logger() {
        // Only the binary installs the global logger
        assert!(!is_running());
        let e = unroutable("x");
        err(e.kind(), Some(&e as &dyn std::error::Error), Some("x"), DROPPED);
        err("unroutable_update", None, None, DROPPED);
        assert!(!is_running());
    }

    #[tokio::test]
    async fn test_cancel_flushes_buffered_entries() {
        let (tx, rx) = mpsc::channel(16);
        for key in ["a", "b", "c"] {
            tx.try_send(sample(&unroutable(key), Some(key), DROPPED))
                .expect("channel has room");
        }

        let token = CancellationToken::new();
        token.cancel();

        let detached = Arc::new(AtomicBool::new(false));
        let flag = detached.clone();
        let stats = run(token, rx, Duration::from_secs(60), move || {
            flag.store(true, Ordering::SeqCst)
        })
        .await;

        assert!(detached.load(Ordering::SeqCst));
        assert_eq!(stats, FlushStats { received: 3, lines: 1 });

        // Channel is closed once the logger stops
        assert!(tx.try_send(sample(&unroutable("late"), None, DROPPED)).is_err());
    }

    #[tokio::test]
    async fn test_periodic_flush_starts_a_new_window() {
        let (tx, rx) = mpsc::channel(16);
        let token = CancellationToken::new();
        let handle = tokio::spawn(run(token.clone(), rx, Duration::from_millis(20), || {}));

        tx.send(sample(&unroutable("a"), Some("a"), DROPPED))
            .await
            .expect("logger is receiving");
        tokio::time::sleep(Duration::from_millis(100)).await;

        token.cancel();
        let stats = handle.await.expect("logger task");

        // Flushed by the ticker; the final flush finds an empty window
        assert_eq!(stats, FlushStats { received: 1, lines: 1 });
    }
}
