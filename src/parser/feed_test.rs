#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    use super::super::{feed_lines, FeedStats};
    use crate::config::new_test_config;
    use crate::manager::CacheManager;

    #[tokio::test]
    async fn test_feed_stages_valid_lines() {
        let manager = Arc::new(CacheManager::new(&new_test_config()));
        let input: &[u8] = b"1\tA:k1\tv1\n\n99\tgarbage\nnot a callback\n1\tB:k2\tv2\n";

        let stats = feed_lines(CancellationToken::new(), manager.clone(), input).await;

        assert_eq!(
            stats,
            FeedStats {
                lines: 4,
                queued: 2,
                invalid: 1,
            }
        );
        assert_eq!(manager.pending_len(), 2);
    }

    #[tokio::test]
    async fn test_feed_stops_on_cancel() {
        let manager = Arc::new(CacheManager::new(&new_test_config()));
        let token = CancellationToken::new();
        token.cancel();

        // A reader that never yields a line
        let (_writer, reader) = tokio::io::duplex(64);
        let stats = feed_lines(token, manager, tokio::io::BufReader::new(reader)).await;
        assert_eq!(stats, FeedStats::default());
    }
}
