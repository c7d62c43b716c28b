// Line-oriented parser feed: one `<msgtype>\t<payload>` callback per line.

use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;

use crate::manager::CacheManager;

use super::CallbackMessage;

/// Counts reported when a feed ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedStats {
    pub lines: usize,
    pub queued: usize,
    /// Lines that were not `<msgtype>\t<payload>`.
    pub invalid: usize,
}

/// Forwards every line of `reader` to the manager until EOF or cancellation.
pub async fn feed_lines<R>(ctx: CancellationToken, manager: Arc<CacheManager>, reader: R) -> FeedStats
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut stats = FeedStats::default();

    loop {
        let line = tokio::select! {
            _ = ctx.cancelled() => break,
            line = lines.next_line() => line,
        };

        match line {
            Ok(Some(line)) => {
                if line.is_empty() {
                    continue;
                }
                stats.lines += 1;
                match CallbackMessage::from_line(&line) {
                    Some(msg) => {
                        if manager.handle_parsers_callback(&msg) {
                            stats.queued += 1;
                        }
                    }
                    None => {
                        stats.invalid += 1;
                        tracing::warn!(component = "feed", line = %line, "not a <msgtype>\\t<payload> line");
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::error!(component = "feed", error = %e, "feed read failed");
                break;
            }
        }
    }

    tracing::info!(
        component = "feed",
        lines = stats.lines,
        queued = stats.queued,
        invalid = stats.invalid,
        "feed finished"
    );
    stats
}
