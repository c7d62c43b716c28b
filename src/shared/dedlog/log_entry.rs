use dashmap::DashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::dedlog::consts;

/// Log entry for deduplication
#[derive(Debug)]
pub struct LogEntry {
    kind: String,
    err: Option<String>,
    reason: String,
    extra: Option<String>,
    count: usize,
}

impl LogEntry {
    fn new(kind: String, err: Option<String>, extra: Option<String>, reason: String) -> Self {
        Self {
            kind,
            err,
            reason,
            extra,
            count: 1,
        }
    }

    /// Entries with the same reason and error kind collapse together; the
    /// first one keeps its error text and extra as the sample.
    fn dedup_key(&self) -> String {
        format!("{}|{}", self.reason, self.kind)
    }
}

/// Entries aggregated during one flush window.
#[derive(Default)]
pub(crate) struct Window {
    entries: DashMap<String, LogEntry>,
}

impl Window {
    pub(crate) fn record(&self, entry: LogEntry) {
        let key = entry.dedup_key();
        if let Some(mut existing) = self.entries.get_mut(&key) {
            existing.count += 1;
        } else {
            self.entries.insert(key, entry);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Occurrences of `reason` with error `kind` recorded so far.
    #[cfg(test)]
    pub(crate) fn count(&self, reason: &str, kind: &str) -> usize {
        self.entries
            .get(&format!("{}|{}", reason, kind))
            .map_or(0, |e| e.count)
    }

    /// Emits one line per aggregated reason; returns the number of lines.
    pub(crate) fn flush(&self) -> usize {
        for entry in self.entries.iter() {
            match (&entry.err, &entry.extra) {
                (Some(err), Some(extra)) => error!(
                    component = consts::COMPONENT,
                    kind = %entry.kind,
                    count = entry.count,
                    err = %err,
                    extra = %extra,
                    "{}", entry.reason
                ),
                (Some(err), None) => error!(
                    component = consts::COMPONENT,
                    kind = %entry.kind,
                    count = entry.count,
                    err = %err,
                    "{}", entry.reason
                ),
                (None, Some(extra)) => error!(
                    component = consts::COMPONENT,
                    kind = %entry.kind,
                    count = entry.count,
                    extra = %extra,
                    "{}", entry.reason
                ),
                (None, None) => error!(
                    component = consts::COMPONENT,
                    kind = %entry.kind,
                    count = entry.count,
                    "{}", entry.reason
                ),
            }
        }
        self.entries.len()
    }
}

/// Totals of one logger run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FlushStats {
    /// Entries received from callers.
    pub received: usize,
    /// Aggregated lines emitted.
    pub lines: usize,
}

// Sender installed by start_dedup_logger; std Mutex for synchronous access on the hot path
static ERR_CH: once_cell::sync::Lazy<Mutex<Option<mpsc::Sender<LogEntry>>>> =
    once_cell::sync::Lazy::new(|| Mutex::new(None));

fn get_err_ch() -> Option<mpsc::Sender<LogEntry>> {
    if let Ok(guard) = ERR_CH.try_lock() {
        guard.clone()
    } else {
        None
    }
}

fn set_err_ch(tx: Option<mpsc::Sender<LogEntry>>) {
    if let Ok(mut guard) = ERR_CH.lock() {
        *guard = tx;
    }
}

/// Whether `err` currently forwards entries to a running logger.
pub fn is_running() -> bool {
    get_err_ch().is_some()
}

pub(crate) fn new_entry(
    kind: &str,
    err: Option<&dyn std::error::Error>,
    extra: Option<&str>,
    msg: &str,
) -> LogEntry {
    LogEntry::new(
        kind.to_string(),
        err.map(|e| e.to_string()),
        extra.map(|s| s.to_string()),
        msg.to_string(),
    )
}

/// Hot path method for logging errors without blocking the caller.
/// `kind` is the stable error label entries are grouped by.
/// Drops the entry when the logger is not running or its channel is full.
pub fn err(kind: &str, err: Option<&dyn std::error::Error>, extra: Option<&str>, msg: &str) {
    if let Some(tx) = get_err_ch() {
        let _ = tx.try_send(new_entry(kind, err, extra, msg));
    }
}

/// Runs the deduplicated logger until the token is cancelled.
pub async fn start_dedup_logger(ctx: CancellationToken) {
    let (tx, rx) = mpsc::channel(consts::CHANNEL_CAPACITY);
    set_err_ch(Some(tx));
    run(ctx, rx, Duration::from_secs(consts::FLUSH_INTERVAL_SECS), || set_err_ch(None)).await;
}

/// Aggregates entries from `rx`, flushing every `every` and once on cancel.
///
/// On cancel `detach` runs first so no new sender is handed out, then the
/// channel is closed and whatever is still buffered joins the final flush.
pub(crate) async fn run(
    ctx: CancellationToken,
    mut rx: mpsc::Receiver<LogEntry>,
    every: Duration,
    detach: impl FnOnce(),
) -> FlushStats {
    let mut stats = FlushStats::default();
    let mut window = Window::default();

    let mut ticker = interval_at(Instant::now() + every, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ctx.cancelled() => break,
            entry = rx.recv() => match entry {
                Some(entry) => {
                    stats.received += 1;
                    window.record(entry);
                }
                None => break,
            },
            _ = ticker.tick() => {
                let prev = std::mem::take(&mut window);
                stats.lines += prev.flush();
            }
        }
    }

    detach();
    rx.close();
    while let Ok(entry) = rx.try_recv() {
        stats.received += 1;
        window.record(entry);
    }
    stats.lines += window.flush();
    stats
}
