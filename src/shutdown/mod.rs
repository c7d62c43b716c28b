// Package shutdown provides graceful shutdown functionality.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
#[error("graceful shutdown timeout exceeded")]
pub struct TimeoutError;

/// Cancels the shared token on Ctrl-C and waits for registered tasks.
#[derive(Clone)]
pub struct GracefulShutdown {
    shutdown_token: CancellationToken,
    timeout: Duration,
    tasks: Arc<Mutex<JoinSet<()>>>,
}

impl GracefulShutdown {
    pub fn new(shutdown_token: CancellationToken, timeout: Duration) -> Self {
        Self {
            shutdown_token,
            timeout,
            tasks: Arc::new(Mutex::new(JoinSet::new())),
        }
    }

    /// Registers a task that must finish before shutdown completes.
    pub async fn spawn<F>(&self, fut: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        self.tasks.lock().await.spawn(fut);
    }

    /// Waits for an OS signal or cancellation, then for all tasks.
    pub async fn await_shutdown(&self) -> Result<()> {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!(
                    component = "graceful-shutdown",
                    event = "os_signal",
                    signal = "SIGINT",
                    "cancellation started"
                );
            }
            _ = self.shutdown_token.cancelled() => {
                info!(
                    component = "graceful-shutdown",
                    event = "ctx_done",
                    "cancellation started"
                );
            }
        }

        self.cancel_and_await_with_timeout().await
    }

    async fn cancel_and_await_with_timeout(&self) -> Result<()> {
        self.shutdown_token.cancel();

        let mut tasks = self.tasks.lock().await;
        match timeout(self.timeout, async { while tasks.join_next().await.is_some() {} }).await {
            Ok(_) => {
                info!(
                    component = "graceful-shutdown",
                    event = "shutdown_success",
                    "service was gracefully shut down"
                );
                Ok(())
            }
            Err(_) => {
                warn!(
                    component = "graceful-shutdown",
                    event = "shutdown_timeout",
                    timeout_ms = self.timeout.as_millis() as u64,
                    "not all tasks were closed within timeout"
                );
                Err(TimeoutError.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_waits_for_tasks_after_cancel() {
        let token = CancellationToken::new();
        let graceful = GracefulShutdown::new(token.clone(), Duration::from_secs(1));

        let done = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let (task_token, task_done) = (token.clone(), done.clone());
        graceful
            .spawn(async move {
                task_token.cancelled().await;
                task_done.store(true, std::sync::atomic::Ordering::SeqCst);
            })
            .await;

        token.cancel();
        graceful.await_shutdown().await.expect("clean shutdown");
        assert!(done.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_times_out_on_stuck_task() {
        let token = CancellationToken::new();
        let graceful = GracefulShutdown::new(token.clone(), Duration::from_millis(20));
        graceful
            .spawn(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
            })
            .await;

        token.cancel();
        let err = graceful.await_shutdown().await.expect_err("must time out");
        assert!(err.downcast_ref::<TimeoutError>().is_some());
    }
}
