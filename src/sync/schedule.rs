//! Fixed-interval driver for sync sessions.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::error::SessionError;
use crate::sync::session::{SessionOptions, SessionReport, SyncSession};

/// Pause between the end of one session and the start of the next
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Counters kept for the lifetime of the loop. Never fed back into sessions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoopStats {
    pub iterations: u64,
    pub succeeded: u64,
    pub failed: u64,
}

pub struct SyncLoop {
    config: ClientConfig,
    options: SessionOptions,
    interval: Duration,
}

impl SyncLoop {
    pub fn new(config: ClientConfig, options: SessionOptions, interval: Duration) -> Self {
        Self {
            config,
            options,
            interval,
        }
    }

    /// Run a single session and return what happened.
    pub async fn run_once(&self, iteration: u64, cancel: &CancellationToken) -> SessionReport {
        let session = SyncSession::new(&self.config, self.options);
        let outcome = session.run(cancel).await;
        SessionReport { iteration, outcome }
    }

    /// Run until cancelled, printing one line per session to stdout.
    pub async fn run(&self, cancel: CancellationToken) -> LoopStats {
        self.run_with(cancel, |report| println!("{}", report)).await
    }

    /// Run until cancelled, handing every finished session to `on_report`.
    ///
    /// Sessions never overlap. A failed session is reported like any other
    /// and the next one starts after the usual interval.
    pub async fn run_with<F>(&self, cancel: CancellationToken, mut on_report: F) -> LoopStats
    where
        F: FnMut(&SessionReport),
    {
        let mut stats = LoopStats::default();

        while !cancel.is_cancelled() {
            let report = self.run_once(stats.iterations + 1, &cancel).await;
            if matches!(report.outcome, Err(SessionError::Cancelled)) {
                break;
            }

            stats.iterations += 1;
            match &report.outcome {
                Ok(response) => {
                    stats.succeeded += 1;
                    tracing::info!(
                        iteration = report.iteration,
                        bytes = response.bytes_read,
                        "sync report acknowledged"
                    );
                }
                Err(e) => {
                    stats.failed += 1;
                    tracing::warn!(iteration = report.iteration, "sync session failed: {}", e);
                }
            }
            on_report(&report);
            tracing::debug!(
                "{} sessions so far ({} ok, {} failed)",
                stats.iterations,
                stats.succeeded,
                stats.failed
            );

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        tracing::info!("sync loop stopped after {} sessions", stats.iterations);
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Timeouts;
    use tokio::net::TcpListener;

    async fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        port
    }

    fn options(port: u16) -> SessionOptions {
        SessionOptions {
            port,
            timeouts: Timeouts::uniform(Duration::from_secs(2)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_cancelled_loop_runs_nothing() {
        let sync_loop = SyncLoop::new(ClientConfig::default(), options(1), DEFAULT_INTERVAL);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut seen = 0;
        let stats = sync_loop.run_with(cancel, |_| seen += 1).await;
        assert_eq!(stats, LoopStats::default());
        assert_eq!(seen, 0);
    }

    #[tokio::test]
    async fn test_unreachable_server_keeps_looping() {
        let port = closed_port().await;
        let sync_loop = SyncLoop::new(
            ClientConfig::default(),
            options(port),
            Duration::from_millis(10),
        );
        let cancel = CancellationToken::new();

        let mut lines = Vec::new();
        let stop = cancel.clone();
        let stats = sync_loop
            .run_with(cancel, |report| {
                lines.push(report.to_string());
                if lines.len() == 3 {
                    stop.cancel();
                }
            })
            .await;

        assert_eq!(stats.iterations, 3);
        assert_eq!(stats.failed, 3);
        assert_eq!(stats.succeeded, 0);
        assert!(lines.iter().all(|l| l.starts_with("Error: ")));
    }

    #[tokio::test]
    async fn test_run_once_numbers_iteration() {
        let port = closed_port().await;
        let sync_loop = SyncLoop::new(ClientConfig::default(), options(port), DEFAULT_INTERVAL);

        let report = sync_loop.run_once(7, &CancellationToken::new()).await;
        assert_eq!(report.iteration, 7);
        assert!(report
            .outcome
            .as_ref()
            .is_err_and(|e| e.is_connect_failure()));
    }
}
