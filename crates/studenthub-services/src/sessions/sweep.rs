use super::store::{SessionStore, SweepReport};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Periodically evicts expired sessions from a [`SessionStore`].
pub struct SessionSweeper {
    store: Arc<SessionStore>,
    period: Duration,
}

/// Handle to a running sweep loop
pub struct SweeperHandle {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl SweeperHandle {
    /// Stop the loop and wait for an in-flight pass to finish
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.join.await {
            tracing::error!(error = %e, "Session sweeper task panicked");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

impl SessionSweeper {
    pub fn new(store: Arc<SessionStore>, period: Duration) -> Self {
        Self { store, period }
    }

    /// Start the background sweep loop.
    ///
    /// The first pass runs immediately, then once per period.
    pub fn start(self: Arc<Self>) -> SweeperHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let join = tokio::spawn(async move {
            let mut sweep_interval = interval(self.period);
            sweep_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::info!(
                period_secs = self.period.as_secs(),
                "Session sweeper started"
            );

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        break;
                    }
                    _ = sweep_interval.tick() => {
                        self.sweep_once().await;
                    }
                }
            }

            tracing::info!("Session sweeper stopped");
        });

        SweeperHandle { cancel, join }
    }

    /// Run a single sweep pass
    #[tracing::instrument(skip(self), fields(sweep.operation = "expire_sessions"))]
    pub async fn sweep_once(&self) -> SweepReport {
        let start = std::time::Instant::now();
        let report = self.store.sweep().await;

        if report.evicted() > 0 || report.deletion_failures > 0 {
            tracing::info!(
                expired_sessions = report.expired_sessions,
                stale_leases = report.stale_leases,
                files_deleted = report.files_deleted,
                deletion_failures = report.deletion_failures,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Session sweep completed"
            );
        } else {
            tracing::debug!("Session sweep found nothing to evict");
        }

        report
    }
}
