//! Task lifecycle and shutdown signaling.
//!
//! Every scheduler and watch task is spawned through the coordinator so a
//! single stop request reaches all of them, whether it came from a Unix
//! signal or a programmatic `shutdown()` call.

use std::future::Future;
use std::time::Duration;

use tokio::signal;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Spawns and tracks background tasks, stopping them on request.
pub struct ShutdownCoordinator {
    stop_tx: watch::Sender<bool>,
    tasks: JoinSet<()>,
}

impl ShutdownCoordinator {
    /// Create a coordinator with no tasks.
    #[must_use]
    pub fn new() -> Self {
        let (stop_tx, _) = watch::channel(false);
        Self {
            stop_tx,
            tasks: JoinSet::new(),
        }
    }

    /// Get a signal handle for a task to await.
    #[must_use]
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            stop_rx: self.stop_tx.subscribe(),
        }
    }

    /// Spawn a tracked task that is cancelled when shutdown is requested.
    pub fn spawn<F>(&mut self, name: &'static str, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut signal = self.subscribe();

        self.tasks.spawn(async move {
            tokio::select! {
                () = future => {
                    info!(task = name, "task finished");
                }
                () = signal.recv() => {
                    info!(task = name, "task stopped by shutdown");
                }
            }
        });
    }

    /// Number of tasks still tracked.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Signal all tasks to stop and wait up to `timeout` for them to end.
    ///
    /// Tasks still running after the timeout are aborted.
    pub async fn shutdown(mut self, timeout: Duration) {
        let _ = self.stop_tx.send(true);

        let joined = tokio::time::timeout(timeout, async {
            while let Some(result) = self.tasks.join_next().await {
                if let Err(e) = result {
                    warn!(error = %e, "task failed during shutdown");
                }
            }
        })
        .await;

        if joined.is_err() {
            warn!("shutdown timeout reached, aborting remaining tasks");
            self.tasks.abort_all();
        }

        info!("shutdown complete");
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle a task awaits to learn about shutdown.
#[derive(Clone)]
pub struct ShutdownSignal {
    stop_rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resolves once shutdown has been requested.
    pub async fn recv(&mut self) {
        // A closed channel means the coordinator is gone; treat as stop.
        let _ = self.stop_rx.wait_for(|stopped| *stopped).await;
    }
}

/// Wait for SIGINT or SIGTERM.
pub async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C, exiting"),
        () = terminate => info!("received SIGTERM, exiting"),
    }
}
