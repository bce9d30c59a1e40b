//! Periodic TTL watch reporter.
//!
//! Independent of renewal: each cycle reads the credential's remaining TTL
//! from the backend and reports it. The sleep length is re-read from the
//! shared interval on every cycle, so a reconfigured interval takes effect
//! on the next cycle without restarting the task.

use crate::{
    backend::SecretsBackend,
    credential::{CredentialKind, SharedCredential},
    error::BackendResult,
    shutdown::ShutdownSignal,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Live watch interval shared between the registry and reporter tasks.
#[derive(Debug)]
pub struct WatchInterval {
    secs: AtomicU64,
}

impl WatchInterval {
    /// Create an interval holding `secs` seconds.
    #[must_use]
    pub const fn new(secs: u64) -> Self {
        Self {
            secs: AtomicU64::new(secs),
        }
    }

    /// Current interval in seconds.
    #[must_use]
    pub fn get(&self) -> u64 {
        self.secs.load(Ordering::Relaxed)
    }

    /// Replace the interval; reporters pick it up on their next cycle.
    pub fn set(&self, secs: u64) {
        self.secs.store(secs, Ordering::Relaxed);
    }
}

/// Watch loop for a single credential.
pub struct WatchReporter {
    backend: Arc<dyn SecretsBackend>,
    credential: SharedCredential,
    interval: Arc<WatchInterval>,
    shutdown: ShutdownSignal,
}

impl WatchReporter {
    /// Create a reporter for one credential.
    #[must_use]
    pub fn new(
        backend: Arc<dyn SecretsBackend>,
        credential: SharedCredential,
        interval: Arc<WatchInterval>,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            backend,
            credential,
            interval,
            shutdown,
        }
    }

    /// Run until shutdown. Read failures are logged and the loop continues.
    pub async fn run(mut self) {
        let (kind, id) = {
            let cred = self.credential.read().await;
            (cred.kind(), cred.id().to_string())
        };

        loop {
            let sleep = Duration::from_secs(self.interval.get());
            tokio::select! {
                () = tokio::time::sleep(sleep) => {}
                () = self.shutdown.recv() => return,
            }

            match self.read_ttl(kind, &id).await {
                Ok(ttl) => {
                    self.credential.write().await.apply_observation(ttl);
                    info!(
                        credential = %id,
                        kind = kind.as_str(),
                        ttl_secs = ttl.as_secs(),
                        "watch"
                    );
                }
                Err(e) => {
                    warn!(
                        credential = %id,
                        kind = kind.as_str(),
                        error = %e,
                        "watch read failed, retrying next cycle"
                    );
                }
            }
        }
    }

    async fn read_ttl(&self, kind: CredentialKind, id: &str) -> BackendResult<Duration> {
        match kind {
            CredentialKind::Token => Ok(self.backend.lookup_self().await?.current_ttl),
            CredentialKind::Lease => self.backend.read_lease(id).await,
        }
    }
}
