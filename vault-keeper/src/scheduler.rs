//! Half-life renewal scheduler.
//!
//! One renewal loop per credential: sleep until the half-life deadline,
//! renew, recompute the deadline from the response, repeat. A failed
//! renewal is terminal for the credential; the loop ends and the watch
//! reporter (if any) keeps the staleness visible.

use crate::{
    backend::SecretsBackend,
    credential::{CredentialKind, SharedCredential},
    error::BackendResult,
    shutdown::ShutdownSignal,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Renewal loop for a single credential.
pub struct RenewalScheduler {
    backend: Arc<dyn SecretsBackend>,
    credential: SharedCredential,
    shutdown: ShutdownSignal,
}

impl RenewalScheduler {
    /// Create a scheduler for one credential.
    #[must_use]
    pub fn new(
        backend: Arc<dyn SecretsBackend>,
        credential: SharedCredential,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            backend,
            credential,
            shutdown,
        }
    }

    /// Run until shutdown or until the credential becomes unrenewable.
    ///
    /// Renewals for this credential are strictly sequential: the next
    /// deadline is computed only after the previous renewal completes, so
    /// at most one renewal call is ever in flight.
    pub async fn run(mut self) {
        let (kind, id, mut delay) = {
            let cred = self.credential.read().await;
            (
                cred.kind(),
                cred.id().to_string(),
                cred.initial_renewal_delay(),
            )
        };

        if delay.is_none() {
            info!(
                credential = %id,
                kind = kind.as_str(),
                "past half-life at startup, renewing immediately"
            );
        }

        loop {
            if let Some(d) = delay {
                tokio::select! {
                    () = tokio::time::sleep(d) => {}
                    () = self.shutdown.recv() => return,
                }
            }

            match self.renew(kind, &id).await {
                Ok(new_ttl) => {
                    let next = self.credential.write().await.apply_renewal(new_ttl);
                    info!(
                        credential = %id,
                        kind = kind.as_str(),
                        new_ttl_secs = new_ttl.as_secs(),
                        next_renewal_secs = next.as_secs(),
                        "renewed"
                    );
                    delay = Some(next);
                }
                Err(e) => {
                    self.credential.write().await.mark_unrenewable();
                    error!(
                        credential = %id,
                        kind = kind.as_str(),
                        error = %e,
                        "renewal failed, credential is no longer renewable"
                    );
                    return;
                }
            }
        }
    }

    async fn renew(&self, kind: CredentialKind, id: &str) -> BackendResult<Duration> {
        match kind {
            CredentialKind::Token => self.backend.renew_self().await,
            CredentialKind::Lease => self.backend.renew_lease(id).await,
        }
    }
}
