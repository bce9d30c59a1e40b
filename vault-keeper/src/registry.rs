//! Registry of active credentials and their tasks.
//!
//! Owns the token credential, every lease credential, the per-kind watch
//! settings, and the scheduler/reporter tasks working on them. No
//! process-wide globals: tasks and the status surface get handles to
//! state owned here.

use crate::{
    backend::{IssuedCredentials, SecretsBackend, TokenStatus},
    config::WatchOptions,
    credential::{Credential, CredentialKind, CredentialState, SharedCredential},
    error::ConfigError,
    scheduler::RenewalScheduler,
    shutdown::ShutdownCoordinator,
    watch::{WatchInterval, WatchReporter},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::info;

/// Watch state for one credential kind: fixed enablement, live interval.
#[derive(Debug)]
struct WatchSettings {
    enabled: bool,
    interval: Arc<WatchInterval>,
}

impl WatchSettings {
    fn new(options: WatchOptions) -> Self {
        Self {
            enabled: options.enabled,
            interval: Arc::new(WatchInterval::new(options.interval_secs)),
        }
    }
}

/// Point-in-time view of one credential for the status surface.
#[derive(Debug, Clone, Serialize)]
pub struct CredentialSnapshot {
    /// Credential identifier (`self` for the token)
    pub id: String,
    /// Credential kind
    pub kind: CredentialKind,
    /// TTL seconds as of the last backend read
    pub ttl_secs: u64,
    /// When that TTL was read
    pub last_observed_at: DateTime<Utc>,
    /// Lifecycle state; `unrenewable` flags a dead credential
    pub state: CredentialState,
}

/// Watch settings as shown on the status surface.
#[derive(Debug, Clone, Serialize)]
pub struct WatchSnapshot {
    /// Whether the watch task was started
    pub enabled: bool,
    /// Current interval in seconds
    pub interval_secs: u64,
}

/// Point-in-time view of the whole registry.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrySnapshot {
    /// Display title for the status surface
    pub title: &'static str,
    /// All credentials, token first
    pub credentials: Vec<CredentialSnapshot>,
    /// Token watch settings
    pub token_watch: WatchSnapshot,
    /// Lease watch settings
    pub lease_watch: WatchSnapshot,
}

/// Coordinator for all credentials and their renewal/watch tasks.
pub struct Registry {
    backend: Arc<dyn SecretsBackend>,
    credentials: Vec<SharedCredential>,
    token_watch: WatchSettings,
    lease_watch: WatchSettings,
    coordinator: ShutdownCoordinator,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new(
        backend: Arc<dyn SecretsBackend>,
        token_watch: WatchOptions,
        lease_watch: WatchOptions,
    ) -> Self {
        Self {
            backend,
            credentials: Vec::new(),
            token_watch: WatchSettings::new(token_watch),
            lease_watch: WatchSettings::new(lease_watch),
            coordinator: ShutdownCoordinator::new(),
        }
    }

    /// Register the token and all issued leases, starting their tasks.
    pub async fn initialize(&mut self, token: TokenStatus, leases: &[IssuedCredentials]) {
        self.register_token(token);
        for issued in leases {
            self.register_lease(issued);
        }
        info!(
            credentials = self.credentials.len(),
            tasks = self.coordinator.task_count(),
            "registry initialized"
        );
    }

    /// Register the token credential and start its scheduler and reporter.
    pub fn register_token(&mut self, token: TokenStatus) {
        let credential: SharedCredential = Arc::new(RwLock::new(Credential::token(
            token.creation_ttl,
            token.current_ttl,
        )));
        self.start_tasks(
            credential,
            "token-renewal",
            "token-watch",
            self.token_watch.enabled,
            Arc::clone(&self.token_watch.interval),
        );
    }

    /// Register a lease credential and start its scheduler and reporter.
    pub fn register_lease(&mut self, issued: &IssuedCredentials) {
        let credential: SharedCredential = Arc::new(RwLock::new(Credential::lease(
            issued.lease_id.clone(),
            issued.lease_duration,
        )));
        self.start_tasks(
            credential,
            "lease-renewal",
            "lease-watch",
            self.lease_watch.enabled,
            Arc::clone(&self.lease_watch.interval),
        );
    }

    fn start_tasks(
        &mut self,
        credential: SharedCredential,
        renewal_name: &'static str,
        watch_name: &'static str,
        watch_enabled: bool,
        interval: Arc<WatchInterval>,
    ) {
        let scheduler = RenewalScheduler::new(
            Arc::clone(&self.backend),
            Arc::clone(&credential),
            self.coordinator.subscribe(),
        );
        self.coordinator.spawn(renewal_name, scheduler.run());

        if watch_enabled {
            let reporter = WatchReporter::new(
                Arc::clone(&self.backend),
                Arc::clone(&credential),
                interval,
                self.coordinator.subscribe(),
            );
            self.coordinator.spawn(watch_name, reporter.run());
        }

        self.credentials.push(credential);
    }

    /// Update a kind's watch interval.
    ///
    /// Reporters pick the new value up on their next cycle; the task is
    /// not restarted and the current TTL is untouched.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidInterval` for non-positive values and
    /// keeps the prior interval.
    pub fn set_watch_interval(&self, kind: CredentialKind, seconds: i64) -> Result<(), ConfigError> {
        if seconds <= 0 {
            return Err(ConfigError::InvalidInterval(seconds));
        }
        let settings = self.watch_settings(kind);
        settings.interval.set(seconds as u64);
        info!(
            kind = kind.as_str(),
            interval_secs = seconds,
            "watch interval updated"
        );
        Ok(())
    }

    /// Current watch interval for a kind, in seconds.
    #[must_use]
    pub fn watch_interval(&self, kind: CredentialKind) -> u64 {
        self.watch_settings(kind).interval.get()
    }

    /// Read-only view of every credential and the watch settings.
    pub async fn snapshot(&self) -> RegistrySnapshot {
        let mut credentials = Vec::with_capacity(self.credentials.len());
        for shared in &self.credentials {
            let cred = shared.read().await;
            credentials.push(CredentialSnapshot {
                id: cred.id().to_string(),
                kind: cred.kind(),
                ttl_secs: cred.current_ttl().as_secs(),
                last_observed_at: cred.last_observed_at(),
                state: cred.state(),
            });
        }

        RegistrySnapshot {
            title: "Vault Token Management",
            credentials,
            token_watch: WatchSnapshot {
                enabled: self.token_watch.enabled,
                interval_secs: self.token_watch.interval.get(),
            },
            lease_watch: WatchSnapshot {
                enabled: self.lease_watch.enabled,
                interval_secs: self.lease_watch.interval.get(),
            },
        }
    }

    /// Stop all tasks, waiting up to `timeout` before aborting stragglers.
    pub async fn shutdown(self, timeout: Duration) {
        self.coordinator.shutdown(timeout).await;
    }

    fn watch_settings(&self, kind: CredentialKind) -> &WatchSettings {
        match kind {
            CredentialKind::Token => &self.token_watch,
            CredentialKind::Lease => &self.lease_watch,
        }
    }
}
