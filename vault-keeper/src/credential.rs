//! Credential model: identity plus current expiry state.
//!
//! TTLs held here are only ever set from backend responses (renewal or
//! lookup), never extrapolated from the local clock. The model decides
//! *when* the next renewal is due; scheduling it is the scheduler's job.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// A credential shared between its scheduler, its reporter, and the registry.
pub type SharedCredential = Arc<RwLock<Credential>>;

/// Which kind of credential this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    /// The process's auth token
    Token,
    /// A dynamic secret lease
    Lease,
}

impl CredentialKind {
    /// Name used in log records and snapshots.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::Lease => "lease",
        }
    }
}

/// Renewal lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialState {
    /// Renewals are scheduled and expected to succeed
    Active,
    /// A renewal failed; no further renewals are attempted
    Unrenewable,
}

/// One renewable credential with its current expiry state.
///
/// Identity (`kind`, `id`, `creation_ttl`) is immutable; `current_ttl`,
/// `last_observed_at`, and `state` change as renewal and watch cycles run.
#[derive(Debug, Clone)]
pub struct Credential {
    kind: CredentialKind,
    id: String,
    creation_ttl: Option<Duration>,
    current_ttl: Duration,
    last_observed_at: DateTime<Utc>,
    state: CredentialState,
}

impl Credential {
    /// Create the token credential from a lookup-self answer.
    #[must_use]
    pub fn token(creation_ttl: Duration, current_ttl: Duration) -> Self {
        Self {
            kind: CredentialKind::Token,
            id: "self".to_string(),
            creation_ttl: Some(creation_ttl),
            current_ttl,
            last_observed_at: Utc::now(),
            state: CredentialState::Active,
        }
    }

    /// Create a lease credential from an issuance response.
    #[must_use]
    pub fn lease(lease_id: impl Into<String>, lease_duration: Duration) -> Self {
        Self {
            kind: CredentialKind::Lease,
            id: lease_id.into(),
            creation_ttl: None,
            current_ttl: lease_duration,
            last_observed_at: Utc::now(),
            state: CredentialState::Active,
        }
    }

    /// Credential kind.
    #[must_use]
    pub const fn kind(&self) -> CredentialKind {
        self.kind
    }

    /// Opaque identifier; `"self"` for the token, the lease id otherwise.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// TTL remaining as of the last backend read or renewal.
    #[must_use]
    pub const fn current_ttl(&self) -> Duration {
        self.current_ttl
    }

    /// When the current TTL was read from the backend.
    #[must_use]
    pub const fn last_observed_at(&self) -> DateTime<Utc> {
        self.last_observed_at
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> CredentialState {
        self.state
    }

    /// Whether renewals should still be scheduled.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == CredentialState::Active
    }

    /// Delay before the first renewal, or `None` to renew immediately.
    ///
    /// The token renews immediately when more than half of its creation TTL
    /// has already elapsed by the time the keeper starts. A lease is always
    /// observed fresh at issuance, so its first deadline is a plain
    /// half-life.
    #[must_use]
    pub fn initial_renewal_delay(&self) -> Option<Duration> {
        match self.creation_ttl {
            Some(creation) if self.current_ttl <= creation / 2 => None,
            _ => Some(self.current_ttl / 2),
        }
    }

    /// Record a successful renewal and return the delay until the next one.
    pub fn apply_renewal(&mut self, new_ttl: Duration) -> Duration {
        self.current_ttl = new_ttl;
        self.last_observed_at = Utc::now();
        new_ttl / 2
    }

    /// Record a watch read of the current TTL.
    pub fn apply_observation(&mut self, new_ttl: Duration) {
        self.current_ttl = new_ttl;
        self.last_observed_at = Utc::now();
    }

    /// Mark the credential as permanently unrenewable. Terminal.
    pub fn mark_unrenewable(&mut self) {
        self.state = CredentialState::Unrenewable;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_initial_delay_is_half_life() {
        let cred = Credential::token(Duration::from_secs(3600), Duration::from_secs(3600));
        assert_eq!(cred.initial_renewal_delay(), Some(Duration::from_secs(1800)));
    }

    #[test]
    fn test_token_past_half_life_renews_immediately() {
        let cred = Credential::token(Duration::from_secs(3600), Duration::from_secs(1800));
        assert_eq!(cred.initial_renewal_delay(), None);

        let cred = Credential::token(Duration::from_secs(3600), Duration::from_secs(900));
        assert_eq!(cred.initial_renewal_delay(), None);
    }

    #[test]
    fn test_lease_initial_delay_is_half_life() {
        let cred = Credential::lease("postgres/creds/demo-role/abc", Duration::from_secs(600));
        assert_eq!(cred.initial_renewal_delay(), Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_apply_renewal_updates_ttl_and_returns_half() {
        let mut cred = Credential::token(Duration::from_secs(3600), Duration::from_secs(3600));
        let before = cred.last_observed_at();

        let next = cred.apply_renewal(Duration::from_secs(2400));
        assert_eq!(next, Duration::from_secs(1200));
        assert_eq!(cred.current_ttl(), Duration::from_secs(2400));
        assert!(cred.last_observed_at() >= before);
    }

    #[test]
    fn test_observation_does_not_change_state() {
        let mut cred = Credential::lease("lease-1", Duration::from_secs(600));
        cred.apply_observation(Duration::from_secs(400));
        assert_eq!(cred.current_ttl(), Duration::from_secs(400));
        assert!(cred.is_active());
    }

    #[test]
    fn test_unrenewable_is_terminal() {
        let mut cred = Credential::lease("lease-1", Duration::from_secs(600));
        cred.mark_unrenewable();
        assert!(!cred.is_active());
        assert_eq!(cred.state(), CredentialState::Unrenewable);

        // Observations still land, the state stays terminal.
        cred.apply_observation(Duration::from_secs(100));
        assert_eq!(cred.state(), CredentialState::Unrenewable);
    }
}
