//! Secrets-backend capability consumed by the keeper.
//!
//! The renewal and watch logic only ever sees this trait; the concrete
//! HTTP client lives in [`crate::client`] and tests substitute their own
//! implementations.

use crate::error::BackendResult;
use async_trait::async_trait;
use secrecy::SecretString;
use std::time::Duration;

/// Token state as reported by the backend.
#[derive(Debug, Clone, Copy)]
pub struct TokenStatus {
    /// TTL granted when the token was created
    pub creation_ttl: Duration,
    /// TTL remaining as of this lookup
    pub current_ttl: Duration,
}

/// Dynamic credentials issued by the backend, with their lease.
#[derive(Clone)]
pub struct IssuedCredentials {
    /// Server-issued lease identifier
    pub lease_id: String,
    /// TTL granted at issuance
    pub lease_duration: Duration,
    /// Generated username
    pub username: String,
    /// Generated password
    pub password: SecretString,
}

impl std::fmt::Debug for IssuedCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedCredentials")
            .field("lease_id", &self.lease_id)
            .field("lease_duration", &self.lease_duration)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Operations the keeper needs from a secrets backend.
///
/// Every TTL the keeper holds comes from a response to one of these calls;
/// the backend is the source of truth for remaining credential life.
#[async_trait]
pub trait SecretsBackend: Send + Sync + 'static {
    /// Look up the auth token's creation and current TTL.
    async fn lookup_self(&self) -> BackendResult<TokenStatus>;

    /// Renew the auth token, returning the new TTL.
    async fn renew_self(&self) -> BackendResult<Duration>;

    /// Renew a lease, returning the new TTL.
    async fn renew_lease(&self, lease_id: &str) -> BackendResult<Duration>;

    /// Read a lease's remaining TTL without renewing it.
    async fn read_lease(&self, lease_id: &str) -> BackendResult<Duration>;

    /// Generate dynamic credentials for a role, opening a new lease.
    async fn generate_credentials(&self, role: &str) -> BackendResult<IssuedCredentials>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_not_in_debug_output() {
        let creds = IssuedCredentials {
            lease_id: "postgres/creds/demo-role/abc123".to_string(),
            lease_duration: Duration::from_secs(600),
            username: "v-root-demo".to_string(),
            password: SecretString::from("hunter2"),
        };
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("hunter2"));
    }
}
