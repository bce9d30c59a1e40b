//! Property-based tests for the credential model and interval validation.
//!
//! Properties covered:
//! - Half-life arithmetic: a renewal's returned delay is always half the
//!   new TTL, and the new TTL is stored verbatim.
//! - Startup boundary: the token renews immediately exactly when no more
//!   than half of its creation TTL remains.
//! - Interval validation: every non-positive interval is rejected and the
//!   prior value survives.

use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;
use vault_keeper::credential::Credential;
use vault_keeper::error::{BackendResult, ConfigError};
use vault_keeper::{
    CredentialKind, IssuedCredentials, Registry, SecretsBackend, TokenStatus, WatchOptions,
};

struct NullBackend;

#[async_trait]
impl SecretsBackend for NullBackend {
    async fn lookup_self(&self) -> BackendResult<TokenStatus> {
        Ok(TokenStatus {
            creation_ttl: Duration::from_secs(3600),
            current_ttl: Duration::from_secs(3600),
        })
    }

    async fn renew_self(&self) -> BackendResult<Duration> {
        Ok(Duration::from_secs(3600))
    }

    async fn renew_lease(&self, _lease_id: &str) -> BackendResult<Duration> {
        Ok(Duration::from_secs(600))
    }

    async fn read_lease(&self, _lease_id: &str) -> BackendResult<Duration> {
        Ok(Duration::from_secs(600))
    }

    async fn generate_credentials(&self, _role: &str) -> BackendResult<IssuedCredentials> {
        Ok(IssuedCredentials {
            lease_id: "lease".to_string(),
            lease_duration: Duration::from_secs(600),
            username: "u".to_string(),
            password: SecretString::from("p"),
        })
    }
}

fn registry() -> Registry {
    Registry::new(
        Arc::new(NullBackend),
        WatchOptions::default(),
        WatchOptions::default(),
    )
}

proptest! {
    #[test]
    fn prop_renewal_delay_is_half_of_new_ttl(
        initial in 1u64..=86_400,
        renewed in 1u64..=86_400,
    ) {
        let mut cred = Credential::lease("lease-1", Duration::from_secs(initial));
        let next = cred.apply_renewal(Duration::from_secs(renewed));

        prop_assert_eq!(next, Duration::from_secs(renewed) / 2);
        prop_assert_eq!(cred.current_ttl(), Duration::from_secs(renewed));
    }

    #[test]
    fn prop_token_immediate_renewal_boundary(
        creation in 2u64..=86_400,
        current in 1u64..=86_400,
    ) {
        let cred = Credential::token(
            Duration::from_secs(creation),
            Duration::from_secs(current),
        );

        let delay = cred.initial_renewal_delay();
        if Duration::from_secs(current) <= Duration::from_secs(creation) / 2 {
            prop_assert_eq!(delay, None);
        } else {
            prop_assert_eq!(delay, Some(Duration::from_secs(current) / 2));
        }
    }

    #[test]
    fn prop_lease_initial_delay_always_half(duration in 1u64..=86_400) {
        let cred = Credential::lease("lease-1", Duration::from_secs(duration));
        prop_assert_eq!(
            cred.initial_renewal_delay(),
            Some(Duration::from_secs(duration) / 2)
        );
    }

    #[test]
    fn prop_non_positive_interval_rejected(secs in i64::MIN..=0) {
        let reg = registry();
        let before = reg.watch_interval(CredentialKind::Token);

        let result = reg.set_watch_interval(CredentialKind::Token, secs);
        prop_assert!(matches!(result, Err(ConfigError::InvalidInterval(_))));
        prop_assert_eq!(reg.watch_interval(CredentialKind::Token), before);
    }

    #[test]
    fn prop_positive_interval_accepted(secs in 1i64..=86_400) {
        let reg = registry();
        prop_assert!(reg.set_watch_interval(CredentialKind::Lease, secs).is_ok());
        prop_assert_eq!(reg.watch_interval(CredentialKind::Lease), secs as u64);
    }
}
