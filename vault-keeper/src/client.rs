//! Vault HTTP client implementing [`SecretsBackend`].
//!
//! Covers exactly the five calls the keeper consumes: token lookup/renew,
//! lease lookup/renew, and dynamic credential generation. Every request
//! carries the configured token in `X-Vault-Token` and is bounded by the
//! configured per-request timeout.

use crate::{
    backend::{IssuedCredentials, SecretsBackend, TokenStatus},
    config::KeeperConfig,
    error::{BackendError, BackendResult},
};
use async_trait::async_trait;
use reqwest::{Client, Method};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Vault token lookup-self response.
#[derive(Debug, Deserialize)]
struct LookupSelfResponse {
    data: LookupSelfData,
}

#[derive(Debug, Deserialize)]
struct LookupSelfData {
    creation_ttl: u64,
    ttl: u64,
}

/// Vault token renew-self response.
#[derive(Debug, Deserialize)]
struct RenewSelfResponse {
    auth: RenewSelfAuth,
}

#[derive(Debug, Deserialize)]
struct RenewSelfAuth {
    lease_duration: u64,
}

/// Vault lease renew response.
#[derive(Debug, Deserialize)]
struct LeaseRenewResponse {
    lease_duration: u64,
}

/// Vault lease lookup response.
#[derive(Debug, Deserialize)]
struct LeaseLookupResponse {
    data: LeaseLookupData,
}

#[derive(Debug, Deserialize)]
struct LeaseLookupData {
    ttl: u64,
}

/// Vault dynamic database credentials response.
#[derive(Debug, Deserialize)]
struct DatabaseCredsResponse {
    lease_id: String,
    lease_duration: u64,
    data: DatabaseCredsData,
}

#[derive(Debug, Deserialize)]
struct DatabaseCredsData {
    username: String,
    password: String,
}

/// HTTP client for a Vault server.
pub struct VaultClient {
    addr: String,
    token: SecretString,
    database_mount: String,
    http: Client,
}

impl VaultClient {
    /// Create a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &KeeperConfig) -> BackendResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(BackendError::Http)?;

        Ok(Self {
            addr: config.vault_addr.trim_end_matches('/').to_string(),
            token: config.vault_token.clone(),
            database_mount: config.database_mount.clone(),
            http,
        })
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> BackendResult<T> {
        let url = format!("{}/v1/{}", self.addr, path);
        debug!(%url, "vault request");

        let mut request = self
            .http
            .request(method, &url)
            .header("X-Vault-Token", self.token.expose_secret());

        if let Some(b) = body {
            request = request.json(&b);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BackendError::unavailable(e.to_string()))?;

        let status = response.status();
        match status.as_u16() {
            404 => return Err(BackendError::not_found(path)),
            403 => return Err(BackendError::permission_denied(path)),
            429 => return Err(BackendError::RateLimited),
            _ if !status.is_success() => {
                let text = response.text().await.unwrap_or_default();
                return Err(BackendError::unavailable(format!("status {status}: {text}")));
            }
            _ => {}
        }

        response.json().await.map_err(BackendError::from)
    }
}

#[async_trait]
impl SecretsBackend for VaultClient {
    async fn lookup_self(&self) -> BackendResult<TokenStatus> {
        let response: LookupSelfResponse = self
            .request(Method::GET, "auth/token/lookup-self", None)
            .await?;

        Ok(TokenStatus {
            creation_ttl: Duration::from_secs(response.data.creation_ttl),
            current_ttl: Duration::from_secs(response.data.ttl),
        })
    }

    async fn renew_self(&self) -> BackendResult<Duration> {
        let response: RenewSelfResponse = self
            .request(Method::POST, "auth/token/renew-self", None)
            .await?;

        Ok(Duration::from_secs(response.auth.lease_duration))
    }

    async fn renew_lease(&self, lease_id: &str) -> BackendResult<Duration> {
        let body = serde_json::json!({ "lease_id": lease_id });
        let response: LeaseRenewResponse = self
            .request(Method::PUT, "sys/leases/renew", Some(body))
            .await?;

        Ok(Duration::from_secs(response.lease_duration))
    }

    async fn read_lease(&self, lease_id: &str) -> BackendResult<Duration> {
        let body = serde_json::json!({ "lease_id": lease_id });
        let response: LeaseLookupResponse = self
            .request(Method::PUT, "sys/leases/lookup", Some(body))
            .await?;

        Ok(Duration::from_secs(response.data.ttl))
    }

    async fn generate_credentials(&self, role: &str) -> BackendResult<IssuedCredentials> {
        debug!(role, "generating database credentials");

        let response: DatabaseCredsResponse = self
            .request(
                Method::GET,
                &format!("{}/creds/{role}", self.database_mount),
                None,
            )
            .await?;

        Ok(IssuedCredentials {
            lease_id: response.lease_id,
            lease_duration: Duration::from_secs(response.lease_duration),
            username: response.data.username,
            password: SecretString::from(response.data.password),
        })
    }
}
