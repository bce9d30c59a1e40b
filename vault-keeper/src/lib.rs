//! Half-life renewal keeper for Vault tokens and dynamic secret leases.
//!
//! Tracks each credential's expiry, renews it when half of its granted TTL
//! has elapsed, reports remaining TTL at a configurable cadence, and keeps
//! going for the life of the process. The backend is consumed through the
//! [`backend::SecretsBackend`] trait; [`client::VaultClient`] is the HTTP
//! implementation.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod registry;
pub mod scheduler;
pub mod shutdown;
pub mod watch;

// Re-exports for convenience
pub use backend::{IssuedCredentials, SecretsBackend, TokenStatus};
pub use client::VaultClient;
pub use config::{KeeperConfig, WatchOptions};
pub use credential::{Credential, CredentialKind, CredentialState};
pub use error::{BackendError, BackendResult, ConfigError};
pub use registry::{Registry, RegistrySnapshot};
