//! Error types using thiserror 2.0.
//!
//! Two separate taxonomies: `ConfigError` for startup/runtime configuration
//! problems (fatal at startup, rejected-and-retained at runtime) and
//! `BackendError` for failed calls to the secrets backend, with
//! retryability classification.

use thiserror::Error;

/// Configuration errors.
///
/// At startup these are fatal and the process exits with non-zero status.
/// At runtime (interval reconfiguration) they are rejected and the prior
/// value is retained.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required environment variable not set
    #[error("`{0}` environment variable not set")]
    MissingVar(&'static str),

    /// Environment variable present but unparseable
    #[error("invalid value for `{name}`: {reason}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// Watch interval must be a positive number of seconds
    #[error("watch interval must be positive, got {0}")]
    InvalidInterval(i64),
}

/// Errors from the secrets backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Backend unreachable or returned a server-side failure
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Token or lease lacks permission for the operation
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Lease or path does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Backend rate limited the request
    #[error("rate limited")]
    RateLimited,

    /// HTTP transport error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed backend response
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

impl BackendError {
    /// Check if the error is transient and worth retrying on a later cycle.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Unavailable(_) | Self::RateLimited | Self::Http(_)
        )
    }

    /// Create an unavailable error.
    #[must_use]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a not-found error.
    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create a permission-denied error.
    #[must_use]
    pub fn permission_denied(what: impl Into<String>) -> Self {
        Self::PermissionDenied(what.into())
    }
}
