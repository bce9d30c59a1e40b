//! Centralized configuration loaded from environment variables.
//!
//! `VAULT_ADDR` and `VAULT_TOKEN` are required; everything else has a
//! default. Validation happens once at startup and a failure there is fatal.

use crate::error::ConfigError;
use secrecy::SecretString;
use std::env;
use std::time::Duration;

/// Default watch interval in seconds for both credential kinds.
pub const DEFAULT_WATCH_INTERVAL_SECS: u64 = 5;

/// Per-kind watch settings fixed at startup.
///
/// `enabled` cannot change for the life of the process; the interval is
/// only the *initial* value — the live value is owned by the registry and
/// mutable at runtime.
#[derive(Debug, Clone, Copy)]
pub struct WatchOptions {
    /// Whether the watch task is started at all
    pub enabled: bool,
    /// Initial sampling interval in seconds
    pub interval_secs: u64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: DEFAULT_WATCH_INTERVAL_SECS,
        }
    }
}

/// Keeper configuration.
#[derive(Debug, Clone)]
pub struct KeeperConfig {
    /// Vault server address, e.g. `https://vault.example.com:8200`
    pub vault_addr: String,
    /// Vault auth token used for every backend call
    pub vault_token: SecretString,
    /// Per-request timeout for backend calls
    pub request_timeout: Duration,
    /// Database secrets engine mount point
    pub database_mount: String,
    /// Database role to generate credentials for
    pub database_role: String,
    /// Token watch settings
    pub token_watch: WatchOptions,
    /// Lease watch settings
    pub lease_watch: WatchOptions,
    /// How long shutdown waits for tasks before aborting them
    pub shutdown_timeout: Duration,
}

impl KeeperConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a required variable is missing or a
    /// value fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let vault_addr = env::var("VAULT_ADDR").map_err(|_| ConfigError::MissingVar("VAULT_ADDR"))?;
        let vault_token = env::var("VAULT_TOKEN")
            .map(SecretString::from)
            .map_err(|_| ConfigError::MissingVar("VAULT_TOKEN"))?;

        let request_timeout = Duration::from_secs(parse_env("VAULT_TIMEOUT", 30)?);
        let shutdown_timeout = Duration::from_secs(parse_env("SHUTDOWN_TIMEOUT", 5)?);

        let database_mount = env::var("DATABASE_MOUNT").unwrap_or_else(|_| "postgres".to_string());
        let database_role = env::var("DATABASE_ROLE").unwrap_or_else(|_| "demo-role".to_string());

        let token_watch = WatchOptions {
            enabled: parse_truthy("TOKEN_WATCH_ENABLED", true),
            interval_secs: parse_interval("TOKEN_WATCH_INTERVAL")?,
        };
        let lease_watch = WatchOptions {
            enabled: parse_truthy("LEASE_WATCH_ENABLED", true),
            interval_secs: parse_interval("LEASE_WATCH_INTERVAL")?,
        };

        Ok(Self {
            vault_addr,
            vault_token,
            request_timeout,
            database_mount,
            database_role,
            token_watch,
            lease_watch,
            shutdown_timeout,
        })
    }

    /// Create a configuration with explicit address and token.
    #[must_use]
    pub fn new(addr: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            vault_addr: addr.into(),
            vault_token: SecretString::from(token.into()),
            request_timeout: Duration::from_secs(30),
            database_mount: "postgres".to_string(),
            database_role: "demo-role".to_string(),
            token_watch: WatchOptions::default(),
            lease_watch: WatchOptions::default(),
            shutdown_timeout: Duration::from_secs(5),
        }
    }

    /// Set the per-request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the token watch settings.
    #[must_use]
    pub const fn with_token_watch(mut self, watch: WatchOptions) -> Self {
        self.token_watch = watch;
        self
    }

    /// Set the lease watch settings.
    #[must_use]
    pub const fn with_lease_watch(mut self, watch: WatchOptions) -> Self {
        self.lease_watch = watch;
        self
    }
}

/// Parse an environment variable with a default value.
fn parse_env<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Parse a watch interval, rejecting zero and negative values.
fn parse_interval(name: &'static str) -> Result<u64, ConfigError> {
    let secs: i64 = parse_env(name, DEFAULT_WATCH_INTERVAL_SECS as i64)?;
    if secs <= 0 {
        return Err(ConfigError::InvalidInterval(secs));
    }
    Ok(secs as u64)
}

/// Parse a boolean flag: `true`, `t`, `yes`, and `y` (case-insensitive)
/// are true, everything else is false.
fn parse_truthy(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(val) => matches!(val.to_lowercase().as_str(), "true" | "t" | "yes" | "y"),
        Err(_) => default,
    }
}
