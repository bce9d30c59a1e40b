//! Keeper daemon: wires the Vault HTTP client to the registry and parks
//! until a termination signal arrives.

use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use vault_keeper::{
    shutdown, KeeperConfig, Registry, SecretsBackend, VaultClient,
};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("starting vault-keeper");

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "fatal");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config = KeeperConfig::from_env()?;
    let backend: Arc<dyn SecretsBackend> = Arc::new(VaultClient::new(&config)?);

    let token = backend.lookup_self().await?;
    info!(
        creation_ttl_secs = token.creation_ttl.as_secs(),
        current_ttl_secs = token.current_ttl.as_secs(),
        "token looked up"
    );

    let lease = backend.generate_credentials(&config.database_role).await?;
    info!(
        lease_id = %lease.lease_id,
        lease_ttl_secs = lease.lease_duration.as_secs(),
        username = %lease.username,
        "database credentials obtained"
    );

    let mut registry = Registry::new(
        Arc::clone(&backend),
        config.token_watch,
        config.lease_watch,
    );
    registry.initialize(token, &[lease]).await;

    shutdown::wait_for_signal().await;
    registry.shutdown(config.shutdown_timeout).await;

    Ok(())
}
