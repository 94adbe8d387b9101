//! Card manager service entry point

use anyhow::{Context, Result};
use card_manager::config::CardManagerConfig;
use card_manager::core::FieldCipher;
use card_manager::ledger::HttpLedgerClient;
use card_manager::server::ServerBuilder;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("card_manager=info,tower_http=info")),
        )
        .init();

    let config = CardManagerConfig::from_env().context("Failed to load configuration")?;
    tracing::debug!(?config, "Loaded configuration");

    let cipher = FieldCipher::new(&config.encryption_key).context("Invalid encryption key")?;
    let ledger = HttpLedgerClient::new(&config.ledger).context("Failed to build ledger client")?;

    let builder = ServerBuilder::new().with_ledger(ledger);
    let builder = with_card_store(builder, &config, cipher).await?;

    builder.serve(&config.listen_addr).await
}

#[cfg(feature = "postgres")]
async fn with_card_store(
    builder: ServerBuilder,
    config: &CardManagerConfig,
    cipher: FieldCipher,
) -> Result<ServerBuilder> {
    use card_manager::storage::{PostgresCardStore, postgres};

    let database_url = config
        .database_url
        .as_deref()
        .context("POSTGRES_URL is required by the PostgreSQL backend")?;
    let pool = postgres::connect(database_url, config.max_connections).await?;
    postgres::ensure_schema(&pool).await?;

    tracing::info!(max_connections = config.max_connections, "Using PostgreSQL card store");
    Ok(builder.with_store(PostgresCardStore::new(pool, cipher)))
}

#[cfg(not(feature = "postgres"))]
async fn with_card_store(
    builder: ServerBuilder,
    _config: &CardManagerConfig,
    cipher: FieldCipher,
) -> Result<ServerBuilder> {
    use card_manager::storage::InMemoryCardStore;

    tracing::warn!("Built without the `postgres` feature; cards are kept in memory only");
    Ok(builder.with_store(InMemoryCardStore::new(cipher)))
}
