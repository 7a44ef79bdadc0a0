//! Provisioning entry point
//!
//! Creates the wallet schema, applies seed data and verifies store health.
//! The core prescribes no other CLI; its sole configuration input is the
//! PostgreSQL connection string.

use anyhow::{Context, Result};
use std::sync::Arc;

use wallet_ledger::config::AppConfig;
use wallet_ledger::db::{Database, schema};
use wallet_ledger::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let env = std::env::var("WALLET_ENV").unwrap_or_else(|_| "dev".to_string());
    let config = AppConfig::load(&env)?;

    let _guard = logging::init_logging(&config);

    tracing::info!(
        git = env!("GIT_HASH"),
        env = %env,
        "wallet-ledger provisioning starting"
    );

    let db = Arc::new(
        Database::connect(&config.database)
            .await
            .context("Failed to connect to PostgreSQL")?,
    );

    schema::init_schema(db.pool()).await?;
    schema::seed(db.pool()).await?;

    db.health_check()
        .await
        .context("Store health check failed")?;

    tracing::info!("Provisioning complete - store is ready");
    Ok(())
}
