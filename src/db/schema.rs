//! Schema provisioning for the wallet store
//!
//! Idempotent: every statement is IF NOT EXISTS / ON CONFLICT DO NOTHING,
//! so provisioning can be re-run against a live database.

use anyhow::Result;
use sqlx::PgPool;

/// The all-zeros user identifier owning the system wallets.
pub const SYSTEM_USER: uuid::Uuid = uuid::Uuid::nil();

/// Create the four core relations and their indexes
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    tracing::info!("Initializing wallet schema...");

    for (name, sql) in [
        ("asset_types", CREATE_ASSET_TYPES_TABLE),
        ("wallets", CREATE_WALLETS_TABLE),
        ("transactions", CREATE_TRANSACTIONS_TABLE),
        ("ledger_entries", CREATE_LEDGER_ENTRIES_TABLE),
        ("transactions index", CREATE_TRANSACTIONS_USER_INDEX),
        ("ledger_entries index", CREATE_LEDGER_ENTRIES_WALLET_INDEX),
    ] {
        sqlx::query(sql)
            .execute(pool)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create {}: {}", name, e))?;
    }

    tracing::info!("Wallet schema initialized");
    Ok(())
}

/// Insert the canonical asset types and one system wallet per asset
pub async fn seed(pool: &PgPool) -> Result<()> {
    sqlx::query(SEED_ASSET_TYPES)
        .execute(pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to seed asset types: {}", e))?;

    sqlx::query(SEED_SYSTEM_WALLETS)
        .bind(SYSTEM_USER)
        .execute(pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to seed system wallets: {}", e))?;

    tracing::info!("Seed data applied");
    Ok(())
}

const CREATE_ASSET_TYPES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS asset_types (
    asset_type_id SERIAL PRIMARY KEY,
    name VARCHAR(64) NOT NULL UNIQUE,
    code VARCHAR(16) NOT NULL UNIQUE
)
"#;

const CREATE_WALLETS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS wallets (
    wallet_id BIGSERIAL PRIMARY KEY,
    user_id UUID NOT NULL,
    asset_type_id INT NOT NULL REFERENCES asset_types (asset_type_id),
    balance NUMERIC(20,2) NOT NULL DEFAULT 0 CHECK (balance >= 0),
    version BIGINT NOT NULL DEFAULT 1,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT wallets_user_asset_key UNIQUE (user_id, asset_type_id)
)
"#;

const CREATE_TRANSACTIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS transactions (
    transaction_id UUID PRIMARY KEY,
    idempotency_key VARCHAR(255) NOT NULL,
    kind SMALLINT NOT NULL,
    status SMALLINT NOT NULL,
    user_id UUID NOT NULL,
    asset_type_id INT NOT NULL REFERENCES asset_types (asset_type_id),
    amount NUMERIC(20,2) NOT NULL CHECK (amount > 0),
    metadata JSONB,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    processed_at TIMESTAMPTZ,
    CONSTRAINT transactions_idempotency_key_key UNIQUE (idempotency_key)
)
"#;

const CREATE_LEDGER_ENTRIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS ledger_entries (
    entry_id BIGSERIAL PRIMARY KEY,
    transaction_id UUID NOT NULL REFERENCES transactions (transaction_id),
    wallet_id BIGINT NOT NULL REFERENCES wallets (wallet_id),
    side SMALLINT NOT NULL,
    amount NUMERIC(20,2) NOT NULL CHECK (amount > 0),
    balance_after NUMERIC(20,2) NOT NULL CHECK (balance_after >= 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_TRANSACTIONS_USER_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_transactions_user_created
    ON transactions (user_id, created_at DESC)
"#;

const CREATE_LEDGER_ENTRIES_WALLET_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_ledger_entries_wallet
    ON ledger_entries (wallet_id)
"#;

const SEED_ASSET_TYPES: &str = r#"
INSERT INTO asset_types (name, code)
VALUES ('Gold Coins', 'GOLD'), ('Diamonds', 'DIAMOND'), ('Loyalty Points', 'LOYALTY')
ON CONFLICT (code) DO NOTHING
"#;

const SEED_SYSTEM_WALLETS: &str = r#"
INSERT INTO wallets (user_id, asset_type_id, balance)
SELECT $1, asset_type_id, 1000000000.00 FROM asset_types
ON CONFLICT (user_id, asset_type_id) DO NOTHING
"#;
