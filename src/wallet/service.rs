//! Wallet service: the programmatic contract exposed to collaborators
//!
//! HTTP shape, rate limiting, webhooks and metrics live outside this crate;
//! everything they may assume about the core is expressed here.

use rust_decimal::Decimal;
use sqlx::Row;
use std::sync::Arc;
use uuid::Uuid;

use super::engine::{LedgerEngine, LedgerOperation};
use super::error::WalletError;
use super::models::{Transaction, TransactionKind, TransactionRecord, Wallet};
use crate::asset::{AssetType, AssetTypeManager};
use crate::db::Database;
use crate::db::schema::SYSTEM_USER;
use crate::money::{self, AmountInput};

/// Largest page size accepted by the history query
pub const MAX_PAGE_LIMIT: i64 = 500;

/// The wallet service facade
///
/// Owns the pool handle; every mutating call runs one store-level
/// transaction through the [`LedgerEngine`].
pub struct WalletService {
    db: Arc<Database>,
}

impl WalletService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Issue value to a user from the system wallet
    pub async fn top_up(
        &self,
        user_id: Uuid,
        asset_code: &str,
        amount: AmountInput,
        idempotency_key: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<Transaction, WalletError> {
        self.execute_kind(TransactionKind::TopUp, user_id, asset_code, amount, idempotency_key, metadata)
            .await
    }

    /// Issue promotional value to a user; identical flow to top_up,
    /// classified separately in the audit trail
    pub async fn grant_bonus(
        &self,
        user_id: Uuid,
        asset_code: &str,
        amount: AmountInput,
        idempotency_key: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<Transaction, WalletError> {
        self.execute_kind(TransactionKind::Bonus, user_id, asset_code, amount, idempotency_key, metadata)
            .await
    }

    /// Retire value from a user to the system wallet
    pub async fn spend(
        &self,
        user_id: Uuid,
        asset_code: &str,
        amount: AmountInput,
        idempotency_key: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<Transaction, WalletError> {
        self.execute_kind(TransactionKind::Spend, user_id, asset_code, amount, idempotency_key, metadata)
            .await
    }

    async fn execute_kind(
        &self,
        kind: TransactionKind,
        user_id: Uuid,
        asset_code: &str,
        amount: AmountInput,
        idempotency_key: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<Transaction, WalletError> {
        // Normalize and validate at the boundary, before any store work.
        // The engine's own reads are never cached.
        let amount = amount.normalize()?;

        let asset = AssetTypeManager::get_by_code(self.db.pool(), asset_code)
            .await?
            .ok_or_else(|| WalletError::InvalidAsset(asset_code.to_string()))?;

        let (from_user, to_user) = match kind {
            TransactionKind::TopUp | TransactionKind::Bonus => (SYSTEM_USER, user_id),
            TransactionKind::Spend => (user_id, SYSTEM_USER),
        };

        LedgerEngine::execute(
            self.db.pool(),
            LedgerOperation {
                from_user,
                to_user,
                asset_type_id: asset.asset_type_id,
                amount,
                kind,
                idempotency_key: idempotency_key.to_string(),
                owner_user: user_id,
                metadata,
            },
        )
        .await
    }

    /// Current balance for a (user, asset) pair; 0.00 if no wallet exists.
    ///
    /// Plain uncontended read: no locks are acquired, and the result must
    /// never feed back into the engine.
    pub async fn get_balance(
        &self,
        user_id: Uuid,
        asset_type_id: i32,
    ) -> Result<Decimal, WalletError> {
        let wallet: Option<Wallet> = sqlx::query_as(
            r#"
            SELECT wallet_id, user_id, asset_type_id, balance, version, created_at, updated_at
            FROM wallets WHERE user_id = $1 AND asset_type_id = $2
            "#,
        )
        .bind(user_id)
        .bind(asset_type_id)
        .fetch_optional(self.db.pool())
        .await?;

        let mut balance = wallet.map(|w| w.balance).unwrap_or(Decimal::ZERO);
        balance.rescale(money::AMOUNT_SCALE);
        Ok(balance)
    }

    /// Look up an asset type by canonical name or short code.
    ///
    /// Case-sensitive: "gold" is distinct from "GOLD".
    pub async fn get_asset_type(
        &self,
        identifier: &str,
    ) -> Result<Option<AssetType>, WalletError> {
        Ok(AssetTypeManager::get_by_identifier(self.db.pool(), identifier).await?)
    }

    /// Transaction history for a user, newest first, joined with the asset
    /// code, paginated
    pub async fn list_transactions(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TransactionRecord>, WalletError> {
        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(WalletError::InvalidArgument(format!(
                "limit must be 1..={}",
                MAX_PAGE_LIMIT
            )));
        }
        if offset < 0 {
            return Err(WalletError::InvalidArgument("offset must be >= 0".to_string()));
        }

        let rows = sqlx::query(
            r#"
            SELECT t.transaction_id, t.idempotency_key, t.kind, t.status, t.user_id,
                   t.asset_type_id, t.amount, t.metadata, t.created_at, t.processed_at,
                   a.code AS asset_code
            FROM transactions t
            JOIN asset_types a ON t.asset_type_id = a.asset_type_id
            WHERE t.user_id = $1
            ORDER BY t.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.db.pool())
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let transaction = Transaction::from_row(&row).map_err(WalletError::Internal)?;
            records.push(TransactionRecord {
                transaction,
                asset_code: row.get("asset_code"),
            });
        }

        Ok(records)
    }
}
