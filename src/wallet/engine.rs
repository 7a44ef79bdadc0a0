//! Ledger Engine
//!
//! Moves value between two wallets inside one store-level transaction:
//! balance check, both wallet updates, the DEBIT/CREDIT entry pair and the
//! PENDING -> COMPLETED transition either all commit or none do.

use rust_decimal::Decimal;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::error::WalletError;
use super::lock;
use super::models::{Transaction, TransactionKind, TransactionStatus};
use crate::money::MoneyError;

/// Maximum accepted idempotency key length (store column is VARCHAR(255))
pub const MAX_IDEMPOTENCY_KEY_LEN: usize = 255;

/// A fully resolved value movement, ready for execution
#[derive(Debug, Clone)]
pub struct LedgerOperation {
    pub from_user: Uuid,
    pub to_user: Uuid,
    pub asset_type_id: i32,
    /// Canonical scale-2 amount, strictly positive
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub idempotency_key: String,
    /// The non-system party whose history this transaction joins
    pub owner_user: Uuid,
    pub metadata: Option<serde_json::Value>,
}

/// The transaction engine
pub struct LedgerEngine;

struct LockedWallet {
    wallet_id: i64,
    balance: Decimal,
}

impl LedgerEngine {
    /// Execute one value movement with exactly-once semantics per
    /// idempotency key.
    ///
    /// Procedure (single store-level transaction):
    /// 1. Session guardrails: lock_timeout 5s, statement_timeout 10s.
    /// 2. Advisory lock derived from {from, to, asset}.
    /// 3. Idempotency gate: replay returns the stored COMPLETED record;
    ///    a PENDING or FAILED duplicate is a conflict.
    /// 4. Auto-onboarding: insert-if-absent both wallet rows, ascending
    ///    user order.
    /// 5. Row-lock both wallets, ascending user order.
    /// 6. Balance check before any UPDATE.
    /// 7. Insert the PENDING transaction row.
    /// 8. Debit source, write DEBIT entry with balance_after.
    /// 9. Credit destination, write CREDIT entry with balance_after.
    /// 10. Transition PENDING -> COMPLETED.
    /// 11. Commit. Any failure rolls the whole store transaction back.
    pub async fn execute(pool: &PgPool, op: LedgerOperation) -> Result<Transaction, WalletError> {
        Self::validate(&op)?;

        let mut tx = pool.begin().await?;

        // SET accepts no bind parameters; both values are fixed guardrails
        sqlx::query("SET LOCAL lock_timeout = '5s'")
            .execute(&mut *tx)
            .await?;
        sqlx::query("SET LOCAL statement_timeout = '10s'")
            .execute(&mut *tx)
            .await?;

        let advisory_key = lock::advisory_key(op.from_user, op.to_user, op.asset_type_id);
        lock::acquire_advisory_lock(&mut *tx, advisory_key).await?;

        // Idempotency gate: runs after the advisory lock, so duplicate
        // submissions are fully serialized here
        let existing = sqlx::query(
            r#"
            SELECT transaction_id, idempotency_key, kind, status, user_id,
                   asset_type_id, amount, metadata, created_at, processed_at
            FROM transactions
            WHERE idempotency_key = $1
            "#,
        )
        .bind(&op.idempotency_key)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(row) = existing {
            let record = Transaction::from_row(&row).map_err(WalletError::Internal)?;
            if record.status == TransactionStatus::Completed {
                tx.rollback().await?;
                tracing::info!(
                    transaction_id = %record.transaction_id,
                    idempotency_key = %op.idempotency_key,
                    "Idempotent replay - returning stored transaction"
                );
                return Ok(record);
            }
            return Err(WalletError::IdempotencyConflict(op.idempotency_key.clone()));
        }

        // Auto-onboarding: both wallet rows must exist before locking.
        // Ascending user order, same as the row locks below.
        let order = lock::lock_order(op.from_user, op.to_user);
        for user in order {
            sqlx::query(
                r#"
                INSERT INTO wallets (user_id, asset_type_id)
                VALUES ($1, $2)
                ON CONFLICT (user_id, asset_type_id) DO NOTHING
                "#,
            )
            .bind(user)
            .bind(op.asset_type_id)
            .execute(&mut *tx)
            .await?;
        }

        let mut locked: Vec<(Uuid, LockedWallet)> = Vec::with_capacity(2);
        for user in order {
            let row = sqlx::query(
                r#"
                SELECT wallet_id, balance FROM wallets
                WHERE user_id = $1 AND asset_type_id = $2
                FOR UPDATE
                "#,
            )
            .bind(user)
            .bind(op.asset_type_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                WalletError::Internal(format!(
                    "wallet row missing after insert-if-absent: user {} asset {}",
                    user, op.asset_type_id
                ))
            })?;

            locked.push((
                user,
                LockedWallet {
                    wallet_id: row.get("wallet_id"),
                    balance: row.get("balance"),
                },
            ));
        }

        let from = Self::take(&locked, op.from_user)?;
        let to = Self::take(&locked, op.to_user)?;

        // Balance check precedes every UPDATE; the rollback on failure
        // leaves no transaction row behind
        let new_from = from.balance - op.amount;
        if new_from < Decimal::ZERO {
            return Err(WalletError::InsufficientFunds);
        }

        let transaction_id = Uuid::new_v4();
        let created_at: chrono::DateTime<chrono::Utc> = sqlx::query_scalar(
            r#"
            INSERT INTO transactions
                (transaction_id, idempotency_key, kind, status, user_id,
                 asset_type_id, amount, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING created_at
            "#,
        )
        .bind(transaction_id)
        .bind(&op.idempotency_key)
        .bind(op.kind.id())
        .bind(TransactionStatus::Pending.id())
        .bind(op.owner_user)
        .bind(op.asset_type_id)
        .bind(op.amount)
        .bind(&op.metadata)
        .fetch_one(&mut *tx)
        .await?;

        Self::apply_side(&mut tx, transaction_id, from, new_from, op.amount, true).await?;

        let new_to = to.balance + op.amount;
        Self::apply_side(&mut tx, transaction_id, to, new_to, op.amount, false).await?;

        let processed_at: chrono::DateTime<chrono::Utc> = sqlx::query_scalar(
            r#"
            UPDATE transactions SET status = $1, processed_at = NOW()
            WHERE transaction_id = $2
            RETURNING processed_at
            "#,
        )
        .bind(TransactionStatus::Completed.id())
        .bind(transaction_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            transaction_id = %transaction_id,
            kind = %op.kind,
            user_id = %op.owner_user,
            asset_type_id = op.asset_type_id,
            amount = %op.amount,
            "Transaction completed"
        );

        Ok(Transaction {
            transaction_id,
            idempotency_key: op.idempotency_key,
            kind: op.kind,
            status: TransactionStatus::Completed,
            user_id: op.owner_user,
            asset_type_id: op.asset_type_id,
            amount: op.amount,
            metadata: op.metadata,
            created_at,
            processed_at: Some(processed_at),
        })
    }

    fn validate(op: &LedgerOperation) -> Result<(), WalletError> {
        if op.amount <= Decimal::ZERO {
            return Err(WalletError::InvalidAmount(MoneyError::NotPositive));
        }
        if op.from_user == op.to_user {
            return Err(WalletError::InvalidArgument(
                "source and destination users are the same".to_string(),
            ));
        }
        if op.idempotency_key.is_empty() || op.idempotency_key.len() > MAX_IDEMPOTENCY_KEY_LEN {
            return Err(WalletError::InvalidArgument(format!(
                "idempotency key must be 1..={} bytes",
                MAX_IDEMPOTENCY_KEY_LEN
            )));
        }
        if op.owner_user != op.from_user && op.owner_user != op.to_user {
            return Err(WalletError::InvalidArgument(
                "owner must be one of the transacting parties".to_string(),
            ));
        }
        Ok(())
    }

    fn take<'a>(
        locked: &'a [(Uuid, LockedWallet)],
        user: Uuid,
    ) -> Result<&'a LockedWallet, WalletError> {
        locked
            .iter()
            .find(|(u, _)| *u == user)
            .map(|(_, w)| w)
            .ok_or_else(|| WalletError::Internal(format!("locked wallet set missing user {}", user)))
    }

    /// Update one wallet to its new balance and write the matching ledger
    /// entry. `debit` selects the entry side.
    async fn apply_side(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        transaction_id: Uuid,
        wallet: &LockedWallet,
        new_balance: Decimal,
        amount: Decimal,
        debit: bool,
    ) -> Result<(), WalletError> {
        use super::models::EntrySide;

        sqlx::query(
            r#"
            UPDATE wallets
            SET balance = $1, version = version + 1, updated_at = NOW()
            WHERE wallet_id = $2
            "#,
        )
        .bind(new_balance)
        .bind(wallet.wallet_id)
        .execute(&mut **tx)
        .await?;

        let side = if debit { EntrySide::Debit } else { EntrySide::Credit };
        sqlx::query(
            r#"
            INSERT INTO ledger_entries
                (transaction_id, wallet_id, side, amount, balance_after)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(transaction_id)
        .bind(wallet.wallet_id)
        .bind(side.id())
        .bind(amount)
        .bind(new_balance)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(from: u128, to: u128, owner: u128) -> LedgerOperation {
        LedgerOperation {
            from_user: Uuid::from_u128(from),
            to_user: Uuid::from_u128(to),
            asset_type_id: 1,
            amount: Decimal::new(5000, 2),
            kind: TransactionKind::TopUp,
            idempotency_key: "key-1".to_string(),
            owner_user: Uuid::from_u128(owner),
            metadata: None,
        }
    }

    #[test]
    fn test_validate_rejects_same_party() {
        let op = op(7, 7, 7);
        assert!(matches!(
            LedgerEngine::validate(&op),
            Err(WalletError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_validate_rejects_non_positive_amount() {
        let mut op = op(0, 7, 7);
        op.amount = Decimal::ZERO;
        assert!(matches!(
            LedgerEngine::validate(&op),
            Err(WalletError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_validate_rejects_oversized_key() {
        let mut op = op(0, 7, 7);
        op.idempotency_key = "k".repeat(MAX_IDEMPOTENCY_KEY_LEN + 1);
        assert!(matches!(
            LedgerEngine::validate(&op),
            Err(WalletError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_validate_rejects_foreign_owner() {
        let op = op(0, 7, 9);
        assert!(matches!(
            LedgerEngine::validate(&op),
            Err(WalletError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_validate_accepts_well_formed() {
        assert!(LedgerEngine::validate(&op(0, 7, 7)).is_ok());
    }
}
