//! Wallet core types
//!
//! Row models for the wallets, transactions and ledger_entries relations,
//! plus the i16-discriminant enums stored in their SMALLINT columns.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use sqlx::Row;
use sqlx::postgres::PgRow;
use std::fmt;
use uuid::Uuid;

/// Operation kind of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum TransactionKind {
    /// System -> user issuance
    TopUp = 1,
    /// Identical flow to TopUp; kind differs for audit classification
    Bonus = 2,
    /// User -> system retirement
    Spend = 3,
}

impl TransactionKind {
    /// Get numeric ID for PostgreSQL storage
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    /// Convert from PostgreSQL ID
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(TransactionKind::TopUp),
            2 => Some(TransactionKind::Bonus),
            3 => Some(TransactionKind::Spend),
            _ => None,
        }
    }

    /// Get human-readable name
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::TopUp => "TOP_UP",
            TransactionKind::Bonus => "BONUS",
            TransactionKind::Spend => "SPEND",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<i16> for TransactionKind {
    type Error = ();

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        TransactionKind::from_id(value).ok_or(())
    }
}

/// Lifecycle status of a transaction
///
/// PENDING and COMPLETED are written inside one store-level transaction, so
/// PENDING is never observed by other operations. FAILED is reserved for
/// out-of-band reconciliation tooling and never written here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum TransactionStatus {
    Pending = 1,
    Completed = 2,
    Failed = 3,
}

impl TransactionStatus {
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(TransactionStatus::Pending),
            2 => Some(TransactionStatus::Completed),
            3 => Some(TransactionStatus::Failed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Completed => "COMPLETED",
            TransactionStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<i16> for TransactionStatus {
    type Error = ();

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        TransactionStatus::from_id(value).ok_or(())
    }
}

/// Double-entry side of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum EntrySide {
    Debit = 1,
    Credit = 2,
}

impl EntrySide {
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(EntrySide::Debit),
            2 => Some(EntrySide::Credit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntrySide::Debit => "DEBIT",
            EntrySide::Credit => "CREDIT",
        }
    }
}

impl fmt::Display for EntrySide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A (user, asset) balance record
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Wallet {
    pub wallet_id: i64,
    pub user_id: Uuid,
    pub asset_type_id: i32,
    pub balance: Decimal,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single logical value-movement event
#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    pub transaction_id: Uuid,
    pub idempotency_key: String,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    /// The non-system party whose history this transaction joins
    pub user_id: Uuid,
    pub asset_type_id: i32,
    pub amount: Decimal,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Convert a transactions row, rejecting unknown discriminants
    pub fn from_row(row: &PgRow) -> Result<Self, String> {
        let kind_id: i16 = row.get("kind");
        let kind =
            TransactionKind::from_id(kind_id).ok_or_else(|| format!("Invalid kind ID: {}", kind_id))?;

        let status_id: i16 = row.get("status");
        let status = TransactionStatus::from_id(status_id)
            .ok_or_else(|| format!("Invalid status ID: {}", status_id))?;

        Ok(Transaction {
            transaction_id: row.get("transaction_id"),
            idempotency_key: row.get("idempotency_key"),
            kind,
            status,
            user_id: row.get("user_id"),
            asset_type_id: row.get("asset_type_id"),
            amount: row.get("amount"),
            metadata: row.get("metadata"),
            created_at: row.get("created_at"),
            processed_at: row.get("processed_at"),
        })
    }
}

/// One half of the double-entry pair for a transaction
#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntry {
    pub entry_id: i64,
    pub transaction_id: Uuid,
    pub wallet_id: i64,
    pub side: EntrySide,
    pub amount: Decimal,
    /// Balance of the affected wallet immediately after this entry
    pub balance_after: Decimal,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn from_row(row: &PgRow) -> Result<Self, String> {
        let side_id: i16 = row.get("side");
        let side =
            EntrySide::from_id(side_id).ok_or_else(|| format!("Invalid side ID: {}", side_id))?;

        Ok(LedgerEntry {
            entry_id: row.get("entry_id"),
            transaction_id: row.get("transaction_id"),
            wallet_id: row.get("wallet_id"),
            side,
            amount: row.get("amount"),
            balance_after: row.get("balance_after"),
            created_at: row.get("created_at"),
        })
    }
}

/// A transaction joined with its asset code, as returned by the history query
#[derive(Debug, Clone, Serialize)]
pub struct TransactionRecord {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub asset_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_id_roundtrip() {
        for kind in [
            TransactionKind::TopUp,
            TransactionKind::Bonus,
            TransactionKind::Spend,
        ] {
            assert_eq!(TransactionKind::from_id(kind.id()), Some(kind));
        }
        assert_eq!(TransactionKind::from_id(0), None);
        assert_eq!(TransactionKind::from_id(4), None);
    }

    #[test]
    fn test_status_id_roundtrip() {
        for status in [
            TransactionStatus::Pending,
            TransactionStatus::Completed,
            TransactionStatus::Failed,
        ] {
            assert_eq!(TransactionStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(TransactionStatus::from_id(9), None);
    }

    #[test]
    fn test_side_id_roundtrip() {
        assert_eq!(EntrySide::from_id(1), Some(EntrySide::Debit));
        assert_eq!(EntrySide::from_id(2), Some(EntrySide::Credit));
        assert_eq!(EntrySide::from_id(3), None);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(TransactionKind::TopUp.to_string(), "TOP_UP");
        assert_eq!(TransactionStatus::Completed.to_string(), "COMPLETED");
        assert_eq!(EntrySide::Debit.to_string(), "DEBIT");
    }

    #[test]
    fn test_try_from_invalid() {
        assert!(TransactionKind::try_from(0i16).is_err());
        assert!(TransactionStatus::try_from(-1i16).is_err());
    }
}
