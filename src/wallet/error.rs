//! Wallet error taxonomy
//!
//! Every failure aborts the store transaction and is returned to the caller;
//! nothing is swallowed inside the engine and no background retry occurs.

use thiserror::Error;

/// Name of the unique constraint backing the idempotency gate
pub const IDEMPOTENCY_KEY_CONSTRAINT: &str = "transactions_idempotency_key_key";

#[derive(Debug, Error)]
pub enum WalletError {
    /// Malformed identifier, bad pagination bounds, from == to
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Unknown asset code
    #[error("Invalid asset: {0}")]
    InvalidAsset(String),

    /// Amount not positive, non-numeric, or out of range
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] crate::money::MoneyError),

    /// Source wallet balance < amount; nothing was persisted
    #[error("Insufficient funds")]
    InsufficientFunds,

    /// Key already present with a non-COMPLETED status, or the
    /// unique-constraint insert lost the race after the gate.
    /// Non-retryable for this key.
    #[error("Idempotency conflict for key: {0}")]
    IdempotencyConflict(String),

    /// Lock timeout, statement timeout, deadlock, pool exhaustion.
    /// The store rolled back; the caller may retry with the same key.
    #[error("Transient store failure: {0}")]
    Transient(String),

    /// Any other store error
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Invariant violation detected at runtime
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for WalletError {
    /// Classify store errors into the caller-facing taxonomy.
    ///
    /// SQLSTATE 55P03 (lock_not_available), 57014 (query_canceled, raised by
    /// statement_timeout), 40001 (serialization_failure) and 40P01
    /// (deadlock_detected) are transient. A unique violation on the
    /// idempotency key is the gate's constraint backstop firing.
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::PoolTimedOut => {
                WalletError::Transient("connection pool acquire timed out".to_string())
            }
            sqlx::Error::Database(db) => match db.code().as_deref() {
                Some("55P03") => WalletError::Transient("lock acquisition timed out".to_string()),
                Some("57014") => WalletError::Transient("statement timed out".to_string()),
                Some("40001") | Some("40P01") => {
                    WalletError::Transient(format!("store serialization failure: {}", db.message()))
                }
                Some("23505") if db.constraint() == Some(IDEMPOTENCY_KEY_CONSTRAINT) => {
                    WalletError::IdempotencyConflict(
                        "duplicate idempotency key lost the insert race".to_string(),
                    )
                }
                _ => WalletError::Database(err),
            },
            _ => WalletError::Database(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_is_transient() {
        let err = WalletError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, WalletError::Transient(_)));
    }

    #[test]
    fn test_row_not_found_is_database() {
        let err = WalletError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, WalletError::Database(_)));
    }

    #[test]
    fn test_money_error_converts() {
        let err = WalletError::from(crate::money::MoneyError::NotPositive);
        assert!(matches!(err, WalletError::InvalidAmount(_)));
    }
}
