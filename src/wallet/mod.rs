//! Wallet transactional core
//!
//! Layered leaves-first: the lock coordinator serializes racing operations,
//! the idempotency gate makes retries exactly-once, and the ledger engine
//! performs the double-entry value movement inside one store transaction.

pub mod engine;
pub mod error;
pub mod lock;
pub mod models;
pub mod service;

#[cfg(test)]
mod integration_tests;

pub use engine::{LedgerEngine, LedgerOperation};
pub use error::WalletError;
pub use models::{
    EntrySide, LedgerEntry, Transaction, TransactionKind, TransactionRecord, TransactionStatus,
    Wallet,
};
pub use service::WalletService;
