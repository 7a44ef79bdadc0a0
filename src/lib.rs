//! wallet-ledger - Transactional core of a virtual-asset wallet service
//!
//! Users hold balances of one or more asset classes (Gold Coins, Diamonds,
//! Loyalty Points); a distinguished system account is the counterparty for
//! issuance (top-up, bonus) and retirement (spend) of value. The core moves
//! value between a user wallet and the system wallet atomically, with a
//! double-entry audit trail.
//!
//! # Modules
//!
//! - [`config`] - Application configuration (YAML + env overrides)
//! - [`logging`] - tracing subscriber setup
//! - [`db`] - PostgreSQL pool, schema and seed data
//! - [`money`] - Boundary amount normalization (scale-2 decimal)
//! - [`asset`] - Asset-type model, lookup and TTL cache
//! - [`wallet`] - Lock coordinator, idempotency gate, ledger engine,
//!   wallet service and query surface

pub mod config;
pub mod logging;

pub mod db;
pub mod money;

pub mod asset;
pub mod wallet;

// Convenient re-exports at crate root
pub use asset::{AssetType, AssetTypeManager};
pub use config::AppConfig;
pub use db::Database;
pub use money::AmountInput;
pub use wallet::{
    EntrySide, LedgerEngine, Transaction, TransactionKind, TransactionStatus, Wallet,
    WalletError, WalletService,
};
