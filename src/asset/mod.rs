//! Asset types: the fungible virtual units users hold balances of

pub mod cache;
pub mod manager;
pub mod models;

pub use manager::AssetTypeManager;
pub use models::AssetType;
