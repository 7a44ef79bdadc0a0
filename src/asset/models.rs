//! Asset type model

use serde::Serialize;
use sqlx::FromRow;

/// Asset type definition (Gold Coins, Diamonds, Loyalty Points)
///
/// Inserted once at provisioning, read-only thereafter.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct AssetType {
    pub asset_type_id: i32,
    /// Human name, unique (e.g. "Gold Coins")
    pub name: String,
    /// Short code, unique (e.g. "GOLD")
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_type_equality() {
        let a = AssetType {
            asset_type_id: 1,
            name: "Gold Coins".to_string(),
            code: "GOLD".to_string(),
        };
        let b = a.clone();
        assert_eq!(a, b);
    }
}
