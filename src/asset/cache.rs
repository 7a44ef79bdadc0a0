//! TTL-based cache for asset type lookups
//!
//! Uses the `cached` crate for automatic TTL expiration. Asset metadata is
//! immutable after provisioning, so any TTL is safe here. This cache serves
//! external collaborators only; the ledger engine always resolves assets
//! through [`AssetTypeManager`] directly.

use cached::proc_macro::cached;
use sqlx::PgPool;
use std::sync::Arc;

use super::manager::AssetTypeManager;
use super::models::AssetType;

/// TTL for the asset type cache in seconds
pub const TTL_SECONDS: u64 = 300;

/// Look up an asset type by name or code, with caching
///
/// Results (including misses) are cached for TTL_SECONDS.
#[cached(
    time = 300,
    key = "String",
    convert = r#"{ identifier.clone() }"#,
    result = true
)]
pub async fn get_asset_type_cached(
    pool: Arc<PgPool>,
    identifier: String,
) -> Result<Option<AssetType>, String> {
    tracing::debug!(identifier = %identifier, "[cache] Loading asset type from database");
    AssetTypeManager::get_by_identifier(&pool, &identifier)
        .await
        .map_err(|e| format!("Failed to load asset type: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_constant() {
        assert_eq!(TTL_SECONDS, 300);
    }
}
