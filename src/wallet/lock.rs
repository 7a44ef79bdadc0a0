//! Lock Coordinator
//!
//! Two mechanisms together serialize every pair of operations that could
//! race on the same accounts:
//!
//! 1. A transaction-scoped advisory lock keyed by the participating users
//!    and asset. Acquired before any row is touched, it collapses the
//!    check-then-act race on duplicate idempotency keys.
//! 2. Row locks taken in ascending user_id order, which breaks cycle
//!    formation when mixed operations interleave across overlapping
//!    wallets.

use sqlx::PgConnection;
use uuid::Uuid;

/// Derive the deterministic 64-bit advisory-lock key for an operation.
///
/// The user ids and asset-type id are stringified, sorted lexicographically
/// and joined with `:` before hashing, so the key is order-insensitive with
/// respect to party identities: a SPEND (user -> system) and a TOP_UP
/// (system -> user) on the same (user, asset) collide on the same key.
///
/// A 64-bit hash can collide across unrelated tuples; that costs spurious
/// serialization, not correctness, because the row locks still serialize
/// true conflicts.
pub fn advisory_key(user_a: Uuid, user_b: Uuid, asset_type_id: i32) -> i64 {
    let mut parts = [
        user_a.to_string(),
        user_b.to_string(),
        asset_type_id.to_string(),
    ];
    parts.sort();

    fold_key(parts.join(":").as_bytes())
}

/// Stable byte fold: h = (h << 5) - h + byte, over wrapping i64
fn fold_key(bytes: &[u8]) -> i64 {
    let mut h: i64 = 0;
    for &b in bytes {
        h = h.wrapping_shl(5).wrapping_sub(h).wrapping_add(b as i64);
    }
    h
}

/// Acquire the advisory lock on the open store transaction.
///
/// pg_advisory_xact_lock blocks until granted (bounded by the session
/// lock_timeout) and releases automatically at commit or rollback.
pub async fn acquire_advisory_lock(conn: &mut PgConnection, key: i64) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(key)
        .execute(conn)
        .await?;
    Ok(())
}

/// Sort users into the canonical row-locking order (ascending user_id,
/// lexicographic over the 128-bit identifier).
pub fn lock_order(user_a: Uuid, user_b: Uuid) -> [Uuid; 2] {
    if user_a <= user_b {
        [user_a, user_b]
    } else {
        [user_b, user_a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn test_key_is_deterministic() {
        let a = user(1);
        let b = user(2);
        assert_eq!(advisory_key(a, b, 7), advisory_key(a, b, 7));
    }

    #[test]
    fn test_key_is_order_insensitive() {
        // SPEND (user -> system) and TOP_UP (system -> user) must collide
        let system = Uuid::nil();
        let u = user(42);
        assert_eq!(advisory_key(system, u, 1), advisory_key(u, system, 1));
    }

    #[test]
    fn test_key_depends_on_asset() {
        let system = Uuid::nil();
        let u = user(42);
        assert_ne!(advisory_key(system, u, 1), advisory_key(system, u, 2));
    }

    #[test]
    fn test_key_depends_on_parties() {
        let system = Uuid::nil();
        assert_ne!(
            advisory_key(system, user(1), 1),
            advisory_key(system, user(2), 1)
        );
    }

    #[test]
    fn test_fold_known_values() {
        // The fold must stay stable across releases: keys participate in
        // cross-process lock agreement.
        assert_eq!(fold_key(b""), 0);
        assert_eq!(fold_key(b"a"), 97);
        assert_eq!(fold_key(b"ab"), 97 * 31 + 98);
    }

    #[test]
    fn test_lock_order_ascending() {
        let lo = user(1);
        let hi = user(2);
        assert_eq!(lock_order(lo, hi), [lo, hi]);
        assert_eq!(lock_order(hi, lo), [lo, hi]);
        // The system user (all zeros) always sorts first
        assert_eq!(lock_order(user(9), Uuid::nil()), [Uuid::nil(), user(9)]);
    }
}
