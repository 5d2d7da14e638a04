//! Cache key generation and invalidation utilities.
//!
//! Provides consistent cache key generation and invalidation helpers across the application.

use crate::MemoryCache;
use tracing::debug;

/// Key prefixes, one per cached resource collection.
///
/// Every key for a resource starts with its prefix, so a mutation can drop
/// the whole collection with a single prefix invalidation.
pub mod prefixes {
    pub const PRODUCTS: &str = "products";
    pub const CATEGORIES: &str = "categories";
    pub const SUB_CATEGORIES: &str = "subcategories";
    pub const PURCHASES: &str = "purchases";
    pub const SALES: &str = "sales";
    pub const ORDERS: &str = "orders";
    pub const USERS: &str = "users";
    pub const EXCHANGE_RATES: &str = "exchange-rates";
}

/// Generates a deterministic cache key from a prefix and query parameters.
///
/// Parameters are sorted by name before concatenation, so differently-ordered
/// but equal parameter sets collide to the same key:
///
/// ```
/// use stockbay_cache::keys::generate;
///
/// let a = generate("products", &[("page", "1".into()), ("limit", "10".into())]);
/// let b = generate("products", &[("limit", "10".into()), ("page", "1".into())]);
/// assert_eq!(a, b);
/// ```
pub fn generate(prefix: &str, params: &[(&str, String)]) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by_key(|(name, _)| *name);

    let joined = sorted
        .iter()
        .map(|(name, value)| format!("{name}:{value}"))
        .collect::<Vec<_>>()
        .join("|");

    format!("{prefix}:{joined}")
}

/// Cache invalidation helpers, one per resource.
///
/// Call the matching function after creating, updating, or deleting a row
/// of that resource.
pub mod invalidate {
    use super::*;

    async fn purge(cache: &MemoryCache, prefix: &str) {
        let removed = cache.invalidate_prefix(prefix).await;
        debug!(cache.prefix = %prefix, cache.removed = %removed, "Resource cache invalidated");
    }

    pub async fn products(cache: &MemoryCache) {
        purge(cache, prefixes::PRODUCTS).await;
    }

    pub async fn categories(cache: &MemoryCache) {
        purge(cache, prefixes::CATEGORIES).await;
        // Category trees embed subcategory and product counts.
        purge(cache, prefixes::SUB_CATEGORIES).await;
    }

    pub async fn sub_categories(cache: &MemoryCache) {
        purge(cache, prefixes::SUB_CATEGORIES).await;
        // Parent category trees embed their subcategories.
        purge(cache, prefixes::CATEGORIES).await;
    }

    pub async fn purchases(cache: &MemoryCache) {
        purge(cache, prefixes::PURCHASES).await;
    }

    pub async fn sales(cache: &MemoryCache) {
        purge(cache, prefixes::SALES).await;
    }

    pub async fn orders(cache: &MemoryCache) {
        purge(cache, prefixes::ORDERS).await;
    }

    pub async fn users(cache: &MemoryCache) {
        purge(cache, prefixes::USERS).await;
    }

    pub async fn exchange_rates(cache: &MemoryCache) {
        purge(cache, prefixes::EXCHANGE_RATES).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_is_order_independent() {
        let a = generate("x", &[("b", "2".into()), ("a", "1".into())]);
        let b = generate("x", &[("a", "1".into()), ("b", "2".into())]);
        assert_eq!(a, b);
        assert_eq!(a, "x:a:1|b:2");
    }

    #[test]
    fn generate_with_no_params_is_just_the_prefix() {
        assert_eq!(generate("categories", &[]), "categories:");
    }

    #[test]
    fn generate_distinguishes_different_values() {
        let a = generate("products", &[("page", "1".into())]);
        let b = generate("products", &[("page", "2".into())]);
        assert_ne!(a, b);
    }

    #[test]
    fn generated_keys_start_with_their_prefix() {
        let key = generate(prefixes::SALES, &[("productId", "abc".into())]);
        assert!(key.starts_with(prefixes::SALES));
    }

    #[tokio::test]
    async fn invalidate_helpers_drop_the_collection() {
        let cache = MemoryCache::new(std::time::Duration::from_secs(60));

        let key = generate(prefixes::SALES, &[("page", "1".into())]);
        cache.set(&key, &42i32).await.unwrap();

        invalidate::sales(&cache).await;

        assert_eq!(cache.get::<i32>(&key).await, None);
    }
}
