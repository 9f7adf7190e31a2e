//! Query-cache invalidation.
//!
//! Only the query-cache keys are removed. Cached responses are left to expire
//! on their own TTL, so a rendered listing can lag behind the store for up to
//! that long.

use serde::Serialize;
use tracing::{error, info};

use super::keys::QUERY_CACHE_KEYS;
use crate::cache::CacheBackend;

/// Outcome for one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClearedCache {
    pub name: String,
    pub key: String,
    /// True when the key existed and was removed
    pub cleared: bool,
}

/// Outcome of a full invalidation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidationReport {
    pub success: bool,
    pub cleared_caches: Vec<ClearedCache>,
    pub errors: Vec<String>,
    pub total_cleared: usize,
}

/// Deletes every query-cache key.
///
/// Each key is attempted even if an earlier one fails; failures are collected
/// in the report rather than returned.
pub async fn invalidate_property_cache(cache: &dyn CacheBackend) -> InvalidationReport {
    let mut cleared_caches = Vec::with_capacity(QUERY_CACHE_KEYS.len());
    let mut errors = Vec::new();

    for (name, key) in QUERY_CACHE_KEYS {
        match cache.delete(key).await {
            Ok(cleared) => {
                info!(name, key, cleared, "Cache key invalidated");
                cleared_caches.push(ClearedCache {
                    name: name.to_string(),
                    key: key.to_string(),
                    cleared,
                });
            }
            Err(e) => {
                let message = format!("Error clearing {}: {}", name, e);
                error!("{}", message);
                errors.push(message);
            }
        }
    }

    InvalidationReport {
        success: errors.is_empty(),
        total_cleared: cleared_caches.len(),
        cleared_caches,
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::properties::keys::{ALL_PROPERTIES, PROPERTY_COUNT};
    use std::time::Duration;

    #[tokio::test]
    async fn test_invalidation_removes_query_keys() {
        let cache = MemoryCache::new(10);
        cache.set(ALL_PROPERTIES, "[]", Duration::from_secs(60)).await.unwrap();
        cache.set(PROPERTY_COUNT, "0", Duration::from_secs(60)).await.unwrap();

        let report = invalidate_property_cache(&cache).await;

        assert!(report.success);
        assert_eq!(report.total_cleared, 2);
        assert!(report.cleared_caches.iter().all(|c| c.cleared));
        assert!(cache.get(ALL_PROPERTIES).await.unwrap().is_none());
        assert!(cache.get(PROPERTY_COUNT).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalidation_of_absent_keys_is_a_no_op() {
        let cache = MemoryCache::new(10);

        let first = invalidate_property_cache(&cache).await;
        let second = invalidate_property_cache(&cache).await;

        for report in [first, second] {
            assert!(report.success);
            assert!(report.errors.is_empty());
            assert!(report.cleared_caches.iter().all(|c| !c.cleared));
        }
    }

    #[tokio::test]
    async fn test_invalidation_leaves_other_keys() {
        let cache = MemoryCache::new(10);
        cache
            .set("views.cache_page.html.abc", "<html>", Duration::from_secs(60))
            .await
            .unwrap();

        invalidate_property_cache(&cache).await;

        assert!(cache.get("views.cache_page.html.abc").await.unwrap().is_some());
    }
}
