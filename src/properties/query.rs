//! Read-through query cache for property listings.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::keys::{CacheTimeouts, ALL_PROPERTIES, PROPERTY_COUNT, QUERY_CACHE_KEYS};
use super::model::Property;
use super::repository::PropertyRepository;
use crate::cache::{CacheExt, CacheHandle};
use crate::error::{AppError, Result};

/// What is stored under [`ALL_PROPERTIES`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedQueryResult {
    pub properties: Vec<Property>,
    pub count: usize,
}

impl CachedQueryResult {
    pub fn new(properties: Vec<Property>) -> Self {
        Self {
            count: properties.len(),
            properties,
        }
    }
}

/// Presence of each query-cache key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheInfo {
    pub all_properties_cached: bool,
    pub property_count_cached: bool,
    pub cache_keys: Vec<String>,
    pub cache_timeouts: CacheTimeouts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WarmReport {
    pub properties_cached: usize,
    pub count_cached: u64,
}

/// Property reads backed by the query cache.
#[derive(Clone)]
pub struct QueryService {
    cache: CacheHandle,
    repository: PropertyRepository,
    timeouts: CacheTimeouts,
    fail_open: bool,
}

impl QueryService {
    /// With `fail_open`, cache errors are logged and the store is read
    /// directly; otherwise they are returned.
    pub fn new(
        cache: CacheHandle,
        repository: PropertyRepository,
        timeouts: CacheTimeouts,
        fail_open: bool,
    ) -> Self {
        Self {
            cache,
            repository,
            timeouts,
            fail_open,
        }
    }

    // == All Properties ==
    /// Returns every property, newest first, and whether it came from the cache.
    pub async fn get_all_properties(&self) -> Result<(Vec<Property>, bool)> {
        info!("Checking cache for key: {}", ALL_PROPERTIES);

        match self.lookup::<CachedQueryResult>(ALL_PROPERTIES).await {
            Ok(Some(cached)) => {
                info!(count = cached.count, "Cache HIT: returning cached properties");
                return Ok((cached.properties, true));
            }
            Ok(None) => info!("Cache MISS: fetching properties from database"),
            Err(e) => self.bypass(ALL_PROPERTIES, e)?,
        }

        let properties = self.repository.list_all().await?;
        let entry = CachedQueryResult::new(properties);
        self.store(ALL_PROPERTIES, &entry, self.timeouts.properties)
            .await?;

        info!(
            count = entry.count,
            ttl_secs = self.timeouts.properties.as_secs(),
            "Cached properties"
        );
        Ok((entry.properties, false))
    }

    // == Property Count ==
    /// Returns the number of properties and whether it came from the cache.
    pub async fn get_property_count(&self) -> Result<(u64, bool)> {
        match self.lookup::<u64>(PROPERTY_COUNT).await {
            Ok(Some(count)) => {
                info!("Cache HIT: returning cached property count");
                return Ok((count, true));
            }
            Ok(None) => info!("Cache MISS: fetching property count from database"),
            Err(e) => self.bypass(PROPERTY_COUNT, e)?,
        }

        let count = self.repository.count().await?;
        self.store(PROPERTY_COUNT, &count, self.timeouts.count).await?;
        info!(count, "Cached property count");
        Ok((count, false))
    }

    // == Cache Info ==
    pub async fn cache_info(&self) -> Result<CacheInfo> {
        Ok(CacheInfo {
            all_properties_cached: self.cache.get(ALL_PROPERTIES).await?.is_some(),
            property_count_cached: self.cache.get(PROPERTY_COUNT).await?.is_some(),
            cache_keys: QUERY_CACHE_KEYS.iter().map(|(_, key)| key.to_string()).collect(),
            cache_timeouts: self.timeouts,
        })
    }

    // == Warm Cache ==
    /// Fills both query-cache keys ahead of traffic.
    pub async fn warm_cache(&self) -> Result<WarmReport> {
        info!("Warming up property cache");
        let (properties, _) = self.get_all_properties().await?;
        let (count, _) = self.get_property_count().await?;

        info!(properties = properties.len(), "Cache warmed up");
        Ok(WarmReport {
            properties_cached: properties.len(),
            count_cached: count,
        })
    }

    pub fn timeouts(&self) -> CacheTimeouts {
        self.timeouts
    }

    /// Reads a typed entry. A payload that no longer deserializes counts as
    /// a miss and will be overwritten.
    async fn lookup<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: serde::de::DeserializeOwned + Send,
    {
        match self.cache.get_json::<T>(key).await {
            Err(AppError::Serialization(e)) => {
                warn!(key, error = %e, "Discarding unreadable cache entry");
                Ok(None)
            }
            other => other,
        }
    }

    /// Writes a typed entry. A value the backend is unable to hold is served
    /// without caching whatever the fail-open setting.
    async fn store<T>(&self, key: &str, value: &T, ttl: std::time::Duration) -> Result<()>
    where
        T: Serialize + Send + Sync,
    {
        match self.cache.set_json(key, value, ttl).await {
            Ok(()) => Ok(()),
            Err(AppError::ValueTooLarge { size, limit }) => {
                warn!(key, size, limit, "Result too large to cache, serving uncached");
                Ok(())
            }
            Err(e @ AppError::Cache(_)) => self.bypass(key, e),
            Err(e) => Err(e),
        }
    }

    /// Applies the fail-open policy to a cache error.
    fn bypass(&self, key: &str, err: AppError) -> Result<()> {
        if self.fail_open {
            warn!(key, error = %err, "Cache unavailable, serving from database");
            Ok(())
        } else {
            Err(err)
        }
    }
}
