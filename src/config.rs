//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// sqlx connection URL for the property store
    pub database_url: String,
    /// Redis connection URL; the in-process cache is used when unset
    pub redis_url: Option<String>,
    /// Namespace prepended to every key written to Redis
    pub cache_key_prefix: String,
    /// TTL in seconds of the cached property list
    pub query_cache_ttl: u64,
    /// TTL in seconds of the cached property count
    pub count_cache_ttl: u64,
    /// TTL in seconds of cached HTTP responses
    pub page_cache_ttl: u64,
    /// Serve uncached data instead of failing when the cache store errors
    pub cache_fail_open: bool,
    /// Capacity of the in-process cache
    pub memory_max_entries: usize,
    /// Expiry sweep interval of the in-process cache, in seconds
    pub cleanup_interval: u64,
    /// Insert the sample properties on startup
    pub seed_sample_data: bool,
    /// Populate the query cache on startup
    pub warm_cache_on_startup: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8000)
    /// - `DATABASE_URL` - Property store URL (default: `sqlite://properties.db?mode=rwc`)
    /// - `REDIS_URL` - Redis URL (default: unset, in-process cache)
    /// - `CACHE_KEY_PREFIX` - Redis key namespace (default: `property_listings`)
    /// - `QUERY_CACHE_TTL` - Property list TTL in seconds (default: 3600)
    /// - `COUNT_CACHE_TTL` - Property count TTL in seconds (default: 1800)
    /// - `PAGE_CACHE_TTL` - Response cache TTL in seconds (default: 900)
    /// - `CACHE_FAIL_OPEN` - Bypass the cache on cache errors (default: false)
    /// - `MEMORY_CACHE_MAX_ENTRIES` - In-process cache capacity (default: 10000)
    /// - `CLEANUP_INTERVAL` - Expiry sweep frequency in seconds (default: 1)
    /// - `SEED_SAMPLE_DATA` - Insert sample properties (default: false)
    /// - `WARM_CACHE_ON_STARTUP` - Pre-populate the query cache (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            cache_key_prefix: env::var("CACHE_KEY_PREFIX").unwrap_or(defaults.cache_key_prefix),
            query_cache_ttl: env_or("QUERY_CACHE_TTL", defaults.query_cache_ttl),
            count_cache_ttl: env_or("COUNT_CACHE_TTL", defaults.count_cache_ttl),
            page_cache_ttl: env_or("PAGE_CACHE_TTL", defaults.page_cache_ttl),
            cache_fail_open: env_or("CACHE_FAIL_OPEN", defaults.cache_fail_open),
            memory_max_entries: env_or("MEMORY_CACHE_MAX_ENTRIES", defaults.memory_max_entries),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            seed_sample_data: env_or("SEED_SAMPLE_DATA", defaults.seed_sample_data),
            warm_cache_on_startup: env_or("WARM_CACHE_ON_STARTUP", defaults.warm_cache_on_startup),
        }
    }

    pub fn query_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.query_cache_ttl)
    }

    pub fn count_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.count_cache_ttl)
    }

    pub fn page_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.page_cache_ttl)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8000,
            database_url: "sqlite://properties.db?mode=rwc".to_string(),
            redis_url: None,
            cache_key_prefix: "property_listings".to_string(),
            query_cache_ttl: 3600,
            count_cache_ttl: 1800,
            page_cache_ttl: 900,
            cache_fail_open: false,
            memory_max_entries: 10_000,
            cleanup_interval: 1,
            seed_sample_data: false,
            warm_cache_on_startup: false,
        }
    }
}

/// Reads and parses an environment variable, falling back to `default` when
/// it is missing or unparsable.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
