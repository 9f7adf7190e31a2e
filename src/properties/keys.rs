//! Query-cache key names and lifetimes.

use std::time::Duration;

use serde::Serialize;

use crate::config::Config;

/// Serialized property list.
pub const ALL_PROPERTIES: &str = "all_properties";

/// Cached property count.
pub const PROPERTY_COUNT: &str = "property_count";

/// Every query-cache key with its display name, in invalidation order.
pub const QUERY_CACHE_KEYS: [(&str, &str); 2] = [
    ("ALL_PROPERTIES", ALL_PROPERTIES),
    ("PROPERTY_COUNT", PROPERTY_COUNT),
];

/// Lifetimes of the query-cache entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheTimeouts {
    #[serde(rename = "PROPERTIES", serialize_with = "as_secs")]
    pub properties: Duration,
    #[serde(rename = "COUNT", serialize_with = "as_secs")]
    pub count: Duration,
}

impl CacheTimeouts {
    pub fn from_config(config: &Config) -> Self {
        Self {
            properties: config.query_cache_ttl(),
            count: config.count_cache_ttl(),
        }
    }
}

impl Default for CacheTimeouts {
    fn default() -> Self {
        Self {
            properties: Duration::from_secs(3600),
            count: Duration::from_secs(1800),
        }
    }
}

fn as_secs<S: serde::Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(value.as_secs())
}

/// Renders a lifetime as `1 hour`, `15 minutes`, `90 seconds`.
pub fn describe_ttl(ttl: Duration) -> String {
    fn plural(n: u64, unit: &str) -> String {
        if n == 1 {
            format!("1 {}", unit)
        } else {
            format!("{} {}s", n, unit)
        }
    }

    let secs = ttl.as_secs();
    if secs >= 3600 && secs % 3600 == 0 {
        plural(secs / 3600, "hour")
    } else if secs >= 60 && secs % 60 == 0 {
        plural(secs / 60, "minute")
    } else {
        plural(secs, "second")
    }
}
