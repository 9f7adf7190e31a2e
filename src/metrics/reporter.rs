//! Cache-server metrics and their analysis.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::cache::{human_bytes, human_uptime, CacheHandle, ServerInfo};
use crate::error::Result;

/// Used memory above which a review is suggested (100 MiB).
pub const HIGH_MEMORY_BYTES: u64 = 100 * 1024 * 1024;

/// Client count above which connection pooling is suggested.
pub const HIGH_CLIENT_COUNT: u64 = 100;

// == Rating ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PerformanceRating {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl PerformanceRating {
    /// Lower-case name, used as a CSS class on the dashboard.
    pub fn css_class(self) -> &'static str {
        match self {
            PerformanceRating::Excellent => "excellent",
            PerformanceRating::Good => "good",
            PerformanceRating::Fair => "fair",
            PerformanceRating::Poor => "poor",
        }
    }
}

impl fmt::Display for PerformanceRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PerformanceRating::Excellent => "Excellent",
            PerformanceRating::Good => "Good",
            PerformanceRating::Fair => "Fair",
            PerformanceRating::Poor => "Poor",
        };
        f.write_str(name)
    }
}

/// Minimum hit ratio, in percent, for each rating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingThresholds {
    pub excellent: f64,
    pub good: f64,
    pub fair: f64,
}

impl Default for RatingThresholds {
    fn default() -> Self {
        Self {
            excellent: 90.0,
            good: 75.0,
            fair: 50.0,
        }
    }
}

impl RatingThresholds {
    pub fn rate(&self, hit_ratio: f64) -> PerformanceRating {
        if hit_ratio >= self.excellent {
            PerformanceRating::Excellent
        } else if hit_ratio >= self.good {
            PerformanceRating::Good
        } else if hit_ratio >= self.fair {
            PerformanceRating::Fair
        } else {
            PerformanceRating::Poor
        }
    }
}

/// `hits / (hits + misses) * 100` rounded to two decimals; 0.0 without traffic.
pub fn hit_ratio(hits: u64, misses: u64) -> f64 {
    let total = hits as u128 + misses as u128;
    if total == 0 {
        return 0.0;
    }
    let ratio = hits as f64 / total as f64 * 100.0;
    ((ratio * 100.0).round() / 100.0).clamp(0.0, 100.0)
}

// == Snapshot ==
#[derive(Debug, Clone, Serialize)]
pub struct CachePerformance {
    pub keyspace_hits: u64,
    pub keyspace_misses: u64,
    pub total_operations: u64,
    pub hit_ratio_percent: f64,
    pub performance_rating: PerformanceRating,
    /// Entries dropped because their TTL elapsed
    pub expired_keys: u64,
    /// Entries dropped to make room
    pub evicted_keys: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemoryUsage {
    pub used_memory: u64,
    pub used_memory_human: String,
    pub used_memory_peak_human: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerSummary {
    pub backend: String,
    pub redis_version: String,
    pub uptime_in_seconds: u64,
    pub uptime_human: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectionStats {
    pub connected_clients: u64,
    pub total_commands_processed: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub cache_efficiency: String,
    pub recommendations: Vec<String>,
}

/// Point-in-time view of the cache server, recomputed on every request.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub cache_performance: CachePerformance,
    pub memory_usage: MemoryUsage,
    pub server_info: ServerSummary,
    pub connection_stats: ConnectionStats,
    pub analysis: Analysis,
}

impl MetricsSnapshot {
    /// Derives ratios, rating and advice from raw counters.
    pub fn from_info(backend: &str, info: &ServerInfo, thresholds: &RatingThresholds) -> Self {
        let total_operations = info.keyspace_hits.saturating_add(info.keyspace_misses);
        let ratio = hit_ratio(info.keyspace_hits, info.keyspace_misses);
        let rating = thresholds.rate(ratio);

        Self {
            cache_performance: CachePerformance {
                keyspace_hits: info.keyspace_hits,
                keyspace_misses: info.keyspace_misses,
                total_operations,
                hit_ratio_percent: ratio,
                performance_rating: rating,
                expired_keys: info.expired_keys,
                evicted_keys: info.evicted_keys,
            },
            memory_usage: MemoryUsage {
                used_memory: info.used_memory,
                used_memory_human: human_bytes(info.used_memory),
                used_memory_peak_human: human_bytes(info.used_memory_peak),
            },
            server_info: ServerSummary {
                backend: backend.to_string(),
                redis_version: info.version.clone(),
                uptime_in_seconds: info.uptime_secs,
                uptime_human: human_uptime(info.uptime_secs),
            },
            connection_stats: ConnectionStats {
                connected_clients: info.connected_clients,
                total_commands_processed: info.total_commands_processed,
            },
            analysis: Analysis {
                cache_efficiency: describe_efficiency(total_operations, ratio, rating),
                recommendations: recommendations(info, total_operations, ratio, thresholds),
            },
        }
    }
}

fn describe_efficiency(total_operations: u64, ratio: f64, rating: PerformanceRating) -> String {
    if total_operations == 0 {
        return "No cache lookups recorded yet.".to_string();
    }
    format!(
        "{} ({:.2}% of {} lookups served from cache)",
        rating, ratio, total_operations
    )
}

/// Advisory text only; nothing here feeds back into cache behavior.
fn recommendations(
    info: &ServerInfo,
    total_operations: u64,
    ratio: f64,
    thresholds: &RatingThresholds,
) -> Vec<String> {
    let mut advice = Vec::new();

    if total_operations == 0 {
        advice.push(
            "No cache traffic yet: generate some with POST /properties/cache-load-test/".to_string(),
        );
    } else if ratio < thresholds.fair {
        advice.push(
            "Hit ratio is low: increase cache TTLs or warm the cache before peak traffic"
                .to_string(),
        );
    } else if ratio < thresholds.good {
        advice.push(
            "Hit ratio is moderate: review invalidation frequency and cache key design".to_string(),
        );
    }

    if info.used_memory > HIGH_MEMORY_BYTES {
        advice.push(format!(
            "Memory usage is high ({}): review TTLs and the eviction policy",
            human_bytes(info.used_memory)
        ));
    }

    if info.connected_clients > HIGH_CLIENT_COUNT {
        advice.push(format!(
            "{} connected clients: review connection pooling",
            info.connected_clients
        ));
    }

    if advice.is_empty() {
        advice.push("Cache performance is healthy; no action required".to_string());
    }
    advice
}

// == Reporter ==
#[derive(Clone)]
pub struct MetricsReporter {
    cache: CacheHandle,
    thresholds: RatingThresholds,
}

impl MetricsReporter {
    pub fn new(cache: CacheHandle) -> Self {
        Self::with_thresholds(cache, RatingThresholds::default())
    }

    pub fn with_thresholds(cache: CacheHandle, thresholds: RatingThresholds) -> Self {
        Self { cache, thresholds }
    }

    pub async fn compute_metrics(&self) -> Result<MetricsSnapshot> {
        let info = self.cache.server_info().await?;
        debug!(?info, "Read cache server counters");
        Ok(MetricsSnapshot::from_info(
            self.cache.name(),
            &info,
            &self.thresholds,
        ))
    }
}
