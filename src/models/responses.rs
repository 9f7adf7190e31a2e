//! Response DTOs for the property API
//!
//! Defines the structure of outgoing JSON bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::metrics::{LoadTestReport, MetricsSnapshot};
use crate::properties::{CacheInfo, InvalidationReport, Property};

fn timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

// == Listing ==
/// One property as rendered in listing JSON.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyView {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Plain decimal, e.g. `1500.00`
    pub price: String,
    /// Display form, e.g. `$1,500.00`
    pub price_formatted: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Property> for PropertyView {
    fn from(property: &Property) -> Self {
        Self {
            id: property.id,
            title: property.title.clone(),
            description: property.description.clone(),
            price: property.price.to_string(),
            price_formatted: property.price.formatted(),
            location: property.location.clone(),
            created_at: property.created_at,
        }
    }
}

/// Lifetimes of both cache tiers, in words.
#[derive(Debug, Clone, Serialize)]
pub struct ListingCacheInfo {
    pub queryset_cache: String,
    pub page_cache: String,
}

/// Body of `GET /properties/` and `GET /properties/no-cache/` in JSON.
#[derive(Debug, Clone, Serialize)]
pub struct ListingResponse {
    pub properties: Vec<PropertyView>,
    pub count: usize,
    /// Whether the query cache served the list
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_info: Option<ListingCacheInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ListingResponse {
    pub fn cached(properties: &[Property], cached: bool, cache_info: ListingCacheInfo) -> Self {
        Self {
            properties: properties.iter().map(PropertyView::from).collect(),
            count: properties.len(),
            cached,
            cache_info: Some(cache_info),
            note: None,
        }
    }

    pub fn uncached(properties: &[Property]) -> Self {
        Self {
            properties: properties.iter().map(PropertyView::from).collect(),
            count: properties.len(),
            cached: false,
            cache_info: None,
            note: Some("This response bypasses all caching".to_string()),
        }
    }
}

// == Cache Status ==
#[derive(Debug, Clone, Serialize)]
pub struct PageCacheStatus {
    pub backend: String,
    pub location: String,
    pub html_page_cached: bool,
    pub json_page_cached: bool,
    pub cache_key_example: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheStatusResponse {
    pub page_cache: PageCacheStatus,
    pub queryset_cache: CacheInfo,
    pub timestamp: String,
}

impl CacheStatusResponse {
    pub fn new(page_cache: PageCacheStatus, queryset_cache: CacheInfo) -> Self {
        Self {
            page_cache,
            queryset_cache,
            timestamp: timestamp(),
        }
    }
}

// == Cache Clear ==
#[derive(Debug, Clone, Serialize)]
pub struct CacheClearResponse {
    pub success: bool,
    pub message: String,
    pub details: InvalidationReport,
    pub timestamp: String,
}

impl CacheClearResponse {
    pub fn new(details: InvalidationReport) -> Self {
        let message = if details.success {
            "Property cache cleared successfully"
        } else {
            "Errors occurred while clearing cache"
        };
        Self {
            success: details.success,
            message: message.to_string(),
            details,
            timestamp: timestamp(),
        }
    }
}

// == Cache Test ==
#[derive(Debug, Clone, Serialize)]
pub struct CacheTestResponse {
    pub cache_working: bool,
    pub original_value: String,
    pub cached_value: Option<String>,
    pub cache_backend: String,
    pub timestamp: String,
}

impl CacheTestResponse {
    pub fn new(original_value: String, cached_value: Option<String>, cache_backend: &str) -> Self {
        Self {
            cache_working: cached_value.as_deref() == Some(original_value.as_str()),
            original_value,
            cached_value,
            cache_backend: cache_backend.to_string(),
            timestamp: timestamp(),
        }
    }
}

/// Value written by the cache round-trip check.
pub fn cache_test_value() -> String {
    format!("Cache test at {}", timestamp())
}

// == Metrics ==
#[derive(Debug, Clone, Serialize)]
pub struct MetricsResponse {
    pub success: bool,
    pub metrics: MetricsSnapshot,
    pub timestamp: String,
}

impl MetricsResponse {
    pub fn new(metrics: MetricsSnapshot) -> Self {
        Self {
            success: true,
            metrics,
            timestamp: timestamp(),
        }
    }
}

/// Returned when the cache server cannot be queried for metrics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsErrorResponse {
    pub success: bool,
    pub error: String,
    pub recommendations: Vec<String>,
}

impl MetricsErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            recommendations: vec![
                "Check that the cache server is running".to_string(),
                "Verify the REDIS_URL setting".to_string(),
            ],
        }
    }
}

// == Load Test ==
#[derive(Debug, Clone, Serialize)]
pub struct LoadTestResponse {
    pub success: bool,
    pub message: String,
    pub operations_count: usize,
    pub hits: u64,
    pub misses: u64,
    pub note: String,
    pub timestamp: String,
}

impl From<LoadTestReport> for LoadTestResponse {
    fn from(report: LoadTestReport) -> Self {
        Self {
            success: true,
            message: format!(
                "Generated {} cache operations for testing",
                report.operations_count
            ),
            operations_count: report.operations_count,
            hits: report.hits,
            misses: report.misses,
            note: "Check /properties/redis-metrics/ to see updated statistics".to_string(),
            timestamp: timestamp(),
        }
    }
}

// == Test Signals ==
#[derive(Debug, Clone, Serialize)]
pub struct CreatedProperty {
    pub id: i64,
    pub title: String,
    pub price: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestSignalsResponse {
    pub success: bool,
    pub message: String,
    pub property: CreatedProperty,
    pub cache_before: CacheInfo,
    pub cache_after: CacheInfo,
    pub note: String,
    pub timestamp: String,
}

impl TestSignalsResponse {
    pub fn new(property: &Property, cache_before: CacheInfo, cache_after: CacheInfo) -> Self {
        Self {
            success: true,
            message: "Test property created successfully".to_string(),
            property: CreatedProperty {
                id: property.id,
                title: property.title.clone(),
                price: property.price.to_string(),
            },
            cache_before,
            cache_after,
            note: "The write hooks should have cleared the query cache".to_string(),
            timestamp: timestamp(),
        }
    }
}

// == Usage ==
/// Body of the 405 returned for a GET on a POST-only endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct UsageResponse {
    pub error: String,
    pub usage: String,
}

impl UsageResponse {
    pub fn post_only(usage: impl Into<String>) -> Self {
        Self {
            error: "Only POST requests are allowed".to_string(),
            usage: usage.into(),
        }
    }
}

// == Health ==
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::Price;

    fn property() -> Property {
        Property {
            id: 7,
            title: "Loft".to_string(),
            description: "Open plan".to_string(),
            price: Price::from_units(1500),
            location: "Harbor".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_property_view_prices() {
        let view = PropertyView::from(&property());
        assert_eq!(view.price, "1500.00");
        assert_eq!(view.price_formatted, "$1,500.00");
    }

    #[test]
    fn test_listing_serialize() {
        let listing = ListingResponse::cached(
            &[property()],
            true,
            ListingCacheInfo {
                queryset_cache: "1 hour".to_string(),
                page_cache: "15 minutes".to_string(),
            },
        );
        let json = serde_json::to_value(&listing).unwrap();

        assert_eq!(json["count"], 1);
        assert_eq!(json["cached"], true);
        assert_eq!(json["cache_info"]["page_cache"], "15 minutes");
        assert_eq!(json["properties"][0]["id"], 7);
        assert!(json.get("note").is_none());
    }

    #[test]
    fn test_uncached_listing_has_note() {
        let json = serde_json::to_value(ListingResponse::uncached(&[])).unwrap();
        assert_eq!(json["cached"], false);
        assert!(json.get("cache_info").is_none());
        assert!(json["note"].as_str().unwrap().contains("bypasses"));
    }

    #[test]
    fn test_cache_test_detects_mismatch() {
        let ok = CacheTestResponse::new("v".to_string(), Some("v".to_string()), "memory");
        let broken = CacheTestResponse::new("v".to_string(), None, "memory");
        assert!(ok.cache_working);
        assert!(!broken.cache_working);
    }

    #[test]
    fn test_clear_message_follows_success() {
        let report = InvalidationReport {
            success: false,
            cleared_caches: Vec::new(),
            errors: vec!["refused".to_string()],
            total_cleared: 0,
        };
        let response = CacheClearResponse::new(report);
        assert!(!response.success);
        assert_eq!(response.message, "Errors occurred while clearing cache");
    }

    #[test]
    fn test_usage_serialize() {
        let json = serde_json::to_string(&UsageResponse::post_only("POST here")).unwrap();
        assert!(json.contains("Only POST requests are allowed"));
        assert!(json.contains("POST here"));
    }

    #[test]
    fn test_health_response_serialize() {
        let json = serde_json::to_string(&HealthResponse::healthy()).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
