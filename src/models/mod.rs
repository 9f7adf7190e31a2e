//! Request and Response models for the property API
//!
//! DTOs used for serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::LoadTestParams;
pub use responses::{
    cache_test_value, CacheClearResponse, CacheStatusResponse, CacheTestResponse,
    HealthResponse, ListingCacheInfo, ListingResponse, LoadTestResponse, MetricsErrorResponse,
    MetricsResponse, PageCacheStatus, PropertyView, TestSignalsResponse, UsageResponse,
};
