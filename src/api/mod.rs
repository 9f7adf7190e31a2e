//! API Module
//!
//! HTTP handlers, routing and the response cache layer.
//!
//! # Endpoints
//! - `GET /properties/` - Property listing (HTML or JSON)
//! - `GET /properties/no-cache/` - Uncached listing
//! - `GET /properties/cache-status/` - Cache presence report
//! - `POST /properties/cache-clear/` - Query cache invalidation
//! - `GET /properties/cache-test/` - Cache round trip
//! - `GET /properties/redis-metrics/` - Metrics dashboard
//! - `POST /properties/cache-load-test/` - Synthetic load
//! - `POST /properties/test-signals/` - Write-path demo
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod html;
pub mod negotiation;
pub mod response_cache;
pub mod routes;

pub use handlers::*;
pub use negotiation::OutputFormat;
pub use response_cache::{
    page_cache_key, response_cache_layer, CachedResponse, ResponseCacheSettings, X_CACHE,
};
pub use routes::create_router;
