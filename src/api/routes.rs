//! API Routes
//!
//! Configures the Axum router with all property service endpoints.

use axum::{middleware, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_clear, cache_clear_usage, cache_load_test, cache_load_test_usage, cache_status,
    cache_test, health_handler, property_list, property_list_no_cache, redis_metrics,
    test_signals, test_signals_usage, AppState,
};
use super::response_cache::response_cache_layer;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /properties/` - Listing, HTML or JSON, response-cached
/// - `GET /properties/no-cache/` - Listing straight from the database
/// - `GET /properties/cache-status/` - Presence of every cache entry
/// - `POST /properties/cache-clear/` - Invalidate the query cache
/// - `GET /properties/cache-test/` - Cache set/get round trip
/// - `GET /properties/redis-metrics/` - Hit ratio dashboard
/// - `POST /properties/cache-load-test/` - Generate synthetic cache traffic
/// - `POST /properties/test-signals/` - Create a property through the write path
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - Response cache: only on the listing route
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let cached_listing = Router::new()
        .route("/properties/", get(property_list))
        .route_layer(middleware::from_fn_with_state(
            state.page_cache.clone(),
            response_cache_layer,
        ));

    Router::new()
        .merge(cached_listing)
        .route("/properties/no-cache/", get(property_list_no_cache))
        .route("/properties/cache-status/", get(cache_status))
        .route(
            "/properties/cache-clear/",
            get(cache_clear_usage).post(cache_clear),
        )
        .route("/properties/cache-test/", get(cache_test))
        .route("/properties/redis-metrics/", get(redis_metrics))
        .route(
            "/properties/cache-load-test/",
            get(cache_load_test_usage).post(cache_load_test),
        )
        .route(
            "/properties/test-signals/",
            get(test_signals_usage).post(test_signals),
        )
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
