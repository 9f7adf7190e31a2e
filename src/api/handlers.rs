//! API Handlers
//!
//! HTTP request handlers for the property listing and cache tooling endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Json,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::html::{render_metrics_dashboard, render_metrics_error, render_property_list};
use super::negotiation::OutputFormat;
use super::response_cache::ResponseCacheSettings;
use crate::cache::{CacheHandle, CacheStore, MemoryCache, RedisCache};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::metrics::{generate_load, MetricsReporter};
use crate::models::{
    cache_test_value, CacheClearResponse, CacheStatusResponse, CacheTestResponse,
    HealthResponse, ListingCacheInfo, ListingResponse, LoadTestParams, LoadTestResponse,
    MetricsErrorResponse, MetricsResponse, PageCacheStatus, TestSignalsResponse, UsageResponse,
};
use crate::properties::keys::describe_ttl;
use crate::properties::{
    connect_pool, invalidate_property_cache, CacheInvalidationHook, CacheTimeouts,
    ChangeLogHook, NewProperty, Price, PropertyRepository, PropertyWriter, QueryService,
};

/// Key written by the cache round-trip check.
pub const CACHE_TEST_KEY: &str = "cache_test_key";
const CACHE_TEST_TTL: Duration = Duration::from_secs(60);

/// Path of the response-cached listing.
const LISTING_PATH: &str = "/properties/";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: CacheHandle,
    pub repository: PropertyRepository,
    pub query: QueryService,
    pub writer: PropertyWriter,
    pub metrics: MetricsReporter,
    pub page_cache: ResponseCacheSettings,
    /// Set when the in-process backend is in use, for the expiry sweep.
    pub local_store: Option<Arc<RwLock<CacheStore>>>,
}

impl AppState {
    /// Wires the services around an existing cache and repository.
    ///
    /// Writes go through a [`PropertyWriter`] that invalidates the query
    /// cache and logs every change.
    pub fn new(cache: CacheHandle, repository: PropertyRepository, config: &Config) -> Self {
        let fail_open = config.cache_fail_open;
        let query = QueryService::new(
            cache.clone(),
            repository.clone(),
            CacheTimeouts::from_config(config),
            fail_open,
        );
        let writer = PropertyWriter::new(repository.clone())
            .with_hook(Arc::new(CacheInvalidationHook::new(cache.clone(), fail_open)))
            .with_hook(Arc::new(ChangeLogHook));

        Self {
            metrics: MetricsReporter::new(cache.clone()),
            page_cache: ResponseCacheSettings::new(cache.clone(), config.page_cache_ttl(), fail_open),
            cache,
            repository,
            query,
            writer,
            local_store: None,
        }
    }

    /// Uses the in-process cache backend.
    pub fn with_memory_cache(repository: PropertyRepository, config: &Config) -> Self {
        let memory = MemoryCache::new(config.memory_max_entries);
        let store = memory.store();
        let mut state = Self::new(Arc::new(memory), repository, config);
        state.local_store = Some(store);
        state
    }

    /// Connects the property store and the configured cache backend.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let repository = PropertyRepository::new(connect_pool(&config.database_url).await?);
        repository.ensure_schema().await?;

        match &config.redis_url {
            Some(url) => {
                let redis = RedisCache::connect(url, config.cache_key_prefix.clone()).await?;
                info!(location = %url, "Using Redis cache backend");
                Ok(Self::new(Arc::new(redis), repository, config))
            }
            None => {
                info!(
                    max_entries = config.memory_max_entries,
                    "REDIS_URL not set, using in-process cache backend"
                );
                Ok(Self::with_memory_cache(repository, config))
            }
        }
    }

    fn listing_cache_info(&self) -> ListingCacheInfo {
        ListingCacheInfo {
            queryset_cache: describe_ttl(self.query.timeouts().properties),
            page_cache: describe_ttl(self.page_cache.ttl),
        }
    }
}

/// 405 body for a GET on a POST-only endpoint.
fn post_only(usage: &str) -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        Json(UsageResponse::post_only(usage)),
    )
        .into_response()
}

// == Listing ==
/// Handler for GET /properties/
///
/// Served through the query cache; the whole response is also cached by the
/// response cache layer.
pub async fn property_list(State(state): State<AppState>, format: OutputFormat) -> Result<Response> {
    let (properties, cached) = state.query.get_all_properties().await?;
    let (total_count, _) = state.query.get_property_count().await?;
    let cache_info = state.listing_cache_info();

    match format {
        OutputFormat::Json => {
            Ok(Json(ListingResponse::cached(&properties, cached, cache_info)).into_response())
        }
        OutputFormat::Html => {
            let notes = vec![
                format!("Query cache: {}", cache_info.queryset_cache),
                format!("Page cache: {}", cache_info.page_cache),
            ];
            Ok(Html(render_property_list(&properties, total_count, &notes)).into_response())
        }
    }
}

/// Handler for GET /properties/no-cache/
pub async fn property_list_no_cache(
    State(state): State<AppState>,
    format: OutputFormat,
) -> Result<Response> {
    let properties = state.repository.list_all().await?;

    match format {
        OutputFormat::Json => Ok(Json(ListingResponse::uncached(&properties)).into_response()),
        OutputFormat::Html => {
            let notes = vec!["This page bypasses all caching".to_string()];
            let total = properties.len() as u64;
            Ok(Html(render_property_list(&properties, total, &notes)).into_response())
        }
    }
}

// == Cache Tooling ==
/// Handler for GET /properties/cache-status/
pub async fn cache_status(State(state): State<AppState>) -> Result<Json<CacheStatusResponse>> {
    let key_fn = state.page_cache.key_fn;
    let html_key = key_fn(OutputFormat::Html, &Uri::from_static(LISTING_PATH));
    let json_keys = [
        key_fn(OutputFormat::Json, &Uri::from_static(LISTING_PATH)),
        key_fn(OutputFormat::Json, &Uri::from_static("/properties/?format=json")),
    ];

    let html_page_cached = state.cache.get(&html_key).await?.is_some();
    let mut json_page_cached = false;
    for key in &json_keys {
        json_page_cached |= state.cache.get(key).await?.is_some();
    }

    let cache_key_example = format!("{}...", html_key.chars().take(50).collect::<String>());
    let page_cache = PageCacheStatus {
        backend: state.cache.name().to_string(),
        location: state.cache.location(),
        html_page_cached,
        json_page_cached,
        cache_key_example,
    };

    Ok(Json(CacheStatusResponse::new(
        page_cache,
        state.query.cache_info().await?,
    )))
}

/// Handler for POST /properties/cache-clear/
pub async fn cache_clear(State(state): State<AppState>) -> Json<CacheClearResponse> {
    let report = invalidate_property_cache(state.cache.as_ref()).await;
    Json(CacheClearResponse::new(report))
}

pub async fn cache_clear_usage() -> Response {
    post_only("Send a POST request to this endpoint to clear the property cache")
}

/// Handler for GET /properties/cache-test/
pub async fn cache_test(State(state): State<AppState>) -> Result<Json<CacheTestResponse>> {
    let value = cache_test_value();
    state.cache.set(CACHE_TEST_KEY, &value, CACHE_TEST_TTL).await?;
    let cached = state.cache.get(CACHE_TEST_KEY).await?;

    Ok(Json(CacheTestResponse::new(value, cached, state.cache.name())))
}

/// Handler for GET /properties/redis-metrics/
///
/// A cache server that cannot be queried yields a 503 error page or body.
pub async fn redis_metrics(State(state): State<AppState>, format: OutputFormat) -> Response {
    match (state.metrics.compute_metrics().await, format) {
        (Ok(metrics), OutputFormat::Json) => Json(MetricsResponse::new(metrics)).into_response(),
        (Ok(metrics), OutputFormat::Html) => Html(render_metrics_dashboard(&metrics)).into_response(),
        (Err(e), format) => {
            warn!(error = %e, "Failed to read cache metrics");
            let body = MetricsErrorResponse::new(e.to_string());
            match format {
                OutputFormat::Json => (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response(),
                OutputFormat::Html => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Html(render_metrics_error(&body.error, &body.recommendations)),
                )
                    .into_response(),
            }
        }
    }
}

/// Handler for POST /properties/cache-load-test/
pub async fn cache_load_test(
    State(state): State<AppState>,
    Query(params): Query<LoadTestParams>,
) -> Result<Json<LoadTestResponse>> {
    if let Some(error_msg) = params.validate() {
        return Err(AppError::InvalidRequest(error_msg));
    }

    let mut rng = StdRng::from_os_rng();
    let report = generate_load(state.cache.as_ref(), params.iterations(), &mut rng).await?;
    Ok(Json(LoadTestResponse::from(report)))
}

pub async fn cache_load_test_usage() -> Response {
    post_only("Send a POST request to generate cache load for testing metrics")
}

fn test_property_title() -> String {
    format!("Test Property {}", rand::rng().random_range(1000..=9999))
}

/// Handler for POST /properties/test-signals/
///
/// Creates a property through the write path and reports the query cache
/// before and after, showing the invalidation hook at work.
pub async fn test_signals(State(state): State<AppState>) -> Result<Json<TestSignalsResponse>> {
    let cache_before = state.query.cache_info().await?;

    let property = state
        .writer
        .create(NewProperty::new(
            test_property_title(),
            "This is a test property created to demonstrate hook-based cache invalidation.",
            Price::from_units(1500),
            "Test Location",
        ))
        .await?;

    let cache_after = state.query.cache_info().await?;
    Ok(Json(TestSignalsResponse::new(&property, cache_before, cache_after)))
}

pub async fn test_signals_usage() -> Response {
    post_only(
        "Send a POST request to create a test property and see hook-based cache invalidation in action",
    )
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::repository::tests::memory_repository;

    async fn test_state() -> AppState {
        AppState::with_memory_cache(memory_repository().await, &Config::default())
    }

    #[tokio::test]
    async fn test_cache_test_round_trip() {
        let state = test_state().await;
        let response = cache_test(State(state)).await.unwrap();

        assert!(response.cache_working);
        assert_eq!(response.cache_backend, "memory");
    }

    #[tokio::test]
    async fn test_test_signals_clears_warm_cache() {
        let state = test_state().await;
        state.query.warm_cache().await.unwrap();

        let response = test_signals(State(state.clone())).await.unwrap();

        assert!(response.cache_before.all_properties_cached);
        assert!(!response.cache_after.all_properties_cached);
        assert!(!response.cache_after.property_count_cached);
        assert!(response.property.title.starts_with("Test Property "));
        assert_eq!(response.property.price, "1500.00");
        assert_eq!(state.repository.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_cache_clear_reports_both_keys() {
        let state = test_state().await;
        state.query.warm_cache().await.unwrap();

        let response = cache_clear(State(state.clone())).await;

        assert!(response.success);
        assert_eq!(response.details.total_cleared, 2);
        assert!(!state.query.cache_info().await.unwrap().all_properties_cached);
    }

    #[tokio::test]
    async fn test_load_test_rejects_zero_iterations() {
        let state = test_state().await;
        let result = cache_load_test(
            State(state),
            Query(LoadTestParams { iterations: Some(0) }),
        )
        .await;

        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_usage_is_method_not_allowed() {
        let response = cache_clear_usage().await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
