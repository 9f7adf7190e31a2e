//! Response cache middleware.
//!
//! Caches whole GET responses in the cache store and replays them without
//! calling the wrapped handler. HTML and JSON renderings of the same URL are
//! stored under different keys.

use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, HeaderValue, Method, Request, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

use super::negotiation::OutputFormat;
use crate::cache::{CacheExt, CacheHandle, MAX_VALUE_SIZE};
use crate::error::{AppError, Result};

pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Builds the cache key for a negotiated format and request URI.
pub type KeyFn = fn(OutputFormat, &Uri) -> String;

/// `views.cache_page.<format>.<sha256(path?query)>`
pub fn page_cache_key(format: OutputFormat, uri: &Uri) -> String {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    format!(
        "views.cache_page.{}.{}",
        format.as_str(),
        hex::encode(Sha256::digest(target.as_bytes()))
    )
}

#[derive(Clone)]
pub struct ResponseCacheSettings {
    pub cache: CacheHandle,
    pub ttl: Duration,
    pub fail_open: bool,
    pub key_fn: KeyFn,
}

impl ResponseCacheSettings {
    pub fn new(cache: CacheHandle, ttl: Duration, fail_open: bool) -> Self {
        Self {
            cache,
            ttl,
            fail_open,
            key_fn: page_cache_key,
        }
    }

    pub fn with_key_fn(mut self, key_fn: KeyFn) -> Self {
        self.key_fn = key_fn;
        self
    }
}

/// A stored response: status, headers and a UTF-8 body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CachedResponse {
    fn into_response(self) -> Response {
        let mut builder = Response::builder().status(self.status);
        for (name, value) in self.headers {
            if let Ok(value) = HeaderValue::from_str(&value) {
                builder = builder.header(name, value);
            }
        }
        builder
            .body(Body::from(self.body))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
    }
}

#[instrument(skip_all, fields(path = %request.uri().path()))]
pub async fn response_cache_layer(
    State(settings): State<ResponseCacheSettings>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() != Method::GET {
        return next.run(request).await;
    }

    let format = OutputFormat::negotiate(request.uri(), request.headers());
    let key = (settings.key_fn)(format, request.uri());

    match settings.cache.get_json::<CachedResponse>(&key).await {
        Ok(Some(cached)) => {
            info!(key = %key, "Page cache HIT");
            return mark(cached.into_response(), "HIT");
        }
        Ok(None) => debug!(key = %key, "Page cache MISS"),
        Err(AppError::Serialization(e)) => {
            warn!(key = %key, error = %e, "Discarding unreadable page cache entry");
        }
        Err(e) => {
            if let Err(e) = bypass(&settings, &key, e) {
                return mark(e.into_response(), "MISS");
            }
        }
    }

    let response = next.run(request).await;
    if response.status() != StatusCode::OK {
        return mark(response, "MISS");
    }

    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(key = %key, error = %e, "Failed to read response body");
            return mark(StatusCode::INTERNAL_SERVER_ERROR.into_response(), "MISS");
        }
    };

    if bytes.len() > MAX_VALUE_SIZE {
        warn!(
            key = %key,
            size = bytes.len(),
            limit = MAX_VALUE_SIZE,
            "Page too large to cache, serving uncached"
        );
        return mark(Response::from_parts(parts, Body::from(bytes)), "MISS");
    }

    // Binary bodies are served but never stored.
    if let Ok(text) = std::str::from_utf8(&bytes) {
        let cached = CachedResponse {
            status: parts.status.as_u16(),
            headers: parts
                .headers
                .iter()
                .filter(|(name, _)| name.as_str() != X_CACHE.as_str())
                .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
                .collect(),
            body: text.to_string(),
        };

        if let Err(e) = store(&settings, &key, &cached).await {
            return mark(e.into_response(), "MISS");
        }
        debug!(key = %key, ttl_secs = settings.ttl.as_secs(), "Cached page");
    }

    mark(Response::from_parts(parts, Body::from(bytes)), "MISS")
}

async fn store(settings: &ResponseCacheSettings, key: &str, cached: &CachedResponse) -> Result<()> {
    match settings.cache.set_json(key, cached, settings.ttl).await {
        Ok(()) => Ok(()),
        Err(AppError::ValueTooLarge { size, limit }) => {
            warn!(key, size, limit, "Page too large to cache, serving uncached");
            Ok(())
        }
        Err(e @ AppError::Cache(_)) => bypass(settings, key, e),
        Err(e) => Err(e),
    }
}

fn bypass(settings: &ResponseCacheSettings, key: &str, err: AppError) -> Result<()> {
    if settings.fail_open {
        warn!(key, error = %err, "Page cache unavailable, rendering uncached");
        Ok(())
    } else {
        Err(err)
    }
}

fn mark(mut response: Response, outcome: &'static str) -> Response {
    response
        .headers_mut()
        .insert(X_CACHE, HeaderValue::from_static(outcome));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::testing::UnreachableCache;
    use crate::cache::MemoryCache;
    use axum::{middleware, routing::get, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn counting_app(settings: ResponseCacheSettings, calls: Arc<AtomicUsize>) -> Router {
        Router::new()
            .route(
                "/page",
                get(move || {
                    let calls = calls.clone();
                    async move {
                        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                        format!("render {}", n)
                    }
                })
                .post(|| async { "posted" }),
            )
            .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
            .layer(middleware::from_fn_with_state(settings, response_cache_layer))
    }

    async fn send(app: &Router, method: Method, uri: &str) -> (StatusCode, Option<String>, String) {
        let response = app
            .clone()
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let x_cache = response
            .headers()
            .get(X_CACHE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, x_cache, String::from_utf8(body.to_vec()).unwrap())
    }

    fn settings(cache: CacheHandle) -> ResponseCacheSettings {
        ResponseCacheSettings::new(cache, Duration::from_secs(900), false)
    }

    #[test]
    fn test_key_includes_format_and_hashes_target() {
        let uri: Uri = "/properties/?page=2".parse().unwrap();
        let html = page_cache_key(OutputFormat::Html, &uri);
        let json = page_cache_key(OutputFormat::Json, &uri);

        assert!(html.starts_with("views.cache_page.html."));
        assert!(json.starts_with("views.cache_page.json."));
        assert_eq!(html.len(), "views.cache_page.html.".len() + 64);

        let other: Uri = "/properties/?page=3".parse().unwrap();
        assert_ne!(html, page_cache_key(OutputFormat::Html, &other));
    }

    #[tokio::test]
    async fn test_second_get_is_served_from_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = counting_app(settings(Arc::new(MemoryCache::new(100))), calls.clone());

        let first = send(&app, Method::GET, "/page").await;
        let second = send(&app, Method::GET, "/page").await;

        assert_eq!(first.1.as_deref(), Some("MISS"));
        assert_eq!(second.1.as_deref(), Some("HIT"));
        assert_eq!(second.2, "render 1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_formats_are_cached_separately() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = counting_app(settings(Arc::new(MemoryCache::new(100))), calls.clone());

        send(&app, Method::GET, "/page").await;
        let json = send(&app, Method::GET, "/page?format=json").await;

        assert_eq!(json.1.as_deref(), Some("MISS"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_get_passes_through() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = counting_app(settings(Arc::new(MemoryCache::new(100))), calls);

        let (status, x_cache, body) = send(&app, Method::POST, "/page").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(x_cache, None);
        assert_eq!(body, "posted");
    }

    #[tokio::test]
    async fn test_non_ok_responses_are_not_stored() {
        let cache: CacheHandle = Arc::new(MemoryCache::new(100));
        let app = counting_app(settings(cache.clone()), Arc::new(AtomicUsize::new(0)));

        send(&app, Method::GET, "/missing").await;
        let (status, x_cache, _) = send(&app, Method::GET, "/missing").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(x_cache.as_deref(), Some("MISS"));
    }

    #[tokio::test]
    async fn test_unreachable_cache_fails_loud() {
        let app = counting_app(settings(Arc::new(UnreachableCache)), Arc::new(AtomicUsize::new(0)));

        let (status, _, _) = send(&app, Method::GET, "/page").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_unreachable_cache_fail_open_renders() {
        let calls = Arc::new(AtomicUsize::new(0));
        let settings = ResponseCacheSettings::new(Arc::new(UnreachableCache), Duration::from_secs(900), true);
        let app = counting_app(settings, calls.clone());

        let (status, x_cache, body) = send(&app, Method::GET, "/page").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(x_cache.as_deref(), Some("MISS"));
        assert_eq!(body, "render 1");
    }

    fn sized_app(cache: CacheHandle, size: usize, calls: Arc<AtomicUsize>) -> Router {
        Router::new()
            .route(
                "/large",
                get(move || {
                    let calls = calls.clone();
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        "x".repeat(size)
                    }
                }),
            )
            .layer(middleware::from_fn_with_state(settings(cache), response_cache_layer))
    }

    #[tokio::test]
    async fn test_page_over_cache_limit_is_served_uncached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = sized_app(Arc::new(MemoryCache::new(100)), MAX_VALUE_SIZE + 1, calls.clone());

        for _ in 0..2 {
            let (status, x_cache, body) = send(&app, Method::GET, "/large").await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(x_cache.as_deref(), Some("MISS"));
            assert_eq!(body.len(), MAX_VALUE_SIZE + 1);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stored_entry_over_cache_limit_is_skipped() {
        // The body fits, but the stored entry with its headers does not.
        let cache: CacheHandle = Arc::new(MemoryCache::new(100));
        let calls = Arc::new(AtomicUsize::new(0));
        let app = sized_app(cache.clone(), MAX_VALUE_SIZE - 8, calls.clone());

        let (status, x_cache, body) = send(&app, Method::GET, "/large").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(x_cache.as_deref(), Some("MISS"));
        assert_eq!(body.len(), MAX_VALUE_SIZE - 8);

        let key = page_cache_key(OutputFormat::Html, &Uri::from_static("/large"));
        assert!(cache.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_custom_key_fn() {
        fn single_key(_: OutputFormat, _: &Uri) -> String {
            "one_page".to_string()
        }
        let cache: CacheHandle = Arc::new(MemoryCache::new(100));
        let app = counting_app(
            settings(cache.clone()).with_key_fn(single_key),
            Arc::new(AtomicUsize::new(0)),
        );

        send(&app, Method::GET, "/page").await;
        assert!(cache.get("one_page").await.unwrap().is_some());
    }
}
