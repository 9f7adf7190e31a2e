//! Error types for the property service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == App Error Enum ==
/// Unified error type for the property service.
#[derive(Error, Debug)]
pub enum AppError {
    /// The relational store failed or is unreachable
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The cache store failed or is unreachable
    #[error("Cache error: {0}")]
    Cache(String),

    /// A cached or outgoing payload could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A value is larger than the cache accepts; callers serve it uncached
    #[error("Value of {size} bytes exceeds the cache limit of {limit} bytes")]
    ValueTooLarge { size: usize, limit: usize },

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::Cache(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Database(_) | AppError::Cache(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Serialization(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ValueTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the property service.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_error_maps_to_service_unavailable() {
        let response = AppError::Cache("connection refused".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_database_error_maps_to_service_unavailable() {
        let response = AppError::from(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_invalid_request_maps_to_bad_request() {
        let response = AppError::InvalidRequest("bad price".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_value_too_large_message() {
        let err = AppError::ValueTooLarge { size: 10, limit: 8 };
        assert_eq!(err.to_string(), "Value of 10 bytes exceeds the cache limit of 8 bytes");
        assert_eq!(err.into_response().status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_not_found_message() {
        let err = AppError::NotFound("property 7".to_string());
        assert_eq!(err.to_string(), "Not found: property 7");
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
