//! Unified error handling for the HTTP layer.
//!
//! Handlers return [`ApiResult`] so cache failures can be propagated with `?`
//! and turned into a status code plus a JSON body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::api::ErrorResponse;
use thiserror::Error;

use crate::cache::CacheError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// Upstream feeds could not provide any data
    #[error("Upstream unavailable: {0}")]
    Upstream(String),
}

impl ApiError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        ApiError::NotFound(resource.into())
    }
}

impl From<CacheError> for ApiError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::UnknownCalendar(name) => ApiError::not_found(format!("Calendar '{}'", name)),
            CacheError::Fetch { .. } | CacheError::NoSourceAvailable(_) => {
                ApiError::Upstream(err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorResponse::new(self.to_string())),
            ApiError::Upstream(details) => {
                tracing::error!("Upstream error: {}", details);
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorResponse::new("Calendar is not available yet"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
