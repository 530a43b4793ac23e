//! HTTP error handling and conversion.
//!
//! Maps the domain error taxonomy onto HTTP statuses: period and payload
//! problems are the caller's (4xx), upstream lookups are a bad gateway,
//! storage trouble is service-unavailable, and broken internal invariants
//! are a plain 500 that is also logged loudly.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use field_analytics_domain::AnalyticsError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Result alias for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// API-level error type.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Domain failure propagated from an engine.
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    /// Request could not be parsed.
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Analytics(err) => match err {
                AnalyticsError::InvalidPeriod { .. }
                | AnalyticsError::MalformedEvent(_)
                | AnalyticsError::UnknownEventType(_) => StatusCode::BAD_REQUEST,
                AnalyticsError::NoData { .. } => StatusCode::NOT_FOUND,
                AnalyticsError::Enrichment { .. } => StatusCode::BAD_GATEWAY,
                AnalyticsError::Persistence { .. } => StatusCode::SERVICE_UNAVAILABLE,
                AnalyticsError::DataConsistency(_) | AnalyticsError::Artifact(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Stable error code for the response body.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Analytics(err) => err.error_code(),
            Self::BadRequest(_) => "BAD_REQUEST",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(code = self.error_code(), error = %self, "request failed");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: self.error_code(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}
