//! HTTP error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

use atelier_core::error::{AppError, ErrorKind};

/// JSON body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    /// Stable code clients can match on.
    pub error: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional structured details (e.g. per-field validation errors).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// An [`AppError`] carried across the HTTP boundary.
///
/// `IntoResponse` lives on this wrapper rather than on `AppError` itself,
/// keeping the core crate free of HTTP concerns.
#[derive(Debug)]
pub struct ApiError {
    inner: AppError,
    details: Option<serde_json::Value>,
}

impl ApiError {
    /// Wrap an application error with no extra details.
    pub fn new(inner: AppError) -> Self {
        Self {
            inner,
            details: None,
        }
    }

    /// The underlying error kind.
    pub fn kind(&self) -> ErrorKind {
        self.inner.kind
    }

    fn status(&self) -> StatusCode {
        match self.inner.kind {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Session => StatusCode::BAD_REQUEST,
            ErrorKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Internal
            | ErrorKind::Database
            | ErrorKind::Configuration
            | ErrorKind::Serialization => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AppError> for ApiError {
    fn from(inner: AppError) -> Self {
        Self::new(inner)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(&errors).ok();
        Self {
            inner: AppError::validation("Request validation failed"),
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(
                kind = %self.inner.kind,
                message = %self.inner.message,
                "Request failed"
            );
        }
        let body = ApiErrorResponse {
            error: self.inner.kind.to_string(),
            message: self.inner.message,
            details: self.details,
        };
        (status, Json(body)).into_response()
    }
}
