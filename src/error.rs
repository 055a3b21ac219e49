use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::provider::ProviderError;

/// Unified error type for API responses. Validation and empty-data cases are
/// redirects, not errors; this covers the failures that surface as 5xx.
#[derive(Debug)]
pub enum AppError {
    Provider(String),
    Internal(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Provider(msg) => write!(f, "provider_error: {msg}"),
            Self::Internal(msg) => write!(f, "internal_error: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_str) = match &self {
            Self::Provider(msg) => (StatusCode::BAD_GATEWAY, format!("provider_error: {msg}")),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        tracing::error!("request failed: {self}");

        let body = json!({ "error": error_str });
        (status, axum::Json(body)).into_response()
    }
}

impl From<ProviderError> for AppError {
    fn from(e: ProviderError) -> Self {
        Self::Provider(e.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(e: csv::Error) -> Self {
        Self::Internal(e.to_string())
    }
}
