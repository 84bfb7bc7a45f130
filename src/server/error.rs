//! Error types for the HTTP surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors returned to API clients as `{"error": <message>}`
#[derive(Debug, Error)]
pub enum ApiError {
    /// No identifier in the path and none pinned at startup
    #[error("Resource ID is required")]
    MissingIdentifier,

    /// Identifier cannot name an instance or disk
    #[error("Invalid resource ID '{0}'")]
    InvalidIdentifier(String),

    /// `type` query parameter is not a known resource kind
    #[error("Unknown resource type '{0}', expected 'instance' or 'disk'")]
    InvalidType(String),

    /// No zone had an instance or disk with the requested name
    #[error("Resource not found")]
    NotFound,

    /// Zone enumeration failed; carries an already-sanitized message
    #[error("Unable to fetch zones: {0}")]
    Upstream(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingIdentifier
            | ApiError::InvalidIdentifier(_)
            | ApiError::InvalidType(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        tracing::error!("Upstream failure: {:#}", error);
        ApiError::Upstream(crate::gcp::client::format_gcp_error(&error))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
