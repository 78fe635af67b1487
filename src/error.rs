//! Error types for the gateway
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Gateway Error Enum ==
/// Unified error type for the gateway.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Admission bucket is empty
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Token refresh exchange was rejected or failed
    #[error("Spotify authentication failed: {0}")]
    Authentication(String),

    /// Network or API-level failure on a catalog call
    #[error("{0}")]
    Upstream(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Tool name not recognized by the dispatcher
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Startup configuration is missing or malformed
    #[error("Configuration error: {0}")]
    Configuration(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::InvalidRequest(_) | GatewayError::UnknownTool(_) => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::Authentication(_) | GatewayError::Upstream(_) => StatusCode::OK,
            GatewayError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "status": "error",
            "message": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the gateway.
pub type Result<T> = std::result::Result<T, GatewayError>;
