//! Application error handling
//!
//! This module provides unified error handling for the API, converting
//! internal errors to the `{"success": false, "error": ...}` envelope the
//! dashboard expects. Internal and database failures are logged and
//! surfaced with opaque messages.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type that can be converted to HTTP responses
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or missing input (400)
    #[error("{0}")]
    Validation(String),

    /// Bad credentials or an invalid/expired/missing token (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Unknown resource (404)
    #[error("{0}")]
    NotFound(String),

    /// Duplicate email or username (409)
    #[error("{0}")]
    Conflict(String),

    /// Upstream notification transport failure (500); the message is
    /// returned to the caller so the delivery prefix survives
    #[error("{0}")]
    Delivery(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::Delivery(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            ApiError::Internal(err) => {
                error!("Internal error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::Database(err) => {
                error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": message,
        }));

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
