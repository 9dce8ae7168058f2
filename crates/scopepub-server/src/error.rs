//! Error handling for the API server

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use scopepub_registry::{PublishError, RegistryError, RejectReason, Rejection};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::error;

/// Reason tag for request bodies that could not be read at all
const INVALID_BODY: &str = "invalid_body";

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found")]
    NotFound,

    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<PublishError> for ApiError {
    fn from(err: PublishError) -> Self {
        match err {
            PublishError::Rejected(rejection) => Self::Rejected(rejection),
            PublishError::Internal(e) => Self::Registry(e),
        }
    }
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, reason) = match &self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, self.to_string(), Value::Null),
            ApiError::Rejected(rejection) => {
                let status = match rejection.reason() {
                    RejectReason::VersionConflict => StatusCode::CONFLICT,
                    // Auth failures are reported like validation failures
                    _ => StatusCode::BAD_REQUEST,
                };
                (status, self.to_string(), json!(rejection.reason()))
            }
            ApiError::BadRequest(_) => (
                StatusCode::BAD_REQUEST,
                self.to_string(),
                json!(INVALID_BODY),
            ),
            ApiError::Registry(e) => {
                error!("Registry failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Value::Null,
                )
            }
            ApiError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Configuration error".to_string(),
                Value::Null,
            ),
            ApiError::Io(e) => {
                error!("IO failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Value::Null,
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
            "reason": reason,
        }));

        (status, body).into_response()
    }
}
