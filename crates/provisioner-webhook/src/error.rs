//! Error types for the webhook intake layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Result type alias using `WebhookError`.
pub type WebhookResult<T> = Result<T, WebhookError>;

/// Errors that can terminate webhook handling.
///
/// Individual vendor-call failures are not represented here — they are
/// captured as per-item result entries and never abort the request.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Signature missing or invalid. Carries no detail by design.
    #[error("Invalid webhook signature")]
    Unauthorized,

    /// Request payload failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The event kind is not handled by this endpoint.
    #[error("Unsupported event: {0}")]
    UnsupportedEvent(String),

    /// Vendor token acquisition failed; no provisioning was performed.
    #[error("Vendor authentication failed: {0}")]
    VendorAuth(String),

    /// Anything uncaught. Logged server-side, opaque to the caller.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response format for webhook rejections.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            WebhookError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Invalid webhook signature".to_string(),
            ),
            WebhookError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg.clone())
            }
            WebhookError::UnsupportedEvent(key) => (
                StatusCode::BAD_REQUEST,
                "unsupported_event",
                format!("Unsupported event: {key}"),
            ),
            WebhookError::VendorAuth(msg) => {
                tracing::error!("Vendor authentication failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "vendor_auth_failed",
                    "Unable to authenticate with the vendor".to_string(),
                )
            }
            WebhookError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            error: error_code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}
