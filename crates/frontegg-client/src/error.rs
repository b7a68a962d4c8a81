//! Error types for the Frontegg management API client.

use thiserror::Error;

/// Result type alias using `FronteggError`.
pub type FronteggResult<T> = Result<T, FronteggError>;

/// Errors that can occur when interacting with the Frontegg API.
#[derive(Debug, Error)]
pub enum FronteggError {
    /// Configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Vendor token exchange failed or was rejected.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Frontegg API returned a non-success status.
    #[error("Frontegg API error: {status} - {detail}")]
    Api { status: u16, detail: String },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Maximum retry attempts exceeded.
    #[error("{message}")]
    MaxRetriesExceeded { attempts: u32, message: String },
}

impl FronteggError {
    /// Whether the error is transient and worth retrying (network failures,
    /// timeouts, rate limiting).
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Whether the error is a server-side (5xx) API error.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status >= 500)
    }
}
