//! Application configuration loaded from environment variables.
//!
//! Required variables must be present and valid, or the application exits
//! with a clear error message before binding the listener.

use secrecy::SecretString;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors that can occur during environment loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// How inbound webhook signatures are verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureMode {
    /// `x-webhook-secret` must equal the configured secret.
    SharedSecret,
    /// `x-webhook-secret` carries an HS256 token signed with the secret.
    SignedToken,
}

impl SignatureMode {
    fn from_env_str(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "shared-secret" => Ok(Self::SharedSecret),
            "signed-token" => Ok(Self::SignedToken),
            other => Err(ConfigError::InvalidValue {
                var: "WEBHOOK_SIGNATURE_MODE".to_string(),
                message: format!(
                    "Unknown mode '{other}' (expected 'shared-secret' or 'signed-token')"
                ),
            }),
        }
    }
}

/// Application configuration.
#[derive(Clone)]
pub struct Config {
    /// Base URL of the Frontegg API.
    pub frontegg_api_base_url: String,

    /// Vendor client id for the client-credentials exchange.
    pub frontegg_client_id: String,

    /// Vendor client secret.
    pub frontegg_client_secret: SecretString,

    /// Shared secret for inbound webhook verification.
    pub webhook_secret: SecretString,

    /// Inbound signature verification mode.
    pub signature_mode: SignatureMode,

    /// Tracing filter directive (e.g., "info,provisioner=debug").
    pub rust_log: String,

    /// Server bind address.
    pub host: String,

    /// Server listen port.
    pub port: u16,

    /// Per-request timeout applied to every vendor call.
    pub request_timeout: Duration,

    /// Concurrency bound for assignment fan-out (minimum 1).
    pub assign_concurrency: usize,

    /// Disable the invited user once all assignments complete.
    pub disable_user_after_assign: bool,

    /// Maximum retries for idempotent vendor reads.
    pub vendor_max_retries: u32,

    /// Base backoff delay in seconds for vendor read retries.
    pub vendor_retry_base_delay_secs: u64,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("frontegg_api_base_url", &self.frontegg_api_base_url)
            .field("frontegg_client_id", &self.frontegg_client_id)
            .field("frontegg_client_secret", &"[redacted]")
            .field("webhook_secret", &"[redacted]")
            .field("signature_mode", &self.signature_mode)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value
    /// fails to parse.
    ///
    /// # Required Variables
    ///
    /// - `FRONTEGG_CLIENT_ID` - vendor client id
    /// - `FRONTEGG_CLIENT_SECRET` - vendor client secret
    /// - `WEBHOOK_SECRET` - inbound webhook secret
    ///
    /// # Optional Variables
    ///
    /// - `FRONTEGG_API_BASE_URL` (default: "https://api.frontegg.com")
    /// - `WEBHOOK_SIGNATURE_MODE` - "shared-secret" or "signed-token"
    ///   (default: "signed-token")
    /// - `RUST_LOG` (default: "info")
    /// - `HOST` (default: "0.0.0.0")
    /// - `PORT` (default: 9000)
    /// - `REQUEST_TIMEOUT_SECS` (default: 30)
    /// - `ASSIGN_CONCURRENCY` (default: 8, minimum 1)
    /// - `DISABLE_USER_AFTER_ASSIGN` (default: false)
    /// - `VENDOR_MAX_RETRIES` (default: 3)
    /// - `VENDOR_RETRY_BASE_DELAY_SECS` (default: 1)
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (development only)
        let _ = dotenvy::dotenv();

        let frontegg_client_id = env::var("FRONTEGG_CLIENT_ID")
            .map_err(|_| ConfigError::MissingVar("FRONTEGG_CLIENT_ID".to_string()))?;

        let frontegg_client_secret = env::var("FRONTEGG_CLIENT_SECRET")
            .map_err(|_| ConfigError::MissingVar("FRONTEGG_CLIENT_SECRET".to_string()))?;

        let webhook_secret = env::var("WEBHOOK_SECRET")
            .map_err(|_| ConfigError::MissingVar("WEBHOOK_SECRET".to_string()))?;

        let frontegg_api_base_url = env::var("FRONTEGG_API_BASE_URL")
            .unwrap_or_else(|_| "https://api.frontegg.com".to_string());

        if !frontegg_api_base_url.starts_with("http://")
            && !frontegg_api_base_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidValue {
                var: "FRONTEGG_API_BASE_URL".to_string(),
                message: "Must be an http:// or https:// URL".to_string(),
            });
        }

        let signature_mode = SignatureMode::from_env_str(
            &env::var("WEBHOOK_SIGNATURE_MODE").unwrap_or_else(|_| "signed-token".to_string()),
        )?;

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port: u16 = parse_var("PORT", 9000)?;
        if port == 0 {
            return Err(ConfigError::InvalidValue {
                var: "PORT".to_string(),
                message: "Port must be between 1 and 65535".to_string(),
            });
        }

        let request_timeout = Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", 30u64)?);
        let assign_concurrency = parse_var("ASSIGN_CONCURRENCY", 8usize)?.max(1);

        let disable_user_after_assign = env::var("DISABLE_USER_AFTER_ASSIGN")
            .map(|s| matches!(s.to_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false);

        let vendor_max_retries = parse_var("VENDOR_MAX_RETRIES", 3u32)?;
        let vendor_retry_base_delay_secs = parse_var("VENDOR_RETRY_BASE_DELAY_SECS", 1u64)?;

        Ok(Config {
            frontegg_api_base_url,
            frontegg_client_id,
            frontegg_client_secret: SecretString::new(frontegg_client_secret),
            webhook_secret: SecretString::new(webhook_secret),
            signature_mode,
            rust_log,
            host,
            port,
            request_timeout,
            assign_concurrency,
            disable_user_after_assign,
            vendor_max_retries,
            vendor_retry_base_delay_secs,
        })
    }

    /// Get the server bind address as a socket address string.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse an optional env var, falling back to a default, erroring on junk.
fn parse_var<T: std::str::FromStr>(var: &str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(s) => s.parse().map_err(|_| ConfigError::InvalidValue {
            var: var.to_string(),
            message: format!("Failed to parse '{s}'"),
        }),
        Err(_) => Ok(default),
    }
}
