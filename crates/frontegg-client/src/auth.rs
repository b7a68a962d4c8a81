//! Vendor token acquisition and caching.
//!
//! Frontegg management API calls authenticate with a vendor token obtained
//! through a client-credentials exchange. The token is cached in a single
//! process-wide slot and reused until shortly before expiry.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{FronteggError, FronteggResult};

/// Safety margin subtracted from the vendor-reported expiry so a token is
/// never used past server-side expiry mid-flight.
const EXPIRY_BUFFER_SECS: i64 = 60;

/// Vendor credentials for the client-credentials exchange.
#[derive(Clone)]
pub struct VendorCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
}

impl std::fmt::Debug for VendorCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VendorCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Request body for `POST /auth/vendor/`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VendorTokenRequest<'a> {
    client_id: &'a str,
    secret: &'a str,
}

/// Response from the vendor token endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VendorTokenResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    expires_in: i64,
}

/// Cached vendor token with its effective expiry.
#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// Returns true if the token is expired or will expire within the buffer.
    fn is_expired(&self, buffer: Duration) -> bool {
        Utc::now() + buffer >= self.expires_at
    }
}

/// Single-slot cache for the vendor bearer token.
///
/// Concurrent requests may race on refresh; the worst case is a redundant
/// token fetch. The slot itself is updated under a write lock, so a reader
/// never observes a half-written credential. Token fetch failures are
/// terminal for the calling request and are never retried here.
#[derive(Debug)]
pub struct TokenCache {
    credentials: VendorCredentials,
    token_url: String,
    http_client: reqwest::Client,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    buffer: Duration,
}

impl TokenCache {
    /// Creates a token cache against `{api_base_url}/auth/vendor/`.
    pub fn new(
        credentials: VendorCredentials,
        api_base_url: &str,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            credentials,
            token_url: format!("{}/auth/vendor/", api_base_url.trim_end_matches('/')),
            http_client,
            cached_token: Arc::new(RwLock::new(None)),
            buffer: Duration::seconds(EXPIRY_BUFFER_SECS),
        }
    }

    /// Gets a valid vendor token, exchanging credentials if necessary.
    pub async fn get_token(&self) -> FronteggResult<String> {
        {
            let cache = self.cached_token.read().await;
            if let Some(ref token) = *cache {
                if !token.is_expired(self.buffer) {
                    debug!("Using cached vendor token");
                    return Ok(token.token.clone());
                }
            }
        }

        debug!("Exchanging client credentials for a new vendor token");
        let new_token = self.exchange_credentials().await?;

        {
            let mut cache = self.cached_token.write().await;
            *cache = Some(new_token.clone());
        }

        Ok(new_token.token)
    }

    /// Invalidates the cached token, forcing a fresh exchange on next use.
    pub async fn invalidate(&self) {
        let mut cache = self.cached_token.write().await;
        *cache = None;
    }

    async fn exchange_credentials(&self) -> FronteggResult<CachedToken> {
        let body = VendorTokenRequest {
            client_id: &self.credentials.client_id,
            secret: self.credentials.client_secret.expose_secret(),
        };

        let response = self
            .http_client
            .post(&self.token_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| FronteggError::Auth(format!("Token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FronteggError::Auth(format!(
                "Token request failed with status {status}: {body}"
            )));
        }

        let token_response: VendorTokenResponse = response
            .json()
            .await
            .map_err(|e| FronteggError::Auth(format!("Failed to parse token response: {e}")))?;

        let Some(token) = token_response.token else {
            return Err(FronteggError::Auth(
                "Token response did not contain a token".to_string(),
            ));
        };

        let expires_at = Utc::now() + Duration::seconds(token_response.expires_in);

        debug!(
            expires_at = %expires_at.format("%Y-%m-%d %H:%M:%S UTC"),
            "Vendor token acquired"
        );

        Ok(CachedToken { token, expires_at })
    }
}
