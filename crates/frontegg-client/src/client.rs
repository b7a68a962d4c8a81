//! Typed client for the Frontegg management API.
//!
//! One parameterized request layer (bearer injection, JSON decoding, error
//! shaping) with thin typed operations on top. Discovery reads return
//! `FronteggResult` and are retried per the configured policy; mutating
//! calls never error — they capture the HTTP status into a per-item result
//! so one failed assignment cannot abort its siblings.

use reqwest::StatusCode;
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::auth::{TokenCache, VendorCredentials};
use crate::error::{FronteggError, FronteggResult};
use crate::retry::RetryPolicy;

const TENANT_ID_HEADER: &str = "frontegg-tenant-id";
const USER_ID_HEADER: &str = "frontegg-user-id";

/// Configuration for constructing a [`FronteggClient`].
#[derive(Clone)]
pub struct FronteggConfig {
    /// Base URL of the Frontegg API (e.g., "<https://api.frontegg.com>").
    pub api_base_url: String,
    /// Vendor client id.
    pub client_id: String,
    /// Vendor client secret.
    pub client_secret: SecretString,
    /// Per-request timeout applied to every vendor call.
    pub request_timeout: Duration,
    /// Retry policy for idempotent discovery reads.
    pub retry: RetryPolicy,
}

impl std::fmt::Debug for FronteggConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FronteggConfig")
            .field("api_base_url", &self.api_base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("request_timeout", &self.request_timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

/// One tenant's application assignments, as reported by the vendor.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantAppAssignments {
    pub tenant_id: String,
    #[serde(default)]
    pub app_ids: Vec<String>,
}

/// A sub-tenant record from the tenant hierarchy.
#[derive(Debug, Clone, Deserialize)]
pub struct SubTenant {
    #[serde(alias = "tenantId")]
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserTenant {
    tenant_id: String,
}

/// Outcome of assigning a user to one application.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppAssignment {
    pub app_id: String,
    pub succeeded: bool,
    /// HTTP status of the assignment call; 0 when no response was received.
    pub status_code: u16,
}

/// Outcome of assigning a user to one sub-tenant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubTenantAssignment {
    pub sub_tenant_id: String,
    pub succeeded: bool,
    /// True when the user already held the sub-tenant and no call was made.
    pub skipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

/// Outcome of the best-effort disable call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisableOutcome {
    pub succeeded: bool,
    pub status_code: u16,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AssignAppRequest<'a> {
    app_id: &'a str,
    tenant_id: &'a str,
    user_ids: [&'a str; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AssignTenantRequest<'a> {
    tenant_id: &'a str,
    skip_invite_email: bool,
    validate_tenant_exist: bool,
}

/// Frontegg management API client.
#[derive(Debug, Clone)]
pub struct FronteggClient {
    base_url: String,
    http_client: reqwest::Client,
    token_cache: Arc<TokenCache>,
    retry: RetryPolicy,
}

impl FronteggClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: FronteggConfig) -> FronteggResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| FronteggError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::with_http_client(config, http_client))
    }

    /// Create a client with a pre-built `reqwest::Client` (for testing).
    #[must_use]
    pub fn with_http_client(config: FronteggConfig, http_client: reqwest::Client) -> Self {
        let base_url = config.api_base_url.trim_end_matches('/').to_string();
        let credentials = VendorCredentials {
            client_id: config.client_id,
            client_secret: config.client_secret,
        };
        let token_cache = Arc::new(TokenCache::new(
            credentials,
            &base_url,
            http_client.clone(),
        ));

        Self {
            base_url,
            http_client,
            token_cache,
            retry: config.retry,
        }
    }

    /// The shared vendor token cache.
    #[must_use]
    pub fn token_cache(&self) -> &Arc<TokenCache> {
        &self.token_cache
    }

    /// Acquire a vendor token, exchanging credentials if the cache is cold.
    pub async fn get_token(&self) -> FronteggResult<String> {
        self.token_cache.get_token().await
    }

    // ── Discovery reads ───────────────────────────────────────────────

    /// List the application ids assigned to a tenant.
    ///
    /// The vendor returns assignments for multiple tenants; only the entry
    /// matching `tenant_id` is selected. A tenant absent from the response
    /// has no assigned apps and yields an empty list.
    pub async fn list_assigned_apps(&self, tenant_id: &str) -> FronteggResult<Vec<String>> {
        let url = format!(
            "{}/applications/resources/applications/tenant-assignments/v1",
            self.base_url
        );
        let assignments: Vec<TenantAppAssignments> = self
            .retry
            .execute("list_assigned_apps", || {
                self.get_json(&url, TENANT_ID_HEADER, tenant_id)
            })
            .await?;

        let app_ids = assignments
            .into_iter()
            .find(|a| a.tenant_id == tenant_id)
            .map(|a| a.app_ids)
            .unwrap_or_default();

        debug!(tenant_id, apps = app_ids.len(), "Listed tenant app assignments");
        Ok(app_ids)
    }

    /// List the sub-tenants beneath a tenant in the hierarchy.
    pub async fn list_sub_tenants(&self, tenant_id: &str) -> FronteggResult<Vec<SubTenant>> {
        let url = format!("{}/tenants/resources/hierarchy/v1", self.base_url);
        self.retry
            .execute("list_sub_tenants", || {
                self.get_json(&url, TENANT_ID_HEADER, tenant_id)
            })
            .await
    }

    /// List the tenant ids the user currently belongs to.
    pub async fn list_user_tenants(&self, user_id: &str) -> FronteggResult<Vec<String>> {
        let url = format!("{}/identity/resources/users/v2/me/tenants", self.base_url);
        let tenants: Vec<UserTenant> = self
            .retry
            .execute("list_user_tenants", || {
                self.get_json(&url, USER_ID_HEADER, user_id)
            })
            .await?;
        Ok(tenants.into_iter().map(|t| t.tenant_id).collect())
    }

    // ── Mutating calls ────────────────────────────────────────────────

    /// Assign a user to one application. Never errors; the HTTP status is
    /// captured into the result.
    pub async fn assign_user_to_app(
        &self,
        app_id: &str,
        tenant_id: &str,
        user_id: &str,
    ) -> AppAssignment {
        let url = format!("{}/identity/resources/applications/v1", self.base_url);
        let body = AssignAppRequest {
            app_id,
            tenant_id,
            user_ids: [user_id],
        };

        let status = self.post_for_status(&url, Some(&body), None).await;
        let succeeded = status.is_some_and(|s| s.is_success());
        if !succeeded {
            warn!(app_id, user_id, status = ?status, "App assignment failed");
        }

        AppAssignment {
            app_id: app_id.to_string(),
            succeeded,
            status_code: status.map_or(0, |s| s.as_u16()),
        }
    }

    /// Assign a user to one sub-tenant, skipping the vendor call when the
    /// user already holds it.
    ///
    /// The vendor's invite endpoint is not safely idempotent (re-inviting
    /// can trigger duplicate emails), so membership is checked against the
    /// caller-provided tenant set before any network call.
    pub async fn assign_user_to_sub_tenant(
        &self,
        user_id: &str,
        sub_tenant_id: &str,
        existing_tenants: &HashSet<String>,
    ) -> SubTenantAssignment {
        if existing_tenants.contains(sub_tenant_id) {
            debug!(user_id, sub_tenant_id, "User already in sub-tenant, skipping");
            return SubTenantAssignment {
                sub_tenant_id: sub_tenant_id.to_string(),
                succeeded: true,
                skipped: true,
                status_code: None,
            };
        }

        let url = format!(
            "{}/identity/resources/users/v1/{}/tenant",
            self.base_url, user_id
        );
        let body = AssignTenantRequest {
            tenant_id: sub_tenant_id,
            skip_invite_email: true,
            validate_tenant_exist: true,
        };

        let status = self.post_for_status(&url, Some(&body), None).await;
        let succeeded = status.is_some_and(|s| s.is_success());
        if !succeeded {
            warn!(user_id, sub_tenant_id, status = ?status, "Sub-tenant assignment failed");
        }

        SubTenantAssignment {
            sub_tenant_id: sub_tenant_id.to_string(),
            succeeded,
            skipped: false,
            status_code: Some(status.map_or(0, |s| s.as_u16())),
        }
    }

    /// Disable a user within a tenant. Best-effort; never errors.
    pub async fn disable_user(&self, user_id: &str, tenant_id: &str) -> DisableOutcome {
        let url = format!(
            "{}/identity/resources/tenants/users/v1/{}/disable",
            self.base_url, user_id
        );

        let status = self
            .post_for_status(&url, None::<&()>, Some((TENANT_ID_HEADER, tenant_id)))
            .await;
        let succeeded = status.is_some_and(|s| s.is_success());
        if !succeeded {
            warn!(user_id, tenant_id, status = ?status, "User disable failed");
        }

        DisableOutcome {
            succeeded,
            status_code: status.map_or(0, |s| s.as_u16()),
        }
    }

    // ── Internal request layer ────────────────────────────────────────

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        header_name: &str,
        header_value: &str,
    ) -> FronteggResult<T> {
        let token = self.token_cache.get_token().await?;

        debug!(%url, "Frontegg GET");
        let response = self
            .http_client
            .get(url)
            .bearer_auth(&token)
            .header(header_name, header_value)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// POST a mutating call and return its HTTP status, or `None` when no
    /// response was received at all.
    async fn post_for_status<B: Serialize>(
        &self,
        url: &str,
        body: Option<&B>,
        header: Option<(&str, &str)>,
    ) -> Option<StatusCode> {
        let token = match self.token_cache.get_token().await {
            Ok(t) => t,
            Err(e) => {
                warn!(%url, error = %e, "Token unavailable for vendor call");
                return None;
            }
        };

        debug!(%url, "Frontegg POST");
        let mut request = self.http_client.post(url).bearer_auth(&token);
        if let Some(b) = body {
            request = request.json(b);
        }
        if let Some((name, value)) = header {
            request = request.header(name, value);
        }

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                if status == StatusCode::UNAUTHORIZED {
                    self.token_cache.invalidate().await;
                }
                Some(status)
            }
            Err(e) => {
                warn!(%url, error = %e, "Vendor call failed without a response");
                None
            }
        }
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> FronteggResult<T> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        let body = response.text().await.unwrap_or_default();

        match status {
            StatusCode::UNAUTHORIZED => {
                // A stale vendor token; drop it so the next call re-exchanges.
                self.token_cache.invalidate().await;
                Err(FronteggError::Auth(format!(
                    "Vendor rejected the token (401): {body}"
                )))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("Frontegg rate limited, retry after {:?}s", retry_after);
                Err(FronteggError::RateLimited {
                    retry_after_secs: retry_after,
                })
            }
            _ => {
                let detail = if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    body
                };
                Err(FronteggError::Api {
                    status: status.as_u16(),
                    detail,
                })
            }
        }
    }
}
