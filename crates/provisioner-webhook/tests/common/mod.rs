//! Common test utilities for webhook handler integration tests.

#![allow(dead_code)] // not every test binary uses every helper

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use frontegg_client::{FronteggClient, FronteggConfig, RetryPolicy};
use http_body_util::BodyExt;
use provisioner_webhook::{
    webhook_router, OrchestrationSettings, SignatureScheme, WebhookState, SIGNATURE_HEADER,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TENANT_A: &str = "t1";
pub const USER_1: &str = "u1";
pub const WEBHOOK_SECRET: &str = "test-webhook-secret";

/// A user-invited payload with the user id under `user.id`.
pub fn invited_payload(tenant_id: &str, user_id: &str) -> Value {
    json!({
        "eventKey": "frontegg.user.invitedToTenant",
        "eventContext": { "tenantId": tenant_id },
        "user": { "id": user_id }
    })
}

/// Mock vendor with the endpoints the orchestrator touches.
pub struct MockVendor {
    pub server: MockServer,
}

impl MockVendor {
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Builds the webhook router against this vendor, shared-secret mode.
    pub fn app(&self, settings: OrchestrationSettings) -> Router {
        let client = FronteggClient::new(FronteggConfig {
            api_base_url: self.server.uri(),
            client_id: "test-client".to_string(),
            client_secret: "test-client-secret".to_string().into(),
            request_timeout: Duration::from_secs(5),
            retry: RetryPolicy::new(0, 0),
        })
        .expect("client construction");

        let state = WebhookState::new(
            SignatureScheme::SharedSecret(WEBHOOK_SECRET.to_string().into()),
            client,
            settings,
        );
        webhook_router(state)
    }

    pub async fn mock_token(&self) {
        Mock::given(method("POST"))
            .and(path("/auth/vendor/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "vendor-token",
                "expiresIn": 3600
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_token_rejected(&self) {
        Mock::given(method("POST"))
            .and(path("/auth/vendor/"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_tenant_apps(&self, tenant_id: &str, app_ids: &[&str]) {
        Mock::given(method("GET"))
            .and(path(
                "/applications/resources/applications/tenant-assignments/v1",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "tenantId": tenant_id, "appIds": app_ids }
            ])))
            .mount(&self.server)
            .await;
    }

    /// Mounts the app assignment endpoint, responding per app id.
    pub async fn mock_assign_app(&self, app_id: &str, status: u16) {
        Mock::given(method("POST"))
            .and(path("/identity/resources/applications/v1"))
            .and(body_partial_json(json!({ "appId": app_id })))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Mounts the app assignment endpoint for any app, expecting a count.
    pub async fn mock_assign_any_app(&self, status: u16, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/identity/resources/applications/v1"))
            .respond_with(ResponseTemplate::new(status))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_sub_tenants(&self, sub_tenant_ids: &[&str]) {
        let records: Vec<Value> = sub_tenant_ids
            .iter()
            .map(|id| json!({ "tenantId": id }))
            .collect();
        Mock::given(method("GET"))
            .and(path("/tenants/resources/hierarchy/v1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(records))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_user_tenants(&self, tenant_ids: &[&str]) {
        let records: Vec<Value> = tenant_ids
            .iter()
            .map(|id| json!({ "tenantId": id }))
            .collect();
        Mock::given(method("GET"))
            .and(path("/identity/resources/users/v2/me/tenants"))
            .respond_with(ResponseTemplate::new(200).set_body_json(records))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_assign_sub_tenant(&self, user_id: &str, status: u16, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path(format!(
                "/identity/resources/users/v1/{user_id}/tenant"
            )))
            .respond_with(ResponseTemplate::new(status))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_disable_user(&self, user_id: &str, status: u16) {
        Mock::given(method("POST"))
            .and(path(format!(
                "/identity/resources/tenants/users/v1/{user_id}/disable"
            )))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Total vendor requests received so far.
    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map_or(0, |reqs| reqs.len())
    }

    /// Paths of all received requests, in arrival order.
    pub async fn received_paths(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .map(|r| r.url.path().to_string())
            .collect()
    }
}

/// POST a payload to the webhook route and return status + parsed body.
pub async fn post_webhook(
    app: Router,
    payload: &Value,
    signature: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhooks/user-invited")
        .header("content-type", "application/json");
    if let Some(sig) = signature {
        builder = builder.header(SIGNATURE_HEADER, sig);
    }
    let request = builder
        .body(Body::from(payload.to_string()))
        .expect("request construction");

    send(app, request).await
}

/// Send an arbitrary request to the router.
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("router call");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collect")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}
