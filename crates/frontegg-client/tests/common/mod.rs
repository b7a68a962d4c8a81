//! Common test utilities for frontegg-client integration tests.

#![allow(dead_code)] // not every test binary uses every helper

use std::time::Duration;

use frontegg_client::{FronteggClient, FronteggConfig, RetryPolicy};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TENANT_A: &str = "tenant-a";
pub const USER_1: &str = "user-1";

/// Creates a mock vendor token response.
pub fn token_response(token: &str, expires_in: u64) -> Value {
    json!({
        "token": token,
        "expiresIn": expires_in
    })
}

/// Mock server wrapper with Frontegg endpoint helpers.
pub struct MockFronteggServer {
    pub server: MockServer,
}

impl MockFronteggServer {
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Builds a client pointed at the mock server with fast retries.
    pub fn client(&self) -> FronteggClient {
        self.client_with_retry(RetryPolicy::new(2, 0))
    }

    pub fn client_with_retry(&self, retry: RetryPolicy) -> FronteggClient {
        FronteggClient::new(FronteggConfig {
            api_base_url: self.url(),
            client_id: "test-client".to_string(),
            client_secret: "test-secret".to_string().into(),
            request_timeout: Duration::from_secs(5),
            retry,
        })
        .expect("client construction")
    }

    /// Mounts the vendor token endpoint, expecting exactly `expected_calls`.
    pub async fn mock_token_endpoint(&self, token: &str, expires_in: u64, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/auth/vendor/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_response(token, expires_in)))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    /// Mounts the vendor token endpoint without call-count expectations.
    pub async fn mock_token_endpoint_unbounded(&self, token: &str, expires_in: u64) {
        Mock::given(method("POST"))
            .and(path("/auth/vendor/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_response(token, expires_in)))
            .mount(&self.server)
            .await;
    }

    /// Mounts the tenant app-assignments endpoint.
    pub async fn mock_tenant_apps(&self, tenant_id: &str, app_ids: &[&str]) {
        Mock::given(method("GET"))
            .and(path(
                "/applications/resources/applications/tenant-assignments/v1",
            ))
            .and(header("frontegg-tenant-id", tenant_id))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "tenantId": tenant_id, "appIds": app_ids }
            ])))
            .mount(&self.server)
            .await;
    }

    /// Mounts the tenant hierarchy endpoint.
    pub async fn mock_sub_tenants(&self, tenant_id: &str, sub_tenant_ids: &[&str]) {
        let records: Vec<Value> = sub_tenant_ids
            .iter()
            .map(|id| json!({ "tenantId": id }))
            .collect();
        Mock::given(method("GET"))
            .and(path("/tenants/resources/hierarchy/v1"))
            .and(header("frontegg-tenant-id", tenant_id))
            .respond_with(ResponseTemplate::new(200).set_body_json(records))
            .mount(&self.server)
            .await;
    }

    /// Mounts the user tenants endpoint.
    pub async fn mock_user_tenants(&self, user_id: &str, tenant_ids: &[&str]) {
        let records: Vec<Value> = tenant_ids
            .iter()
            .map(|id| json!({ "tenantId": id }))
            .collect();
        Mock::given(method("GET"))
            .and(path("/identity/resources/users/v2/me/tenants"))
            .and(header("frontegg-user-id", user_id))
            .respond_with(ResponseTemplate::new(200).set_body_json(records))
            .mount(&self.server)
            .await;
    }

    /// Mounts the app assignment endpoint with a fixed response status.
    pub async fn mock_assign_app(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path("/identity/resources/applications/v1"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Mounts the sub-tenant assignment endpoint for one user.
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

    /// Mounts the user disable endpoint.
    pub async fn mock_disable_user(&self, user_id: &str, status: u16) {
        Mock::given(method("POST"))
            .and(path(format!(
                "/identity/resources/tenants/users/v1/{user_id}/disable"
            )))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }
}
