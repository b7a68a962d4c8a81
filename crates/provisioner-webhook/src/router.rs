//! Axum router setup for the webhook endpoint.

use std::sync::Arc;

use axum::{routing::post, Router};
use frontegg_client::FronteggClient;

use crate::handler::handle_user_invited;
use crate::signature::SignatureScheme;

/// Orchestration knobs for the webhook handler.
#[derive(Debug, Clone)]
pub struct OrchestrationSettings {
    /// The only event kind this endpoint provisions.
    pub accepted_event_key: String,
    /// Concurrency bound for assignment fan-out.
    pub assign_concurrency: usize,
    /// Disable the user after all assignments complete.
    pub disable_user_after_assign: bool,
}

impl Default for OrchestrationSettings {
    fn default() -> Self {
        Self {
            accepted_event_key: crate::event::USER_INVITED_EVENT.to_string(),
            assign_concurrency: 8,
            disable_user_after_assign: false,
        }
    }
}

/// Shared state for the webhook handler.
#[derive(Clone)]
pub struct WebhookState {
    pub verifier: Arc<SignatureScheme>,
    pub client: Arc<FronteggClient>,
    pub settings: Arc<OrchestrationSettings>,
}

impl WebhookState {
    /// Create the handler state.
    pub fn new(
        verifier: SignatureScheme,
        client: FronteggClient,
        settings: OrchestrationSettings,
    ) -> Self {
        Self {
            verifier: Arc::new(verifier),
            client: Arc::new(client),
            settings: Arc::new(settings),
        }
    }
}

/// Creates the webhook router. Only POST is registered; axum answers other
/// methods on the route with 405.
pub fn webhook_router(state: WebhookState) -> Router {
    Router::new()
        .route("/webhooks/user-invited", post(handle_user_invited))
        .with_state(state)
}
