//! Frontegg invitation provisioner.
//!
//! HTTP service that receives `frontegg.user.invitedToTenant` webhooks and
//! assigns the invited user to the tenant's applications and sub-tenants.

mod config;
mod health;
mod logging;

use axum::{routing::get, Router};
use config::{Config, SignatureMode};
use frontegg_client::{FronteggClient, FronteggConfig, RetryPolicy};
use health::health_handler;
use provisioner_webhook::{
    webhook_router, OrchestrationSettings, SignatureScheme, WebhookState, USER_INVITED_EVENT,
};
use std::net::SocketAddr;
use tokio::signal;
use tracing::info;

/// Webhook payloads are small; anything larger is rejected early.
const MAX_BODY_SIZE: usize = 256 * 1024;

#[tokio::main]
async fn main() {
    // Load configuration (fail-fast on missing required values)
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.rust_log);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.host,
        port = config.port,
        api_base_url = %config.frontegg_api_base_url,
        "Starting provisioner API"
    );

    let client = match FronteggClient::new(FronteggConfig {
        api_base_url: config.frontegg_api_base_url.clone(),
        client_id: config.frontegg_client_id.clone(),
        client_secret: config.frontegg_client_secret.clone(),
        request_timeout: config.request_timeout,
        retry: RetryPolicy::new(
            config.vendor_max_retries,
            config.vendor_retry_base_delay_secs,
        ),
    }) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to create Frontegg client: {e}");
            std::process::exit(1);
        }
    };

    let verifier = match config.signature_mode {
        SignatureMode::SharedSecret => {
            SignatureScheme::SharedSecret(config.webhook_secret.clone())
        }
        SignatureMode::SignedToken => SignatureScheme::SignedToken(config.webhook_secret.clone()),
    };

    let settings = OrchestrationSettings {
        accepted_event_key: USER_INVITED_EVENT.to_string(),
        assign_concurrency: config.assign_concurrency,
        disable_user_after_assign: config.disable_user_after_assign,
    };

    let state = WebhookState::new(verifier, client, settings);

    let app = Router::new()
        .route("/health", get(health_handler))
        .merge(webhook_router(state))
        .layer(tower_http::limit::RequestBodyLimitLayer::new(MAX_BODY_SIZE));

    let addr: SocketAddr = match config.bind_addr().parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!("Invalid bind address '{}': {e}", config.bind_addr());
            std::process::exit(1);
        }
    };

    info!(%addr, "Server listening");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {addr}: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {e}");
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
