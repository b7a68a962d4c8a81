//! The provisioning orchestrator — webhook handler for tenant invitations.
//!
//! One execution per inbound request: verify the signature, normalize the
//! event, acquire a vendor token, discover the tenant's apps and
//! sub-tenants, fan the assignments out with bounded concurrency, then
//! optionally disable the user once every assignment has completed.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use frontegg_client::{AppAssignment, SubTenantAssignment};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::error::{WebhookError, WebhookResult};
use crate::event::{InboundEvent, ProvisioningRequest};
use crate::router::WebhookState;
use crate::signature::SIGNATURE_HEADER;

/// Summary of one provisioning run, returned to the webhook caller.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningResponse {
    pub apps_assigned: usize,
    pub app_assignments: Vec<AppAssignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_tenants_assigned: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_assignments: Option<Vec<SubTenantAssignment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_disabled: Option<bool>,
}

/// Handle a `frontegg.user.invitedToTenant` webhook.
///
/// Rejections (405 wrong method via the router, 401 bad signature, 400 bad
/// payload) happen before any vendor call. Token acquisition failure aborts
/// with 500 before provisioning. Individual assignment failures are
/// captured per item and never fail the request.
pub async fn handle_user_invited(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> WebhookResult<Json<ProvisioningResponse>> {
    // Signature first, before the body is even parsed.
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    if !state.verifier.verify(signature) {
        return Err(WebhookError::Unauthorized);
    }

    let event: InboundEvent = serde_json::from_slice(&body)
        .map_err(|e| WebhookError::Validation(format!("Invalid JSON body: {e}")))?;
    let request = event.normalize(&state.settings.accepted_event_key)?;

    info!(
        tenant_id = %request.tenant_id,
        user_id = %request.user_id,
        "Provisioning invited user"
    );

    // Token acquisition is a precondition: a cold cache plus a vendor
    // rejection means no provisioning at all.
    state
        .client
        .get_token()
        .await
        .map_err(|e| WebhookError::VendorAuth(e.to_string()))?;

    // Discovery errors mean "nothing to assign", not a failed request.
    let app_ids = match state.client.list_assigned_apps(&request.tenant_id).await {
        Ok(ids) => ids,
        Err(e) => {
            warn!(tenant_id = %request.tenant_id, error = %e, "App discovery failed");
            Vec::new()
        }
    };

    if app_ids.is_empty() {
        info!(tenant_id = %request.tenant_id, "Tenant has no assigned apps");
        return Ok(Json(ProvisioningResponse {
            apps_assigned: 0,
            app_assignments: Vec::new(),
            sub_tenants_assigned: None,
            sub_assignments: None,
            user_disabled: None,
        }));
    }

    let app_assignments = assign_apps(&state, &request, app_ids).await;
    let sub_assignments = assign_sub_tenants(&state, &request).await;

    // The disable step must not start until every assignment has settled;
    // both fan-outs above are fully joined at this point.
    let user_disabled = if state.settings.disable_user_after_assign {
        let outcome = state
            .client
            .disable_user(&request.user_id, &request.tenant_id)
            .await;
        Some(outcome.succeeded)
    } else {
        None
    };

    let apps_assigned = app_assignments.iter().filter(|a| a.succeeded).count();
    let sub_tenants_assigned = sub_assignments.iter().filter(|a| a.succeeded).count();

    info!(
        tenant_id = %request.tenant_id,
        user_id = %request.user_id,
        apps_assigned,
        sub_tenants_assigned,
        user_disabled = ?user_disabled,
        "Provisioning complete"
    );

    Ok(Json(ProvisioningResponse {
        apps_assigned,
        app_assignments,
        sub_tenants_assigned: Some(sub_tenants_assigned),
        sub_assignments: Some(sub_assignments),
        user_disabled,
    }))
}

/// Assign the user to every discovered app, concurrently up to the
/// configured bound. One app's failure never aborts another's attempt; the
/// join below is the barrier that keeps partial results out of the
/// response.
async fn assign_apps(
    state: &WebhookState,
    request: &ProvisioningRequest,
    app_ids: Vec<String>,
) -> Vec<AppAssignment> {
    let semaphore = Arc::new(Semaphore::new(state.settings.assign_concurrency));
    let mut join_set = JoinSet::new();

    for app_id in app_ids {
        let client = Arc::clone(&state.client);
        let tenant_id = request.tenant_id.clone();
        let user_id = request.user_id.clone();
        let semaphore = Arc::clone(&semaphore);
        join_set.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .expect("assignment semaphore is never closed");
            client.assign_user_to_app(&app_id, &tenant_id, &user_id).await
        });
    }

    collect_assignments(join_set, "app assignment").await
}

/// Discover sub-tenants and assign the user to each one not already held.
///
/// Both discovery calls fall back to empty on failure; an empty tenant set
/// means every sub-tenant goes through the vendor (the guard only ever
/// skips work, it cannot invent it).
async fn assign_sub_tenants(
    state: &WebhookState,
    request: &ProvisioningRequest,
) -> Vec<SubTenantAssignment> {
    let sub_tenants = match state.client.list_sub_tenants(&request.tenant_id).await {
        Ok(subs) => subs,
        Err(e) => {
            warn!(tenant_id = %request.tenant_id, error = %e, "Sub-tenant discovery failed");
            Vec::new()
        }
    };

    if sub_tenants.is_empty() {
        return Vec::new();
    }

    let existing: Arc<HashSet<String>> = Arc::new(
        match state.client.list_user_tenants(&request.user_id).await {
            Ok(tenants) => tenants.into_iter().collect(),
            Err(e) => {
                warn!(user_id = %request.user_id, error = %e, "User tenant lookup failed");
                HashSet::new()
            }
        },
    );

    let semaphore = Arc::new(Semaphore::new(state.settings.assign_concurrency));
    let mut join_set = JoinSet::new();

    for sub_tenant in sub_tenants {
        let client = Arc::clone(&state.client);
        let user_id = request.user_id.clone();
        let existing = Arc::clone(&existing);
        let semaphore = Arc::clone(&semaphore);
        join_set.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .expect("assignment semaphore is never closed");
            client
                .assign_user_to_sub_tenant(&user_id, &sub_tenant.id, &existing)
                .await
        });
    }

    collect_assignments(join_set, "sub-tenant assignment").await
}

/// Gather barrier: wait for every spawned assignment before returning.
async fn collect_assignments<T: 'static>(mut join_set: JoinSet<T>, what: &str) -> Vec<T> {
    let mut results = Vec::new();
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            Err(e) => {
                error!(error = %e, "{} task panicked", what);
            }
        }
    }
    results
}
