//! Inbound event wire types and ingress normalization.
//!
//! The identity provider delivers the invited user's id in one of two
//! places depending on event schema version: `user.id` or
//! `eventContext.userId`. Both shapes are mapped into one canonical
//! [`ProvisioningRequest`] here, and nowhere else.

use serde::Deserialize;

use crate::error::WebhookError;

/// The event kind this endpoint provisions.
pub const USER_INVITED_EVENT: &str = "frontegg.user.invitedToTenant";

/// Raw webhook payload as delivered by the identity provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEvent {
    #[serde(default)]
    pub event_key: Option<String>,
    #[serde(default)]
    pub event_context: Option<EventContext>,
    #[serde(default)]
    pub user: Option<UserRef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventContext {
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserRef {
    #[serde(default)]
    pub id: Option<String>,
}

/// Canonical, validated provisioning input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningRequest {
    pub tenant_id: String,
    pub user_id: String,
}

impl InboundEvent {
    /// Normalize the wire event into a [`ProvisioningRequest`].
    ///
    /// Rejects unsupported event kinds (an absent `eventKey` is accepted),
    /// a missing tenant id, and a user id that is absent from both
    /// accepted locations or present in both.
    pub fn normalize(self, accepted_event_key: &str) -> Result<ProvisioningRequest, WebhookError> {
        if let Some(key) = self.event_key.as_deref() {
            if key != accepted_event_key {
                return Err(WebhookError::UnsupportedEvent(key.to_string()));
            }
        }

        let tenant_id = self
            .event_context
            .as_ref()
            .and_then(|c| c.tenant_id.clone())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| WebhookError::Validation("Missing tenantId".to_string()))?;

        let from_user = self
            .user
            .and_then(|u| u.id)
            .filter(|id| !id.is_empty());
        let from_context = self
            .event_context
            .and_then(|c| c.user_id)
            .filter(|id| !id.is_empty());

        let user_id = match (from_user, from_context) {
            (Some(id), None) | (None, Some(id)) => id,
            (None, None) => {
                return Err(WebhookError::Validation("Missing userId".to_string()));
            }
            (Some(_), Some(_)) => {
                return Err(WebhookError::Validation(
                    "Ambiguous userId: present under both user.id and eventContext.userId"
                        .to_string(),
                ));
            }
        };

        Ok(ProvisioningRequest { tenant_id, user_id })
    }
}
