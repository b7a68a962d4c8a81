//! Webhook intake and provisioning orchestration.
//!
//! Receives `frontegg.user.invitedToTenant` webhooks, verifies their
//! signature, and provisions the invited user: assigns them to every app
//! and sub-tenant associated with the tenant, optionally disabling the
//! user afterwards. Stateless per request; the only cross-request state is
//! the vendor token cache inside [`frontegg_client::FronteggClient`].

pub mod error;
pub mod event;
pub mod handler;
pub mod router;
pub mod signature;

pub use error::{ErrorResponse, WebhookError, WebhookResult};
pub use event::{InboundEvent, ProvisioningRequest, USER_INVITED_EVENT};
pub use handler::ProvisioningResponse;
pub use router::{webhook_router, OrchestrationSettings, WebhookState};
pub use signature::{SignatureScheme, SIGNATURE_HEADER};
