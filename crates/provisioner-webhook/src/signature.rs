//! Webhook signature verification.
//!
//! Two explicit modes, selected at configuration time and never mixed:
//!
//! - **Shared secret**: the `x-webhook-secret` header must equal the
//!   configured secret; compared in constant time.
//! - **Signed token**: the header carries an HS256 JWT signed with the
//!   configured secret.
//!
//! Verification fails closed — an absent, empty, or malformed header and
//! any decode or signature error all yield `false`, with no distinction
//! exposed to the caller.

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use subtle::ConstantTimeEq;

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "x-webhook-secret";

/// Claims carried by a signed webhook token. The payload is irrelevant;
/// only the signature (and standard expiry) is checked.
#[derive(Debug, Deserialize)]
struct WebhookClaims {}

/// Configured verification mode for inbound webhooks.
pub enum SignatureScheme {
    /// Header value must equal the shared secret.
    SharedSecret(SecretString),
    /// Header value is an HS256 JWT signed with the secret.
    SignedToken(SecretString),
}

impl std::fmt::Debug for SignatureScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SharedSecret(_) => f.write_str("SharedSecret([REDACTED])"),
            Self::SignedToken(_) => f.write_str("SignedToken([REDACTED])"),
        }
    }
}

impl SignatureScheme {
    /// Verify the signature header. Returns only pass/fail.
    #[must_use]
    pub fn verify(&self, header_value: Option<&str>) -> bool {
        let Some(value) = header_value else {
            return false;
        };
        if value.is_empty() {
            return false;
        }

        match self {
            Self::SharedSecret(secret) => {
                let expected = secret.expose_secret().as_bytes();
                value.as_bytes().ct_eq(expected).into()
            }
            Self::SignedToken(secret) => {
                let key = DecodingKey::from_secret(secret.expose_secret().as_bytes());
                let mut validation = Validation::new(Algorithm::HS256);
                // Webhook tokens carry no required claims beyond expiry.
                validation.required_spec_claims.clear();
                jsonwebtoken::decode::<WebhookClaims>(value, &key, &validation).is_ok()
            }
        }
    }
}
