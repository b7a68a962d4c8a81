//! Frontegg management API client.
//!
//! Provides vendor token acquisition with single-slot caching, typed
//! wrappers over the management endpoints the provisioner needs, and an
//! explicit retry policy for idempotent reads.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use frontegg_client::{FronteggClient, FronteggConfig, RetryPolicy};
//!
//! # async fn example() -> Result<(), frontegg_client::FronteggError> {
//! let client = FronteggClient::new(FronteggConfig {
//!     api_base_url: "https://api.frontegg.com".to_string(),
//!     client_id: "your-client-id".to_string(),
//!     client_secret: "your-client-secret".to_string().into(),
//!     request_timeout: Duration::from_secs(30),
//!     retry: RetryPolicy::default(),
//! })?;
//!
//! let apps = client.list_assigned_apps("tenant-id").await?;
//! # Ok(())
//! # }
//! ```

mod auth;
mod client;
mod error;
mod retry;

pub use auth::{TokenCache, VendorCredentials};
pub use client::{
    AppAssignment, DisableOutcome, FronteggClient, FronteggConfig, SubTenant, SubTenantAssignment,
    TenantAppAssignments,
};
pub use error::{FronteggError, FronteggResult};
pub use retry::RetryPolicy;
