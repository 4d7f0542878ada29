//! OAuth2 federated identity resolution.
//!
//! Provider adapters fetch an external profile; the resolver reconciles
//! it against the local account store, provisioning credential-less
//! accounts for first-time logins and rejecting provider mismatches.

pub mod error;
pub mod providers;
pub mod services;

pub use error::{FederationError, FederationResult};
pub use providers::{google::GoogleProvider, IdentityProvider, ProfileAttributes, ProviderTokens};
pub use services::{build_redirect_url, FederatedIdentityResolver};
