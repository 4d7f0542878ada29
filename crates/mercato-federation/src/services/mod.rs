//! Federation services.

pub mod resolver;

pub use resolver::{build_redirect_url, FederatedIdentityResolver};
