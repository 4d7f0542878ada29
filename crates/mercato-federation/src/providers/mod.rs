//! Identity-provider adapters.

pub mod google;

pub use async_trait::async_trait;
use mercato_db::AccountProvider;
use serde::{Deserialize, Serialize};

use crate::error::FederationResult;

/// Tokens returned by a provider's code exchange.
#[derive(Debug, Clone)]
pub struct ProviderTokens {
    /// Access token for provider API calls.
    pub access_token: String,
    /// Refresh token, when the provider grants one.
    pub refresh_token: Option<String>,
    /// Access-token expiration in seconds.
    pub expires_in: Option<i64>,
    /// ID token (OIDC providers).
    pub id_token: Option<String>,
}

/// Profile attributes fetched from a provider's userinfo endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileAttributes {
    /// Unique identifier at the provider (sub claim).
    pub provider_user_id: String,
    /// Email address, if the provider exposes one.
    pub email: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Profile picture URL.
    pub picture: Option<String>,
}

/// An external OAuth2 identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Which account provider this adapter federates with.
    fn provider(&self) -> AccountProvider;

    /// Build the authorization URL the client is redirected to.
    fn authorization_url(&self, state: &str, redirect_uri: &str) -> String;

    /// Exchange an authorization code for provider tokens.
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> FederationResult<ProviderTokens>;

    /// Fetch the user's profile with a provider access token.
    async fn fetch_profile(&self, access_token: &str) -> FederationResult<ProfileAttributes>;
}
