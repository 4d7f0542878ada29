//! Reconciliation of federated profiles against local accounts.

use crate::error::{FederationError, FederationResult};
use crate::providers::ProfileAttributes;
use mercato_db::{Account, AccountProvider, AccountRole};
use sqlx::PgPool;

/// Role granted to freshly provisioned federated accounts.
const PROVISIONED_ROLE: &str = "USER";

/// Maps a provider profile to a local account.
///
/// Never issues tokens; it hands back an [`Account`] for the caller to
/// feed into token issuance.
#[derive(Clone)]
pub struct FederatedIdentityResolver {
    pool: PgPool,
}

impl FederatedIdentityResolver {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolve a provider profile to a local account.
    ///
    /// An existing account with a matching provider gets its mutable
    /// profile fields refreshed; an existing account with a different
    /// provider blocks resolution with its row untouched; an unknown
    /// email provisions a new credential-less account.
    pub async fn resolve(
        &self,
        provider: AccountProvider,
        profile: &ProfileAttributes,
    ) -> FederationResult<Account> {
        let email = required_email(profile)?;

        match Account::find_by_email(&self.pool, email).await? {
            Some(account) => {
                check_provider(&account, provider)?;

                // A profile without a picture must not erase a stored
                // avatar; the row is only touched when there is a value.
                if let Some(picture) = profile.picture.as_deref() {
                    Account::update_avatar(&self.pool, account.account_id(), Some(picture))
                        .await?;
                }

                tracing::debug!(account_id = account.id, provider = %provider, "federated profile refreshed");

                let avatar_url =
                    refreshed_avatar(account.avatar_url.clone(), profile.picture.as_deref());
                Ok(Account { avatar_url, ..account })
            }
            None => {
                let username = derive_username(email);
                let account = Account::insert_federated(
                    &self.pool,
                    provider,
                    &username,
                    email,
                    profile.picture.as_deref(),
                )
                .await?;

                AccountRole::assign(&self.pool, account.account_id(), PROVISIONED_ROLE).await?;

                tracing::info!(
                    account_id = account.id,
                    provider = %provider,
                    "provisioned federated account"
                );

                Ok(account)
            }
        }
    }
}

/// Build the post-callback redirect URL carrying the minted access
/// token.
#[must_use]
pub fn build_redirect_url(base: &str, access_token: &str) -> String {
    format!(
        "{}?token={}&type=Bearer",
        base,
        urlencoding::encode(access_token)
    )
}

/// The profile's email, or `EmailMissing` if absent or blank.
fn required_email(profile: &ProfileAttributes) -> FederationResult<&str> {
    match profile.email.as_deref().map(str::trim) {
        Some(email) if !email.is_empty() => Ok(email),
        _ => Err(FederationError::EmailMissing),
    }
}

/// Reject resolution when the account is owned by another provider.
fn check_provider(account: &Account, requested: AccountProvider) -> FederationResult<()> {
    if account.provider() == Some(requested) {
        Ok(())
    } else {
        Err(FederationError::ProviderMismatch {
            existing: account.provider.clone(),
        })
    }
}

/// The avatar to carry after a profile refresh: the provider's picture
/// when it sent one, otherwise the value already stored.
fn refreshed_avatar(current: Option<String>, incoming: Option<&str>) -> Option<String> {
    match incoming {
        Some(picture) => Some(picture.to_string()),
        None => current,
    }
}

/// Derive a username from an email: the local part, lower-cased.
#[must_use]
pub fn derive_username(email: &str) -> String {
    email
        .split('@')
        .next()
        .unwrap_or(email)
        .to_lowercase()
}
