//! Account entity model.
//!
//! Accounts are owned by the user store; the identity core reads them
//! during authentication and writes them only through the federation
//! resolver (provisioning and profile updates).

use chrono::{DateTime, Utc};
use mercato_core::AccountId;
use serde::Serialize;
use sqlx::FromRow;
use std::str::FromStr;

/// The channel through which an account was created.
///
/// A `Local` account authenticates with a password; any other provider
/// delegates authentication to the external identity provider and may
/// carry no credential at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountProvider {
    Local,
    Google,
}

impl std::fmt::Display for AccountProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountProvider::Local => write!(f, "local"),
            AccountProvider::Google => write!(f, "google"),
        }
    }
}

impl FromStr for AccountProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(AccountProvider::Local),
            "google" => Ok(AccountProvider::Google),
            other => Err(format!("unknown provider: {other}")),
        }
    }
}

/// A user account row.
///
/// Schema: `accounts(id BIGSERIAL, username TEXT UNIQUE, email TEXT
/// UNIQUE, password_hash TEXT NULL, provider TEXT, is_active BOOL,
/// avatar_url TEXT NULL, created_at, updated_at)`.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    /// Unique numeric identifier.
    pub id: i64,

    /// Unique username (for federated accounts, derived from the email).
    pub username: String,

    /// Unique email address.
    pub email: String,

    /// Argon2id hash; NULL for accounts that only authenticate through
    /// an external provider.
    pub password_hash: Option<String>,

    /// Creation channel, stored as text ("local", "google", ...).
    pub provider: String,

    /// Whether the account may authenticate at all.
    pub is_active: bool,

    /// Avatar image URL, refreshed from the federated profile.
    pub avatar_url: Option<String>,

    /// When the account was created.
    pub created_at: DateTime<Utc>,

    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// The account id in its typed form.
    #[must_use]
    pub fn account_id(&self) -> AccountId {
        AccountId::from_i64(self.id)
    }

    /// The provider parsed to its enum form, if recognized.
    #[must_use]
    pub fn provider(&self) -> Option<AccountProvider> {
        self.provider.parse().ok()
    }

    /// Whether the account has a password set. Local accounts must
    /// acquire one before password login can succeed.
    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Find an account by username.
    pub async fn find_by_username(
        pool: &sqlx::PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM accounts WHERE username = $1")
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Find an account by email, case-insensitively.
    pub async fn find_by_email(
        pool: &sqlx::PgPool,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM accounts WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find an account by id.
    pub async fn find_by_id(pool: &sqlx::PgPool, id: AccountId) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM accounts WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(pool)
            .await
    }

    /// Check whether an account is currently active. Lightweight query
    /// used on the token-refresh path.
    pub async fn is_active_by_id(pool: &sqlx::PgPool, id: AccountId) -> Result<bool, sqlx::Error> {
        let active: Option<bool> = sqlx::query_scalar("SELECT is_active FROM accounts WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(pool)
            .await?;
        Ok(active.unwrap_or(false))
    }

    /// Provision a federated account with no credential.
    pub async fn insert_federated(
        pool: &sqlx::PgPool,
        provider: AccountProvider,
        username: &str,
        email: &str,
        avatar_url: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r"
            INSERT INTO accounts (username, email, password_hash, provider, is_active, avatar_url, created_at, updated_at)
            VALUES ($1, $2, NULL, $3, TRUE, $4, NOW(), NOW())
            RETURNING *
            ",
        )
        .bind(username)
        .bind(email)
        .bind(provider.to_string())
        .bind(avatar_url)
        .fetch_one(pool)
        .await
    }

    /// Refresh the mutable profile fields carried by the federated
    /// provider. Currently only the avatar URL.
    pub async fn update_avatar(
        pool: &sqlx::PgPool,
        id: AccountId,
        avatar_url: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r"
            UPDATE accounts
            SET avatar_url = $2, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.as_i64())
        .bind(avatar_url)
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(provider: &str, password_hash: Option<&str>) -> Account {
        Account {
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: password_hash.map(String::from),
            provider: provider.to_string(),
            is_active: true,
            avatar_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn provider_parses_known_values() {
        assert_eq!(account("local", None).provider(), Some(AccountProvider::Local));
        assert_eq!(account("google", None).provider(), Some(AccountProvider::Google));
        assert_eq!(account("GOOGLE", None).provider(), Some(AccountProvider::Google));
        assert_eq!(account("facebook", None).provider(), None);
    }

    #[test]
    fn provider_display_round_trips() {
        for p in [AccountProvider::Local, AccountProvider::Google] {
            assert_eq!(p.to_string().parse::<AccountProvider>().unwrap(), p);
        }
    }

    #[test]
    fn federated_accounts_may_lack_credentials() {
        assert!(!account("google", None).has_credential());
        assert!(account("local", Some("$argon2id$...")).has_credential());
    }

    #[test]
    fn typed_account_id() {
        assert_eq!(account("local", None).account_id().as_i64(), 1);
    }
}
