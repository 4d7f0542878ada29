//! Access-token claim set.
//!
//! The access token is stateless: everything a downstream service needs
//! to authorize a request is inside the signed claim set, so validity is
//! fully determined by signature plus expiry with no server lookup.

use chrono::{Duration, Utc};
use mercato_core::AccountId;
use serde::{Deserialize, Serialize};

/// Claims carried by a mercato access token.
///
/// Layout on the wire:
///
/// ```json
/// { "sub": "<username>", "iss": "<role-context>", "id": "<account id>",
///   "username": "<username>", "iat": 1700000000, "exp": 1700003600 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    /// Subject: the account's username.
    pub sub: String,

    /// Issuer context: the role under which the token was minted.
    pub iss: String,

    /// Account id, stringified.
    pub id: String,

    /// Username, duplicated from `sub` for downstream convenience.
    pub username: String,

    /// Issued-at as Unix timestamp.
    pub iat: i64,

    /// Expiration as Unix timestamp.
    pub exp: i64,
}

impl AccessClaims {
    /// Create a new builder.
    #[must_use]
    pub fn builder() -> AccessClaimsBuilder {
        AccessClaimsBuilder::default()
    }

    /// Whether the claim set has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Account id parsed back to its typed form, if well-formed.
    #[must_use]
    pub fn account_id(&self) -> Option<AccountId> {
        self.id.parse().ok()
    }
}

/// Builder for [`AccessClaims`].
#[derive(Debug, Default)]
pub struct AccessClaimsBuilder {
    sub: Option<String>,
    iss: Option<String>,
    id: Option<String>,
    iat: Option<i64>,
    exp: Option<i64>,
}

impl AccessClaimsBuilder {
    /// Set the username (becomes both `sub` and `username`).
    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.sub = Some(username.into());
        self
    }

    /// Set the issuer role context.
    #[must_use]
    pub fn role_context(mut self, iss: impl Into<String>) -> Self {
        self.iss = Some(iss.into());
        self
    }

    /// Set the account id.
    #[must_use]
    pub fn account_id(mut self, id: AccountId) -> Self {
        self.id = Some(id.to_string());
        self
    }

    /// Set the expiration as an absolute Unix timestamp.
    #[must_use]
    pub fn expiration(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    /// Set the expiration relative to now.
    #[must_use]
    pub fn expires_in_secs(mut self, secs: i64) -> Self {
        self.exp = Some((Utc::now() + Duration::seconds(secs)).timestamp());
        self
    }

    /// Override the issued-at timestamp (defaults to now).
    #[must_use]
    pub fn issued_at(mut self, iat: i64) -> Self {
        self.iat = Some(iat);
        self
    }

    /// Build the claim set. Missing fields fall back to empty strings,
    /// `iat` to now and `exp` to one hour from now.
    #[must_use]
    pub fn build(self) -> AccessClaims {
        let now = Utc::now().timestamp();
        let username = self.sub.unwrap_or_default();
        AccessClaims {
            sub: username.clone(),
            iss: self.iss.unwrap_or_default(),
            id: self.id.unwrap_or_default(),
            username,
            iat: self.iat.unwrap_or(now),
            exp: self.exp.unwrap_or(now + 3600),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_fills_all_fields() {
        let claims = AccessClaims::builder()
            .username("alice")
            .role_context("SELLER")
            .account_id(AccountId::from_i64(9))
            .expires_in_secs(600)
            .build();

        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.iss, "SELLER");
        assert_eq!(claims.id, "9");
        assert!(claims.exp > claims.iat);
        assert!(!claims.is_expired());
    }

    #[test]
    fn account_id_round_trips() {
        let claims = AccessClaims::builder()
            .username("bob")
            .account_id(AccountId::from_i64(123))
            .build();
        assert_eq!(claims.account_id(), Some(AccountId::from_i64(123)));
    }

    #[test]
    fn malformed_id_yields_none() {
        let mut claims = AccessClaims::builder().username("bob").build();
        claims.id = "not-numeric".to_string();
        assert!(claims.account_id().is_none());
    }

    #[test]
    fn past_expiration_is_expired() {
        let claims = AccessClaims::builder()
            .username("carol")
            .expiration(Utc::now().timestamp() - 60)
            .build();
        assert!(claims.is_expired());
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let claims = AccessClaims::builder()
            .username("alice")
            .role_context("USER")
            .account_id(AccountId::from_i64(1))
            .build();

        let json = serde_json::to_value(&claims).unwrap();
        for key in ["sub", "iss", "id", "username", "iat", "exp"] {
            assert!(json.get(key).is_some(), "missing claim {key}");
        }
    }
}
