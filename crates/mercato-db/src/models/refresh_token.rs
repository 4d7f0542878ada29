//! Refresh token persistence model.

use chrono::{DateTime, Duration, Utc};
use mercato_core::AccountId;
use sqlx::FromRow;
use uuid::Uuid;

/// A stored refresh token.
///
/// Only the SHA-256 hash of the opaque secret is persisted; the secret
/// itself is handed to the client once at issuance and never stored.
/// A token authorizes a refresh iff it is neither revoked nor expired.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshToken {
    pub id: Uuid,
    pub account_id: i64,
    /// Hex-encoded SHA-256 of the opaque token string.
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Whether this token currently authorizes a refresh.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.revoked && !self.is_expired()
    }

    /// Whether the token has passed its expiry instant.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Whether the token has been revoked.
    #[must_use]
    pub fn is_revoked(&self) -> bool {
        self.revoked
    }

    /// The owning account id in its typed form.
    #[must_use]
    pub fn account_id(&self) -> AccountId {
        AccountId::from_i64(self.account_id)
    }

    /// Look up a token by the hash of its opaque secret.
    pub async fn find_by_hash(
        pool: &sqlx::PgPool,
        token_hash: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM refresh_tokens WHERE token_hash = $1")
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    /// Insert a freshly issued token.
    pub async fn insert(
        pool: &sqlx::PgPool,
        account_id: AccountId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r"
            INSERT INTO refresh_tokens (id, account_id, token_hash, expires_at, revoked, created_at)
            VALUES ($1, $2, $3, $4, FALSE, NOW())
            RETURNING *
            ",
        )
        .bind(Uuid::new_v4())
        .bind(account_id.as_i64())
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(pool)
        .await
    }

    /// Revoke every live token belonging to an account. Returns the
    /// number of tokens revoked.
    pub async fn revoke_all_for_account(
        pool: &sqlx::PgPool,
        account_id: AccountId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE WHERE account_id = $1 AND NOT revoked",
        )
        .bind(account_id.as_i64())
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete tokens that expired before the cutoff. Returns the number
    /// of rows removed.
    pub async fn delete_expired_before(
        pool: &sqlx::PgPool,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < $1")
            .bind(cutoff)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(revoked: bool, expires_in: Duration) -> RefreshToken {
        RefreshToken {
            id: Uuid::new_v4(),
            account_id: 42,
            token_hash: "a".repeat(64),
            expires_at: Utc::now() + expires_in,
            revoked,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn live_token_is_valid() {
        let t = token(false, Duration::days(7));
        assert!(t.is_valid());
        assert!(!t.is_expired());
        assert!(!t.is_revoked());
    }

    #[test]
    fn revoked_token_is_invalid() {
        let t = token(true, Duration::days(7));
        assert!(!t.is_valid());
        assert!(t.is_revoked());
    }

    #[test]
    fn expired_token_is_invalid() {
        let t = token(false, Duration::seconds(-1));
        assert!(!t.is_valid());
        assert!(t.is_expired());
    }

    #[test]
    fn revoked_and_expired_is_both() {
        let t = token(true, Duration::seconds(-1));
        assert!(t.is_expired());
        assert!(t.is_revoked());
        assert!(!t.is_valid());
    }

    #[test]
    fn typed_account_id() {
        assert_eq!(token(false, Duration::days(1)).account_id().as_i64(), 42);
    }
}
