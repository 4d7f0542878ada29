//! Access-token issuance and refresh-token lifecycle.
//!
//! Access tokens are stateless RS256 claim sets; refresh tokens are
//! opaque high-entropy strings stored hashed, rotated on every use, and
//! kept to a single active chain per account.

use crate::error::SessionError;
use crate::models::TokenResponse;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use mercato_auth::{encode_access_token, AccessClaims, SecurityPrincipal};
use mercato_core::AccountId;
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// Default access token validity in seconds.
pub const ACCESS_TOKEN_VALIDITY_SECS: i64 = 3600;

/// Default refresh token validity in days.
pub const REFRESH_TOKEN_VALIDITY_DAYS: i64 = 7;

/// Size of opaque refresh tokens in bytes (256 bits of entropy).
pub const OPAQUE_TOKEN_BYTES: usize = 32;

/// Default role claimed when an account has no explicit assignment.
pub const DEFAULT_ROLE: &str = "USER";

/// Signing material for access tokens.
#[derive(Clone)]
pub struct TokenConfig {
    /// PEM-encoded RSA private key; signs access tokens.
    pub private_key: Vec<u8>,
    /// PEM-encoded RSA public key; verifies access tokens.
    pub public_key: Vec<u8>,
}

/// Service owning token issuance, rotation and revocation.
#[derive(Clone)]
pub struct TokenService {
    config: TokenConfig,
    pool: PgPool,
    access_token_validity: Duration,
    refresh_token_validity: Duration,
}

impl TokenService {
    #[must_use]
    pub fn new(config: TokenConfig, pool: PgPool) -> Self {
        Self {
            config,
            pool,
            access_token_validity: Duration::seconds(ACCESS_TOKEN_VALIDITY_SECS),
            refresh_token_validity: Duration::days(REFRESH_TOKEN_VALIDITY_DAYS),
        }
    }

    /// Create a token service with custom validity periods.
    #[must_use]
    pub fn with_validity(
        config: TokenConfig,
        pool: PgPool,
        access_token_secs: i64,
        refresh_token_days: i64,
    ) -> Self {
        Self {
            config,
            pool,
            access_token_validity: Duration::seconds(access_token_secs),
            refresh_token_validity: Duration::days(refresh_token_days),
        }
    }

    /// Mint an access token and a fresh refresh token for a principal.
    ///
    /// Used at login, after the caller has revoked the principal's prior
    /// sessions.
    pub async fn issue_session(
        &self,
        principal: &SecurityPrincipal,
    ) -> Result<TokenResponse, SessionError> {
        let access_token = self.create_access_token(principal)?;
        let refresh_token = self.issue_refresh_token(principal.account_id).await?;

        Ok(TokenResponse::bearer(
            access_token,
            self.access_token_validity.num_seconds(),
            refresh_token,
        ))
    }

    /// Sign an access token for a principal.
    pub fn create_access_token(
        &self,
        principal: &SecurityPrincipal,
    ) -> Result<String, SessionError> {
        let claims = AccessClaims::builder()
            .username(&principal.username)
            .role_context(&principal.primary_role)
            .account_id(principal.account_id)
            .expires_in_secs(self.access_token_validity.num_seconds())
            .build();

        encode_access_token(&claims, &self.config.private_key).map_err(|e| {
            tracing::error!("failed to sign access token: {e}");
            SessionError::Internal(format!("token generation failed: {e}"))
        })
    }

    /// Validate an access token and return its claims.
    pub fn parse_access_token(&self, token: &str) -> Result<AccessClaims, SessionError> {
        mercato_auth::decode_access_token(token, &self.config.public_key)
            .map_err(SessionError::from)
    }

    /// Rotate a presented refresh token.
    ///
    /// Exactly one of any set of concurrent calls presenting the same
    /// token succeeds; the conditional `revoked` flip inside the
    /// transaction is the serialization point, and losers observe
    /// [`SessionError::TokenRevoked`].
    pub async fn rotate(&self, opaque_token: &str) -> Result<TokenResponse, SessionError> {
        let token = self.validate_refresh_token(opaque_token).await?;
        let token_hash = token.token_hash.clone();

        let account_id = token.account_id();
        if !mercato_db::Account::is_active_by_id(&self.pool, account_id).await? {
            tracing::warn!(account_id = %account_id, "refresh attempt for disabled account");
            return Err(SessionError::AccountDisabled);
        }

        let successor = generate_opaque_token();
        let successor_hash = hash_token(&successor);
        let expires_at = Utc::now() + self.refresh_token_validity;

        // Revoke and insert the successor as one atomic unit: a crash
        // between the two must never leave two live tokens, or none.
        let mut tx = self.pool.begin().await?;

        let revoked = sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE WHERE token_hash = $1 AND NOT revoked",
        )
        .bind(&token_hash)
        .execute(&mut *tx)
        .await?;

        if revoked.rows_affected() == 0 {
            // A concurrent rotation won; this caller's token is spent.
            tx.rollback().await?;
            tracing::warn!(account_id = %account_id, "lost refresh rotation race");
            return Err(SessionError::TokenRevoked);
        }

        sqlx::query(
            r"
            INSERT INTO refresh_tokens (id, account_id, token_hash, expires_at, revoked, created_at)
            VALUES ($1, $2, $3, $4, FALSE, NOW())
            ",
        )
        .bind(Uuid::new_v4())
        .bind(account_id.as_i64())
        .bind(&successor_hash)
        .bind(expires_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let principal = self.load_principal(account_id).await?;
        let access_token = self.create_access_token(&principal)?;

        tracing::info!(account_id = %account_id, "refresh token rotated");

        Ok(TokenResponse::bearer(
            access_token,
            self.access_token_validity.num_seconds(),
            successor,
        ))
    }

    /// Validate a presented refresh token and return its stored row.
    ///
    /// Checks existence, expiry (before revocation, so an expired token
    /// reads as expired even when it was also revoked) and the revoked
    /// flag. Does not mutate anything.
    pub async fn validate_refresh_token(
        &self,
        opaque_token: &str,
    ) -> Result<mercato_db::RefreshToken, SessionError> {
        let token_hash = hash_token(opaque_token);

        let token = mercato_db::RefreshToken::find_by_hash(&self.pool, &token_hash)
            .await?
            .ok_or(SessionError::TokenInvalid)?;

        if !verify_token_hash(opaque_token, &token.token_hash) {
            return Err(SessionError::TokenInvalid);
        }

        check_refresh_token(&token)?;

        Ok(token)
    }

    /// Revoke every live refresh token belonging to an account.
    ///
    /// Called on fresh login (single active chain) and on account
    /// deactivation. Returns the number of tokens revoked.
    pub async fn revoke_all(&self, account_id: AccountId) -> Result<u64, SessionError> {
        let revoked = mercato_db::RefreshToken::revoke_all_for_account(&self.pool, account_id).await?;

        if revoked > 0 {
            tracing::info!(account_id = %account_id, revoked, "revoked prior sessions");
        }

        Ok(revoked)
    }

    /// Delete refresh tokens that expired before now.
    ///
    /// Periodic maintenance; idempotent and safe to run concurrently
    /// with issuance and rotation since it only targets rows that are
    /// already invalid.
    pub async fn sweep_expired(&self) -> Result<u64, SessionError> {
        let removed = mercato_db::RefreshToken::delete_expired_before(&self.pool, Utc::now()).await?;

        if removed > 0 {
            tracing::debug!(removed, "swept expired refresh tokens");
        }

        Ok(removed)
    }

    /// Access token validity in seconds.
    #[must_use]
    pub fn access_token_validity_secs(&self) -> i64 {
        self.access_token_validity.num_seconds()
    }

    /// Generate an opaque refresh token and persist its hash.
    async fn issue_refresh_token(&self, account_id: AccountId) -> Result<String, SessionError> {
        let opaque_token = generate_opaque_token();
        let token_hash = hash_token(&opaque_token);
        let expires_at = Utc::now() + self.refresh_token_validity;

        mercato_db::RefreshToken::insert(&self.pool, account_id, &token_hash, expires_at).await?;

        Ok(opaque_token)
    }

    /// Rebuild a principal from the account store.
    async fn load_principal(&self, account_id: AccountId) -> Result<SecurityPrincipal, SessionError> {
        let account = mercato_db::Account::find_by_id(&self.pool, account_id)
            .await?
            .ok_or(SessionError::TokenInvalid)?;

        let roles = mercato_db::AccountRole::names(&self.pool, account_id).await?;
        let primary_role = roles
            .into_iter()
            .next()
            .unwrap_or_else(|| DEFAULT_ROLE.to_string());

        Ok(SecurityPrincipal::new(account_id, account.username, primary_role))
    }
}

/// Decide whether a stored refresh token still authorizes a rotation.
///
/// Expiry is checked before revocation so an expired token reads as
/// `Expired` even when it was also revoked.
fn check_refresh_token(token: &mercato_db::RefreshToken) -> Result<(), SessionError> {
    if token.is_expired() {
        return Err(SessionError::TokenExpired);
    }
    if token.is_revoked() {
        return Err(SessionError::TokenRevoked);
    }
    Ok(())
}

/// Hash an opaque token with SHA-256, hex-encoded.
#[must_use]
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate an opaque refresh token from the operating system CSPRNG.
///
/// 32 random bytes in URL-safe base64: a 43-character string.
#[must_use]
pub fn generate_opaque_token() -> String {
    use rand::rngs::OsRng;
    let mut bytes = [0u8; OPAQUE_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Compare a presented token against a stored hash in constant time.
#[must_use]
pub fn verify_token_hash(provided_token: &str, stored_hash: &str) -> bool {
    let provided_hash = hash_token(provided_token);
    provided_hash.as_bytes().ct_eq(stored_hash.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mercato_db::RefreshToken;

    fn stored_token(revoked: bool, expires_in: Duration) -> RefreshToken {
        RefreshToken {
            id: Uuid::new_v4(),
            account_id: 7,
            token_hash: hash_token("opaque"),
            expires_at: Utc::now() + expires_in,
            revoked,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn live_token_passes_checks() {
        let token = stored_token(false, Duration::days(3));
        assert!(check_refresh_token(&token).is_ok());
    }

    #[test]
    fn revoked_token_is_rejected() {
        let token = stored_token(true, Duration::days(3));
        assert!(matches!(
            check_refresh_token(&token),
            Err(SessionError::TokenRevoked)
        ));
    }

    #[test]
    fn expired_wins_over_revoked() {
        let token = stored_token(true, Duration::seconds(-5));
        assert!(matches!(
            check_refresh_token(&token),
            Err(SessionError::TokenExpired)
        ));
    }

    #[test]
    fn opaque_tokens_are_unique_and_url_safe() {
        let t1 = generate_opaque_token();
        let t2 = generate_opaque_token();

        assert_ne!(t1, t2);
        assert_eq!(t1.len(), 43);
        assert!(!t1.contains('+'));
        assert!(!t1.contains('/'));
        assert!(URL_SAFE_NO_PAD.decode(&t1).is_ok());
    }

    #[test]
    fn token_hash_is_deterministic_hex() {
        let hash = hash_token("secret");
        assert_eq!(hash, hash_token("secret"));
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn hash_verification() {
        let token = generate_opaque_token();
        let hash = hash_token(&token);

        assert!(verify_token_hash(&token, &hash));
        assert!(!verify_token_hash("something-else", &hash));
    }
}
