//! Password authentication and the login flow.

use crate::error::SessionError;
use crate::models::{LoginRequest, TokenResponse};
use crate::services::token_service::{TokenService, DEFAULT_ROLE};
use mercato_auth::{CredentialCodec, PasswordHasher, SecurityPrincipal};
use mercato_db::{Account, AccountRole};
use sqlx::PgPool;
use std::time::Duration;

/// Lookup attempts before a credential failure is surfaced.
pub const MAX_LOOKUP_ATTEMPTS: u32 = 3;

/// Fixed delay between lookup attempts.
pub const LOOKUP_RETRY_DELAY: Duration = Duration::from_millis(200);

/// Service for password-based authentication.
///
/// Authentication mutates nothing: every failure leaves the account and
/// token state exactly as it found them.
#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
    codec: CredentialCodec,
    password_hasher: PasswordHasher,
    tokens: TokenService,
}

impl AuthService {
    #[must_use]
    pub fn new(pool: PgPool, codec: CredentialCodec, tokens: TokenService) -> Self {
        Self {
            pool,
            codec,
            password_hasher: PasswordHasher::new(),
            tokens,
        }
    }

    /// Authenticate a login request and open a fresh session.
    ///
    /// Prior sessions are revoked before the new refresh token is
    /// issued, so each login leaves exactly one active chain.
    pub async fn login(&self, request: &LoginRequest) -> Result<TokenResponse, SessionError> {
        let principal = self
            .authenticate(&request.username, &request.password)
            .await?;

        self.tokens.revoke_all(principal.account_id).await?;
        let response = self.tokens.issue_session(&principal).await?;

        tracing::info!(
            account_id = %principal.account_id,
            username = %principal.username,
            "login succeeded"
        );

        Ok(response)
    }

    /// Verify a username and transport-encoded password.
    ///
    /// The account lookup is retried a bounded number of times with a
    /// fixed delay when the outcome could stem from a stale replica
    /// read; the final attempt's outcome is surfaced unchanged.
    pub async fn authenticate(
        &self,
        username: &str,
        encoded_password: &str,
    ) -> Result<SecurityPrincipal, SessionError> {
        let password = self.codec.decode(encoded_password).map_err(|e| {
            tracing::debug!(username, "credential decode failed: {e}");
            SessionError::InvalidCredentials
        })?;

        let mut attempt = 1;
        loop {
            match self.check_credentials(username, &password).await {
                Ok(principal) => return Ok(principal),
                Err(e) if is_replica_lag_candidate(&e) && attempt < MAX_LOOKUP_ATTEMPTS => {
                    tracing::debug!(username, attempt, "retrying authentication lookup");
                    tokio::time::sleep(LOOKUP_RETRY_DELAY).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One authentication attempt against the account store.
    async fn check_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<SecurityPrincipal, SessionError> {
        let account = Account::find_by_username(&self.pool, username).await?;

        let Some(account) = account else {
            tracing::debug!(username, "authentication attempt for unknown username");
            return Err(SessionError::AccountNotFound);
        };

        // Federated-only accounts have no password to check.
        let Some(stored_hash) = account.password_hash.as_deref() else {
            tracing::debug!(account_id = account.id, "password login without a credential");
            return Err(SessionError::InvalidCredentials);
        };

        let valid = self
            .password_hasher
            .verify(password, stored_hash)
            .map_err(|e| {
                tracing::error!(account_id = account.id, "password verification error: {e}");
                SessionError::Internal(format!("password verification failed: {e}"))
            })?;

        if !valid {
            tracing::debug!(account_id = account.id, "password mismatch");
            return Err(SessionError::InvalidCredentials);
        }

        if !account.is_active {
            tracing::warn!(account_id = account.id, "login attempt for disabled account");
            return Err(SessionError::AccountDisabled);
        }

        let roles = AccountRole::names(&self.pool, account.account_id()).await?;
        let primary_role = roles
            .into_iter()
            .next()
            .unwrap_or_else(|| DEFAULT_ROLE.to_string());

        Ok(SecurityPrincipal::new(
            account.account_id(),
            account.username,
            primary_role,
        ))
    }
}

/// Whether an authentication failure could be a stale read from a
/// lagging replica rather than a genuinely bad login.
///
/// A freshly created account may be missing, carry an outdated hash, or
/// appear inactive on a replica that has not caught up. Anything else
/// (storage faults, internal errors) is surfaced immediately.
fn is_replica_lag_candidate(err: &SessionError) -> bool {
    matches!(
        err,
        SessionError::AccountNotFound
            | SessionError::InvalidCredentials
            | SessionError::AccountDisabled
    )
}
