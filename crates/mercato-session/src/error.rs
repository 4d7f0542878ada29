//! Session error taxonomy.

use mercato_auth::AuthError;
use thiserror::Error;

/// Failure modes of login, refresh and password-reset operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Username/password mismatch, missing credential, or an undecodable
    /// transport-encoded password. Callers see one generic message.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// No account with the presented username. Carries the same display
    /// message and caller-visible code as
    /// [`SessionError::InvalidCredentials`] to prevent username
    /// enumeration; the distinction exists only for logging.
    #[error("invalid username or password")]
    AccountNotFound,

    /// Credential was valid but the account is deactivated.
    #[error("account is disabled")]
    AccountDisabled,

    /// Token is unknown, malformed, or failed signature verification.
    #[error("invalid token")]
    TokenInvalid,

    /// Token has passed its expiry instant.
    #[error("token has expired")]
    TokenExpired,

    /// Refresh token was already revoked (rotation or revoke-all).
    #[error("token has been revoked")]
    TokenRevoked,

    /// Password-reset token failed validation for any reason.
    #[error("invalid password reset token")]
    ResetTokenInvalid,

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal failure that should not leak detail to callers.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SessionError {
    /// Stable, caller-visible error code.
    ///
    /// `AccountNotFound` and `InvalidCredentials` share one code so a
    /// caller cannot distinguish an unknown username from a wrong
    /// password.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            SessionError::InvalidCredentials | SessionError::AccountNotFound => {
                "invalid_credentials"
            }
            SessionError::AccountDisabled => "account_disabled",
            SessionError::TokenInvalid => "token_invalid",
            SessionError::TokenExpired => "token_expired",
            SessionError::TokenRevoked => "token_revoked",
            SessionError::ResetTokenInvalid => "reset_token_invalid",
            SessionError::Database(_) | SessionError::Internal(_) => "internal_error",
        }
    }
}

impl From<AuthError> for SessionError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenExpired => SessionError::TokenExpired,
            AuthError::InvalidSignature
            | AuthError::InvalidToken(_)
            | AuthError::InvalidAlgorithm => SessionError::TokenInvalid,
            AuthError::DecodeFailed(_) => SessionError::InvalidCredentials,
            AuthError::InvalidKey(_)
            | AuthError::HashingFailed(_)
            | AuthError::InvalidHashFormat
            | AuthError::EncodeFailed(_) => SessionError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_and_bad_password_share_a_code() {
        assert_eq!(
            SessionError::AccountNotFound.error_code(),
            SessionError::InvalidCredentials.error_code()
        );
    }

    #[test]
    fn not_found_and_bad_password_read_identically() {
        // Neither the code nor the message may reveal whether the
        // username exists.
        assert_eq!(
            SessionError::AccountNotFound.to_string(),
            SessionError::InvalidCredentials.to_string()
        );
    }

    #[test]
    fn distinct_token_codes() {
        assert_eq!(SessionError::TokenExpired.error_code(), "token_expired");
        assert_eq!(SessionError::TokenRevoked.error_code(), "token_revoked");
        assert_eq!(SessionError::TokenInvalid.error_code(), "token_invalid");
    }

    #[test]
    fn decode_failure_reads_as_bad_credentials() {
        let err: SessionError = AuthError::DecodeFailed("tampered".into()).into();
        assert!(matches!(err, SessionError::InvalidCredentials));
    }

    #[test]
    fn expired_access_token_maps_through() {
        let err: SessionError = AuthError::TokenExpired.into();
        assert!(matches!(err, SessionError::TokenExpired));
    }

    #[test]
    fn key_problems_stay_internal() {
        let err: SessionError = AuthError::InvalidKey("no pem".into()).into();
        assert_eq!(err.error_code(), "internal_error");
    }
}
