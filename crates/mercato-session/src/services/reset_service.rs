//! Password-reset tokens.
//!
//! Reset tokens are self-contained HS256 claim sets signed with a
//! secret disjoint from the access-token keys, and carry a mandatory
//! `type` claim. An access token can therefore never pass reset
//! validation, nor the reverse.

use crate::error::SessionError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Default reset token validity in minutes.
pub const RESET_TOKEN_VALIDITY_MINUTES: i64 = 30;

/// Mandatory value of the `type` claim.
const RESET_TOKEN_TYPE: &str = "reset_password";

#[derive(Debug, Serialize, Deserialize)]
struct ResetClaims {
    /// The email the reset was requested for.
    sub: String,
    #[serde(rename = "type")]
    token_type: String,
    iat: i64,
    exp: i64,
}

/// Issues and validates password-reset tokens.
///
/// Tokens are never persisted; the short validity window stands in for
/// server-side state, so a captured token stays usable until expiry
/// even after a successful reset.
#[derive(Clone)]
pub struct PasswordResetTokenService {
    secret: Vec<u8>,
    validity: Duration,
}

impl PasswordResetTokenService {
    #[must_use]
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            validity: Duration::minutes(RESET_TOKEN_VALIDITY_MINUTES),
        }
    }

    /// Create a service with a custom validity window.
    #[must_use]
    pub fn with_validity(secret: impl Into<Vec<u8>>, validity_minutes: i64) -> Self {
        Self {
            secret: secret.into(),
            validity: Duration::minutes(validity_minutes),
        }
    }

    /// Issue a reset token for an email address.
    pub fn issue(&self, email: &str) -> Result<String, SessionError> {
        let now = Utc::now();
        let claims = ResetClaims {
            sub: email.to_string(),
            token_type: RESET_TOKEN_TYPE.to_string(),
            iat: now.timestamp(),
            exp: (now + self.validity).timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| {
            tracing::error!("failed to sign reset token: {e}");
            SessionError::Internal(format!("reset token generation failed: {e}"))
        })
    }

    /// Validate a reset token and return the email it was issued for.
    ///
    /// Every failure collapses to one error: callers learn nothing
    /// about whether the signature, expiry or type claim was at fault.
    pub fn validate(&self, token: &str) -> Result<String, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let data = decode::<ResetClaims>(
            token,
            &DecodingKey::from_secret(&self.secret),
            &validation,
        )
        .map_err(|e| {
            tracing::debug!("reset token rejected: {e}");
            SessionError::ResetTokenInvalid
        })?;

        if data.claims.token_type != RESET_TOKEN_TYPE {
            tracing::debug!("reset token with wrong type claim");
            return Err(SessionError::ResetTokenInvalid);
        }

        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"reset-secret-for-tests";

    fn service() -> PasswordResetTokenService {
        PasswordResetTokenService::new(SECRET)
    }

    #[test]
    fn issued_token_validates_to_its_email() {
        let token = service().issue("alice@example.com").unwrap();
        let email = service().validate(&token).unwrap();
        assert_eq!(email, "alice@example.com");
    }

    #[test]
    fn expired_token_is_invalid() {
        let expired = PasswordResetTokenService::with_validity(SECRET, -60);
        let token = expired.issue("alice@example.com").unwrap();

        let err = service().validate(&token).unwrap_err();
        assert!(matches!(err, SessionError::ResetTokenInvalid));
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token = service().issue("alice@example.com").unwrap();

        let other = PasswordResetTokenService::new(b"another-secret".as_slice());
        assert!(other.validate(&token).is_err());
    }

    #[test]
    fn wrong_type_claim_is_invalid() {
        // Same secret, same shape, but not a reset token.
        let now = Utc::now();
        let claims = ResetClaims {
            sub: "alice@example.com".to_string(),
            token_type: "access".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(30)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        let err = service().validate(&token).unwrap_err();
        assert!(matches!(err, SessionError::ResetTokenInvalid));
    }

    #[test]
    fn rs256_shaped_token_is_invalid() {
        // An access token uses a different algorithm and key family;
        // it must never pass reset validation.
        let garbage = "eyJhbGciOiJSUzI1NiJ9.eyJzdWIiOiJhbGljZSJ9.c2ln";
        assert!(service().validate(garbage).is_err());
    }

    #[test]
    fn tampered_token_is_invalid() {
        let mut token = service().issue("alice@example.com").unwrap();
        token.push('x');
        assert!(service().validate(&token).is_err());
    }
}
