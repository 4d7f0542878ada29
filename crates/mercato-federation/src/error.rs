//! Federation error taxonomy.

use thiserror::Error;

/// Failure modes of provider calls and identity resolution.
#[derive(Debug, Error)]
pub enum FederationError {
    /// The provider profile carried no usable email address. A provider
    /// integration fault, not a user error.
    #[error("federated profile has no email address")]
    EmailMissing,

    /// The email belongs to an account owned by a different provider.
    /// User-visible and actionable.
    #[error("account already exists with provider {existing}")]
    ProviderMismatch {
        /// Provider the existing account was created through.
        existing: String,
    },

    /// The requested provider is not configured.
    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// The provider redirected back with an error instead of a code.
    #[error("authorization failed at provider: {0}")]
    AuthorizationFailed(String),

    /// Code-for-token exchange was rejected by the provider.
    #[error("token exchange failed with status {status}")]
    TokenExchangeFailed { status: u16 },

    /// The userinfo endpoint rejected the access token.
    #[error("profile fetch failed with status {status}")]
    ProfileFetchFailed { status: u16 },

    /// Transport-level failure talking to the provider.
    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl FederationError {
    /// Stable, caller-visible error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            FederationError::EmailMissing => "email_missing",
            FederationError::ProviderMismatch { .. } => "provider_mismatch",
            FederationError::UnsupportedProvider(_) => "unsupported_provider",
            FederationError::AuthorizationFailed(_) => "authorization_failed",
            FederationError::TokenExchangeFailed { .. }
            | FederationError::ProfileFetchFailed { .. }
            | FederationError::Http(_) => "provider_unavailable",
            FederationError::Database(_) => "internal_error",
        }
    }
}

/// Convenience alias used across the crate.
pub type FederationResult<T> = Result<T, FederationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_names_the_existing_provider() {
        let err = FederationError::ProviderMismatch {
            existing: "local".to_string(),
        };
        assert_eq!(err.to_string(), "account already exists with provider local");
        assert_eq!(err.error_code(), "provider_mismatch");
    }

    #[test]
    fn provider_faults_share_a_code() {
        assert_eq!(
            FederationError::TokenExchangeFailed { status: 400 }.error_code(),
            FederationError::ProfileFetchFailed { status: 401 }.error_code()
        );
    }
}
