//! Error types for the cryptographic primitives.

use thiserror::Error;

/// Failure modes of token, password and transport operations.
///
/// Each variant maps to one specific failure so callers can translate
/// them into their own caller-visible taxonomy without string matching.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // Access-token errors
    /// Token has expired (`exp` is in the past).
    #[error("token has expired")]
    TokenExpired,

    /// Token signature did not verify.
    #[error("invalid token signature")]
    InvalidSignature,

    /// Token is malformed or otherwise unusable.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Token uses an algorithm other than RS256.
    #[error("unsupported algorithm: only RS256 is accepted")]
    InvalidAlgorithm,

    /// A signing or verification key could not be loaded.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    // Password errors
    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    HashingFailed(String),

    /// Stored credential is not a valid PHC hash string.
    #[error("invalid password hash format")]
    InvalidHashFormat,

    // Transport codec errors
    /// Wire value could not be decoded back to a plaintext credential.
    /// Callers must treat this exactly like a bad credential.
    #[error("credential decode failed: {0}")]
    DecodeFailed(String),

    /// Credential encryption failed.
    #[error("credential encode failed: {0}")]
    EncodeFailed(String),
}

impl AuthError {
    /// Whether this error indicates an expired token.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        matches!(self, AuthError::TokenExpired)
    }

    /// Whether this error came from the transport codec.
    #[must_use]
    pub fn is_decode_error(&self) -> bool {
        matches!(self, AuthError::DecodeFailed(_))
    }
}
