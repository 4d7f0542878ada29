//! One-way password hashing with Argon2id.
//!
//! Slow by design: parameters follow the OWASP recommendation so a
//! leaked credential table resists offline cracking.

use crate::error::AuthError;
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

/// Memory cost in KiB (~19 MiB).
const MEMORY_KIB: u32 = 19_456;
/// Iteration count.
const ITERATIONS: u32 = 2;
/// Lanes.
const PARALLELISM: u32 = 1;

/// Argon2id hasher with fixed parameters.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher {
    /// Create a hasher with the crate's standard parameters.
    ///
    /// The constants above are always valid for `Params::new`, so the
    /// `expect` cannot fire outside of an argon2 library bug.
    #[must_use]
    pub fn new() -> Self {
        let params = Params::new(MEMORY_KIB, ITERATIONS, PARALLELISM, None)
            .expect("standard Argon2 parameters are valid constants");
        Self { params }
    }

    /// Create a hasher with custom parameters (useful in tests, where
    /// the standard cost is needlessly slow).
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::HashingFailed`] if the parameters are
    /// rejected by argon2.
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, AuthError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| AuthError::HashingFailed(format!("invalid parameters: {e}")))?;
        Ok(Self { params })
    }

    /// Hash a plaintext password, producing a PHC-formatted string with
    /// a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::HashingFailed`] if hashing fails.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::HashingFailed(e.to_string()))
    }

    /// Verify a plaintext password against a stored PHC hash.
    ///
    /// A mismatch is `Ok(false)`, not an error; only an unparseable
    /// stored hash is an error.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidHashFormat`] if `hash` is not a valid
    /// PHC string.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|_| AuthError::InvalidHashFormat)?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());

        match argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(_) => Ok(false),
        }
    }
}

/// Hash a password with the standard parameters.
///
/// # Errors
///
/// Returns [`AuthError::HashingFailed`] if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    PasswordHasher::new().hash(password)
}

/// Verify a password against a stored hash with the standard parameters.
///
/// # Errors
///
/// Returns [`AuthError::InvalidHashFormat`] if the stored hash is
/// malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    PasswordHasher::new().verify(password, hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Low-cost hasher so the suite stays fast.
    fn fast_hasher() -> PasswordHasher {
        PasswordHasher::with_params(4096, 1, 1).unwrap()
    }

    #[test]
    fn produces_argon2id_phc_strings() {
        let hash = fast_hasher().hash("Secret1!").unwrap();
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn correct_password_verifies() {
        let hasher = fast_hasher();
        let hash = hasher.hash("Secret1!").unwrap();
        assert!(hasher.verify("Secret1!", &hash).unwrap());
    }

    #[test]
    fn wrong_password_does_not_verify() {
        let hasher = fast_hasher();
        let hash = hasher.hash("Secret1!").unwrap();
        assert!(!hasher.verify("Secret2!", &hash).unwrap());
    }

    #[test]
    fn same_password_hashes_differently() {
        let hasher = fast_hasher();
        let h1 = hasher.hash("Secret1!").unwrap();
        let h2 = hasher.hash("Secret1!").unwrap();
        assert_ne!(h1, h2);
        assert!(hasher.verify("Secret1!", &h1).unwrap());
        assert!(hasher.verify("Secret1!", &h2).unwrap());
    }

    #[test]
    fn garbage_stored_hash_is_an_error() {
        let err = fast_hasher().verify("Secret1!", "not-a-phc-hash").unwrap_err();
        assert!(matches!(err, AuthError::InvalidHashFormat));
    }

    #[test]
    fn unicode_passwords_round_trip() {
        let hasher = fast_hasher();
        let hash = hasher.hash("пароль日本語🔐").unwrap();
        assert!(hasher.verify("пароль日本語🔐", &hash).unwrap());
        assert!(!hasher.verify("wrong", &hash).unwrap());
    }
}
