//! Reversible credential transport codec.
//!
//! Login requests carry the password encrypted under a fixed shared key
//! so the literal value never appears in transport logs or request
//! bodies. This is obfuscation of the wire value only; the server still
//! verifies the decoded plaintext against the Argon2 hash, and a failed
//! decode must be treated exactly like a wrong password.
//!
//! Wire format: URL-safe base64 (no padding) of `nonce || ciphertext`,
//! AES-256-GCM with a random 12-byte nonce per encode.

use crate::error::AuthError;
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;

/// AES-256 key size in bytes.
const KEY_SIZE: usize = 32;

/// GCM nonce size in bytes.
const NONCE_SIZE: usize = 12;

/// Environment variable holding the hex-encoded shared key.
const KEY_ENV_VAR: &str = "MERCATO_TRANSPORT_KEY";

/// Symmetric codec for passwords in flight.
#[derive(Clone)]
pub struct CredentialCodec {
    cipher: Aes256Gcm,
}

impl CredentialCodec {
    /// Create a codec from the `MERCATO_TRANSPORT_KEY` environment
    /// variable (hex-encoded, 32 bytes).
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidKey`] if the variable is missing or
    /// does not decode to a 32-byte key.
    pub fn from_env() -> Result<Self, AuthError> {
        let key_hex = std::env::var(KEY_ENV_VAR)
            .map_err(|_| AuthError::InvalidKey(format!("{KEY_ENV_VAR} is not set")))?;
        Self::from_hex_key(&key_hex)
    }

    /// Create a codec from a hex-encoded key string.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidKey`] on malformed hex or wrong length.
    pub fn from_hex_key(key_hex: &str) -> Result<Self, AuthError> {
        let key = hex::decode(key_hex.trim())
            .map_err(|e| AuthError::InvalidKey(format!("invalid hex key: {e}")))?;
        Self::from_key(&key)
    }

    /// Create a codec from raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidKey`] if the key is not 32 bytes.
    pub fn from_key(key: &[u8]) -> Result<Self, AuthError> {
        if key.len() != KEY_SIZE {
            return Err(AuthError::InvalidKey(format!(
                "expected {KEY_SIZE} byte key, got {}",
                key.len()
            )));
        }

        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|e| AuthError::InvalidKey(e.to_string()))?;
        Ok(Self { cipher })
    }

    /// Encrypt a plaintext credential into its wire form.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EncodeFailed`] if encryption fails.
    pub fn encode(&self, plaintext: &str) -> Result<String, AuthError> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| AuthError::EncodeFailed(e.to_string()))?;

        let mut wire = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        wire.extend_from_slice(&nonce_bytes);
        wire.extend_from_slice(&ciphertext);

        Ok(URL_SAFE_NO_PAD.encode(wire))
    }

    /// Decrypt a wire value back to the plaintext credential.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DecodeFailed`] for malformed base64, short
    /// input, tampered ciphertext or non-UTF-8 plaintext. Callers map
    /// this to their bad-credential outcome, never to a server fault.
    pub fn decode(&self, wire: &str) -> Result<String, AuthError> {
        let raw = URL_SAFE_NO_PAD
            .decode(wire)
            .map_err(|e| AuthError::DecodeFailed(format!("invalid base64: {e}")))?;

        if raw.len() <= NONCE_SIZE {
            return Err(AuthError::DecodeFailed("wire value too short".to_string()));
        }

        let (nonce_bytes, ciphertext) = raw.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| AuthError::DecodeFailed("authentication failed".to_string()))?;

        String::from_utf8(plaintext)
            .map_err(|_| AuthError::DecodeFailed("plaintext is not UTF-8".to_string()))
    }
}

impl std::fmt::Debug for CredentialCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCodec")
            .field("cipher", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_codec() -> CredentialCodec {
        let key: Vec<u8> = (0u8..32).collect();
        CredentialCodec::from_key(&key).unwrap()
    }

    #[test]
    fn round_trips_printable_ascii() {
        let codec = test_codec();
        // Every printable ASCII character in one credential.
        let printable: String = (0x20u8..=0x7e).map(char::from).collect();

        let wire = codec.encode(&printable).unwrap();
        assert_eq!(codec.decode(&wire).unwrap(), printable);
    }

    #[test]
    fn wire_value_differs_from_plaintext() {
        let codec = test_codec();
        let wire = codec.encode("Secret1!").unwrap();
        assert_ne!(wire, "Secret1!");
        assert!(!wire.contains("Secret1!"));
    }

    #[test]
    fn fresh_nonce_per_encode() {
        let codec = test_codec();
        let w1 = codec.encode("Secret1!").unwrap();
        let w2 = codec.encode("Secret1!").unwrap();
        assert_ne!(w1, w2);
        assert_eq!(codec.decode(&w1).unwrap(), codec.decode(&w2).unwrap());
    }

    #[test]
    fn tampered_wire_value_fails_decode() {
        let codec = test_codec();
        let wire = codec.encode("Secret1!").unwrap();

        let mut bytes = URL_SAFE_NO_PAD.decode(&wire).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let tampered = URL_SAFE_NO_PAD.encode(bytes);

        let err = codec.decode(&tampered).unwrap_err();
        assert!(err.is_decode_error());
    }

    #[test]
    fn malformed_base64_fails_decode() {
        let err = test_codec().decode("!!! not base64 !!!").unwrap_err();
        assert!(err.is_decode_error());
    }

    #[test]
    fn truncated_wire_value_fails_decode() {
        let err = test_codec().decode("AAAA").unwrap_err();
        assert!(err.is_decode_error());
    }

    #[test]
    fn wrong_key_fails_decode() {
        let wire = test_codec().encode("Secret1!").unwrap();

        let other_key: Vec<u8> = (100u8..132).collect();
        let other = CredentialCodec::from_key(&other_key).unwrap();

        assert!(other.decode(&wire).unwrap_err().is_decode_error());
    }

    #[test]
    fn rejects_short_keys() {
        let err = CredentialCodec::from_key(&[0u8; 16]).unwrap_err();
        assert!(matches!(err, AuthError::InvalidKey(_)));
    }
}
