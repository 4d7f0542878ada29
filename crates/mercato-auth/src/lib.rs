//! Cryptographic primitives for the mercato identity core.
//!
//! This crate holds the leaf building blocks that the session services
//! compose:
//!
//! - RS256 access-token signing and validation ([`jwt`])
//! - the access-token claim set ([`claims`])
//! - Argon2id password hashing ([`password`])
//! - the reversible credential transport codec ([`transport`])
//! - the per-request [`SecurityPrincipal`] view
//!
//! Nothing in this crate touches the network or the database.

pub mod claims;
pub mod error;
pub mod jwt;
pub mod password;
pub mod principal;
pub mod transport;

pub use claims::{AccessClaims, AccessClaimsBuilder};
pub use error::AuthError;
pub use jwt::{decode_access_token, encode_access_token};
pub use password::{hash_password, verify_password, PasswordHasher};
pub use principal::SecurityPrincipal;
pub use transport::CredentialCodec;
