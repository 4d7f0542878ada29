//! Login, token issuance, refresh rotation and password reset.
//!
//! Each request is an independent unit of work; the only shared mutable
//! state is the refresh-token record set in Postgres, and every
//! mutation of it is either a single statement or one transaction.

pub mod error;
pub mod models;
pub mod services;

pub use error::SessionError;
pub use models::{LoginRequest, RefreshRequest, TokenResponse};
pub use services::{AuthService, PasswordResetTokenService, TokenConfig, TokenService};
