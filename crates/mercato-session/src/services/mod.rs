//! Session services.

pub mod auth_service;
pub mod reset_service;
pub mod token_service;

pub use auth_service::AuthService;
pub use reset_service::PasswordResetTokenService;
pub use token_service::{TokenConfig, TokenService};
