//! Persistence layer for the mercato identity core.
//!
//! Row models are plain `sqlx::FromRow` structs with their finder and
//! update queries attached as associated functions. Multi-statement
//! transactions (refresh-token rotation) live with the services that
//! own them, not here.

pub mod models;

pub use models::account::{Account, AccountProvider};
pub use models::account_role::AccountRole;
pub use models::refresh_token::RefreshToken;
