//! Database entity models.

pub mod account;
pub mod account_role;
pub mod refresh_token;
