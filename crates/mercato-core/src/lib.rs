//! Core types shared across the mercato platform.
//!
//! Contains the strongly typed identifiers used by the identity and
//! session crates. No I/O and no heavyweight dependencies live here.

pub mod ids;

pub use ids::{AccountId, ParseIdError};
