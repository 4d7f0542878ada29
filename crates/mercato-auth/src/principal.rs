//! The authenticated principal.

use mercato_core::AccountId;

/// In-memory view of an authenticated account.
///
/// Built fresh for every authentication event and passed explicitly to
/// whichever component needs identity context; never cached across
/// requests and never read from ambient global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityPrincipal {
    /// The account's opaque numeric id.
    pub account_id: AccountId,
    /// The account's unique username.
    pub username: String,
    /// The role under which tokens are minted for this principal.
    pub primary_role: String,
}

impl SecurityPrincipal {
    /// Build a principal from its parts.
    #[must_use]
    pub fn new(
        account_id: AccountId,
        username: impl Into<String>,
        primary_role: impl Into<String>,
    ) -> Self {
        Self {
            account_id,
            username: username.into(),
            primary_role: primary_role.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carries_its_parts() {
        let p = SecurityPrincipal::new(AccountId::from_i64(5), "alice", "SELLER");
        assert_eq!(p.account_id, AccountId::from_i64(5));
        assert_eq!(p.username, "alice");
        assert_eq!(p.primary_role, "SELLER");
    }
}
