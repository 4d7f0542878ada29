//! Account role assignments.

use chrono::{DateTime, Utc};
use mercato_core::AccountId;
use sqlx::FromRow;

/// A role assigned to an account.
///
/// Roles are plain names ("USER", "SELLER", "ADMIN"); the first role
/// returned by [`AccountRole::names`] is treated as the account's
/// primary role when minting tokens.
#[derive(Debug, Clone, FromRow)]
pub struct AccountRole {
    pub id: i64,
    pub account_id: i64,
    pub role_name: String,
    pub created_at: DateTime<Utc>,
}

impl AccountRole {
    /// All role names assigned to an account, oldest assignment first.
    pub async fn names(pool: &sqlx::PgPool, account_id: AccountId) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            r"
            SELECT role_name FROM account_roles
            WHERE account_id = $1
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(account_id.as_i64())
        .fetch_all(pool)
        .await
    }

    /// Assign a role to an account. Idempotent on the (account, role)
    /// pair.
    pub async fn assign(
        pool: &sqlx::PgPool,
        account_id: AccountId,
        role_name: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r"
            INSERT INTO account_roles (account_id, role_name, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (account_id, role_name) DO NOTHING
            ",
        )
        .bind(account_id.as_i64())
        .bind(role_name)
        .execute(pool)
        .await?;

        Ok(())
    }
}
