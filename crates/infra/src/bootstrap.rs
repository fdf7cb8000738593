//! One-time initialisation: default accounts for a fresh database.
//!
//! Run explicitly (`commissary-api init`), never on every start. Seeding only
//! happens while the `users` table is empty, so repeated runs are no-ops.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};

use commissary_auth::{hash_password, Role, UserAccount};
use commissary_core::UserId;

use crate::error::{map_sqlx_error, PipelineError};
use crate::writes::users::insert_user;

/// (username, password, role, first name, last name)
pub const DEFAULT_ACCOUNTS: &[(&str, &str, Role, &str, &str)] = &[
    ("admin", "admin123", Role::Admin, "System", "Administrator"),
    ("staff", "staff123", Role::Staff, "Default", "Staff"),
    ("trustee", "trustee123", Role::Trustee, "Default", "Trustee"),
];

/// Seed [`DEFAULT_ACCOUNTS`] if no user exists. Returns how many were created.
pub async fn seed_default_users(pool: &SqlitePool) -> Result<usize, PipelineError> {
    let hashed = tokio::task::spawn_blocking(|| {
        DEFAULT_ACCOUNTS
            .iter()
            .map(|(_, password, ..)| hash_password(password))
            .collect::<Result<Vec<_>, _>>()
    })
    .await
    .map_err(|e| PipelineError::storage(format!("password hashing task failed: {e}")))?
    .map_err(|e| PipelineError::storage(e.to_string()))?;

    let mut tx = pool
        .begin_with("BEGIN IMMEDIATE")
        .await
        .map_err(|e| map_sqlx_error("begin_transaction", e))?;

    let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("count_users", e))?;
    if existing > 0 {
        info!(existing, "users already present; skipping default accounts");
        return Ok(0);
    }

    let now = Utc::now();
    for ((username, _, role, first_name, last_name), password_hash) in DEFAULT_ACCOUNTS.iter().zip(&hashed) {
        let account = UserAccount {
            id: UserId::new(),
            username: username.to_string(),
            role: *role,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: None,
            created_at: now,
        };
        insert_user(&mut tx, &account, password_hash).await?;
    }

    tx.commit()
        .await
        .map_err(|e| map_sqlx_error("commit", e))?;

    warn!(
        accounts = DEFAULT_ACCOUNTS.len(),
        "seeded default accounts with well-known passwords; change them before production use"
    );
    Ok(DEFAULT_ACCOUNTS.len())
}
