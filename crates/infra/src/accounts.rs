//! Login and account lookup.

use sqlx::SqlitePool;
use tracing::{info, instrument};

use commissary_auth::{verify_password, Actor, UserAccount};
use commissary_core::UserId;

use crate::error::{map_sqlx_error, PipelineError};
use crate::records;

const BAD_CREDENTIALS: &str = "invalid username or password";

/// Verify a username/password pair and return the account it belongs to.
#[instrument(skip(pool, password), err)]
pub async fn authenticate(pool: &SqlitePool, username: &str, password: &str) -> Result<UserAccount, PipelineError> {
    let mut conn = pool
        .acquire()
        .await
        .map_err(|e| map_sqlx_error("acquire", e))?;
    let row = records::user_by_username(&mut conn, username.trim())
        .await?
        .ok_or_else(|| PipelineError::Unauthenticated(BAD_CREDENTIALS.to_string()))?;
    drop(conn);

    let stored_hash = row.password_hash.clone();
    let password = password.to_string();
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| PipelineError::storage(format!("password verification task failed: {e}")))?
        .map_err(|e| PipelineError::storage(e.to_string()))?;

    if !matches {
        return Err(PipelineError::Unauthenticated(BAD_CREDENTIALS.to_string()));
    }

    let account = row.into_account()?;
    info!(user = %account.id, role = %account.role, "login succeeded");
    Ok(account)
}

/// The account behind an authenticated actor.
pub async fn account(pool: &SqlitePool, actor: &Actor) -> Result<UserAccount, PipelineError> {
    account_by_id(pool, actor.id).await
}

pub async fn account_by_id(pool: &SqlitePool, id: UserId) -> Result<UserAccount, PipelineError> {
    let mut conn = pool
        .acquire()
        .await
        .map_err(|e| map_sqlx_error("acquire", e))?;
    records::user_by_id(&mut conn, id)
        .await?
        .ok_or_else(|| PipelineError::Unauthenticated(format!("unknown user {id}")))?
        .into_account()
}
