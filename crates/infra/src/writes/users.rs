use async_trait::async_trait;
use sqlx::SqliteConnection;

use commissary_auth::{hash_password, Action, NewUser, UserAccount};
use commissary_core::UserId;

use crate::error::{map_sqlx_error, PipelineError};
use crate::pipeline::{Applied, DomainWrite, WriteEnv};

/// Create a user account. The password is hashed before the transaction opens.
#[derive(Debug, Clone)]
pub struct CreateUser {
    user: NewUser,
    password_hash: String,
}

impl CreateUser {
    /// Hash the password on the blocking pool.
    pub async fn prepare(user: NewUser) -> Result<Self, PipelineError> {
        let password = user.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| PipelineError::storage(format!("password hashing task failed: {e}")))?
            .map_err(|e| PipelineError::Validation(e.to_string()))?;
        Ok(Self { user, password_hash })
    }
}

#[async_trait]
impl DomainWrite for CreateUser {
    type Output = UserAccount;

    fn action(&self) -> Action {
        Action::CreateUser
    }

    async fn apply(self, conn: &mut SqliteConnection, env: &WriteEnv<'_>) -> Result<Applied<UserAccount>, PipelineError> {
        let account = UserAccount {
            id: UserId::new(),
            username: self.user.username,
            role: self.user.role,
            first_name: self.user.first_name,
            last_name: self.user.last_name,
            email: self.user.email,
            created_at: env.now,
        };
        insert_user(conn, &account, &self.password_hash)
            .await
            .map_err(|e| match e {
                PipelineError::Conflict(_) => {
                    PipelineError::Conflict(format!("username '{}' is taken", account.username))
                }
                other => other,
            })?;

        let detail = format!("User {} added with role {}", account.username, account.role);
        Ok(Applied::new(account, detail))
    }
}

pub(crate) async fn insert_user(
    conn: &mut SqliteConnection,
    account: &UserAccount,
    password_hash: &str,
) -> Result<(), PipelineError> {
    sqlx::query(
        "INSERT INTO users (id, username, password_hash, role, first_name, last_name, email, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(*account.id.as_uuid())
    .bind(&account.username)
    .bind(password_hash)
    .bind(account.role.as_str())
    .bind(&account.first_name)
    .bind(&account.last_name)
    .bind(account.email.as_deref())
    .bind(account.created_at)
    .execute(conn)
    .await
    .map_err(|e| map_sqlx_error("insert_user", e))?;
    Ok(())
}
