//! User accounts (operators of the system, not inmates).

use chrono::{DateTime, Utc};
use serde::Serialize;

use commissary_core::{optional_text, required_text, DomainError, DomainResult, UserId};

use crate::Role;

const USERNAME_MAX: usize = 50;
const NAME_MAX: usize = 100;
const EMAIL_MAX: usize = 254;

/// A stored user account as exposed to callers. The password hash never leaves storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserAccount {
    pub id: UserId,
    pub username: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated input for creating a user account.
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

impl core::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .finish()
    }
}

impl NewUser {
    pub fn new(
        username: Option<String>,
        password: Option<String>,
        role: Option<String>,
        first_name: Option<String>,
        last_name: Option<String>,
        email: Option<String>,
    ) -> DomainResult<Self> {
        let username = required_text("username", username, USERNAME_MAX)?;
        if username.chars().any(char::is_whitespace) {
            return Err(DomainError::validation("username cannot contain whitespace"));
        }

        // Passwords are not trimmed; length is checked when hashing.
        let password = password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| DomainError::validation("password is required"))?;

        let role: Role = role
            .as_deref()
            .ok_or_else(|| DomainError::validation("role is required"))?
            .parse()?;

        let email = optional_text("email", email, EMAIL_MAX)?;
        if let Some(email) = &email {
            if !email.contains('@') {
                return Err(DomainError::validation("email must contain '@'"));
            }
        }

        Ok(Self {
            username,
            password,
            role,
            first_name: required_text("first_name", first_name, NAME_MAX)?,
            last_name: required_text("last_name", last_name, NAME_MAX)?,
            email,
        })
    }
}
