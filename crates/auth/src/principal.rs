use serde::{Deserialize, Serialize};

use commissary_core::UserId;

use crate::Role;

/// An authenticated identity: who is acting, and under which role.
///
/// Produced by login or token verification. The mutation pipeline re-reads the
/// account before acting, so a stale role in a token is never trusted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }
}
