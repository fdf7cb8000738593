use thiserror::Error;

use crate::{Action, Actor, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("permission denied: role {role} may not perform '{action}'")]
    PermissionDenied { action: Action, role: Role },
}

/// Check an actor's role against the policy table.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(actor: &Actor, action: Action) -> Result<(), AuthzError> {
    if action.permits(actor.role) {
        Ok(())
    } else {
        tracing::info!(actor = %actor.id, role = %actor.role, action = %action, "permission denied");
        Err(AuthzError::PermissionDenied {
            action,
            role: actor.role,
        })
    }
}
