//! Pipeline error model and SQLx error mapping.
//!
//! ## Error Mapping
//!
//! | SQLx error | SQLite condition | PipelineError |
//! |------------|------------------|---------------|
//! | Database (unique violation) | `UNIQUE` / `PRIMARY KEY` | `Conflict` |
//! | Database (foreign key violation) | `FOREIGN KEY` | `NotFound` |
//! | Database (trigger abort) | `RAISE(ABORT, ...)` | `Conflict` |
//! | Database (other) | any other | `StorageUnavailable` |
//! | PoolClosed / PoolTimedOut / Io / other | n/a | `StorageUnavailable` |

use thiserror::Error;

use commissary_auth::{Action, AuthzError, Role};
use commissary_core::DomainError;

/// Message raised by the trigger that keeps retired barcodes out of `items`.
pub(crate) const RETIRED_BARCODE_TRIGGER: &str = "retired barcode";

/// Single error surfaced by every pipeline operation and store query.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Caller identity is missing, invalid, or no longer a known user.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("permission denied: role {role} may not perform '{action}'")]
    PermissionDenied { action: Action, role: Role },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    /// Every candidate barcode for the prefix collided.
    #[error("barcode allocation exhausted for prefix {prefix} after {attempts} attempts")]
    AllocationExhausted { prefix: String, attempts: u32 },

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl PipelineError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::StorageUnavailable(msg.into())
    }
}

impl From<DomainError> for PipelineError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => PipelineError::Validation(msg),
            DomainError::InvariantViolation(msg) | DomainError::Conflict(msg) => PipelineError::Conflict(msg),
            DomainError::NotFound(what) => PipelineError::NotFound(what),
        }
    }
}

impl From<AuthzError> for PipelineError {
    fn from(value: AuthzError) -> Self {
        match value {
            AuthzError::PermissionDenied { action, role } => PipelineError::PermissionDenied { action, role },
        }
    }
}

impl From<sqlx::Error> for PipelineError {
    fn from(value: sqlx::Error) -> Self {
        map_sqlx_error("query", value)
    }
}

pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> PipelineError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {operation}: {}", db_err.message());
            if db_err.is_unique_violation() {
                PipelineError::Conflict(msg)
            } else if db_err.is_foreign_key_violation() {
                PipelineError::NotFound(format!("referenced record missing in {operation}"))
            } else if db_err.message().contains(RETIRED_BARCODE_TRIGGER)
                || db_err.message().contains("append-only")
            {
                PipelineError::Conflict(msg)
            } else {
                PipelineError::StorageUnavailable(msg)
            }
        }
        sqlx::Error::RowNotFound => PipelineError::NotFound(format!("no row returned in {operation}")),
        sqlx::Error::PoolClosed => {
            PipelineError::StorageUnavailable(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::PoolTimedOut => {
            PipelineError::StorageUnavailable(format!("timed out acquiring a connection in {operation}"))
        }
        other => PipelineError::StorageUnavailable(format!("{operation}: {other}")),
    }
}

/// A constraint or trigger violation that the barcode allocator treats as a collision.
pub(crate) fn is_barcode_collision(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation() || db_err.message().contains(RETIRED_BARCODE_TRIGGER)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_pipeline_kinds() {
        assert!(matches!(
            PipelineError::from(DomainError::validation("x")),
            PipelineError::Validation(_)
        ));
        assert!(matches!(
            PipelineError::from(DomainError::invalid_id("x")),
            PipelineError::Validation(_)
        ));
        assert!(matches!(
            PipelineError::from(DomainError::conflict("x")),
            PipelineError::Conflict(_)
        ));
        assert!(matches!(
            PipelineError::from(DomainError::not_found("inmate")),
            PipelineError::NotFound(_)
        ));
    }

    #[test]
    fn pool_errors_are_storage_failures() {
        assert!(matches!(
            map_sqlx_error("begin", sqlx::Error::PoolClosed),
            PipelineError::StorageUnavailable(_)
        ));
        assert!(!is_barcode_collision(&sqlx::Error::PoolTimedOut));
    }
}
