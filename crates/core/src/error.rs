//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, conflicts). Storage and authorization failures are modelled by
/// the crates that own those concerns.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. missing or malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated (e.g. returning an item that is not assigned).
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A referenced record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness or state conflict.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}

/// Trim a required text field, rejecting absent or blank values.
pub fn required_text(field: &str, value: Option<String>, max_len: usize) -> DomainResult<String> {
    let value = value.unwrap_or_default();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    if trimmed.chars().count() > max_len {
        return Err(DomainError::validation(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field; blank values become `None`.
pub fn optional_text(field: &str, value: Option<String>, max_len: usize) -> DomainResult<Option<String>> {
    match value {
        None => Ok(None),
        Some(v) if v.trim().is_empty() => Ok(None),
        Some(v) => required_text(field, Some(v), max_len).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_trims_and_rejects_blank() {
        assert_eq!(required_text("name", Some("  Jane Doe ".into()), 100).unwrap(), "Jane Doe");
        assert!(matches!(
            required_text("name", Some("   ".into()), 100),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(required_text("name", None, 100), Err(DomainError::Validation(_))));
    }

    #[test]
    fn required_text_enforces_length() {
        let err = required_text("name", Some("x".repeat(11)), 10).unwrap_err();
        assert!(err.to_string().contains("at most 10"));
    }

    #[test]
    fn optional_text_maps_blank_to_none() {
        assert_eq!(optional_text("vendor", Some(" ".into()), 10).unwrap(), None);
        assert_eq!(optional_text("vendor", None, 10).unwrap(), None);
        assert_eq!(optional_text("vendor", Some("Acme".into()), 10).unwrap(), Some("Acme".into()));
    }
}
