//! Domain error model.
//!
//! Keep this focused on deterministic, business/domain failures (validation,
//! invariants, conflicts). Transport and auth concerns belong elsewhere.

use serde::Serialize;
use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// A single field-level violation, carried inside `DomainError::Validation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl core::fmt::Display for FieldError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Domain-level error.
///
/// Validation failures name every offending field; uniqueness and referential
/// failures name the conflicting field. Raw storage errors never escape as
/// anything other than `Internal`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A payload failed structural or invariant checks.
    #[error("validation failed: {}", format_fields(.0))]
    Validation(Vec<FieldError>),

    /// A uniqueness or referential conflict on write.
    #[error("conflict on {field}: {message}")]
    Conflict { field: String, message: String },

    /// The operation targeted a nonexistent entity.
    #[error("not found")]
    NotFound,

    /// Unexpected failure (e.g. store unavailable). Detail is for logs only.
    #[error("internal error: {0}")]
    Internal(String),
}

fn format_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl DomainError {
    /// Single-field validation failure.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    /// Multi-field validation failure. Empty input is a caller bug; it is
    /// still reported as a validation error with no detail rather than a panic.
    pub fn validation_all(fields: Vec<FieldError>) -> Self {
        Self::Validation(fields)
    }

    pub fn conflict(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conflict {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// The field-level detail, if any (used by the envelope layer).
    pub fn field_errors(&self) -> Option<&[FieldError]> {
        match self {
            Self::Validation(fields) => Some(fields),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_names_every_field() {
        let err = DomainError::validation_all(vec![
            FieldError::new("startDate", "must not be after endDate"),
            FieldError::new("endDate", "must not be before startDate"),
        ]);
        let text = err.to_string();
        assert!(text.contains("startDate"));
        assert!(text.contains("endDate"));
    }

    #[test]
    fn conflict_names_the_field() {
        let err = DomainError::conflict("email", "already registered");
        assert!(err.to_string().contains("email"));
    }
}
