//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent rejected user input.
/// Missing ids are not errors: tree edits degrade to no-ops instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("diagram title must not be empty")]
    EmptyTitle,

    #[error("bone name must not be empty")]
    EmptyName,
}

/// Trim user input and reject it when nothing is left.
pub fn validate_title(raw: &str) -> Result<String, DomainError> {
    non_empty(raw).ok_or(DomainError::EmptyTitle)
}

/// Trim a bone name and reject it when nothing is left.
pub fn validate_name(raw: &str) -> Result<String, DomainError> {
    non_empty(raw).ok_or(DomainError::EmptyName)
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
