//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;
use crate::infrastructure::traits::StoreError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{context}: {source}")]
    Store {
        context: String,
        #[source]
        source: StoreError,
    },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("bone not found: {0}")]
    BoneNotFound(String),
}

impl ApplicationError {
    /// Text suitable for a transient notification.
    pub fn user_message(&self) -> String {
        match self {
            ApplicationError::Store { source, .. } => source.user_message().to_string(),
            other => other.to_string(),
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
