//! I/O boundary traits for testability
//!
//! These traits abstract the remote diagram store and id generation,
//! allowing services to be tested with mock implementations.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Diagram, DiagramUpdate};

/// Failure reported by a diagram store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Non-success response; `message` comes from the body when present.
    #[error("{message} (status {status})")]
    Rejected { status: u16, message: String },

    /// The request never produced a response.
    #[error("{message}: {cause}")]
    Transport { message: String, cause: String },

    /// Response body did not match the expected shape.
    #[error("{message}: {cause}")]
    Decode { message: String, cause: String },
}

impl StoreError {
    /// Human-readable message without transport details.
    pub fn user_message(&self) -> &str {
        match self {
            StoreError::Rejected { message, .. }
            | StoreError::Transport { message, .. }
            | StoreError::Decode { message, .. } => message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Remote persistence of diagrams. The forest is always saved whole.
#[async_trait]
pub trait DiagramStore: Send + Sync {
    async fn list_diagrams(&self) -> Result<Vec<Diagram>, StoreError>;

    async fn get_diagram(&self, id: &str) -> Result<Diagram, StoreError>;

    /// Server assigns id, attribution, timestamps and an empty forest.
    async fn create_diagram(&self, title: &str) -> Result<Diagram, StoreError>;

    /// Partial update; absent fields stay unchanged server-side.
    async fn update_diagram(&self, id: &str, update: DiagramUpdate) -> Result<Diagram, StoreError>;

    async fn delete_diagram(&self, id: &str) -> Result<(), StoreError>;
}

/// Source of globally unique bone ids.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Random UUID v4 ids.
#[derive(Debug, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_uuid_generator_when_drawing_twice_then_ids_differ() {
        let ids = UuidGenerator;
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }
}
