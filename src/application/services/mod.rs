//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (DiagramStore, IdGenerator, etc.)
//! but are themselves concrete structs, not traits.

mod catalog;
mod editor;

pub use catalog::DiagramCatalog;
pub use editor::{BoneAdded, DiagramEditor, EditorDefaults, SaveOutcome};
