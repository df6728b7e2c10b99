//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod error;
pub mod forest;
pub mod layout;
pub mod tree_traits;
pub mod view;

pub use entities::*;
pub use error::{validate_name, validate_title, DomainError};
pub use forest::{ForestEditor, TreeEditingPort};
pub use layout::{compute_layout, DiagramLayout, Viewport};
pub use tree_traits::TreeNodeConvert;
pub use view::{PanZoom, PointerEvent, ViewTransform};
