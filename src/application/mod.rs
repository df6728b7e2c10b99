//! Application layer: services and use cases
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod error;
pub mod error_ext;
pub mod notification;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::StoreResultExt;
pub use notification::{Notification, Severity};
