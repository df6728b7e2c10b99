//! Error conversion helpers for store calls
//!
//! Provides an extension trait for cleaner error handling with operation context.

use crate::application::{ApplicationError, ApplicationResult};
use crate::infrastructure::traits::StoreError;

/// Extension trait for converting store results to `ApplicationResult` with context.
pub trait StoreResultExt<T> {
    /// Add operation context to a store error.
    ///
    /// # Example
    /// ```ignore
    /// store.get_diagram(id).await
    ///     .with_store_context("fetch diagram", id)?;
    /// ```
    fn with_store_context(self, action: &str, target: &str) -> ApplicationResult<T>;
}

impl<T> StoreResultExt<T> for Result<T, StoreError> {
    fn with_store_context(self, action: &str, target: &str) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::Store {
            context: if target.is_empty() {
                action.to_string()
            } else {
                format!("{}: {}", action, target)
            },
            source: e,
        })
    }
}
