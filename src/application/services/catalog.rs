//! Cached view of all diagrams in the store.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::application::error_ext::StoreResultExt;
use crate::application::ApplicationResult;
use crate::domain::{validate_title, Diagram, DiagramSummary};
use crate::infrastructure::traits::DiagramStore;

/// Explicit replacement for a global diagram list.
///
/// A failed call leaves the cache as it was and records the message.
pub struct DiagramCatalog {
    store: Arc<dyn DiagramStore>,
    diagrams: Vec<Diagram>,
    last_error: Option<String>,
}

impl DiagramCatalog {
    pub fn new(store: Arc<dyn DiagramStore>) -> Self {
        Self {
            store,
            diagrams: Vec::new(),
            last_error: None,
        }
    }

    pub fn diagrams(&self) -> &[Diagram] {
        &self.diagrams
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Replace the cache with the store's full list.
    #[instrument(level = "debug", skip(self))]
    pub async fn refresh(&mut self) -> ApplicationResult<&[Diagram]> {
        let result = self
            .store
            .list_diagrams()
            .await
            .with_store_context("list diagrams", "");
        let diagrams = self.record(result)?;
        debug!("refresh: {} diagrams", diagrams.len());
        self.diagrams = diagrams;
        Ok(&self.diagrams)
    }

    /// Load one diagram and move it to the end of the cache.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch(&mut self, id: &str) -> ApplicationResult<Diagram> {
        let result = self
            .store
            .get_diagram(id)
            .await
            .with_store_context("fetch diagram", id);
        let diagram = self.record(result)?;
        self.diagrams.retain(|d| d.id != id);
        self.diagrams.push(diagram.clone());
        Ok(diagram)
    }

    /// Create a diagram; newest first in the cache.
    #[instrument(level = "debug", skip(self))]
    pub async fn create(&mut self, title: &str) -> ApplicationResult<Diagram> {
        let title = validate_title(title)?;
        let result = self
            .store
            .create_diagram(&title)
            .await
            .with_store_context("create diagram", &title);
        let diagram = self.record(result)?;
        self.diagrams.insert(0, diagram.clone());
        Ok(diagram)
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn delete(&mut self, id: &str) -> ApplicationResult<()> {
        let result = self
            .store
            .delete_diagram(id)
            .await
            .with_store_context("delete diagram", id);
        self.record(result)?;
        self.diagrams.retain(|d| d.id != id);
        Ok(())
    }

    /// Case-insensitive title substring match; empty query matches all.
    pub fn search(&self, query: &str) -> Vec<&Diagram> {
        let needle = query.to_lowercase();
        self.diagrams
            .iter()
            .filter(|d| d.title.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn summaries(&self, query: &str) -> Vec<DiagramSummary> {
        self.search(query)
            .into_iter()
            .map(DiagramSummary::from)
            .collect()
    }

    fn record<T>(&mut self, result: ApplicationResult<T>) -> ApplicationResult<T> {
        match result {
            Ok(value) => {
                self.last_error = None;
                Ok(value)
            }
            Err(e) => {
                warn!("{}", e);
                self.last_error = Some(e.user_message());
                Err(e)
            }
        }
    }
}
