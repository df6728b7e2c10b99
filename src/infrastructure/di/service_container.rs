//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;
use std::time::Duration;

use crate::application::services::{DiagramCatalog, DiagramEditor};
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::{ForestEditor, TreeEditingPort};
use crate::infrastructure::store::HttpDiagramStore;
use crate::infrastructure::traits::{DiagramStore, IdGenerator, UuidGenerator};
use crate::infrastructure::InfraResult;

/// Container holding all application collaborators.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Remote diagram store
    pub store: Arc<dyn DiagramStore>,

    /// Bone id source
    pub ids: Arc<dyn IdGenerator>,

    /// Tree engine
    pub tree: Arc<dyn TreeEditingPort>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        let store = HttpDiagramStore::new(
            &settings.server_url,
            Duration::from_secs(settings.timeout_secs),
        )?;
        Ok(Self::with_deps(
            settings,
            Arc::new(store),
            Arc::new(UuidGenerator),
        ))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        store: Arc<dyn DiagramStore>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            store,
            ids,
            tree: Arc::new(ForestEditor),
        }
    }

    pub fn catalog(&self) -> DiagramCatalog {
        DiagramCatalog::new(Arc::clone(&self.store))
    }

    /// Load a diagram into a fresh editing session.
    pub async fn open_editor(&self, id: &str) -> ApplicationResult<DiagramEditor> {
        DiagramEditor::open(
            id,
            Arc::clone(&self.store),
            Arc::clone(&self.ids),
            Arc::clone(&self.tree),
            self.settings.editor_defaults(),
        )
        .await
    }
}
