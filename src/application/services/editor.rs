//! Diagram editing session
//!
//! Applies tree edits to the in-memory diagram first, then persists the
//! whole forest. A failed or cancelled save keeps the local change: there is
//! no rollback and no retry, the next edit saves the full forest again.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::application::error_ext::StoreResultExt;
use crate::application::notification::Notification;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    compute_layout, forest, validate_name, validate_title, Bone, Diagram, DiagramLayout,
    DiagramUpdate, TreeEditingPort, Viewport,
};
use crate::infrastructure::traits::{DiagramStore, IdGenerator};

/// Names and attribution given to freshly created bones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorDefaults {
    pub root_name: String,
    pub child_name: String,
    pub created_by: String,
}

impl Default for EditorDefaults {
    fn default() -> Self {
        Self {
            root_name: "New Bone".into(),
            child_name: "New Child Bone".into(),
            created_by: "user".into(),
        }
    }
}

/// Result of the persistence step of an edit.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// Store accepted the change and returned its copy.
    Saved(Diagram),
    /// Nothing changed, no request was sent.
    Unchanged,
    /// Store call failed; local state is kept.
    Failed(Notification),
    /// Caller cancelled before the store answered; local state is kept.
    Cancelled,
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved(_))
    }
}

/// A bone was inserted locally.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneAdded {
    pub bone_id: String,
    pub outcome: SaveOutcome,
}

/// Editing session over one diagram.
pub struct DiagramEditor {
    diagram: Diagram,
    store: Arc<dyn DiagramStore>,
    ids: Arc<dyn IdGenerator>,
    tree: Arc<dyn TreeEditingPort>,
    defaults: EditorDefaults,
}

impl DiagramEditor {
    /// Start a session on an already loaded diagram.
    pub fn new(
        diagram: Diagram,
        store: Arc<dyn DiagramStore>,
        ids: Arc<dyn IdGenerator>,
        tree: Arc<dyn TreeEditingPort>,
        defaults: EditorDefaults,
    ) -> Self {
        Self {
            diagram,
            store,
            ids,
            tree,
            defaults,
        }
    }

    /// Load the diagram from the store and start a session on it.
    pub async fn open(
        id: &str,
        store: Arc<dyn DiagramStore>,
        ids: Arc<dyn IdGenerator>,
        tree: Arc<dyn TreeEditingPort>,
        defaults: EditorDefaults,
    ) -> ApplicationResult<Self> {
        let diagram = store
            .get_diagram(id)
            .await
            .with_store_context("fetch diagram", id)?;
        debug!("open: {} bones in '{}'", forest::count_nodes(&diagram.bones), diagram.title);
        Ok(Self::new(diagram, store, ids, tree, defaults))
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn bones(&self) -> &[Bone] {
        &self.diagram.bones
    }

    /// Top-level bone count and total bone count.
    pub fn stats(&self) -> (usize, usize) {
        (self.diagram.bones.len(), forest::count_nodes(&self.diagram.bones))
    }

    /// Layout of the current forest; recomputed from scratch on every call.
    pub fn layout(&self, viewport: Viewport) -> DiagramLayout {
        compute_layout(&self.diagram.bones, viewport)
    }

    /// Append a main bone; `None` uses the default name.
    #[instrument(level = "debug", skip(self, cancel), fields(diagram = %self.diagram.id))]
    pub async fn add_root_bone(
        &mut self,
        name: Option<&str>,
        cancel: &CancellationToken,
    ) -> ApplicationResult<BoneAdded> {
        let name = self.bone_name(name, &self.defaults.root_name)?;
        let bone = Bone::new_root(self.ids.next_id(), name, self.defaults.created_by.clone());
        let bone_id = bone.id.clone();
        self.diagram.bones = self.tree.add_root(&self.diagram.bones, bone);
        let outcome = self.save_bones(cancel).await;
        Ok(BoneAdded { bone_id, outcome })
    }

    /// Append a child under `parent_id`; `None` uses the default name.
    ///
    /// An unknown parent leaves the forest unchanged; the save still goes out.
    #[instrument(level = "debug", skip(self, cancel), fields(diagram = %self.diagram.id))]
    pub async fn add_child_bone(
        &mut self,
        parent_id: &str,
        name: Option<&str>,
        cancel: &CancellationToken,
    ) -> ApplicationResult<BoneAdded> {
        let name = self.bone_name(name, &self.defaults.child_name)?;
        let bone = Bone::new_child(
            self.ids.next_id(),
            name,
            self.defaults.created_by.clone(),
            parent_id,
        );
        let bone_id = bone.id.clone();
        if !forest::contains_id(&self.diagram.bones, parent_id) {
            debug!("add_child_bone: parent {} not in forest", parent_id);
        }
        self.diagram.bones = self.tree.add_child(&self.diagram.bones, parent_id, bone);
        let outcome = self.save_bones(cancel).await;
        Ok(BoneAdded { bone_id, outcome })
    }

    /// Rename a bone. Empty names are rejected before anything changes.
    #[instrument(level = "debug", skip(self, cancel), fields(diagram = %self.diagram.id))]
    pub async fn rename_bone(
        &mut self,
        id: &str,
        name: &str,
        cancel: &CancellationToken,
    ) -> ApplicationResult<SaveOutcome> {
        let name = validate_name(name)?;
        match forest::find_by_id(&self.diagram.bones, id) {
            Some(bone) if bone.name == name => return Ok(SaveOutcome::Unchanged),
            None => return Ok(SaveOutcome::Unchanged),
            Some(_) => {}
        }
        self.diagram.bones = self.tree.rename(&self.diagram.bones, id, &name);
        Ok(self.save_bones(cancel).await)
    }

    /// Delete a bone with its subtree.
    #[instrument(level = "debug", skip(self, cancel), fields(diagram = %self.diagram.id))]
    pub async fn delete_bone(&mut self, id: &str, cancel: &CancellationToken) -> SaveOutcome {
        self.diagram.bones = self.tree.delete(&self.diagram.bones, id);
        self.save_bones(cancel).await
    }

    /// Change the diagram title; only the title is sent.
    #[instrument(level = "debug", skip(self, cancel), fields(diagram = %self.diagram.id))]
    pub async fn rename_title(
        &mut self,
        title: &str,
        cancel: &CancellationToken,
    ) -> ApplicationResult<SaveOutcome> {
        let title = validate_title(title)?;
        if title == self.diagram.title {
            return Ok(SaveOutcome::Unchanged);
        }
        self.diagram.title = title.clone();
        Ok(self.persist(DiagramUpdate::title(title), cancel).await)
    }

    /// Bone lookup for callers that need to report on a specific node.
    pub fn bone(&self, id: &str) -> ApplicationResult<&Bone> {
        forest::find_by_id(&self.diagram.bones, id)
            .ok_or_else(|| ApplicationError::BoneNotFound(id.to_string()))
    }

    fn bone_name(&self, requested: Option<&str>, default: &str) -> ApplicationResult<String> {
        match requested {
            Some(raw) => Ok(validate_name(raw)?),
            None => Ok(default.to_string()),
        }
    }

    async fn save_bones(&mut self, cancel: &CancellationToken) -> SaveOutcome {
        let update = DiagramUpdate::bones(self.diagram.bones.clone());
        self.persist(update, cancel).await
    }

    async fn persist(&mut self, update: DiagramUpdate, cancel: &CancellationToken) -> SaveOutcome {
        let store = Arc::clone(&self.store);
        let id = self.diagram.id.clone();

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = store.update_diagram(&id, update) => Some(result),
        };

        match result {
            None => {
                warn!("save of diagram {} cancelled, keeping local state", id);
                SaveOutcome::Cancelled
            }
            Some(Ok(saved)) => {
                // server metadata wins, the local forest and title stay
                self.diagram.updated_at = saved.updated_at;
                self.diagram.status = saved.status;
                self.diagram.tags = saved.tags.clone();
                SaveOutcome::Saved(saved)
            }
            Some(Err(e)) => {
                warn!("save of diagram {} failed: {}", id, e);
                SaveOutcome::Failed(Notification::error(e.user_message()))
            }
        }
    }
}
