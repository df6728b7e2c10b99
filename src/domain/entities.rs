//! Domain entities: core data structures
//!
//! Field names follow the store's JSON wire format (camelCase).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Ordered sequence of root bones belonging to one diagram.
pub type Forest = Vec<Bone>;

/// Reads `null` as an empty list; `#[serde(default)]` covers a missing key.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A node in the cause tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bone {
    /// Opaque unique identifier, immutable after creation
    pub id: String,
    /// Display text
    pub name: String,
    /// Ordered children; insertion order drives layout and traversal
    #[serde(default, deserialize_with = "null_as_empty")]
    pub children: Vec<Bone>,
    /// Informational back-reference, never used for traversal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Attribution, set at creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl Bone {
    /// Fresh top-level bone with no children.
    pub fn new_root(id: impl Into<String>, name: impl Into<String>, created_by: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            children: Vec::new(),
            parent_id: None,
            created_by: Some(created_by.into()),
        }
    }

    /// Fresh child bone pointing back at `parent_id`.
    pub fn new_child(
        id: impl Into<String>,
        name: impl Into<String>,
        created_by: impl Into<String>,
        parent_id: impl Into<String>,
    ) -> Self {
        Self {
            parent_id: Some(parent_id.into()),
            ..Self::new_root(id, name, created_by)
        }
    }
}

impl fmt::Display for Bone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Publication state carried by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagramStatus {
    Draft,
    Published,
    Archived,
}

impl fmt::Display for DiagramStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagramStatus::Draft => "Draft",
            DiagramStatus::Published => "Published",
            DiagramStatus::Archived => "Archived",
        };
        write!(f, "{s}")
    }
}

/// The unit of persistence: metadata plus the whole forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagram {
    pub id: String,
    pub title: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    /// Older records may not carry it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DiagramStatus>,
    /// Nullable column server-side
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub bones: Forest,
}

impl Diagram {
    /// Last modification time, falling back to creation time.
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }
}

/// Partial update: absent fields are left unchanged server-side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bones: Option<Forest>,
}

impl DiagramUpdate {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            bones: None,
        }
    }

    pub fn bones(bones: Forest) -> Self {
        Self {
            title: None,
            bones: Some(bones),
        }
    }
}

/// One row of the diagram overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramSummary {
    pub id: String,
    pub title: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Number of main bones
    pub top_level_bones: usize,
    /// Number of bones at every depth
    pub total_bones: usize,
}

impl From<&Diagram> for DiagramSummary {
    fn from(diagram: &Diagram) -> Self {
        Self {
            id: diagram.id.clone(),
            title: diagram.title.clone(),
            created_by: diagram.created_by.clone(),
            created_at: diagram.created_at,
            updated_at: diagram.last_modified(),
            top_level_bones: diagram.bones.len(),
            total_bones: crate::domain::forest::count_nodes(&diagram.bones),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_store_json_when_deserializing_then_missing_collections_default_to_empty() {
        let json = r#"{
            "id": "d1",
            "title": "Late deliveries",
            "createdBy": "user",
            "createdAt": "2025-05-01T10:00:00Z",
            "bones": [{"id": "b1", "name": "Machine", "createdBy": "user"}]
        }"#;

        let diagram: Diagram = serde_json::from_str(json).unwrap();

        assert!(diagram.tags.is_empty());
        assert!(diagram.updated_at.is_none());
        assert_eq!(diagram.bones.len(), 1);
        assert!(diagram.bones[0].children.is_empty());
        assert_eq!(diagram.last_modified(), diagram.created_at);
    }

    #[test]
    fn given_null_collections_when_deserializing_then_read_as_empty() {
        let json = r#"{
            "id": "d1",
            "title": "Late deliveries",
            "createdBy": "user",
            "createdAt": "2025-05-01T10:00:00Z",
            "updatedAt": null,
            "status": null,
            "tags": null,
            "bones": [{"id": "b1", "name": "Machine", "children": null}]
        }"#;

        let diagram: Diagram = serde_json::from_str(json).unwrap();

        assert!(diagram.tags.is_empty());
        assert!(diagram.status.is_none());
        assert!(diagram.bones[0].children.is_empty());
    }

    #[test]
    fn given_null_bones_when_deserializing_then_empty_forest() {
        let json = r#"{"id": "d2", "title": "Scrap", "createdBy": "user",
            "createdAt": "2025-05-01T10:00:00Z", "tags": ["line 3"], "bones": null}"#;

        let diagram: Diagram = serde_json::from_str(json).unwrap();

        assert!(diagram.bones.is_empty());
        assert_eq!(diagram.tags, vec!["line 3".to_string()]);
    }

    #[test]
    fn given_title_only_update_when_serializing_then_bones_are_omitted() {
        let json = serde_json::to_value(DiagramUpdate::title("Scrap rate")).unwrap();
        assert_eq!(json, serde_json::json!({"title": "Scrap rate"}));
    }

    #[test]
    fn given_child_bone_when_serializing_then_uses_camel_case_keys() {
        let bone = Bone::new_child("c1", "Sub 1", "user", "p1");
        let json = serde_json::to_value(&bone).unwrap();
        assert_eq!(json["parentId"], "p1");
        assert_eq!(json["createdBy"], "user");
        assert_eq!(json["children"], serde_json::json!([]));
    }
}
