//! Tree engine: immutable edits over an ordered forest of bones.
//!
//! Every edit takes the forest by reference and returns a new one. Edits
//! address nodes by id and rebuild the whole root-to-target path, so callers
//! can compare old and new forests by value. An id that matches nothing
//! leaves the result value-equal to the input.

use tracing::instrument;

use crate::domain::entities::{Bone, Forest};

/// Append `new_bone` to the root sequence.
///
/// Id uniqueness is the caller's precondition.
#[instrument(level = "debug", skip(forest, new_bone), fields(id = %new_bone.id))]
pub fn add_root(forest: &[Bone], new_bone: Bone) -> Forest {
    let mut result = forest.to_vec();
    result.push(new_bone);
    result
}

/// Append `new_bone` to the children of the node with `parent_id`.
///
/// Unknown `parent_id` is a no-op: the parent may have been deleted
/// concurrently.
#[instrument(level = "debug", skip(forest, new_bone), fields(id = %new_bone.id))]
pub fn add_child(forest: &[Bone], parent_id: &str, new_bone: Bone) -> Forest {
    forest
        .iter()
        .map(|bone| insert_under(bone, parent_id, &new_bone))
        .collect()
}

fn insert_under(bone: &Bone, parent_id: &str, new_bone: &Bone) -> Bone {
    if bone.id == parent_id {
        let mut children = bone.children.clone();
        children.push(new_bone.clone());
        return Bone {
            children,
            ..bone.clone()
        };
    }
    Bone {
        children: bone
            .children
            .iter()
            .map(|child| insert_under(child, parent_id, new_bone))
            .collect(),
        ..bone.clone()
    }
}

/// Replace the name of the node with `id`; every other node is returned
/// value-equal.
#[instrument(level = "debug", skip(forest))]
pub fn rename_by_id(forest: &[Bone], id: &str, new_name: &str) -> Forest {
    forest
        .iter()
        .map(|bone| rename_in(bone, id, new_name))
        .collect()
}

fn rename_in(bone: &Bone, id: &str, new_name: &str) -> Bone {
    Bone {
        id: bone.id.clone(),
        name: if bone.id == id {
            new_name.to_string()
        } else {
            bone.name.clone()
        },
        children: rename_by_id(&bone.children, id, new_name),
        parent_id: bone.parent_id.clone(),
        created_by: bone.created_by.clone(),
    }
}

/// Remove every node with `id`, together with its subtree, at any depth.
#[instrument(level = "debug", skip(forest))]
pub fn delete_by_id(forest: &[Bone], id: &str) -> Forest {
    prune(forest, id)
}

fn prune(nodes: &[Bone], id: &str) -> Forest {
    nodes
        .iter()
        .filter(|bone| bone.id != id)
        .map(|bone| Bone {
            children: prune(&bone.children, id),
            ..bone.clone()
        })
        .collect()
}

/// Number of bones at every depth.
pub fn count_nodes(forest: &[Bone]) -> usize {
    forest.iter().map(subtree_size).sum()
}

/// The bone itself plus all of its descendants.
pub fn subtree_size(bone: &Bone) -> usize {
    1 + count_nodes(&bone.children)
}

/// Depth-first lookup.
pub fn find_by_id<'a>(forest: &'a [Bone], id: &str) -> Option<&'a Bone> {
    forest.iter().find_map(|bone| {
        if bone.id == id {
            Some(bone)
        } else {
            find_by_id(&bone.children, id)
        }
    })
}

pub fn contains_id(forest: &[Bone], id: &str) -> bool {
    find_by_id(forest, id).is_some()
}

/// Number of levels; 0 for an empty forest.
pub fn depth(forest: &[Bone]) -> usize {
    forest
        .iter()
        .map(|bone| 1 + depth(&bone.children))
        .max()
        .unwrap_or(0)
}

/// Explicit editing seam so services can be handed the tree engine.
pub trait TreeEditingPort: Send + Sync {
    fn add_root(&self, forest: &[Bone], new_bone: Bone) -> Forest;
    fn add_child(&self, forest: &[Bone], parent_id: &str, new_bone: Bone) -> Forest;
    fn rename(&self, forest: &[Bone], id: &str, new_name: &str) -> Forest;
    fn delete(&self, forest: &[Bone], id: &str) -> Forest;
}

/// Pure implementation backed by the functions in this module.
#[derive(Debug, Default, Clone, Copy)]
pub struct ForestEditor;

impl TreeEditingPort for ForestEditor {
    fn add_root(&self, forest: &[Bone], new_bone: Bone) -> Forest {
        add_root(forest, new_bone)
    }

    fn add_child(&self, forest: &[Bone], parent_id: &str, new_bone: Bone) -> Forest {
        add_child(forest, parent_id, new_bone)
    }

    fn rename(&self, forest: &[Bone], id: &str, new_name: &str) -> Forest {
        rename_by_id(forest, id, new_name)
    }

    fn delete(&self, forest: &[Bone], id: &str) -> Forest {
        delete_by_id(forest, id)
    }
}
