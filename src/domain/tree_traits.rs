//! Conversion of bone trees into printable `termtree` trees.

use termtree::Tree;
use tracing::instrument;

use crate::domain::entities::{Bone, Diagram};

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for Bone {
    fn to_tree_string(&self) -> Tree<String> {
        let leaves: Vec<_> = self.children.iter().map(|c| c.to_tree_string()).collect();
        Tree::new(format!("{} [{}]", self.name, self.id)).with_leaves(leaves)
    }
}

impl TreeNodeConvert for Diagram {
    #[instrument(level = "debug", skip(self), fields(id = %self.id))]
    fn to_tree_string(&self) -> Tree<String> {
        // the diagram title plays the spine
        let leaves: Vec<_> = self.bones.iter().map(|b| b.to_tree_string()).collect();
        Tree::new(self.title.clone()).with_leaves(leaves)
    }
}
