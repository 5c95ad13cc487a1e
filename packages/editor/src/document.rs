//! # Document Handle
//!
//! A Document wraps one mind map tree plus its viewport dimensions. The
//! model holds at most one open document; switching is always a close
//! followed by an open.
//!
//! Loading and saving documents happens outside this crate.

use crate::actions::{Action, Applied, ActionError};
use crate::config::EditorConfig;
use crate::geometry::Dimensions;
use crate::id_generator::{IdGenerator, NodeId};
use crate::style::Color;
use crate::tree::NodeTree;

#[derive(Debug)]
pub struct Document {
    /// Stable document id (CRC32 of its name)
    id: String,

    pub title: String,

    pub dimensions: Dimensions,

    /// Current version number (increments on each applied action)
    pub version: u64,

    tree: NodeTree,

    ids: IdGenerator,

    /// Never edited since creation
    is_new: bool,
}

impl Document {
    /// Create a new document holding only a root node
    pub fn new(title: &str, dimensions: Dimensions, root_caption: &str, root_color: Color) -> Self {
        let mut ids = IdGenerator::new(title);
        let root = ids.next_id();

        Self {
            id: ids.seed().to_string(),
            title: title.to_string(),
            dimensions,
            version: 0,
            tree: NodeTree::new(root, root_caption, root_color),
            ids,
            is_new: true,
        }
    }

    /// Create a new document using the configured defaults
    pub fn from_config(title: &str, config: &EditorConfig) -> Self {
        Self::new(
            title,
            config.default_dimensions,
            &config.root_caption,
            config.root_color.clone(),
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Reserve an id for a node about to be created
    pub fn next_node_id(&mut self) -> NodeId {
        self.ids.next_id()
    }

    /// Apply an action to the tree and bump the version if it succeeded
    pub(crate) fn apply(&mut self, action: &Action) -> Result<Applied, ActionError> {
        let applied = action.apply(&mut self.tree)?;
        self.version += 1;
        self.is_new = false;
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Subtree;

    #[test]
    fn test_new_document() {
        let doc = Document::from_config("ideas", &EditorConfig::default());

        assert_eq!(doc.version, 0);
        assert!(doc.is_new());
        assert_eq!(doc.tree().len(), 1);
        assert_eq!(doc.tree().root().caption(), "Central Idea");
        assert_eq!(doc.dimensions, Dimensions::new(4000.0, 2000.0));
        assert!(doc.tree().root_id().as_str().starts_with(doc.id()));
    }

    #[test]
    fn test_version_increments_only_on_success() {
        let mut doc = Document::from_config("ideas", &EditorConfig::default());
        let root = doc.tree().root_id().clone();
        let child = doc.next_node_id();

        let create = Action::Create {
            parent: root,
            node: Subtree::leaf(child.clone(), "child"),
            index: None,
        };
        doc.apply(&create).unwrap();
        assert_eq!(doc.version, 1);
        assert!(!doc.is_new());

        // Same id again is rejected and does not count
        assert!(doc.apply(&create).is_err());
        assert_eq!(doc.version, 1);
    }

    #[test]
    fn test_node_ids_are_unique() {
        let mut doc = Document::from_config("ideas", &EditorConfig::default());
        let a = doc.next_node_id();
        let b = doc.next_node_id();
        assert_ne!(a, b);
        assert_ne!(&a, doc.tree().root_id());
    }
}
