//! # Actions
//!
//! Reversible units of mutation over a [`NodeTree`].
//!
//! ## Design Principles
//!
//! 1. **Single path**: the tree is only mutated by applying an action
//! 2. **Validated first**: an action that fails leaves the tree untouched
//! 3. **Reversible**: a successful apply returns the action that undoes it
//!
//! ## Action Semantics
//!
//! ### Create
//! - Attaches a fully formed subtree under an existing parent
//! - Appends unless an index is given
//! - Fails if the parent is gone or any incoming id already exists
//!
//! ### Move
//! - Replaces the node's offset relative to its parent
//! - Siblings are not laid out again
//!
//! ### ToggleFold / Open / Close
//! - Change only the fold flag
//! - A leaf has nothing to fold: applying any of them is a no-op
//!
//! ### Delete
//! - Removes the node and all descendants
//! - The root can never be deleted

use crate::geometry::Point;
use crate::id_generator::NodeId;
use crate::node::Subtree;
use crate::style::{Color, Font};
use crate::tree::NodeTree;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mutations of the node tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    /// Attach a new subtree under `parent`
    Create {
        parent: NodeId,
        node: Subtree,
        index: Option<usize>,
    },

    /// Set the node's offset relative to its parent
    Move { node: NodeId, offset: Point },

    /// Replace the node's caption
    ChangeCaption { node: NodeId, caption: String },

    /// Flip the children-folded flag
    ToggleFold { node: NodeId },

    /// Unfold the node's children
    Open { node: NodeId },

    /// Fold the node's children
    Close { node: NodeId },

    /// Remove the node and its subtree
    Delete { node: NodeId },

    /// Set or clear the explicit branch color
    ChangeBranchColor { node: NodeId, color: Option<Color> },

    /// Replace the caption font
    ChangeFont { node: NodeId, font: Font },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActionError {
    #[error("Node not found: {0}")]
    StaleTarget(NodeId),

    #[error("Node already exists: {0}")]
    DuplicateNode(NodeId),

    #[error("The root node cannot be removed")]
    RootImmutable,

    #[error("Index {index} out of bounds for children of {parent}")]
    IndexOutOfBounds { parent: NodeId, index: usize },
}

/// What an applied action changed, in terms the model turns into events
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Created { node: NodeId, parent: NodeId },
    Moved { node: NodeId, offset: Point },
    CaptionChanged { node: NodeId, caption: String },
    Opened { node: NodeId },
    Closed { node: NodeId },
    Deleted { node: NodeId, parent: NodeId, removed: Vec<NodeId> },
    BranchColorChanged { node: NodeId },
    FontChanged { node: NodeId },
    /// The action was valid but had nothing to do
    Unchanged,
}

/// Result of applying an action
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub effect: Effect,

    /// Action restoring the previous state (None when nothing changed)
    pub inverse: Option<Action>,
}

impl Applied {
    fn unchanged() -> Self {
        Self {
            effect: Effect::Unchanged,
            inverse: None,
        }
    }
}

impl Action {
    /// Apply to the tree. On error the tree is left exactly as it was.
    pub fn apply(&self, tree: &mut NodeTree) -> Result<Applied, ActionError> {
        self.validate(tree)?;

        match self {
            Action::Create {
                parent,
                node,
                index,
            } => Self::apply_create(tree, parent, node, *index),
            Action::Move { node, offset } => Self::apply_move(tree, node, *offset),
            Action::ChangeCaption { node, caption } => Self::apply_caption(tree, node, caption),
            Action::ToggleFold { node } => {
                let folded = tree
                    .get(node)
                    .map(|n| n.is_folded())
                    .ok_or_else(|| ActionError::StaleTarget(node.clone()))?;
                Self::apply_fold(tree, node, !folded)
            }
            Action::Open { node } => Self::apply_fold(tree, node, false),
            Action::Close { node } => Self::apply_fold(tree, node, true),
            Action::Delete { node } => Self::apply_delete(tree, node),
            Action::ChangeBranchColor { node, color } => {
                Self::apply_branch_color(tree, node, color)
            }
            Action::ChangeFont { node, font } => Self::apply_font(tree, node, font),
        }
    }

    /// Validate without applying
    pub fn validate(&self, tree: &NodeTree) -> Result<(), ActionError> {
        match self {
            Action::Create { parent, node, index } => tree.check_insert(parent, node, *index),
            Action::Delete { node } if tree.is_root(node) => Err(ActionError::RootImmutable),
            _ => {
                let target = self.target();
                if tree.contains(target) {
                    Ok(())
                } else {
                    Err(ActionError::StaleTarget(target.clone()))
                }
            }
        }
    }

    /// The node this action is about (the parent, for Create)
    pub fn target(&self) -> &NodeId {
        match self {
            Action::Create { parent, .. } => parent,
            Action::Move { node, .. }
            | Action::ChangeCaption { node, .. }
            | Action::ToggleFold { node }
            | Action::Open { node }
            | Action::Close { node }
            | Action::Delete { node }
            | Action::ChangeBranchColor { node, .. }
            | Action::ChangeFont { node, .. } => node,
        }
    }

    /// Get a debug name for this action
    pub fn name(&self) -> &'static str {
        match self {
            Action::Create { .. } => "create",
            Action::Move { .. } => "move",
            Action::ChangeCaption { .. } => "change_caption",
            Action::ToggleFold { .. } => "toggle_fold",
            Action::Open { .. } => "open",
            Action::Close { .. } => "close",
            Action::Delete { .. } => "delete",
            Action::ChangeBranchColor { .. } => "change_branch_color",
            Action::ChangeFont { .. } => "change_font",
        }
    }

    fn apply_create(
        tree: &mut NodeTree,
        parent: &NodeId,
        node: &Subtree,
        index: Option<usize>,
    ) -> Result<Applied, ActionError> {
        tree.insert_subtree(parent, node, index)?;

        Ok(Applied {
            effect: Effect::Created {
                node: node.id.clone(),
                parent: parent.clone(),
            },
            inverse: Some(Action::Delete { node: node.id.clone() }),
        })
    }

    fn apply_move(tree: &mut NodeTree, id: &NodeId, offset: Point) -> Result<Applied, ActionError> {
        let node = tree.node_mut(id)?;
        let previous = std::mem::replace(&mut node.offset, offset);

        Ok(Applied {
            effect: Effect::Moved {
                node: id.clone(),
                offset,
            },
            inverse: Some(Action::Move {
                node: id.clone(),
                offset: previous,
            }),
        })
    }

    fn apply_caption(
        tree: &mut NodeTree,
        id: &NodeId,
        caption: &str,
    ) -> Result<Applied, ActionError> {
        let node = tree.node_mut(id)?;
        if node.caption == caption {
            return Ok(Applied::unchanged());
        }
        let previous = std::mem::replace(&mut node.caption, caption.to_string());

        Ok(Applied {
            effect: Effect::CaptionChanged {
                node: id.clone(),
                caption: caption.to_string(),
            },
            inverse: Some(Action::ChangeCaption {
                node: id.clone(),
                caption: previous,
            }),
        })
    }

    fn apply_fold(tree: &mut NodeTree, id: &NodeId, folded: bool) -> Result<Applied, ActionError> {
        let node = tree.node_mut(id)?;
        if node.is_leaf() || node.fold_children == folded {
            return Ok(Applied::unchanged());
        }
        node.fold_children = folded;

        let (effect, inverse) = if folded {
            (Effect::Closed { node: id.clone() }, Action::Open { node: id.clone() })
        } else {
            (Effect::Opened { node: id.clone() }, Action::Close { node: id.clone() })
        };

        Ok(Applied {
            effect,
            inverse: Some(inverse),
        })
    }

    fn apply_delete(tree: &mut NodeTree, id: &NodeId) -> Result<Applied, ActionError> {
        let detached = tree.remove_subtree(id)?;
        let removed = detached.subtree.ids();

        Ok(Applied {
            effect: Effect::Deleted {
                node: id.clone(),
                parent: detached.parent.clone(),
                removed,
            },
            inverse: Some(Action::Create {
                parent: detached.parent,
                node: detached.subtree,
                index: Some(detached.index),
            }),
        })
    }

    fn apply_branch_color(
        tree: &mut NodeTree,
        id: &NodeId,
        color: &Option<Color>,
    ) -> Result<Applied, ActionError> {
        let node = tree.node_mut(id)?;
        if node.branch_color == *color {
            return Ok(Applied::unchanged());
        }
        let previous = std::mem::replace(&mut node.branch_color, color.clone());

        Ok(Applied {
            effect: Effect::BranchColorChanged { node: id.clone() },
            inverse: Some(Action::ChangeBranchColor {
                node: id.clone(),
                color: previous,
            }),
        })
    }

    fn apply_font(tree: &mut NodeTree, id: &NodeId, font: &Font) -> Result<Applied, ActionError> {
        let node = tree.node_mut(id)?;
        if node.font == *font {
            return Ok(Applied::unchanged());
        }
        let previous = std::mem::replace(&mut node.font, font.clone());

        Ok(Applied {
            effect: Effect::FontChanged { node: id.clone() },
            inverse: Some(Action::ChangeFont {
                node: id.clone(),
                font: previous,
            }),
        })
    }
}
