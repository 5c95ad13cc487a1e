//! # Nodes
//!
//! A [`Node`] is one element of the mind map tree. Nodes are only ever
//! mutated by actions applied through the model; everything here is either
//! a read accessor or a detached value used to describe nodes that are not
//! (or no longer) attached to a tree.

use crate::geometry::Point;
use crate::id_generator::NodeId;
use crate::style::{Color, Font};
use serde::{Deserialize, Serialize};

/// A node attached to a [`NodeTree`](crate::NodeTree)
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) caption: String,
    pub(crate) offset: Point,
    pub(crate) branch_color: Option<Color>,
    pub(crate) font: Font,
    pub(crate) fold_children: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    /// Offset relative to the parent node
    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Explicitly assigned branch color. Use
    /// [`NodeTree::effective_branch_color`](crate::NodeTree::effective_branch_color)
    /// for the inherited one.
    pub fn branch_color(&self) -> Option<&Color> {
        self.branch_color.as_ref()
    }

    pub fn font(&self) -> &Font {
        &self.font
    }

    pub fn is_folded(&self) -> bool {
        self.fold_children
    }

    pub fn parent(&self) -> Option<&NodeId> {
        self.parent.as_ref()
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Owned, detached description of a node and all of its descendants.
///
/// Create actions carry one to insert; Delete captures one so the removal
/// can be reversed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtree {
    pub id: NodeId,
    pub caption: String,
    pub offset: Point,
    pub branch_color: Option<Color>,
    pub font: Font,
    pub fold_children: bool,
    pub children: Vec<Subtree>,
}

impl Subtree {
    /// A childless subtree
    pub fn leaf(id: NodeId, caption: impl Into<String>) -> Self {
        Self {
            id,
            caption: caption.into(),
            offset: Point::ORIGIN,
            branch_color: None,
            font: Font::default(),
            fold_children: false,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: Subtree) -> Self {
        self.children.push(child);
        self
    }

    /// Ids of this node and every descendant, pre-order
    pub fn ids(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_ids(&mut out);
        out
    }

    fn collect_ids(&self, out: &mut Vec<NodeId>) {
        out.push(self.id.clone());
        for child in &self.children {
            child.collect_ids(out);
        }
    }
}

/// Request to create a node; the model assigns its identity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewNode {
    pub caption: String,
    pub offset: Point,
    pub branch_color: Option<Color>,
    pub font: Option<Font>,
}

impl NewNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }

    pub fn offset(mut self, offset: Point) -> Self {
        self.offset = offset;
        self
    }

    pub fn branch_color(mut self, color: Option<Color>) -> Self {
        self.branch_color = color;
        self
    }

    pub fn font(mut self, font: Font) -> Self {
        self.font = Some(font);
        self
    }

    pub(crate) fn into_subtree(self, id: NodeId) -> Subtree {
        Subtree {
            id,
            caption: self.caption,
            offset: self.offset,
            branch_color: self.branch_color,
            font: self.font.unwrap_or_default(),
            fold_children: false,
            children: Vec::new(),
        }
    }
}
