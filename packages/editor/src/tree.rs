//! # Node Tree
//!
//! Arena-backed hierarchy of [`Node`]s. Every node except the root has
//! exactly one parent, which is stored on the node, so ancestor queries
//! walk at most `depth` links.
//!
//! Public methods are pure queries. Structural changes are `pub(crate)` and
//! only reached through [`Action::apply`](crate::Action::apply).

use crate::actions::ActionError;
use crate::id_generator::NodeId;
use crate::node::{Node, Subtree};
use crate::style::{Color, Font};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct NodeTree {
    root: NodeId,
    nodes: HashMap<NodeId, Node>,
}

/// A subtree detached from the tree, with where it used to hang
#[derive(Debug, Clone)]
pub(crate) struct Detached {
    pub subtree: Subtree,
    pub parent: NodeId,
    pub index: usize,
}

impl NodeTree {
    /// Tree consisting of a single root node
    pub fn new(root_id: NodeId, caption: impl Into<String>, color: Color) -> Self {
        let root = Node {
            id: root_id.clone(),
            caption: caption.into(),
            offset: Default::default(),
            branch_color: Some(color),
            font: Font::default(),
            fold_children: false,
            parent: None,
            children: Vec::new(),
        };

        let mut nodes = HashMap::new();
        nodes.insert(root_id.clone(), root);

        Self { root: root_id, nodes }
    }

    pub fn root_id(&self) -> &NodeId {
        &self.root
    }

    pub fn root(&self) -> &Node {
        // The root is inserted at construction and never removed
        &self.nodes[&self.root]
    }

    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        // A tree always has its root
        false
    }

    pub fn is_root(&self, id: &NodeId) -> bool {
        *id == self.root
    }

    /// True if the node exists and has no children
    pub fn is_leaf(&self, id: &NodeId) -> bool {
        self.get(id).map(Node::is_leaf).unwrap_or(false)
    }

    pub fn parent(&self, id: &NodeId) -> Option<&NodeId> {
        self.get(id).and_then(Node::parent)
    }

    pub fn children(&self, id: &NodeId) -> &[NodeId] {
        self.get(id).map(Node::children).unwrap_or(&[])
    }

    /// Position of a node among its siblings
    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| c == id)
    }

    /// Number of links between the node and the root
    pub fn depth(&self, id: &NodeId) -> Option<usize> {
        let mut depth = 0;
        let mut current = self.get(id)?;
        while let Some(parent) = current.parent() {
            depth += 1;
            current = self.get(parent)?;
        }
        Some(depth)
    }

    /// True if `other` is a strict descendant of `node`. O(depth of `other`).
    pub fn is_descendant(&self, node: &NodeId, other: &NodeId) -> bool {
        let mut current = self.parent(other);
        while let Some(id) = current {
            if id == node {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Branch color of the node, inherited from the nearest ancestor that
    /// sets one explicitly
    pub fn effective_branch_color(&self, id: &NodeId) -> Option<&Color> {
        let mut current = self.get(id);
        while let Some(node) = current {
            if let Some(color) = node.branch_color() {
                return Some(color);
            }
            current = node.parent().and_then(|p| self.get(p));
        }
        None
    }

    /// Nodes in pre-order, children in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Node> + '_ {
        let mut stack = vec![&self.root];
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            let node = self.nodes.get(id)?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    /// Snapshot of a node and its descendants
    pub fn subtree(&self, id: &NodeId) -> Option<Subtree> {
        let node = self.get(id)?;
        let children = node
            .children
            .iter()
            .map(|child| self.subtree(child))
            .collect::<Option<Vec<_>>>()?;

        Some(Subtree {
            id: node.id.clone(),
            caption: node.caption.clone(),
            offset: node.offset,
            branch_color: node.branch_color.clone(),
            font: node.font.clone(),
            fold_children: node.fold_children,
            children,
        })
    }

    /// Check structural integrity: single root, acyclic, every node reachable
    /// from the root, and parent/child links agreeing in both directions
    pub fn is_consistent(&self) -> bool {
        let Some(root) = self.nodes.get(&self.root) else {
            return false;
        };
        if root.parent.is_some() {
            return false;
        }

        let mut seen = HashSet::new();
        let mut stack = vec![&self.root];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                // Reached twice: a cycle or a shared child
                return false;
            }
            let Some(node) = self.nodes.get(id) else {
                return false;
            };
            for child in &node.children {
                match self.nodes.get(child) {
                    Some(c) if c.parent.as_ref() == Some(id) => stack.push(child),
                    _ => return false,
                }
            }
        }

        seen.len() == self.nodes.len()
    }

    pub(crate) fn node_mut(&mut self, id: &NodeId) -> Result<&mut Node, ActionError> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| ActionError::StaleTarget(id.clone()))
    }

    /// Validate that `subtree` could be attached under `parent` at `index`
    pub(crate) fn check_insert(
        &self,
        parent: &NodeId,
        subtree: &Subtree,
        index: Option<usize>,
    ) -> Result<(), ActionError> {
        let parent_node = self
            .get(parent)
            .ok_or_else(|| ActionError::StaleTarget(parent.clone()))?;

        if let Some(index) = index {
            if index > parent_node.children.len() {
                return Err(ActionError::IndexOutOfBounds {
                    parent: parent.clone(),
                    index,
                });
            }
        }

        let mut incoming = HashSet::new();
        for id in subtree.ids() {
            if self.contains(&id) || !incoming.insert(id.clone()) {
                return Err(ActionError::DuplicateNode(id));
            }
        }

        Ok(())
    }

    pub(crate) fn insert_subtree(
        &mut self,
        parent: &NodeId,
        subtree: &Subtree,
        index: Option<usize>,
    ) -> Result<(), ActionError> {
        self.check_insert(parent, subtree, index)?;

        let siblings = &mut self.node_mut(parent)?.children;
        let at = index.unwrap_or(siblings.len());
        siblings.insert(at, subtree.id.clone());

        self.attach(parent, subtree);
        Ok(())
    }

    fn attach(&mut self, parent: &NodeId, subtree: &Subtree) {
        let node = Node {
            id: subtree.id.clone(),
            caption: subtree.caption.clone(),
            offset: subtree.offset,
            branch_color: subtree.branch_color.clone(),
            font: subtree.font.clone(),
            fold_children: subtree.fold_children,
            parent: Some(parent.clone()),
            children: subtree.children.iter().map(|c| c.id.clone()).collect(),
        };
        self.nodes.insert(subtree.id.clone(), node);

        for child in &subtree.children {
            self.attach(&subtree.id, child);
        }
    }

    pub(crate) fn remove_subtree(&mut self, id: &NodeId) -> Result<Detached, ActionError> {
        if self.is_root(id) {
            return Err(ActionError::RootImmutable);
        }

        let subtree = self
            .subtree(id)
            .ok_or_else(|| ActionError::StaleTarget(id.clone()))?;
        let parent = self
            .parent(id)
            .cloned()
            .ok_or_else(|| ActionError::StaleTarget(id.clone()))?;

        let siblings = &mut self.node_mut(&parent)?.children;
        let index = siblings
            .iter()
            .position(|c| c == id)
            .ok_or_else(|| ActionError::StaleTarget(id.clone()))?;
        siblings.remove(index);

        for removed in subtree.ids() {
            self.nodes.remove(&removed);
        }

        Ok(Detached {
            subtree,
            parent,
            index,
        })
    }
}
