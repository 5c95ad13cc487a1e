//! Interfaces of the rendering and interaction surfaces the presenter
//! drives. Implementations live outside this crate (a canvas, a terminal,
//! or a recording fake in tests).

use crate::geometry::Dimensions;
use crate::id_generator::NodeId;
use crate::tree::NodeTree;

/// Rendering surface for a mind map
pub trait CanvasView {
    /// Render every node of the tree
    fn draw_map(&mut self, tree: &NodeTree);
    fn create_node(&mut self, tree: &NodeTree, node: &NodeId);
    /// Remove a node that is no longer in the tree, with its subtree
    fn delete_node(&mut self, node: &NodeId);
    fn position_node(&mut self, tree: &NodeTree, node: &NodeId);
    fn set_node_text(&mut self, node: &NodeId, text: &str);
    fn redraw_node_connectors(&mut self, tree: &NodeTree, node: &NodeId);
    /// Redraw after a style change (font, branch color)
    fn update_node(&mut self, tree: &NodeTree, node: &NodeId);
    fn highlight_node(&mut self, node: &NodeId);
    fn unhighlight_node(&mut self, node: &NodeId);
    fn open_node(&mut self, tree: &NodeTree, node: &NodeId);
    fn close_node(&mut self, node: &NodeId);
    fn remove_fold_button(&mut self, node: &NodeId);
    fn edit_node_caption(&mut self, node: &NodeId);
    fn stop_edit_node_caption(&mut self);
    fn set_zoom_factor(&mut self, factor: f64);
    fn apply_view_zoom(&mut self);
    fn scale_map(&mut self);
    fn set_dimensions(&mut self, dimensions: Dimensions);
    fn center(&mut self);
    fn clear(&mut self);
    /// A node is being dragged around the canvas
    fn is_node_dragging(&self) -> bool;
}

/// Drag handle that grows new child nodes out of the node it is attached to
pub trait CreatorTool {
    fn attach_to_node(&mut self, node: &NodeId);
    fn is_dragging(&self) -> bool;
}

/// Owns the zoom level. Stepping returns the resulting factor.
pub trait ZoomController {
    fn zoom_in(&mut self) -> f64;
    fn zoom_out(&mut self) -> f64;
    fn default_zoom(&self) -> f64;
}
