//! # Canvas Presenter
//!
//! Glue between the model and the canvas surfaces:
//!
//! - bus events become view instructions
//! - view and creator-tool interactions become actions or commands
//!
//! The presenter keeps its surfaces behind `RefCell`s and never holds a
//! borrow across a call into the model: model calls publish synchronously,
//! and the resulting events re-enter the presenter.

use crate::actions::Action;
use crate::collaborators::{CanvasView, CreatorTool, ZoomController};
use crate::commands::CommandId;
use crate::errors::EditorError;
use crate::event_bus::{Event, EventBus, Topic};
use crate::geometry::Point;
use crate::id_generator::NodeId;
use crate::model::{CreateOptions, MindMapModel};
use crate::node::{NewNode, Node};
use crate::style::Color;
use crate::tree::NodeTree;
use std::cell::{Ref, RefCell};
use std::rc::Rc;
use tracing::{debug, warn};

type Reaction<P> = fn(&P, &Event, &mut MindMapModel) -> Result<(), EditorError>;

pub struct CanvasPresenter<V, C, Z> {
    view: RefCell<V>,
    creator: RefCell<C>,
    zoom: RefCell<Z>,
    /// Branch color captured when the current creator drag started
    drag_color: RefCell<Option<Color>>,
    pick_color: Box<dyn Fn() -> Color>,
    min_creation_distance: f64,
}

impl<V, C, Z> CanvasPresenter<V, C, Z>
where
    V: CanvasView + 'static,
    C: CreatorTool + 'static,
    Z: ZoomController + 'static,
{
    /// Subscribe to the model's bus and install command handlers
    pub fn attach(view: V, creator: C, zoom: Z, model: &mut MindMapModel) -> Rc<Self> {
        Self::attach_with_colors(view, creator, zoom, model, Color::random)
    }

    /// Like [`attach`](Self::attach), with a custom source for the colors
    /// of branches grown from the root
    pub fn attach_with_colors<F>(
        view: V,
        creator: C,
        zoom: Z,
        model: &mut MindMapModel,
        pick_color: F,
    ) -> Rc<Self>
    where
        F: Fn() -> Color + 'static,
    {
        let presenter = Rc::new(Self {
            view: RefCell::new(view),
            creator: RefCell::new(creator),
            zoom: RefCell::new(zoom),
            drag_color: RefCell::new(None),
            pick_color: Box::new(pick_color),
            min_creation_distance: model.config().min_creation_distance,
        });

        let bus = Rc::clone(model.bus());
        presenter.bind(&bus);
        presenter.init(model);
        presenter
    }

    pub fn view(&self) -> Ref<'_, V> {
        self.view.borrow()
    }

    pub fn creator(&self) -> Ref<'_, C> {
        self.creator.borrow()
    }

    pub fn zoom(&self) -> Ref<'_, Z> {
        self.zoom.borrow()
    }

    fn init(self: &Rc<Self>, model: &mut MindMapModel) {
        let commands = model.commands_mut();

        let this = Rc::clone(self);
        commands
            .get(CommandId::EditNodeCaption)
            .set_handler(move |target, model| this.edit_node_caption(model, target.as_ref()));

        commands
            .get(CommandId::ToggleNodeFolded)
            .set_handler(|target, model| model.toggle_fold(target.as_ref()));

        commands
            .get(CommandId::DeleteNode)
            .set_handler(|target, model| model.delete_node(target.as_ref()));

        let this = Rc::clone(self);
        commands.get(CommandId::Undo).set_handler(move |_, model| {
            this.view.borrow_mut().stop_edit_node_caption();
            model.undo().map(drop)
        });

        let this = Rc::clone(self);
        commands.get(CommandId::Redo).set_handler(move |_, model| {
            this.view.borrow_mut().stop_edit_node_caption();
            model.redo().map(drop)
        });
    }

    fn bind(self: &Rc<Self>, bus: &EventBus<MindMapModel>) {
        self.on(bus, Topic::DocumentOpened, Self::show_mind_map);
        self.on(bus, Topic::DocumentClosed, |this, _, _| {
            this.view.borrow_mut().clear();
            Ok(())
        });
        self.on(bus, Topic::NodeMoved, Self::node_moved);
        self.on(bus, Topic::NodeCaptionChanged, Self::node_caption_changed);
        self.on(bus, Topic::NodeCreated, Self::node_created);
        self.on(bus, Topic::NodeDeleted, Self::node_deleted);
        self.on(bus, Topic::NodeOpened, Self::node_opened);
        self.on(bus, Topic::NodeClosed, Self::node_closed);
        self.on(bus, Topic::NodeSelected, Self::node_selected);
        self.on(bus, Topic::NodeFontChanged, Self::node_style_changed);
        self.on(bus, Topic::NodeBranchColorChanged, Self::node_style_changed);
        self.on(bus, Topic::ZoomChanged, Self::zoom_changed);
    }

    fn on(self: &Rc<Self>, bus: &EventBus<MindMapModel>, topic: Topic, reaction: Reaction<Self>) {
        let this = Rc::clone(self);
        bus.subscribe(topic, move |event, model| {
            // Errors stay on this side of the bus
            if let Err(e) = reaction(&this, event, model) {
                warn!(topic = ?topic, error = %e, "Presenter reaction failed");
            }
        });
    }

    // ─── Bus reactions ───────────────────────────────────────────────────

    fn show_mind_map(&self, _: &Event, model: &mut MindMapModel) -> Result<(), EditorError> {
        let document = model.document().ok_or(EditorError::NoDocument)?;
        let default_zoom = self.zoom.borrow().default_zoom();

        {
            let mut view = self.view.borrow_mut();
            view.set_zoom_factor(default_zoom);
            view.set_dimensions(document.dimensions);
            view.draw_map(document.tree());
            view.center();
        }

        let root = document.tree().root_id().clone();
        model.select_node(&root)
    }

    fn node_moved(&self, event: &Event, model: &mut MindMapModel) -> Result<(), EditorError> {
        let Event::NodeMoved { node, .. } = event else {
            return Ok(());
        };
        self.view.borrow_mut().position_node(tree(model)?, node);
        Ok(())
    }

    fn node_caption_changed(
        &self,
        event: &Event,
        model: &mut MindMapModel,
    ) -> Result<(), EditorError> {
        let Event::NodeCaptionChanged { node, caption } = event else {
            return Ok(());
        };
        let tree = tree(model)?;
        let mut view = self.view.borrow_mut();
        view.set_node_text(node, caption);
        // The caption may have changed the node's height
        view.redraw_node_connectors(tree, node);
        Ok(())
    }

    fn node_created(&self, event: &Event, model: &mut MindMapModel) -> Result<(), EditorError> {
        let Event::NodeCreated {
            node,
            parent,
            edit_caption,
        } = event
        else {
            return Ok(());
        };

        let tree = tree(model)?;
        self.view.borrow_mut().create_node(tree, node);
        if !edit_caption {
            return Ok(());
        }

        // The new node is hidden while its siblings are folded away
        let parent_folded = tree.get(parent).is_some_and(Node::is_folded);
        if parent_folded {
            model.execute_action(Action::Open { node: parent.clone() })?;
        }

        model.select_node(node)?;
        self.view.borrow_mut().edit_node_caption(node);
        Ok(())
    }

    fn node_deleted(&self, event: &Event, model: &mut MindMapModel) -> Result<(), EditorError> {
        let Event::NodeDeleted { node, parent, .. } = event else {
            return Ok(());
        };
        // Selection inside the removed subtree has already moved to `parent`
        let tree = tree(model)?;
        let mut view = self.view.borrow_mut();
        view.delete_node(node);
        if tree.is_leaf(parent) {
            view.remove_fold_button(parent);
        }
        Ok(())
    }

    fn node_opened(&self, event: &Event, model: &mut MindMapModel) -> Result<(), EditorError> {
        let Event::NodeOpened { node } = event else {
            return Ok(());
        };
        self.view.borrow_mut().open_node(tree(model)?, node);
        Ok(())
    }

    fn node_closed(&self, event: &Event, _: &mut MindMapModel) -> Result<(), EditorError> {
        if let Event::NodeClosed { node } = event {
            self.view.borrow_mut().close_node(node);
        }
        Ok(())
    }

    fn node_selected(&self, event: &Event, model: &mut MindMapModel) -> Result<(), EditorError> {
        let Event::NodeSelected { selected, previous } = event else {
            return Ok(());
        };
        let tree = tree(model)?;
        let mut view = self.view.borrow_mut();
        if let Some(previous) = previous.as_ref().filter(|p| tree.contains(p)) {
            view.unhighlight_node(previous);
        }
        view.highlight_node(selected);
        Ok(())
    }

    fn node_style_changed(
        &self,
        event: &Event,
        model: &mut MindMapModel,
    ) -> Result<(), EditorError> {
        let (Event::NodeFontChanged { node } | Event::NodeBranchColorChanged { node }) = event
        else {
            return Ok(());
        };
        self.view.borrow_mut().update_node(tree(model)?, node);
        Ok(())
    }

    fn zoom_changed(&self, event: &Event, _: &mut MindMapModel) -> Result<(), EditorError> {
        if let Event::ZoomChanged { factor } = event {
            let mut view = self.view.borrow_mut();
            view.set_zoom_factor(*factor);
            view.apply_view_zoom();
            view.scale_map();
        }
        Ok(())
    }

    // ─── View interactions ───────────────────────────────────────────────

    /// Enter caption editing on `node` (or the selected node)
    pub fn edit_node_caption(
        &self,
        model: &mut MindMapModel,
        node: Option<&NodeId>,
    ) -> Result<(), EditorError> {
        let node = match node {
            Some(id) => id.clone(),
            None => model
                .selected_node()
                .cloned()
                .ok_or_else(|| EditorError::InvalidRequest("no node selected".to_string()))?,
        };
        if !tree(model)?.contains(&node) {
            return Err(EditorError::StaleTarget(node));
        }
        self.view.borrow_mut().edit_node_caption(&node);
        Ok(())
    }

    pub fn node_hovered(&self, node: &NodeId) {
        // Don't relocate the creator while something is being dragged
        if self.view.borrow().is_node_dragging() || self.creator.borrow().is_dragging() {
            return;
        }
        self.creator.borrow_mut().attach_to_node(node);
    }

    pub fn node_pressed(&self, model: &mut MindMapModel, node: &NodeId) -> Result<(), EditorError> {
        model.select_node(node)?;
        self.creator.borrow_mut().attach_to_node(node);
        Ok(())
    }

    pub fn node_double_clicked(
        &self,
        model: &mut MindMapModel,
        node: &NodeId,
    ) -> Result<(), EditorError> {
        self.edit_node_caption(model, Some(node))
    }

    /// The view has already moved the node; record the new offset
    pub fn node_dragged(
        &self,
        model: &mut MindMapModel,
        node: &NodeId,
        offset: Point,
    ) -> Result<(), EditorError> {
        model.execute_action(Action::Move {
            node: node.clone(),
            offset,
        })
    }

    pub fn fold_button_pressed(
        &self,
        model: &mut MindMapModel,
        node: &NodeId,
    ) -> Result<(), EditorError> {
        model.toggle_fold(Some(node))
    }

    /// Commit an inline caption edit. Whitespace-only input is discarded
    /// and editing continues.
    pub fn caption_edit_committed(
        &self,
        model: &mut MindMapModel,
        text: &str,
    ) -> Result<(), EditorError> {
        let caption = text.trim();
        if caption.is_empty() {
            debug!("Discarding empty caption");
            return Ok(());
        }

        self.view.borrow_mut().stop_edit_node_caption();
        model.change_node_caption(None, caption)
    }

    pub fn mouse_wheeled(&self, model: &mut MindMapModel, delta: f64) {
        self.view.borrow_mut().stop_edit_node_caption();

        let factor = {
            let mut zoom = self.zoom.borrow_mut();
            if delta > 0.0 {
                zoom.zoom_in()
            } else {
                zoom.zoom_out()
            }
        };
        model.zoom_changed(factor);
    }

    // ─── Creator tool ────────────────────────────────────────────────────

    /// A creator drag started on `node`. Returns the color of the branch
    /// being drawn: random from the root, inherited elsewhere.
    pub fn drag_started(&self, model: &MindMapModel, node: &NodeId) -> Result<Color, EditorError> {
        let tree = tree(model)?;
        if !tree.contains(node) {
            return Err(EditorError::StaleTarget(node.clone()));
        }

        let color = if tree.is_root(node) {
            (self.pick_color)()
        } else {
            tree.effective_branch_color(node)
                .cloned()
                .unwrap_or_else(|| (self.pick_color)())
        };

        *self.drag_color.borrow_mut() = Some(color.clone());
        Ok(color)
    }

    /// A creator drag ended at `(x, y)` relative to `parent`. Short drags
    /// are discarded; otherwise the new node is created and put into
    /// caption editing. Returns the id of the created node.
    pub fn drag_stopped(
        &self,
        model: &mut MindMapModel,
        parent: &NodeId,
        x: f64,
        y: f64,
        distance: f64,
    ) -> Result<Option<NodeId>, EditorError> {
        let color = self.drag_color.borrow_mut().take();
        if distance < self.min_creation_distance {
            debug!(distance, "Ignoring short creator drag");
            return Ok(None);
        }

        let node = NewNode::new().offset(Point::new(x, y)).branch_color(color);
        model
            .create_node(node, Some(parent), CreateOptions::edit_caption())
            .map(Some)
    }
}

fn tree(model: &MindMapModel) -> Result<&NodeTree, EditorError> {
    model.tree().ok_or(EditorError::NoDocument)
}
