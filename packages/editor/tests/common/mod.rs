//! Recording fakes for the canvas surfaces
#![allow(dead_code)]

use mindmaps_editor::{
    CanvasPresenter, CanvasView, Color, CreatorTool, Dimensions, Document, EditorConfig, EventBus,
    MindMapModel, NodeId, NodeTree, ZoomController,
};
use std::cell::Cell;
use std::rc::Rc;

pub const DEFAULT_ZOOM: f64 = 1.0;

/// One instruction received by the view
#[derive(Debug, Clone, PartialEq)]
pub enum ViewCall {
    DrawMap { nodes: usize },
    CreateNode(NodeId),
    DeleteNode(NodeId),
    PositionNode(NodeId),
    SetNodeText(NodeId, String),
    RedrawConnectors(NodeId),
    UpdateNode(NodeId),
    Highlight(NodeId),
    Unhighlight(NodeId),
    OpenNode(NodeId),
    CloseNode(NodeId),
    RemoveFoldButton(NodeId),
    EditCaption(NodeId),
    StopEditCaption,
    SetZoomFactor(f64),
    ApplyViewZoom,
    ScaleMap,
    SetDimensions(Dimensions),
    Center,
    Clear,
}

#[derive(Debug, Default)]
pub struct RecordingView {
    pub calls: Vec<ViewCall>,
    pub node_dragging: Rc<Cell<bool>>,
}

impl RecordingView {
    pub fn count(&self, predicate: impl Fn(&ViewCall) -> bool) -> usize {
        self.calls.iter().filter(|c| predicate(c)).count()
    }

    pub fn position(&self, call: &ViewCall) -> Option<usize> {
        self.calls.iter().position(|c| c == call)
    }
}

impl CanvasView for RecordingView {
    fn draw_map(&mut self, tree: &NodeTree) {
        self.calls.push(ViewCall::DrawMap { nodes: tree.len() });
    }

    fn create_node(&mut self, _tree: &NodeTree, node: &NodeId) {
        self.calls.push(ViewCall::CreateNode(node.clone()));
    }

    fn delete_node(&mut self, node: &NodeId) {
        self.calls.push(ViewCall::DeleteNode(node.clone()));
    }

    fn position_node(&mut self, _tree: &NodeTree, node: &NodeId) {
        self.calls.push(ViewCall::PositionNode(node.clone()));
    }

    fn set_node_text(&mut self, node: &NodeId, text: &str) {
        self.calls.push(ViewCall::SetNodeText(node.clone(), text.to_string()));
    }

    fn redraw_node_connectors(&mut self, _tree: &NodeTree, node: &NodeId) {
        self.calls.push(ViewCall::RedrawConnectors(node.clone()));
    }

    fn update_node(&mut self, _tree: &NodeTree, node: &NodeId) {
        self.calls.push(ViewCall::UpdateNode(node.clone()));
    }

    fn highlight_node(&mut self, node: &NodeId) {
        self.calls.push(ViewCall::Highlight(node.clone()));
    }

    fn unhighlight_node(&mut self, node: &NodeId) {
        self.calls.push(ViewCall::Unhighlight(node.clone()));
    }

    fn open_node(&mut self, _tree: &NodeTree, node: &NodeId) {
        self.calls.push(ViewCall::OpenNode(node.clone()));
    }

    fn close_node(&mut self, node: &NodeId) {
        self.calls.push(ViewCall::CloseNode(node.clone()));
    }

    fn remove_fold_button(&mut self, node: &NodeId) {
        self.calls.push(ViewCall::RemoveFoldButton(node.clone()));
    }

    fn edit_node_caption(&mut self, node: &NodeId) {
        self.calls.push(ViewCall::EditCaption(node.clone()));
    }

    fn stop_edit_node_caption(&mut self) {
        self.calls.push(ViewCall::StopEditCaption);
    }

    fn set_zoom_factor(&mut self, factor: f64) {
        self.calls.push(ViewCall::SetZoomFactor(factor));
    }

    fn apply_view_zoom(&mut self) {
        self.calls.push(ViewCall::ApplyViewZoom);
    }

    fn scale_map(&mut self) {
        self.calls.push(ViewCall::ScaleMap);
    }

    fn set_dimensions(&mut self, dimensions: Dimensions) {
        self.calls.push(ViewCall::SetDimensions(dimensions));
    }

    fn center(&mut self) {
        self.calls.push(ViewCall::Center);
    }

    fn clear(&mut self) {
        self.calls.push(ViewCall::Clear);
    }

    fn is_node_dragging(&self) -> bool {
        self.node_dragging.get()
    }
}

#[derive(Debug, Default)]
pub struct FakeCreator {
    pub attached: Vec<NodeId>,
    pub dragging: Rc<Cell<bool>>,
}

impl CreatorTool for FakeCreator {
    fn attach_to_node(&mut self, node: &NodeId) {
        self.attached.push(node.clone());
    }

    fn is_dragging(&self) -> bool {
        self.dragging.get()
    }
}

pub const ZOOM_STEP: f64 = 1.25;

#[derive(Debug)]
pub struct FakeZoom {
    pub factor: f64,
    pub zoom_ins: usize,
    pub zoom_outs: usize,
}

impl Default for FakeZoom {
    fn default() -> Self {
        Self {
            factor: DEFAULT_ZOOM,
            zoom_ins: 0,
            zoom_outs: 0,
        }
    }
}

impl ZoomController for FakeZoom {
    fn zoom_in(&mut self) -> f64 {
        self.zoom_ins += 1;
        self.factor *= ZOOM_STEP;
        self.factor
    }

    fn zoom_out(&mut self) -> f64 {
        self.zoom_outs += 1;
        self.factor /= ZOOM_STEP;
        self.factor
    }

    fn default_zoom(&self) -> f64 {
        DEFAULT_ZOOM
    }
}

pub type Presenter = CanvasPresenter<RecordingView, FakeCreator, FakeZoom>;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Model with an attached presenter and no open document
pub fn editor() -> (MindMapModel, Rc<Presenter>) {
    init_tracing();
    let config = EditorConfig::default();
    let mut model = MindMapModel::new(Rc::new(EventBus::new()), config);
    let presenter = CanvasPresenter::attach_with_colors(
        RecordingView::default(),
        FakeCreator::default(),
        FakeZoom::default(),
        &mut model,
        || Color::rgb(0x12, 0x34, 0x56),
    );
    (model, presenter)
}

/// Model with an attached presenter and a fresh document open
pub fn editor_with_document() -> (MindMapModel, Rc<Presenter>) {
    let (mut model, presenter) = editor();
    model.open_document(Document::from_config("test", model.config()));
    (model, presenter)
}

pub fn root(model: &MindMapModel) -> NodeId {
    model.tree().expect("document open").root_id().clone()
}
