//! # Mind Map Model
//!
//! The coordinator: sole owner of the open [`Document`] and the selection,
//! and the only place actions are applied.
//!
//! Every mutation follows the same path:
//!
//! ```text
//! Action → Document::apply → history → Event(s) on the bus
//! ```
//!
//! An action that fails to apply changes nothing, records nothing and
//! publishes nothing. A successful one has fully mutated the tree before the
//! first subscriber runs.

use crate::actions::{Action, Effect};
use crate::commands::{CommandId, CommandRegistry};
use crate::config::EditorConfig;
use crate::document::Document;
use crate::errors::EditorError;
use crate::event_bus::{Event, EventBus};
use crate::id_generator::NodeId;
use crate::node::NewNode;
use crate::tree::NodeTree;
use crate::undo_stack::UndoStack;
use std::rc::Rc;
use tracing::{debug, info, trace, warn};

/// Options consumed once when a node is created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateOptions {
    /// Put the new node into inline caption editing after it is shown
    pub edit_caption_on_create: bool,
}

impl CreateOptions {
    pub fn edit_caption() -> Self {
        Self {
            edit_caption_on_create: true,
        }
    }
}

#[derive(Debug)]
pub struct MindMapModel {
    bus: Rc<EventBus<MindMapModel>>,
    commands: CommandRegistry<MindMapModel>,
    config: EditorConfig,
    document: Option<Document>,
    selected: Option<NodeId>,
    history: UndoStack,
    /// Set while undo/redo replays history
    replaying: bool,
}

impl MindMapModel {
    pub fn new(bus: Rc<EventBus<MindMapModel>>, config: EditorConfig) -> Self {
        let history = UndoStack::with_max_levels(config.undo_levels);
        Self {
            bus,
            commands: CommandRegistry::new(),
            config,
            document: None,
            selected: None,
            history,
            replaying: false,
        }
    }

    pub fn bus(&self) -> &Rc<EventBus<MindMapModel>> {
        &self.bus
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn commands_mut(&mut self) -> &mut CommandRegistry<MindMapModel> {
        &mut self.commands
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn tree(&self) -> Option<&NodeTree> {
        self.document.as_ref().map(Document::tree)
    }

    pub fn selected_node(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    /// Make `document` the active one, closing the current document first
    pub fn open_document(&mut self, document: Document) {
        if self.document.is_some() {
            self.close_document();
        }

        let event = Event::DocumentOpened {
            document_id: document.id().to_string(),
            is_new: document.is_new(),
        };
        info!(document_id = %document.id(), title = %document.title, "Opening document");

        self.document = Some(document);
        self.publish(event);
    }

    /// Close the active document, returning it
    pub fn close_document(&mut self) -> Option<Document> {
        let document = self.document.take()?;
        self.selected = None;
        self.history.clear();

        info!(document_id = %document.id(), "Closed document");
        self.publish(Event::DocumentClosed {
            document_id: document.id().to_string(),
        });
        Some(document)
    }

    /// Apply an action and publish what it changed
    pub fn execute_action(&mut self, action: Action) -> Result<(), EditorError> {
        self.commit(&action, CreateOptions::default())
    }

    /// Select a node, publishing the new and previous selection
    pub fn select_node(&mut self, node: &NodeId) -> Result<(), EditorError> {
        let tree = self.tree().ok_or(EditorError::NoDocument)?;
        if !tree.contains(node) {
            return Err(EditorError::StaleTarget(node.clone()));
        }
        if self.selected.as_ref() == Some(node) {
            return Ok(());
        }

        let previous = self.selected.replace(node.clone());
        self.publish(Event::NodeSelected {
            selected: node.clone(),
            previous,
        });
        Ok(())
    }

    /// Create a node under `parent`, returning its id.
    ///
    /// Actions issued by node-created subscribers undo together with the
    /// creation.
    pub fn create_node(
        &mut self,
        node: NewNode,
        parent: Option<&NodeId>,
        options: CreateOptions,
    ) -> Result<NodeId, EditorError> {
        let parent = parent
            .cloned()
            .ok_or_else(|| EditorError::InvalidRequest("a new node needs a parent".to_string()))?;
        let document = self.document.as_mut().ok_or(EditorError::NoDocument)?;
        if !document.tree().contains(&parent) {
            return Err(EditorError::StaleTarget(parent));
        }

        let id = document.next_node_id();
        let action = Action::Create {
            parent,
            node: node.into_subtree(id.clone()),
            index: None,
        };

        self.history.begin_batch();
        self.history.set_batch_description("Create node");
        let result = self.commit(&action, options);
        self.history.end_batch();

        result.map(|_| id)
    }

    /// Rename `node` (or the selected node). Surrounding whitespace is
    /// dropped; an empty result is rejected.
    pub fn change_node_caption(
        &mut self,
        node: Option<&NodeId>,
        text: &str,
    ) -> Result<(), EditorError> {
        let caption = text.trim();
        if caption.is_empty() {
            return Err(EditorError::InvalidRequest("caption must not be empty".to_string()));
        }
        let node = self.resolve_target(node)?;

        self.commit(
            &Action::ChangeCaption {
                node,
                caption: caption.to_string(),
            },
            CreateOptions::default(),
        )
    }

    /// Delete `node` (or the selected node) and its subtree
    pub fn delete_node(&mut self, node: Option<&NodeId>) -> Result<(), EditorError> {
        let node = self.resolve_target(node)?;
        if self.tree().is_some_and(|t| t.is_root(&node)) {
            return Err(EditorError::InvalidRequest("the root node cannot be deleted".to_string()));
        }
        self.execute_action(Action::Delete { node })
    }

    /// Fold or unfold `node` (or the selected node)
    pub fn toggle_fold(&mut self, node: Option<&NodeId>) -> Result<(), EditorError> {
        let node = self.resolve_target(node)?;
        self.execute_action(Action::ToggleFold { node })
    }

    /// Revert the most recent history batch. Returns false if there was
    /// nothing to undo.
    pub fn undo(&mut self) -> Result<bool, EditorError> {
        if self.document.is_none() {
            return Err(EditorError::NoDocument);
        }
        let Some(batch) = self.history.take_undo() else {
            return Ok(false);
        };

        self.replay(&batch.inverses)?;
        debug!(actions = batch.actions.len(), "Undid batch");
        self.history.push_undone(batch);
        Ok(true)
    }

    /// Reapply the most recently undone batch. Returns false if there was
    /// nothing to redo.
    pub fn redo(&mut self) -> Result<bool, EditorError> {
        if self.document.is_none() {
            return Err(EditorError::NoDocument);
        }
        let Some(batch) = self.history.take_redo() else {
            return Ok(false);
        };

        self.replay(&batch.actions)?;
        debug!(actions = batch.actions.len(), "Redid batch");
        self.history.push_redone(batch);
        Ok(true)
    }

    /// Announce a new zoom factor to subscribers
    pub fn zoom_changed(&mut self, factor: f64) {
        debug!(factor, "Zoom changed");
        self.publish(Event::ZoomChanged { factor });
    }

    /// Run the handler registered for a command
    pub fn execute_command(
        &mut self,
        id: CommandId,
        target: Option<NodeId>,
    ) -> Result<(), EditorError> {
        let handler = self
            .commands
            .handler(id)
            .ok_or(EditorError::UnhandledCommand(id))?;
        handler(target, self)
    }

    fn replay(&mut self, actions: &[Action]) -> Result<(), EditorError> {
        self.replaying = true;
        let result = actions
            .iter()
            .try_for_each(|action| self.commit(action, CreateOptions::default()));
        self.replaying = false;

        if let Err(e) = &result {
            // A half-replayed batch no longer matches the tree
            warn!(error = %e, "History replay failed, clearing history");
            self.history.clear();
        }
        result
    }

    fn resolve_target(&self, node: Option<&NodeId>) -> Result<NodeId, EditorError> {
        if self.document.is_none() {
            return Err(EditorError::NoDocument);
        }
        match node {
            Some(id) => Ok(id.clone()),
            None => self
                .selected
                .clone()
                .ok_or_else(|| EditorError::InvalidRequest("no node selected".to_string())),
        }
    }

    fn commit(&mut self, action: &Action, options: CreateOptions) -> Result<(), EditorError> {
        let document = self.document.as_mut().ok_or(EditorError::NoDocument)?;

        let applied = match document.apply(action) {
            Ok(applied) => applied,
            Err(e) => {
                warn!(
                    action = action.name(),
                    target = %action.target(),
                    error = %e,
                    "Action rejected"
                );
                return Err(e.into());
            }
        };
        debug!(
            action = action.name(),
            target = %action.target(),
            version = document.version,
            "Applied action"
        );

        if !self.replaying {
            if let Some(inverse) = applied.inverse {
                self.history.record(action.clone(), inverse);
            }
        }

        self.publish_effect(applied.effect, options);
        Ok(())
    }

    fn publish_effect(&mut self, effect: Effect, options: CreateOptions) {
        let event = match effect {
            Effect::Created { node, parent } => Event::NodeCreated {
                node,
                parent,
                edit_caption: options.edit_caption_on_create,
            },
            Effect::Deleted { node, parent, removed } => {
                // Keep the selection live before anyone observes the deletion
                let lost_selection = self.selected.as_ref().is_some_and(|s| removed.contains(s));
                let previous = if lost_selection {
                    self.selected.replace(parent.clone())
                } else {
                    None
                };

                self.publish(Event::NodeDeleted {
                    node,
                    parent: parent.clone(),
                    removed,
                });

                if lost_selection {
                    Event::NodeSelected {
                        selected: parent,
                        previous,
                    }
                } else {
                    return;
                }
            }
            Effect::Moved { node, offset } => Event::NodeMoved { node, offset },
            Effect::CaptionChanged { node, caption } => Event::NodeCaptionChanged { node, caption },
            Effect::Opened { node } => Event::NodeOpened { node },
            Effect::Closed { node } => Event::NodeClosed { node },
            Effect::BranchColorChanged { node } => Event::NodeBranchColorChanged { node },
            Effect::FontChanged { node } => Event::NodeFontChanged { node },
            Effect::Unchanged => {
                trace!("Action changed nothing");
                return;
            }
        };

        self.publish(event);
    }

    fn publish(&mut self, event: Event) {
        let bus = Rc::clone(&self.bus);
        bus.publish(&event, self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionError;
    use crate::event_bus::Topic;
    use crate::geometry::Point;
    use std::cell::RefCell;

    /// Model wired to a bus that records every event it sees
    fn recording_model() -> (MindMapModel, Rc<RefCell<Vec<Event>>>) {
        let bus: Rc<EventBus<MindMapModel>> = Rc::new(EventBus::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        for topic in [
            Topic::DocumentOpened,
            Topic::DocumentClosed,
            Topic::NodeCreated,
            Topic::NodeDeleted,
            Topic::NodeMoved,
            Topic::NodeOpened,
            Topic::NodeClosed,
            Topic::NodeSelected,
            Topic::NodeCaptionChanged,
        ] {
            let log = Rc::clone(&log);
            bus.subscribe(topic, move |event, _| log.borrow_mut().push(event.clone()));
        }

        let mut model = MindMapModel::new(bus, EditorConfig::default());
        model.open_document(Document::from_config("test", &EditorConfig::default()));
        log.borrow_mut().clear();
        (model, log)
    }

    fn root(model: &MindMapModel) -> NodeId {
        model.tree().unwrap().root_id().clone()
    }

    #[test]
    fn test_create_node_publishes_created() {
        let (mut model, log) = recording_model();
        let root = root(&model);

        let id = model
            .create_node(NewNode::new().caption("child"), Some(&root), CreateOptions::default())
            .unwrap();

        assert_eq!(
            *log.borrow(),
            vec![Event::NodeCreated {
                node: id.clone(),
                parent: root.clone(),
                edit_caption: false,
            }]
        );
        assert_eq!(model.tree().unwrap().children(&root), &[id]);
    }

    #[test]
    fn test_create_without_parent_is_invalid() {
        let (mut model, log) = recording_model();
        let result = model.create_node(NewNode::new(), None, CreateOptions::default());

        assert!(matches!(result, Err(EditorError::InvalidRequest(_))));
        assert!(log.borrow().is_empty());
        assert_eq!(model.tree().unwrap().len(), 1);
    }

    #[test]
    fn test_stale_action_publishes_nothing() {
        let (mut model, log) = recording_model();
        let root = root(&model);
        let id = model
            .create_node(NewNode::new(), Some(&root), CreateOptions::default())
            .unwrap();
        model.delete_node(Some(&id)).unwrap();
        log.borrow_mut().clear();
        let version = model.document().unwrap().version;

        let result = model.execute_action(Action::Move {
            node: id,
            offset: Point::new(1.0, 1.0),
        });

        assert!(result.as_ref().is_err_and(EditorError::is_stale));
        assert!(log.borrow().is_empty());
        assert_eq!(model.document().unwrap().version, version);
    }

    #[test]
    fn test_out_of_range_create_publishes_nothing() {
        let (mut model, log) = recording_model();
        let root = root(&model);
        let version = model.document().unwrap().version;

        let result = model.execute_action(Action::Create {
            parent: root,
            node: NewNode::new().into_subtree(NodeId::from("late")),
            index: Some(1),
        });

        assert!(matches!(
            result,
            Err(EditorError::Action(ActionError::IndexOutOfBounds { index: 1, .. }))
        ));
        assert!(log.borrow().is_empty());
        assert_eq!(model.tree().unwrap().len(), 1);
        assert_eq!(model.document().unwrap().version, version);
    }

    #[test]
    fn test_select_node_reports_previous() {
        let (mut model, log) = recording_model();
        let root = root(&model);
        let child = model
            .create_node(NewNode::new(), Some(&root), CreateOptions::default())
            .unwrap();
        log.borrow_mut().clear();

        model.select_node(&root).unwrap();
        model.select_node(&child).unwrap();
        // Reselecting is a no-op
        model.select_node(&child).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                Event::NodeSelected {
                    selected: root.clone(),
                    previous: None,
                },
                Event::NodeSelected {
                    selected: child.clone(),
                    previous: Some(root),
                },
            ]
        );
    }

    #[test]
    fn test_whitespace_caption_rejected() {
        let (mut model, log) = recording_model();
        let root = root(&model);
        model.select_node(&root).unwrap();
        log.borrow_mut().clear();

        let result = model.change_node_caption(None, "  \t ");
        assert!(matches!(result, Err(EditorError::InvalidRequest(_))));
        assert!(log.borrow().is_empty());
        assert_eq!(model.tree().unwrap().root().caption(), "Central Idea");

        model.change_node_caption(None, "  Big Plan ").unwrap();
        assert_eq!(model.tree().unwrap().root().caption(), "Big Plan");
    }

    #[test]
    fn test_deleting_selected_branch_selects_parent() {
        let (mut model, log) = recording_model();
        let root = root(&model);
        let branch = model
            .create_node(NewNode::new(), Some(&root), CreateOptions::default())
            .unwrap();
        let leaf = model
            .create_node(NewNode::new(), Some(&branch), CreateOptions::default())
            .unwrap();
        model.select_node(&leaf).unwrap();
        log.borrow_mut().clear();

        model.delete_node(Some(&branch)).unwrap();

        assert_eq!(model.selected_node(), Some(&root));
        assert_eq!(
            *log.borrow(),
            vec![
                Event::NodeDeleted {
                    node: branch.clone(),
                    parent: root.clone(),
                    removed: vec![branch, leaf.clone()],
                },
                Event::NodeSelected {
                    selected: root,
                    previous: Some(leaf),
                },
            ]
        );
    }

    #[test]
    fn test_root_cannot_be_deleted() {
        let (mut model, _) = recording_model();
        let root = root(&model);
        let result = model.delete_node(Some(&root));
        assert!(matches!(result, Err(EditorError::InvalidRequest(_))));
    }

    #[test]
    fn test_undo_redo_republishes() {
        let (mut model, log) = recording_model();
        let root = root(&model);
        let id = model
            .create_node(NewNode::new(), Some(&root), CreateOptions::default())
            .unwrap();
        log.borrow_mut().clear();

        assert!(model.undo().unwrap());
        assert!(!model.tree().unwrap().contains(&id));
        assert!(model.redo().unwrap());
        assert!(model.tree().unwrap().contains(&id));
        assert!(!model.redo().unwrap());

        let topics: Vec<Topic> = log.borrow().iter().map(Event::topic).collect();
        assert_eq!(topics, vec![Topic::NodeDeleted, Topic::NodeCreated]);
    }

    #[test]
    fn test_close_then_open_on_switch() {
        let (mut model, log) = recording_model();
        model.open_document(Document::from_config("other", &EditorConfig::default()));

        let topics: Vec<Topic> = log.borrow().iter().map(Event::topic).collect();
        assert_eq!(topics, vec![Topic::DocumentClosed, Topic::DocumentOpened]);
        assert!(model.selected_node().is_none());
    }

    #[test]
    fn test_no_document() {
        let mut model = MindMapModel::new(Rc::new(EventBus::new()), EditorConfig::default());
        let result = model.execute_action(Action::Open {
            node: NodeId::from("x"),
        });
        assert!(matches!(result, Err(EditorError::NoDocument)));
        assert!(model.close_document().is_none());
    }

    #[test]
    fn test_zoom_changed_publishes_factor() {
        let bus: Rc<EventBus<MindMapModel>> = Rc::new(EventBus::new());
        let factors = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&factors);
        bus.subscribe(Topic::ZoomChanged, move |event, _| {
            if let Event::ZoomChanged { factor } = event {
                seen.borrow_mut().push(*factor);
            }
        });
        let mut model = MindMapModel::new(bus, EditorConfig::default());

        model.zoom_changed(1.5);

        assert_eq!(*factors.borrow(), vec![1.5]);
    }

    #[test]
    fn test_unhandled_command() {
        let (mut model, _) = recording_model();
        let result = model.execute_command(CommandId::Undo, None);
        assert!(matches!(result, Err(EditorError::UnhandledCommand(CommandId::Undo))));
    }
}
