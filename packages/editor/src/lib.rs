//! # Mindmaps Editor
//!
//! Synchronization core of the mind map editor: the action-based mutation
//! protocol and the event bus that keeps views in step with the document.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ presenter: view/creator interactions        │
//! │  - builds Actions, invokes Commands         │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ model: sole owner of document + selection   │
//! │  - applies Actions to the NodeTree          │
//! │  - records inverses for undo/redo           │
//! │  - publishes Events                         │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ event bus: synchronous, in-order dispatch   │
//! │  → presenter updates the view               │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **One mutation path**: the tree changes only through [`Action::apply`],
//!    and only the model applies actions
//! 2. **All or nothing**: a rejected action changes nothing and publishes
//!    nothing
//! 3. **Synchronous reactions**: every subscriber has run before the call
//!    that triggered the event returns
//! 4. **No ambient state**: the bus and command registry are explicit
//!    objects handed to whoever needs them
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mindmaps_editor::{CanvasPresenter, Document, EditorConfig, EventBus, MindMapModel};
//! use std::rc::Rc;
//!
//! let config = EditorConfig::default();
//! let mut model = MindMapModel::new(Rc::new(EventBus::new()), config.clone());
//! let presenter = CanvasPresenter::attach(view, creator, zoom, &mut model);
//!
//! // Draws the map and selects the root
//! model.open_document(Document::from_config("ideas", &config));
//!
//! // Creator tool dragged 80 units away from the root
//! let root = model.tree().unwrap().root_id().clone();
//! presenter.drag_started(&model, &root)?;
//! presenter.drag_stopped(&mut model, &root, 80.0, 0.0, 80.0)?;
//! ```

mod actions;
mod collaborators;
mod commands;
mod config;
mod document;
mod errors;
mod event_bus;
mod geometry;
mod id_generator;
mod model;
mod node;
mod presenter;
mod style;
mod tree;
mod undo_stack;

pub use actions::{Action, ActionError, Applied, Effect};
pub use collaborators::{CanvasView, CreatorTool, ZoomController};
pub use commands::{Command, CommandHandler, CommandId, CommandRegistry};
pub use config::{EditorConfig, DEFAULT_CONFIG_NAME};
pub use document::Document;
pub use errors::EditorError;
pub use event_bus::{Event, EventBus, Topic};
pub use geometry::{Dimensions, Point};
pub use id_generator::{get_document_id, IdGenerator, NodeId};
pub use model::{CreateOptions, MindMapModel};
pub use node::{NewNode, Node, Subtree};
pub use presenter::CanvasPresenter;
pub use style::{Color, Font};
pub use tree::NodeTree;
pub use undo_stack::{ActionBatch, UndoStack};
