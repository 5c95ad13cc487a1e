//! Command slots that presentation code fills with handlers.
//!
//! A global trigger (a menu item, a shortcut) only knows a [`CommandId`];
//! the handler that does the work is installed at wiring time.

use crate::errors::EditorError;
use crate::id_generator::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandId {
    EditNodeCaption,
    ToggleNodeFolded,
    DeleteNode,
    Undo,
    Redo,
}

/// Handler invoked with an optional target node (None = current selection)
pub type CommandHandler<C> = Rc<dyn Fn(Option<NodeId>, &mut C) -> Result<(), EditorError>>;

/// Registration slot for one command
pub struct Command<C> {
    id: CommandId,
    handler: Option<CommandHandler<C>>,
}

impl<C> Command<C> {
    fn new(id: CommandId) -> Self {
        Self { id, handler: None }
    }

    pub fn id(&self) -> CommandId {
        self.id
    }

    /// Install the handler, replacing any previous one
    pub fn set_handler<F>(&mut self, handler: F)
    where
        F: Fn(Option<NodeId>, &mut C) -> Result<(), EditorError> + 'static,
    {
        self.handler = Some(Rc::new(handler));
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    pub fn handler(&self) -> Option<CommandHandler<C>> {
        self.handler.clone()
    }
}

/// Command id → handler table, at most one handler per id
pub struct CommandRegistry<C> {
    commands: HashMap<CommandId, Command<C>>,
}

impl<C> CommandRegistry<C> {
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Get the slot for a command, creating an empty one on first use
    pub fn get(&mut self, id: CommandId) -> &mut Command<C> {
        self.commands.entry(id).or_insert_with(|| Command::new(id))
    }

    pub fn handler(&self, id: CommandId) -> Option<CommandHandler<C>> {
        self.commands.get(&id).and_then(Command::handler)
    }
}

impl<C> Default for CommandRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for CommandRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut handled: Vec<_> = self
            .commands
            .values()
            .filter(|c| c.has_handler())
            .map(|c| c.id)
            .collect();
        handled.sort_by_key(|id| format!("{:?}", id));
        f.debug_struct("CommandRegistry").field("handled", &handled).finish()
    }
}
