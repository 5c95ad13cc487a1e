//! Error types for the editor

use crate::actions::ActionError;
use crate::commands::CommandId;
use crate::id_generator::NodeId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    /// Malformed caller input, rejected before any action is built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The target node is no longer part of the active document
    #[error("Stale target: node {0} is not in the document")]
    StaleTarget(NodeId),

    #[error("No document is open")]
    NoDocument,

    #[error("No handler registered for command {0:?}")]
    UnhandledCommand(CommandId),

    #[error("Action error: {0}")]
    Action(ActionError),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ActionError> for EditorError {
    fn from(e: ActionError) -> Self {
        match e {
            ActionError::StaleTarget(id) => EditorError::StaleTarget(id),
            ActionError::RootImmutable => {
                EditorError::InvalidRequest("the root node cannot be deleted".to_string())
            }
            other => EditorError::Action(other),
        }
    }
}

impl EditorError {
    /// True for failures that leave the caller free to retry against the
    /// current selection
    pub fn is_stale(&self) -> bool {
        matches!(self, EditorError::StaleTarget(_))
    }
}
