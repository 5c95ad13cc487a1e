//! # Undo/Redo Stack
//!
//! Records applied actions together with their inverses.
//!
//! ## Design
//!
//! - The model records the inverse returned by each successful apply
//! - Undo applies the inverses and moves the batch to the redo stack
//! - Redo reapplies the recorded actions
//! - New records clear the redo stack
//! - Batches group several actions into one undo step
//!
//! The stack only stores history; applying it is the model's job so that
//! undo and redo publish events like any other action.

use crate::actions::Action;

/// A group of actions that should be undone/redone together
#[derive(Debug, Clone, PartialEq)]
pub struct ActionBatch {
    /// The actions in this batch (in application order)
    pub actions: Vec<Action>,

    /// The inverse actions (in reverse order for undo)
    pub inverses: Vec<Action>,

    /// Optional description of this batch
    pub description: Option<String>,
}

impl ActionBatch {
    fn empty() -> Self {
        Self {
            actions: Vec::new(),
            inverses: Vec::new(),
            description: None,
        }
    }

    /// Create a single-action batch
    pub fn single(action: Action, inverse: Action) -> Self {
        Self {
            actions: vec![action],
            inverses: vec![inverse],
            description: None,
        }
    }
}

/// Undo/redo history for one document
#[derive(Debug)]
pub struct UndoStack {
    /// Stack of applied batches (most recent last)
    undo_stack: Vec<ActionBatch>,

    /// Stack of undone batches (most recent last)
    redo_stack: Vec<ActionBatch>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Currently building a batch
    current_batch: Option<ActionBatch>,

    /// Nesting depth of begin_batch calls
    batch_depth: usize,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    /// Create an undo stack with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
            batch_depth: 0,
        }
    }

    /// Record an applied action and its inverse
    pub fn record(&mut self, action: Action, inverse: Action) {
        if let Some(batch) = &mut self.current_batch {
            batch.actions.push(action);
            batch.inverses.insert(0, inverse); // Inverses go in reverse order
        } else {
            self.push_batch(ActionBatch::single(action, inverse));
        }
    }

    /// Start a batch (will be undone/redone together). Nested calls join
    /// the outermost batch.
    pub fn begin_batch(&mut self) {
        if self.batch_depth == 0 {
            self.current_batch = Some(ActionBatch::empty());
        }
        self.batch_depth += 1;
    }

    /// End the current batch and push to undo stack
    pub fn end_batch(&mut self) {
        self.batch_depth = self.batch_depth.saturating_sub(1);
        if self.batch_depth > 0 {
            return;
        }
        if let Some(batch) = self.current_batch.take() {
            if !batch.actions.is_empty() {
                self.push_batch(batch);
            }
        }
    }

    /// Set description for current batch (if batching)
    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    fn push_batch(&mut self, batch: ActionBatch) {
        self.undo_stack.push(batch);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // New action invalidates future
        self.redo_stack.clear();
    }

    /// Take the most recent batch for undoing
    pub fn take_undo(&mut self) -> Option<ActionBatch> {
        self.undo_stack.pop()
    }

    /// Take the most recently undone batch for redoing
    pub fn take_redo(&mut self) -> Option<ActionBatch> {
        self.redo_stack.pop()
    }

    /// Store a batch whose inverses were just applied
    pub fn push_undone(&mut self, batch: ActionBatch) {
        self.redo_stack.push(batch);
    }

    /// Store a batch whose actions were just reapplied
    pub fn push_redone(&mut self, batch: ActionBatch) {
        self.undo_stack.push(batch);
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
        self.batch_depth = 0;
    }

    /// Get description of the next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }

    /// Get description of the next redo operation
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
