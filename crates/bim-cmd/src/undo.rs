//! Undo/redo manager
//!
//! Two bounded stacks of [`Operation`]s. The stacks are private so the only
//! way to record an operation is [`UndoManager::execute`], which always
//! clears the redo stack.

use std::collections::VecDeque;

use bim_model::{Delta, Model, ModelResult};

/// Default number of operations kept for undo
pub const DEFAULT_UNDO_LIMIT: usize = 100;

/// A recorded, reversible model change
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    forward: Delta,
    inverse: Delta,
    description: String,
}

impl Operation {
    /// Build an operation; the inverse is derived from the forward delta
    pub fn new(forward: Delta, description: impl Into<String>) -> Self {
        let inverse = forward.inverse();
        Self {
            forward,
            inverse,
            description: description.into(),
        }
    }

    pub fn forward(&self) -> &Delta {
        &self.forward
    }

    pub fn inverse(&self) -> &Delta {
        &self.inverse
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Undo and redo stacks, most recent at the back
#[derive(Debug, Clone)]
pub struct UndoManager {
    undo_stack: VecDeque<Operation>,
    redo_stack: Vec<Operation>,
    limit: usize,
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_LIMIT)
    }
}

impl UndoManager {
    /// Create a manager keeping at most `limit` undoable operations
    pub fn new(limit: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Apply `op` and record it
    ///
    /// On failure the model is unchanged and neither stack is touched.
    pub fn execute(&mut self, model: &mut Model, op: Operation) -> ModelResult<()> {
        model.apply(&op.forward)?;
        log::info!("applied: {}", op.description);
        self.redo_stack.clear();
        self.undo_stack.push_back(op);
        self.trim();
        Ok(())
    }

    /// Revert the most recent operation
    ///
    /// Returns `Ok(None)` when there is nothing to undo. If the inverse
    /// cannot be applied the operation stays on the undo stack.
    pub fn undo(&mut self, model: &mut Model) -> ModelResult<Option<&Operation>> {
        let Some(op) = self.undo_stack.pop_back() else {
            return Ok(None);
        };
        if let Err(e) = model.apply(&op.inverse) {
            self.undo_stack.push_back(op);
            return Err(e);
        }
        log::info!("undone: {}", op.description);
        self.redo_stack.push(op);
        Ok(self.redo_stack.last())
    }

    /// Re-apply the most recently undone operation
    ///
    /// Returns `Ok(None)` when there is nothing to redo.
    pub fn redo(&mut self, model: &mut Model) -> ModelResult<Option<&Operation>> {
        let Some(op) = self.redo_stack.pop() else {
            return Ok(None);
        };
        if let Err(e) = model.apply(&op.forward) {
            self.redo_stack.push(op);
            return Err(e);
        }
        log::info!("redone: {}", op.description);
        self.undo_stack.push_back(op);
        Ok(self.undo_stack.back())
    }

    /// Change the limit, dropping the oldest operations if needed
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit.max(1);
        self.trim();
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Description of the operation `undo` would revert
    pub fn peek_undo(&self) -> Option<&str> {
        self.undo_stack.back().map(|op| op.description.as_str())
    }

    /// Description of the operation `redo` would re-apply
    pub fn peek_redo(&self) -> Option<&str> {
        self.redo_stack.last().map(|op| op.description.as_str())
    }

    fn trim(&mut self) {
        while self.undo_stack.len() > self.limit {
            if let Some(dropped) = self.undo_stack.pop_front() {
                log::debug!("undo limit reached, dropping '{}'", dropped.description);
            }
        }
    }
}
