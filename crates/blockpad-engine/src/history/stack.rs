use crate::editing::DocumentStore;
use crate::error::Result;

use super::operation::Operation;
use super::replay::{Direction, Replay, replay};

/// Undo/redo stacks of steps, each step one user-perceived action.
///
/// The newest step stays *open* while a burst is in progress. Content
/// updates to the block already being edited fold into it; a content update
/// elsewhere seals it and opens a new step. Structural operations open a new
/// step after a content-only burst and join an open structural step, which
/// is how a split (add + update) or a multi-block delete becomes one step.
/// [`History::optimize_op`] seals the open step.
#[derive(Debug, Clone)]
pub struct History {
    undo: Vec<Vec<Operation>>,
    redo: Vec<Vec<Operation>>,
    open: bool,
    max_depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(200)
    }
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            open: false,
            max_depth: max_depth.max(1),
        }
    }

    pub fn push(&mut self, op: Operation) {
        self.redo.clear();

        if self.open
            && let Some(step) = self.undo.last_mut()
        {
            let structural_step = step.iter().any(|op| !op.is_content_update());
            let joins = if op.is_content_update() {
                structural_step || step.last().is_some_and(|last| last.same_target(&op))
            } else {
                structural_step
            };
            if joins {
                match step.last_mut() {
                    Some(last) => {
                        if let Some(op) = last.absorb(op) {
                            step.push(op);
                        }
                    }
                    None => step.push(op),
                }
                return;
            }
        }

        self.undo.push(vec![op]);
        self.open = true;
        if self.undo.len() > self.max_depth {
            self.undo.remove(0);
        }
    }

    /// Coalesce runs of same-target content updates in the open step and
    /// seal it.
    pub fn optimize_op(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        let Some(step) = self.undo.last_mut() else {
            return;
        };

        let mut folded: Vec<Operation> = Vec::with_capacity(step.len());
        for op in step.drain(..) {
            match folded.last_mut() {
                Some(last) => {
                    if let Some(op) = last.absorb(op) {
                        folded.push(op);
                    }
                }
                None => folded.push(op),
            }
        }
        *step = folded;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    /// The newest step, oldest operation first
    pub fn last_step(&self) -> Option<&[Operation]> {
        self.undo.last().map(Vec::as_slice)
    }

    /// Revert the newest step. `Ok(None)` when there is nothing to undo; on
    /// error the step is discarded and the store is left as it was.
    pub fn undo(&mut self, store: &mut DocumentStore) -> Result<Option<Replay>> {
        self.open = false;
        let Some(step) = self.undo.pop() else {
            return Ok(None);
        };
        let replayed = replay(store, &step, Direction::Undo)?;
        self.redo.push(step);
        Ok(Some(replayed))
    }

    pub fn redo(&mut self, store: &mut DocumentStore) -> Result<Option<Replay>> {
        self.open = false;
        let Some(step) = self.redo.pop() else {
            return Ok(None);
        };
        let replayed = replay(store, &step, Direction::Redo)?;
        self.undo.push(step);
        Ok(Some(replayed))
    }

    /// Apply an operation authored elsewhere without touching the stacks
    pub fn apply_external(&self, store: &mut DocumentStore, op: &Operation) -> Result<Replay> {
        replay(store, std::slice::from_ref(op), Direction::Redo)
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.open = false;
    }
}
