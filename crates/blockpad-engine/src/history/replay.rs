use crate::editing::DocumentStore;
use crate::error::{EngineError, Result};
use crate::models::{Block, BlockId, CaretPosition, Inline};

use super::diff::{self, Edit};
use super::operation::Operation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Undo,
    Redo,
}

/// What a replay touched, for re-rendering and caret restoration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Replay {
    /// Top-level blocks whose content changed and still exist
    pub block_ids: Vec<BlockId>,
    /// `(parent, child)` pairs whose content changed
    pub child_block_ids: Vec<(BlockId, BlockId)>,
    /// Blocks were added or removed
    pub structural: bool,
    pub position: Option<CaretPosition>,
}

/// Apply a step in `direction` against a scratch copy of the store and
/// commit it only if every operation resolves.
pub(crate) fn replay(
    store: &mut DocumentStore,
    ops: &[Operation],
    direction: Direction,
) -> Result<Replay> {
    let mut scratch = store.clone();
    let mut replay = Replay::default();

    let ordered: Vec<&Operation> = match direction {
        Direction::Redo => ops.iter().collect(),
        Direction::Undo => ops.iter().rev().collect(),
    };
    for op in ordered {
        apply_operation(&mut scratch, op, direction, &mut replay)?;
    }
    scratch.check_invariants()?;
    scratch.prune_children_raw();

    replay.block_ids.retain(|id| scratch.get_block(id).is_some());
    replay.block_ids.dedup();
    replay.position = match direction {
        Direction::Undo => ops.first().and_then(Operation::position).cloned(),
        Direction::Redo => ops.last().and_then(Operation::position).cloned(),
    };
    *store = scratch;
    Ok(replay)
}

fn apply_operation(
    store: &mut DocumentStore,
    op: &Operation,
    direction: Direction,
    replay: &mut Replay,
) -> Result<()> {
    let inserting = |added: bool| (direction == Direction::Redo) == added;

    match op {
        Operation::UpdateContents {
            block_id,
            undo,
            redo,
            ..
        } => {
            let edits = pick(direction, undo, redo);
            let block = store
                .get_block(block_id)
                .ok_or_else(|| EngineError::BlockNotFound(block_id.clone()))?;
            let contents = non_empty(diff::apply_edits(&block.contents, edits)?, block_id)?;
            store.set_contents_raw(block_id, contents)?;
            replay.block_ids.push(block_id.clone());
        }
        Operation::AddBlock {
            block_id,
            block,
            prev_block_id,
            ..
        } => {
            if inserting(true) {
                store.insert_raw(block.clone(), prev_block_id.as_ref())?;
                replay.block_ids.push(block_id.clone());
            } else {
                store.remove_raw(block_id)?;
            }
            replay.structural = true;
        }
        Operation::RemoveBlock {
            block_id,
            block,
            prev_block_id,
            children,
            ..
        } => {
            if inserting(false) {
                store.insert_raw(block.clone(), prev_block_id.as_ref())?;
                store.restore_children_raw(block_id, children.clone());
                replay.block_ids.push(block_id.clone());
            } else {
                store.remove_raw(block_id)?;
                if !children.is_empty() {
                    store.take_children_raw(block_id);
                }
            }
            replay.structural = true;
        }
        Operation::ChildUpdateContents {
            parent_block_id,
            block_id,
            undo,
            redo,
            ..
        } => {
            let edits = pick(direction, undo, redo);
            let children = store.children_mut_raw(parent_block_id)?;
            let child = children
                .iter_mut()
                .find(|child| &child.id == block_id)
                .ok_or_else(|| EngineError::ChildBlockNotFound {
                    parent: parent_block_id.clone(),
                    child: block_id.clone(),
                })?;
            child.contents = non_empty(diff::apply_edits(&child.contents, edits)?, block_id)?;
            replay
                .child_block_ids
                .push((parent_block_id.clone(), block_id.clone()));
        }
        Operation::ChildAddBlock {
            parent_block_id,
            block_id,
            block,
            prev_block_id,
            ..
        } => {
            let children = store.children_mut_raw(parent_block_id)?;
            if inserting(true) {
                insert_child(children, block, prev_block_id.as_ref())?;
            } else {
                remove_child(children, parent_block_id, block_id)?;
            }
            replay.block_ids.push(parent_block_id.clone());
        }
        Operation::ChildRemoveBlock {
            parent_block_id,
            block_id,
            block,
            prev_block_id,
            ..
        } => {
            let children = store.children_mut_raw(parent_block_id)?;
            if inserting(false) {
                insert_child(children, block, prev_block_id.as_ref())?;
            } else {
                remove_child(children, parent_block_id, block_id)?;
            }
            replay.block_ids.push(parent_block_id.clone());
        }
    }
    Ok(())
}

fn pick<'a>(direction: Direction, undo: &'a [Edit], redo: &'a [Edit]) -> &'a [Edit] {
    match direction {
        Direction::Undo => undo,
        Direction::Redo => redo,
    }
}

fn non_empty(contents: Vec<Inline>, id: &BlockId) -> Result<Vec<Inline>> {
    if contents.is_empty() {
        return Err(EngineError::ContentMismatch(format!("{id}/contents")));
    }
    Ok(contents)
}

fn insert_child(children: &mut Vec<Block>, block: &Block, prev: Option<&BlockId>) -> Result<()> {
    if children.iter().any(|child| child.id == block.id) {
        return Err(EngineError::DuplicateBlock(block.id.clone()));
    }
    let index = match prev {
        None => 0,
        Some(prev) => {
            children
                .iter()
                .position(|child| &child.id == prev)
                .ok_or_else(|| EngineError::InvalidReference(prev.clone()))?
                + 1
        }
    };
    children.insert(index, block.clone());
    Ok(())
}

fn remove_child(children: &mut Vec<Block>, parent: &BlockId, id: &BlockId) -> Result<()> {
    let index = children
        .iter()
        .position(|child| &child.id == id)
        .ok_or_else(|| EngineError::ChildBlockNotFound {
            parent: parent.clone(),
            child: id.clone(),
        })?;
    children.remove(index);
    Ok(())
}
