use serde::{Deserialize, Serialize};

use super::diff::Edit;
use crate::models::{Block, BlockId, CaretPosition};

/// One reversible change to the document.
///
/// Content updates carry edit lists; structural operations carry the whole
/// block plus the id of the block it follows, which is enough to undo the
/// insert or removal at the same position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Operation {
    UpdateContents {
        block_id: BlockId,
        undo: Vec<Edit>,
        redo: Vec<Edit>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<CaretPosition>,
    },
    AddBlock {
        block_id: BlockId,
        block: Block,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prev_block_id: Option<BlockId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<CaretPosition>,
    },
    RemoveBlock {
        block_id: BlockId,
        block: Block,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prev_block_id: Option<BlockId>,
        /// Child blocks owned by the removed block, restored on undo
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<Block>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<CaretPosition>,
    },
    #[serde(rename = "child_block_update_contents")]
    ChildUpdateContents {
        parent_block_id: BlockId,
        block_id: BlockId,
        undo: Vec<Edit>,
        redo: Vec<Edit>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<CaretPosition>,
    },
    #[serde(rename = "child_block_add_block")]
    ChildAddBlock {
        parent_block_id: BlockId,
        block_id: BlockId,
        block: Block,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prev_block_id: Option<BlockId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<CaretPosition>,
    },
    #[serde(rename = "child_block_remove_block")]
    ChildRemoveBlock {
        parent_block_id: BlockId,
        block_id: BlockId,
        block: Block,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prev_block_id: Option<BlockId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<CaretPosition>,
    },
}

/// Kind tag of an operation, used for coalescing decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    UpdateContents,
    AddBlock,
    RemoveBlock,
    ChildUpdateContents,
    ChildAddBlock,
    ChildRemoveBlock,
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::UpdateContents { .. } => OperationKind::UpdateContents,
            Operation::AddBlock { .. } => OperationKind::AddBlock,
            Operation::RemoveBlock { .. } => OperationKind::RemoveBlock,
            Operation::ChildUpdateContents { .. } => OperationKind::ChildUpdateContents,
            Operation::ChildAddBlock { .. } => OperationKind::ChildAddBlock,
            Operation::ChildRemoveBlock { .. } => OperationKind::ChildRemoveBlock,
        }
    }

    pub fn block_id(&self) -> &BlockId {
        match self {
            Operation::UpdateContents { block_id, .. }
            | Operation::AddBlock { block_id, .. }
            | Operation::RemoveBlock { block_id, .. }
            | Operation::ChildUpdateContents { block_id, .. }
            | Operation::ChildAddBlock { block_id, .. }
            | Operation::ChildRemoveBlock { block_id, .. } => block_id,
        }
    }

    pub fn parent_block_id(&self) -> Option<&BlockId> {
        match self {
            Operation::ChildUpdateContents {
                parent_block_id, ..
            }
            | Operation::ChildAddBlock {
                parent_block_id, ..
            }
            | Operation::ChildRemoveBlock {
                parent_block_id, ..
            } => Some(parent_block_id),
            _ => None,
        }
    }

    pub fn position(&self) -> Option<&CaretPosition> {
        match self {
            Operation::UpdateContents { position, .. }
            | Operation::AddBlock { position, .. }
            | Operation::RemoveBlock { position, .. }
            | Operation::ChildUpdateContents { position, .. }
            | Operation::ChildAddBlock { position, .. }
            | Operation::ChildRemoveBlock { position, .. } => position.as_ref(),
        }
    }

    pub fn set_position(&mut self, caret: Option<CaretPosition>) {
        match self {
            Operation::UpdateContents { position, .. }
            | Operation::AddBlock { position, .. }
            | Operation::RemoveBlock { position, .. }
            | Operation::ChildUpdateContents { position, .. }
            | Operation::ChildAddBlock { position, .. }
            | Operation::ChildRemoveBlock { position, .. } => *position = caret,
        }
    }

    /// Content edits (as opposed to adding or removing blocks)
    pub fn is_content_update(&self) -> bool {
        matches!(
            self,
            Operation::UpdateContents { .. } | Operation::ChildUpdateContents { .. }
        )
    }

    /// Same kind addressing the same block
    pub fn same_target(&self, other: &Operation) -> bool {
        self.kind() == other.kind()
            && self.block_id() == other.block_id()
            && self.parent_block_id() == other.parent_block_id()
    }

    /// Fold a later content update on the same target into this one.
    /// Returns the later operation back when the two cannot be combined.
    pub fn absorb(&mut self, later: Operation) -> Option<Operation> {
        if !self.is_content_update() || !self.same_target(&later) {
            return Some(later);
        }
        match (self, later) {
            (
                Operation::UpdateContents { undo, redo, .. },
                Operation::UpdateContents {
                    undo: later_undo,
                    redo: later_redo,
                    ..
                },
            )
            | (
                Operation::ChildUpdateContents { undo, redo, .. },
                Operation::ChildUpdateContents {
                    undo: later_undo,
                    redo: later_redo,
                    ..
                },
            ) => {
                redo.extend(later_redo);
                let mut combined = later_undo;
                combined.append(undo);
                *undo = combined;
                None
            }
            (_, later) => Some(later),
        }
    }
}
