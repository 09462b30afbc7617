use crate::editing::DocumentStore;
use crate::models::{BlockId, CaretPosition, CaretRequest};

use super::layout::LayoutProvider;

/// Caret mode and block-range mode are mutually exclusive
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SelectionState {
    #[default]
    NoSelection,
    Caret(CaretPosition),
    BlockRange {
        ids: Vec<BlockId>,
        anchor: BlockId,
        focus: BlockId,
    },
}

#[derive(Debug, Default)]
pub struct CaretController {
    state: SelectionState,
}

impl CaretController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn caret(&self) -> Option<&CaretPosition> {
        match &self.state {
            SelectionState::Caret(position) => Some(position),
            _ => None,
        }
    }

    pub fn selected_ids(&self) -> &[BlockId] {
        match &self.state {
            SelectionState::BlockRange { ids, .. } => ids,
            _ => &[],
        }
    }

    pub fn is_block_range(&self) -> bool {
        matches!(self.state, SelectionState::BlockRange { .. })
    }

    /// Enter caret mode, leaving any block range
    pub fn set_caret(&mut self, position: CaretPosition) {
        self.state = SelectionState::Caret(position);
    }

    /// Enter block-range mode, blurring the caret
    pub fn select_range(&mut self, ids: Vec<BlockId>, anchor: BlockId, focus: BlockId) {
        self.state = SelectionState::BlockRange { ids, anchor, focus };
    }

    /// Drop the caret. Returns whether there was one.
    pub fn blur(&mut self) -> bool {
        if self.caret().is_some() {
            self.state = SelectionState::NoSelection;
            return true;
        }
        false
    }

    /// Drop a block range. Returns whether there was one.
    pub fn clear_range(&mut self) -> bool {
        if self.is_block_range() {
            self.state = SelectionState::NoSelection;
            return true;
        }
        false
    }

    pub fn clear(&mut self) {
        self.state = SelectionState::NoSelection;
    }

    /// Resolve a request against the current content, clamping the span
    /// to the block. `None` if the block does not exist.
    pub fn position_for(
        store: &DocumentStore,
        layout: &dyn LayoutProvider,
        request: &CaretRequest,
    ) -> Option<CaretPosition> {
        let block = store.get_block(&request.block_id)?;
        let len = block.len();
        let index = request.index.min(len);
        let length = request.length.min(len - index);
        let geometry = layout.caret_geometry(&block.id, index, length);

        Some(CaretPosition {
            block_id: block.id.clone(),
            block_format: block.kind.tag(),
            index,
            length,
            collapsed: length == 0,
            is_top: geometry.is_top,
            is_bottom: geometry.is_bottom,
            rect: geometry.rect,
        })
    }
}
