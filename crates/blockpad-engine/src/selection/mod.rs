//! Caret and block-range selection state, plus the geometry boundary with
//! the rendering layer.

mod caret;
mod drag;
mod layout;

pub use caret::{CaretController, SelectionState};
pub use drag::covered_blocks;
pub use layout::{CaretGeometry, LayoutProvider, NoLayout, StaticLayout};

use crate::models::{BlockId, Rect};

/// Pointer sample handed to the selector
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    /// Block hit-tested under the pointer, if any
    pub block_id: Option<BlockId>,
    /// Character offset under the pointer when hit-testing resolved one
    pub index: Option<usize>,
    pub x: f64,
    pub y: f64,
    /// Host timestamp in milliseconds
    pub time_ms: u64,
    /// Pointer is over the editing surface (gutter included)
    pub inside_editor: bool,
}

impl PointerEvent {
    pub fn on_block(block_id: BlockId, y: f64, time_ms: u64) -> Self {
        Self {
            block_id: Some(block_id),
            index: None,
            x: 0.0,
            y,
            time_ms,
            inside_editor: true,
        }
    }

    /// Over the editing surface but not over a block (the gutter)
    pub fn at(y: f64, time_ms: u64) -> Self {
        Self {
            block_id: None,
            index: None,
            x: 0.0,
            y,
            time_ms,
            inside_editor: true,
        }
    }

    /// Outside the editing surface entirely
    pub fn outside(y: f64, time_ms: u64) -> Self {
        Self {
            inside_editor: false,
            ..Self::at(y, time_ms)
        }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn within(&self, rect: &Rect) -> bool {
        rect.contains_y(self.y)
    }
}

