use serde::{Deserialize, Serialize};

use super::block::BlockId;

/// Screen-space rectangle reported by the rendering layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains_y(&self, y: f64) -> bool {
        y >= self.top() && y < self.bottom()
    }
}

/// Where the caret sits, in character offsets of a block's flattened text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaretPosition {
    pub block_id: BlockId,
    pub block_format: String,
    pub index: usize,
    pub length: usize,
    pub collapsed: bool,
    pub is_top: bool,
    pub is_bottom: bool,
    pub rect: Rect,
}

impl CaretPosition {
    /// End offset of the addressed span
    pub fn end(&self) -> usize {
        self.index + self.length
    }
}

/// Request to place the caret; clamped against the block when applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaretRequest {
    pub block_id: BlockId,
    pub index: usize,
    pub length: usize,
}

impl CaretRequest {
    pub fn at(block_id: BlockId, index: usize) -> Self {
        Self {
            block_id,
            index,
            length: 0,
        }
    }

    pub fn span(block_id: BlockId, index: usize, length: usize) -> Self {
        Self {
            block_id,
            index,
            length,
        }
    }
}
