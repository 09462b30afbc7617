use std::collections::HashMap;

use crate::models::{BlockId, Rect};

/// Where the rendering layer drew the caret
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaretGeometry {
    pub rect: Rect,
    pub is_top: bool,
    pub is_bottom: bool,
}

impl Default for CaretGeometry {
    fn default() -> Self {
        Self {
            rect: Rect::default(),
            is_top: true,
            is_bottom: true,
        }
    }
}

/// Geometry queries answered by the rendering layer.
///
/// The engine never measures anything itself; drag selection and caret
/// positions read through this trait.
pub trait LayoutProvider {
    fn block_bounds(&self, id: &BlockId) -> Option<Rect>;

    fn caret_geometry(&self, _id: &BlockId, _index: usize, _length: usize) -> CaretGeometry {
        CaretGeometry::default()
    }
}

/// Headless layout: no bounds, single-line carets
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLayout;

impl LayoutProvider for NoLayout {
    fn block_bounds(&self, _id: &BlockId) -> Option<Rect> {
        None
    }
}

/// Fixed bounds per block, for hosts that lay blocks out on a grid and for
/// tests.
#[derive(Debug, Default, Clone)]
pub struct StaticLayout {
    bounds: HashMap<BlockId, Rect>,
}

impl StaticLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stack blocks top to bottom, each `height` tall
    pub fn stacked<'a>(ids: impl IntoIterator<Item = &'a BlockId>, height: f64) -> Self {
        let bounds = ids
            .into_iter()
            .enumerate()
            .map(|(row, id)| (id.clone(), Rect::new(0.0, row as f64 * height, 600.0, height)))
            .collect();
        Self { bounds }
    }

    pub fn insert(&mut self, id: BlockId, rect: Rect) {
        self.bounds.insert(id, rect);
    }
}

impl LayoutProvider for StaticLayout {
    fn block_bounds(&self, id: &BlockId) -> Option<Rect> {
        self.bounds.get(id).copied()
    }

    fn caret_geometry(&self, id: &BlockId, _index: usize, _length: usize) -> CaretGeometry {
        CaretGeometry {
            rect: self.bounds.get(id).copied().unwrap_or_default(),
            is_top: true,
            is_bottom: true,
        }
    }
}
