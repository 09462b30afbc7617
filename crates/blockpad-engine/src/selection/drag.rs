use crate::models::{Block, BlockId, Rect};

/// Blocks covered by a drag that started on `blocks[anchor]`.
///
/// When the pointer is over a concrete block (`hit`), the covered range is
/// the index span between anchor and hit, inclusive and independent of
/// drag direction. Otherwise the range is grown from the anchor towards
/// the pointer: upward while a block's bottom edge is below the pointer,
/// downward while a block's top edge is above it. Blocks without bounds
/// stop the walk. The result is in document order.
pub fn covered_blocks(
    blocks: &[Block],
    anchor: usize,
    hit: Option<usize>,
    pointer_y: f64,
    bounds: impl Fn(&BlockId) -> Option<Rect>,
) -> Vec<BlockId> {
    if anchor >= blocks.len() {
        return Vec::new();
    }

    let (from, to) = match hit {
        Some(hit) if hit < blocks.len() => (anchor.min(hit), anchor.max(hit)),
        _ => scan(blocks, anchor, pointer_y, &bounds),
    };

    blocks[from..=to]
        .iter()
        .map(|block| block.id.clone())
        .collect()
}

fn scan(
    blocks: &[Block],
    anchor: usize,
    pointer_y: f64,
    bounds: &impl Fn(&BlockId) -> Option<Rect>,
) -> (usize, usize) {
    let anchor_top = bounds(&blocks[anchor].id)
        .map(|rect| rect.top())
        .unwrap_or(0.0);

    if anchor_top > pointer_y {
        let mut from = anchor;
        for index in (0..anchor).rev() {
            match bounds(&blocks[index].id) {
                Some(rect) if rect.bottom() > pointer_y => from = index,
                _ => break,
            }
        }
        (from, anchor)
    } else {
        let mut to = anchor;
        for (index, block) in blocks.iter().enumerate().skip(anchor + 1) {
            match bounds(&block.id) {
                Some(rect) if rect.top() < pointer_y => to = index,
                _ => break,
            }
        }
        (anchor, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::{LayoutProvider, StaticLayout};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn document(count: usize) -> (Vec<Block>, StaticLayout) {
        let blocks: Vec<Block> = (0..count)
            .map(|index| Block {
                id: BlockId::from(format!("b{index}")),
                ..Block::paragraph(format!("block {index}"))
            })
            .collect();
        let layout = StaticLayout::stacked(blocks.iter().map(|block| &block.id), 20.0);
        (blocks, layout)
    }

    fn names(ids: &[BlockId]) -> Vec<&str> {
        ids.iter().map(BlockId::as_str).collect()
    }

    #[rstest]
    #[case(3, 1, vec!["b1", "b2", "b3"])]
    #[case(1, 3, vec!["b1", "b2", "b3"])]
    #[case(2, 2, vec!["b2"])]
    fn test_index_span_is_order_independent(
        #[case] anchor: usize,
        #[case] hit: usize,
        #[case] expected: Vec<&str>,
    ) {
        let (blocks, layout) = document(5);
        let ids = covered_blocks(&blocks, anchor, Some(hit), 0.0, |id| layout.block_bounds(id));
        assert_eq!(names(&ids), expected);
    }

    #[test]
    fn test_upward_scan_stops_at_first_block_above_pointer() {
        let (blocks, layout) = document(5);
        // b1 spans 20..40, pointer in it from the gutter
        let ids = covered_blocks(&blocks, 3, None, 25.0, |id| layout.block_bounds(id));
        assert_eq!(names(&ids), vec!["b1", "b2", "b3"]);
    }

    #[test]
    fn test_downward_scan_stops_at_first_block_below_pointer() {
        let (blocks, layout) = document(5);
        // b3 spans 60..80
        let ids = covered_blocks(&blocks, 1, None, 65.0, |id| layout.block_bounds(id));
        assert_eq!(names(&ids), vec!["b1", "b2", "b3"]);
    }

    #[test]
    fn test_scan_without_bounds_keeps_anchor_only() {
        let (blocks, _) = document(3);
        let ids = covered_blocks(&blocks, 1, None, 500.0, |_| None);
        assert_eq!(names(&ids), vec!["b1"]);
    }

    #[test]
    fn test_anchor_out_of_range() {
        let (blocks, layout) = document(2);
        assert!(covered_blocks(&blocks, 9, None, 0.0, |id| layout.block_bounds(id)).is_empty());
    }
}
