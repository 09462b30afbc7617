// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use blockpad_engine::{Block, BlockId, BlockKind};

#[allow(dead_code)]
pub fn generate_document(size: usize) -> Vec<Block> {
    (0..size)
        .map(|index| {
            let kind = match index % 5 {
                0 => BlockKind::Header(2),
                1 | 2 => BlockKind::OrderedList,
                _ => BlockKind::Paragraph,
            };
            Block {
                id: BlockId::from(format!("b{index}")),
                kind,
                ..Block::paragraph(format!(
                    "Block {index} with enough text to make splitting and merging realistic."
                ))
            }
        })
        .collect()
}

#[allow(dead_code)]
pub fn block_id(index: usize) -> BlockId {
    BlockId::from(format!("b{index}"))
}
