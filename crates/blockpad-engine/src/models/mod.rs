pub mod block;
pub mod caret;
pub mod inline;
pub mod kinds;

pub use block::{Block, BlockId, BlockKind};
pub use caret::{CaretPosition, CaretRequest, Rect};
pub use inline::{Attributes, Inline, InlineId, InlineKind};
pub use kinds::{BlockSpec, KindRegistry};
