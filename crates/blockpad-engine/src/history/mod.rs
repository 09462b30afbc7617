//! Reversible operation log over the document store.
//!
//! - **`diff`**: json0-style primitive edits over a block's inline list
//! - **`operation`**: the six operation kinds recorded per user action
//! - **`replay`**: applying a step forwards or backwards, all-or-nothing
//! - **`stack`**: undo/redo stacks with burst coalescing

pub mod diff;
pub mod operation;
mod replay;
mod stack;

pub use diff::Edit;
pub use operation::{Operation, OperationKind};
pub use replay::{Direction, Replay};
pub use stack::History;
