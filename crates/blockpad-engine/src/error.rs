use thiserror::Error;

use crate::models::BlockId;

/// Failures inside the engine. None of these cross the public command
/// surface: commands turn them into no-ops plus a warning on the bus.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("block not found: {0}")]
    BlockNotFound(BlockId),

    #[error("child block {child} not found under {parent}")]
    ChildBlockNotFound { parent: BlockId, child: BlockId },

    #[error("block already exists: {0}")]
    DuplicateBlock(BlockId),

    #[error("reference block not found: {0}")]
    InvalidReference(BlockId),

    #[error("diff path does not resolve: {0}")]
    UnresolvedPath(String),

    #[error("diff does not match current content at {0}")]
    ContentMismatch(String),

    #[error("replay would leave the document without blocks")]
    EmptyDocument,

    #[error("malformed clipboard payload: {0}")]
    Payload(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
