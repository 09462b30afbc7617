use serde::{Deserialize, Serialize};

use crate::history::Operation;
use crate::models::{BlockId, CaretPosition};

/// Who authored a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Applied without history or change notifications
    Silent,
    User,
    Collaborator,
}

/// Severity of a log event; a configured level lets through itself and
/// everything more severe.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    None = 0,
    Error = 1,
    #[default]
    Warning = 2,
    Info = 3,
}

impl LogLevel {
    pub fn allows(self, level: LogLevel) -> bool {
        level != LogLevel::None && level <= self
    }
}

/// Every notification the engine publishes
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    EditorCreated,
    /// An operation was recorded in the local history
    HistoryPushed {
        operation: Operation,
        source: Source,
    },
    EditorChanged {
        source: Source,
    },
    /// Re-read these blocks; `block_count` is the length of the block list
    /// afterwards
    BlocksRerender {
        ids: Vec<BlockId>,
        block_count: usize,
    },
    /// Remount these blocks
    BlocksRerenderForce {
        ids: Vec<BlockId>,
    },
    ChildBlocksRerender {
        parent_id: BlockId,
        ids: Vec<BlockId>,
    },
    ChildBlocksRerenderForce {
        parent_id: BlockId,
        ids: Vec<BlockId>,
    },
    BlocksSelected {
        ids: Vec<BlockId>,
    },
    SelectionChanged {
        position: Option<CaretPosition>,
        source: Source,
    },
    Log {
        level: LogLevel,
        message: String,
    },
    CollaboratorPosition {
        collaborator_id: String,
        position: Option<CaretPosition>,
    },
    CollaboratorsCleared,
}

/// Subscription key, one per [`EditorEvent`] variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    EditorCreated,
    HistoryPushed,
    EditorChanged,
    BlocksRerender,
    BlocksRerenderForce,
    ChildBlocksRerender,
    ChildBlocksRerenderForce,
    BlocksSelected,
    SelectionChanged,
    Log,
    CollaboratorPosition,
    CollaboratorsCleared,
}

impl EditorEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            EditorEvent::EditorCreated => EventKind::EditorCreated,
            EditorEvent::HistoryPushed { .. } => EventKind::HistoryPushed,
            EditorEvent::EditorChanged { .. } => EventKind::EditorChanged,
            EditorEvent::BlocksRerender { .. } => EventKind::BlocksRerender,
            EditorEvent::BlocksRerenderForce { .. } => EventKind::BlocksRerenderForce,
            EditorEvent::ChildBlocksRerender { .. } => EventKind::ChildBlocksRerender,
            EditorEvent::ChildBlocksRerenderForce { .. } => EventKind::ChildBlocksRerenderForce,
            EditorEvent::BlocksSelected { .. } => EventKind::BlocksSelected,
            EditorEvent::SelectionChanged { .. } => EventKind::SelectionChanged,
            EditorEvent::Log { .. } => EventKind::Log,
            EditorEvent::CollaboratorPosition { .. } => EventKind::CollaboratorPosition,
            EditorEvent::CollaboratorsCleared => EventKind::CollaboratorsCleared,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(LogLevel::Info, LogLevel::Info, true)]
    #[case(LogLevel::Info, LogLevel::Error, true)]
    #[case(LogLevel::Warning, LogLevel::Info, false)]
    #[case(LogLevel::Warning, LogLevel::Warning, true)]
    #[case(LogLevel::Error, LogLevel::Warning, false)]
    #[case(LogLevel::None, LogLevel::Error, false)]
    #[case(LogLevel::Info, LogLevel::None, false)]
    fn test_level_filter(
        #[case] configured: LogLevel,
        #[case] level: LogLevel,
        #[case] allowed: bool,
    ) {
        assert_eq!(configured.allows(level), allowed);
    }
}
