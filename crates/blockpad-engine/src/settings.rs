use serde::{Deserialize, Serialize};

use crate::events::LogLevel;
use crate::models::BlockKind;

/// Which modifier acts as the platform "short key"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Cmd (meta) is the short key
    Mac,
    /// Ctrl is the short key
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Mac
        } else {
            Platform::Other
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Idle time after which an open typing burst is sealed
    pub coalesce_delay_ms: u64,
    /// Oldest steps are dropped beyond this depth
    pub max_depth: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            coalesce_delay_ms: 1000,
            max_depth: 200,
        }
    }
}

/// Sampling interval used once the document grows past `above_blocks`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleTier {
    pub above_blocks: usize,
    pub interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorSettings {
    pub min_interval_ms: u64,
    pub tiers: Vec<SampleTier>,
}

impl SelectorSettings {
    /// Pointer-move sampling interval for a document of `block_count` blocks
    pub fn interval_for(&self, block_count: usize) -> u64 {
        self.tiers
            .iter()
            .filter(|tier| block_count > tier.above_blocks)
            .max_by_key(|tier| tier.above_blocks)
            .map(|tier| tier.interval_ms)
            .unwrap_or(self.min_interval_ms)
    }
}

impl Default for SelectorSettings {
    fn default() -> Self {
        Self {
            min_interval_ms: 50,
            tiers: vec![
                SampleTier {
                    above_blocks: 2000,
                    interval_ms: 300,
                },
                SampleTier {
                    above_blocks: 1000,
                    interval_ms: 200,
                },
                SampleTier {
                    above_blocks: 500,
                    interval_ms: 100,
                },
            ],
        }
    }
}

/// Everything a controller needs to know about its editing surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub embedded_blocks: Vec<BlockKind>,
    pub indentable_formats: Vec<BlockKind>,
    pub disable_decoration_formats: Vec<BlockKind>,
    pub max_indent: u32,
    pub log_level: LogLevel,
    /// Delay before a caret placement runs after a structural edit
    pub caret_delay_ms: u64,
    pub platform: Platform,
    pub history: HistorySettings,
    pub selector: SelectorSettings,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            embedded_blocks: vec![
                BlockKind::Image,
                BlockKind::File,
                BlockKind::Extension("TABLE".to_string()),
                BlockKind::Extension("YOUTUBE".to_string()),
            ],
            indentable_formats: vec![BlockKind::OrderedList, BlockKind::BulletList],
            disable_decoration_formats: vec![BlockKind::CodeBlock],
            max_indent: 8,
            log_level: LogLevel::Warning,
            caret_delay_ms: 10,
            platform: Platform::default(),
            history: HistorySettings::default(),
            selector: SelectorSettings::default(),
        }
    }
}
