//! Capability lookup for block kinds.
//!
//! Commands never branch on raw type tags. They ask the registry what a
//! kind can do, and anything the registry has not heard of behaves like a
//! paragraph.

use std::collections::HashMap;

use super::block::BlockKind;
use crate::settings::EditorSettings;

/// What the engine may do with a block of a given kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpec {
    /// Holds editable text, so it can be split and typed into
    pub text_editable: bool,
    /// Atomic embedded content (image, file, ...)
    pub embedded: bool,
    /// Accepts `indent`/`outdent`
    pub indentable: bool,
    /// Accepts inline formatting such as bold or links
    pub decorations: bool,
}

impl BlockSpec {
    pub const PARAGRAPH: BlockSpec = BlockSpec {
        text_editable: true,
        embedded: false,
        indentable: false,
        decorations: true,
    };
}

#[derive(Debug, Clone)]
pub struct KindRegistry {
    specs: HashMap<BlockKind, BlockSpec>,
}

impl KindRegistry {
    pub fn from_settings(settings: &EditorSettings) -> Self {
        let mut kinds = vec![
            BlockKind::Paragraph,
            BlockKind::OrderedList,
            BlockKind::BulletList,
            BlockKind::Blockquote,
            BlockKind::CodeBlock,
            BlockKind::Image,
            BlockKind::File,
        ];
        kinds.extend((1..=6).map(BlockKind::Header));
        kinds.extend(settings.embedded_blocks.iter().cloned());
        kinds.extend(settings.indentable_formats.iter().cloned());

        let specs = kinds
            .into_iter()
            .map(|kind| {
                let embedded = settings.embedded_blocks.contains(&kind);
                let spec = BlockSpec {
                    text_editable: !embedded,
                    embedded,
                    indentable: settings.indentable_formats.contains(&kind),
                    decorations: !embedded
                        && !settings.disable_decoration_formats.contains(&kind),
                };
                (kind, spec)
            })
            .collect();

        Self { specs }
    }

    /// Register or override the capabilities of a kind
    pub fn register(&mut self, kind: BlockKind, spec: BlockSpec) {
        self.specs.insert(kind, spec);
    }

    pub fn is_registered(&self, kind: &BlockKind) -> bool {
        self.specs.contains_key(kind)
    }

    pub fn resolve(&self, kind: &BlockKind) -> BlockSpec {
        self.specs
            .get(kind)
            .copied()
            .unwrap_or_else(|| self.fallback())
    }

    fn fallback(&self) -> BlockSpec {
        self.specs
            .get(&BlockKind::Paragraph)
            .copied()
            .unwrap_or(BlockSpec::PARAGRAPH)
    }
}

impl Default for KindRegistry {
    fn default() -> Self {
        Self::from_settings(&EditorSettings::default())
    }
}
