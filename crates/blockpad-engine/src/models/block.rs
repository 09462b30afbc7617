use serde::{Deserialize, Serialize};
use std::fmt;

use super::inline::{Attributes, Inline};

/// Opaque identifier of a block, stable across every update
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BlockId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for BlockId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Structural kind of a block.
///
/// Known kinds are closed variants; any other tag is carried as
/// `Extension` so documents round-trip without loss. Behaviour for an
/// extension comes from the [`KindRegistry`](super::kinds::KindRegistry),
/// which falls back to paragraph semantics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockKind {
    Paragraph,
    OrderedList,
    BulletList,
    Blockquote,
    CodeBlock,
    Header(u8),
    Image,
    File,
    Extension(String),
}

impl BlockKind {
    pub fn tag(&self) -> String {
        match self {
            BlockKind::Paragraph => "PARAGRAPH".to_string(),
            BlockKind::OrderedList => "ORDEREDLIST".to_string(),
            BlockKind::BulletList => "BULLETLIST".to_string(),
            BlockKind::Blockquote => "BLOCKQUOTE".to_string(),
            BlockKind::CodeBlock => "CODEBLOCK".to_string(),
            BlockKind::Header(level) => format!("HEADER{level}"),
            BlockKind::Image => "IMAGE".to_string(),
            BlockKind::File => "FILE".to_string(),
            BlockKind::Extension(tag) => tag.clone(),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, BlockKind::OrderedList | BlockKind::BulletList)
    }
}

impl From<String> for BlockKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "PARAGRAPH" => BlockKind::Paragraph,
            "ORDEREDLIST" => BlockKind::OrderedList,
            "BULLETLIST" => BlockKind::BulletList,
            "BLOCKQUOTE" => BlockKind::Blockquote,
            "CODEBLOCK" => BlockKind::CodeBlock,
            "IMAGE" => BlockKind::Image,
            "FILE" => BlockKind::File,
            _ => match tag.strip_prefix("HEADER").and_then(|n| n.parse::<u8>().ok()) {
                Some(level @ 1..=6) => BlockKind::Header(level),
                _ => BlockKind::Extension(tag),
            },
        }
    }
}

impl From<&str> for BlockKind {
    fn from(tag: &str) -> Self {
        BlockKind::from(tag.to_string())
    }
}

impl From<BlockKind> for String {
    fn from(kind: BlockKind) -> Self {
        kind.tag()
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

/// A top-level structural unit of the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub contents: Vec<Inline>,
    #[serde(default)]
    pub attributes: Attributes,
    /// Derived values such as `listNumber`; never part of a content diff
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Attributes>,
}

impl Block {
    /// An empty block of `kind` holding the placeholder inline
    pub fn new(kind: BlockKind) -> Self {
        Self::with_contents(kind, Vec::new(), Attributes::new())
    }

    pub fn with_contents(kind: BlockKind, contents: Vec<Inline>, attributes: Attributes) -> Self {
        let mut block = Self {
            id: BlockId::generate(),
            kind,
            contents,
            attributes,
            meta: None,
        };
        block.ensure_placeholder();
        block
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::with_contents(
            BlockKind::Paragraph,
            vec![Inline::text(text)],
            Attributes::new(),
        )
    }

    /// Flattened text length in characters
    pub fn len(&self) -> usize {
        self.contents.iter().map(Inline::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.iter().all(Inline::is_empty)
    }

    /// Plain-text projection of the block's contents
    pub fn text(&self) -> String {
        self.contents.iter().map(|inline| inline.text.as_str()).collect()
    }

    /// Restore the one-inline minimum
    pub fn ensure_placeholder(&mut self) {
        if self.contents.is_empty() {
            self.contents.push(Inline::placeholder());
        }
    }

    /// Indentation level from `attributes.indent`
    pub fn indent(&self) -> u32 {
        self.attributes
            .get("indent")
            .and_then(serde_json::Value::as_u64)
            .map(|indent| indent as u32)
            .unwrap_or(0)
    }

    pub fn list_number(&self) -> Option<u32> {
        self.meta
            .as_ref()
            .and_then(|meta| meta.get("listNumber"))
            .and_then(serde_json::Value::as_u64)
            .map(|number| number as u32)
    }

    /// Equal as user content: kind, attributes and the text/format of the
    /// contents. Ids and `meta` are ignored.
    pub fn same_content(&self, other: &Block) -> bool {
        self.kind == other.kind
            && self.attributes == other.attributes
            && self.contents.len() == other.contents.len()
            && self
                .contents
                .iter()
                .zip(&other.contents)
                .all(|(a, b)| a.text == b.text && a.same_format(b))
    }

    /// Deep copy with new block and inline ids
    pub fn with_fresh_ids(&self) -> Self {
        Self {
            id: BlockId::generate(),
            contents: self.contents.iter().map(Inline::with_fresh_id).collect(),
            ..self.clone()
        }
    }
}
