use serde::{Deserialize, Serialize};
use std::fmt;

/// Formatting state attached to inlines and blocks.
///
/// Values are arbitrary JSON so presentation layers can carry their own
/// keys (`bold`, `link`, `indent`, `language`, ...) through the engine.
pub type Attributes = std::collections::BTreeMap<String, serde_json::Value>;

/// Opaque identifier of an inline run
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InlineId(String);

impl InlineId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for InlineId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for InlineId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for InlineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of an inline run. Unknown tags survive as `Extension` and are
/// treated like `Text` by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InlineKind {
    Text,
    LineBreak,
    CodeToken,
    Embed,
    Extension(String),
}

impl InlineKind {
    pub fn tag(&self) -> &str {
        match self {
            InlineKind::Text => "TEXT",
            InlineKind::LineBreak => "LINE_BREAK",
            InlineKind::CodeToken => "CODE_TOKEN",
            InlineKind::Embed => "EMBED",
            InlineKind::Extension(tag) => tag,
        }
    }
}

impl From<String> for InlineKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "TEXT" => InlineKind::Text,
            "LINE_BREAK" => InlineKind::LineBreak,
            "CODE_TOKEN" => InlineKind::CodeToken,
            "EMBED" => InlineKind::Embed,
            _ => InlineKind::Extension(tag),
        }
    }
}

impl From<InlineKind> for String {
    fn from(kind: InlineKind) -> Self {
        kind.tag().to_string()
    }
}

/// One contiguous run of content with uniform formatting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inline {
    pub id: InlineId,
    #[serde(rename = "type")]
    pub kind: InlineKind,
    pub text: String,
    #[serde(default)]
    pub attributes: Attributes,
}

impl Inline {
    pub fn new(kind: InlineKind, text: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            id: InlineId::generate(),
            kind,
            text: text.into(),
            attributes,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(InlineKind::Text, text, Attributes::new())
    }

    /// The empty TEXT inline that stands in for an otherwise empty block
    pub fn placeholder() -> Self {
        Self::text("")
    }

    /// Length in characters, the unit of every caret offset
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Same kind and formatting, so the two runs could be one
    pub fn same_format(&self, other: &Inline) -> bool {
        self.kind == other.kind && self.attributes == other.attributes
    }

    /// Copy with a fresh id, used whenever content is duplicated
    pub fn with_fresh_id(&self) -> Self {
        Self {
            id: InlineId::generate(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("TEXT", InlineKind::Text)]
    #[case("LINE_BREAK", InlineKind::LineBreak)]
    #[case("CODE_TOKEN", InlineKind::CodeToken)]
    #[case("MENTION", InlineKind::Extension("MENTION".to_string()))]
    fn test_kind_tags(#[case] tag: &str, #[case] expected: InlineKind) {
        let kind = InlineKind::from(tag.to_string());
        assert_eq!(kind, expected);
        assert_eq!(kind.tag(), tag);
    }

    #[test]
    fn test_length_counts_characters() {
        let inline = Inline::text("héllo");
        assert_eq!(inline.len(), 5);
    }

    #[test]
    fn test_deserialize_wire_shape() {
        let json = r#"{"id":"i1","type":"TEXT","text":"hi","attributes":{"bold":true}}"#;
        let inline: Inline = serde_json::from_str(json).unwrap();
        assert_eq!(inline.id, InlineId::from("i1"));
        assert_eq!(inline.kind, InlineKind::Text);
        assert_eq!(inline.attributes.get("bold"), Some(&serde_json::Value::Bool(true)));
    }

    #[test]
    fn test_fresh_id_keeps_content() {
        let inline = Inline::text("abc");
        let copy = inline.with_fresh_id();
        assert_ne!(copy.id, inline.id);
        assert_eq!(copy.text, inline.text);
    }
}
