//! Primitive edits over a block's inline list.
//!
//! An edit addresses `contents[index]` (structural list edits) or a
//! character offset inside `contents[index].text` (string edits). Every
//! delete carries the value it removes, so replay against a diverged state
//! is detected instead of silently corrupting content.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::models::Inline;

/// Block field an edit addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockField {
    Contents,
}

/// Inline field a string edit addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InlineField {
    Text,
}

/// Path to one inline: `(container, index)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPath {
    pub container: BlockField,
    pub index: usize,
}

/// Path to a character offset: `(container, index, subcontainer, subindex)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPath {
    pub container: BlockField,
    pub index: usize,
    pub subcontainer: InlineField,
    pub subindex: usize,
}

impl ListPath {
    pub fn at(index: usize) -> Self {
        Self {
            container: BlockField::Contents,
            index,
        }
    }
}

impl TextPath {
    pub fn at(index: usize, offset: usize) -> Self {
        Self {
            container: BlockField::Contents,
            index,
            subcontainer: InlineField::Text,
            subindex: offset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Edit {
    ListInsert { path: ListPath, value: Inline },
    ListDelete { path: ListPath, value: Inline },
    StringInsert { path: TextPath, text: String },
    StringDelete { path: TextPath, text: String },
}

impl Edit {
    pub fn invert(&self) -> Edit {
        match self.clone() {
            Edit::ListInsert { path, value } => Edit::ListDelete { path, value },
            Edit::ListDelete { path, value } => Edit::ListInsert { path, value },
            Edit::StringInsert { path, text } => Edit::StringDelete { path, text },
            Edit::StringDelete { path, text } => Edit::StringInsert { path, text },
        }
    }
}

/// Inverse of an edit list: each edit inverted, in reverse order
pub fn invert(edits: &[Edit]) -> Vec<Edit> {
    edits.iter().rev().map(Edit::invert).collect()
}

/// Edits turning `old` into `new`, as `(redo, undo)`.
///
/// Shared leading and trailing runs are left alone. When exactly one run
/// differs only in its text, a string edit is produced; otherwise the
/// differing runs are replaced with list edits.
pub fn diff_contents(old: &[Inline], new: &[Inline]) -> (Vec<Edit>, Vec<Edit>) {
    let prefix = old
        .iter()
        .zip(new)
        .take_while(|(a, b)| a == b)
        .count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let old_mid = &old[prefix..old.len() - suffix];
    let new_mid = &new[prefix..new.len() - suffix];

    let mut redo = Vec::new();
    match (old_mid, new_mid) {
        ([], []) => {}
        ([before], [after]) if before.id == after.id && before.same_format(after) => {
            redo.extend(text_edits(prefix, &before.text, &after.text));
        }
        _ => {
            for value in old_mid {
                redo.push(Edit::ListDelete {
                    path: ListPath::at(prefix),
                    value: value.clone(),
                });
            }
            for (offset, value) in new_mid.iter().enumerate() {
                redo.push(Edit::ListInsert {
                    path: ListPath::at(prefix + offset),
                    value: value.clone(),
                });
            }
        }
    }

    let undo = invert(&redo);
    (redo, undo)
}

fn text_edits(index: usize, before: &str, after: &str) -> Vec<Edit> {
    let before: Vec<char> = before.chars().collect();
    let after: Vec<char> = after.chars().collect();
    let head = before
        .iter()
        .zip(&after)
        .take_while(|(a, b)| a == b)
        .count();
    let tail = before[head..]
        .iter()
        .rev()
        .zip(after[head..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let removed: String = before[head..before.len() - tail].iter().collect();
    let inserted: String = after[head..after.len() - tail].iter().collect();

    let mut edits = Vec::new();
    if !removed.is_empty() {
        edits.push(Edit::StringDelete {
            path: TextPath::at(index, head),
            text: removed,
        });
    }
    if !inserted.is_empty() {
        edits.push(Edit::StringInsert {
            path: TextPath::at(index, head),
            text: inserted,
        });
    }
    edits
}

/// Apply `edits` in order to a copy of `contents`. Fails without touching
/// the input if any path does not resolve or a delete does not match.
pub fn apply_edits(contents: &[Inline], edits: &[Edit]) -> Result<Vec<Inline>> {
    let mut result = contents.to_vec();
    for edit in edits {
        apply_edit(&mut result, edit)?;
    }
    Ok(result)
}

fn apply_edit(contents: &mut Vec<Inline>, edit: &Edit) -> Result<()> {
    match edit {
        Edit::ListInsert { path, value } => {
            if path.index > contents.len() {
                return Err(EngineError::UnresolvedPath(format!("contents/{}", path.index)));
            }
            contents.insert(path.index, value.clone());
        }
        Edit::ListDelete { path, value } => {
            let Some(current) = contents.get(path.index) else {
                return Err(EngineError::UnresolvedPath(format!("contents/{}", path.index)));
            };
            if current != value {
                return Err(EngineError::ContentMismatch(format!("contents/{}", path.index)));
            }
            contents.remove(path.index);
        }
        Edit::StringInsert { path, text } => {
            let target = resolve_text(contents, path)?;
            let at = char_to_byte(&target.text, path.subindex);
            target.text.insert_str(at, text);
        }
        Edit::StringDelete { path, text } => {
            let target = resolve_text(contents, path)?;
            let from = char_to_byte(&target.text, path.subindex);
            let to = from + text.len();
            if target.text.get(from..to) != Some(text.as_str()) {
                return Err(EngineError::ContentMismatch(format!(
                    "contents/{}/text/{}",
                    path.index, path.subindex
                )));
            }
            target.text.replace_range(from..to, "");
        }
    }
    Ok(())
}

fn resolve_text<'a>(contents: &'a mut [Inline], path: &TextPath) -> Result<&'a mut Inline> {
    let describe = || format!("contents/{}/text/{}", path.index, path.subindex);
    let target = contents
        .get_mut(path.index)
        .ok_or_else(|| EngineError::UnresolvedPath(describe()))?;
    if path.subindex > target.len() {
        return Err(EngineError::UnresolvedPath(describe()));
    }
    Ok(target)
}

fn char_to_byte(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::contents;
    use crate::models::InlineId;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn run(id: &str, text: &str) -> Inline {
        Inline {
            id: InlineId::from(id),
            ..Inline::text(text)
        }
    }

    #[test]
    fn test_text_change_becomes_string_edits() {
        let old = vec![run("i1", "hello")];
        let new = vec![run("i1", "help!")];
        let (redo, undo) = diff_contents(&old, &new);

        assert_eq!(
            redo,
            vec![
                Edit::StringDelete {
                    path: TextPath::at(0, 3),
                    text: "lo".to_string()
                },
                Edit::StringInsert {
                    path: TextPath::at(0, 3),
                    text: "p!".to_string()
                },
            ]
        );
        assert_eq!(apply_edits(&old, &redo).unwrap(), new);
        assert_eq!(apply_edits(&new, &undo).unwrap(), old);
    }

    #[test]
    fn test_structural_change_becomes_list_edits() {
        let old = vec![run("i1", "hello world")];
        let (first, last) = contents::split_contents(&old, 5);
        let mut new = first;
        new.push(run("x", "!"));
        new.extend(last);

        let (redo, undo) = diff_contents(&old, &new);

        assert!(redo.iter().all(|edit| matches!(
            edit,
            Edit::ListInsert { .. } | Edit::ListDelete { .. }
        )));
        assert_eq!(apply_edits(&old, &redo).unwrap(), new);
        assert_eq!(apply_edits(&new, &undo).unwrap(), old);
    }

    #[rstest]
    #[case(vec![run("a", "x")], vec![run("a", "x")])]
    #[case(vec![run("a", "")], vec![run("a", "typed")])]
    #[case(vec![run("a", "abc"), run("b", "def")], vec![run("a", "abc")])]
    #[case(vec![run("a", "日本")], vec![run("a", "日曜日本")])]
    #[case(vec![], vec![run("a", "new")])]
    fn test_round_trip(#[case] old: Vec<Inline>, #[case] new: Vec<Inline>) {
        let (redo, undo) = diff_contents(&old, &new);
        let forward = apply_edits(&old, &redo).unwrap();
        assert_eq!(forward, new);
        assert_eq!(apply_edits(&forward, &undo).unwrap(), old);
    }

    #[test]
    fn test_identical_contents_produce_no_edits() {
        let contents = vec![run("a", "same")];
        let (redo, undo) = diff_contents(&contents, &contents);
        assert!(redo.is_empty());
        assert!(undo.is_empty());
    }

    #[test]
    fn test_unresolved_path_is_rejected() {
        let edits = vec![Edit::StringInsert {
            path: TextPath::at(3, 0),
            text: "x".to_string(),
        }];
        let result = apply_edits(&[run("a", "abc")], &edits);
        assert!(matches!(result, Err(EngineError::UnresolvedPath(_))));
    }

    #[test]
    fn test_mismatched_delete_is_rejected() {
        let edits = vec![Edit::StringDelete {
            path: TextPath::at(0, 1),
            text: "zz".to_string(),
        }];
        let result = apply_edits(&[run("a", "abc")], &edits);
        assert!(matches!(result, Err(EngineError::ContentMismatch(_))));
    }

    #[test]
    fn test_wire_shape() {
        let edit = Edit::StringInsert {
            path: TextPath::at(1, 2),
            text: "hi".to_string(),
        };
        let json = serde_json::to_value(&edit).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "op": "string_insert",
                "path": {"container": "contents", "index": 1, "subcontainer": "text", "subindex": 2},
                "text": "hi"
            })
        );
    }
}
