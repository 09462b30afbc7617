//! Operations over a block's inline sequence.
//!
//! Offsets are character offsets into the flattened text of the sequence.
//! None of these functions enforce the one-inline minimum; callers that
//! write the result back into a block restore it with
//! [`Block::ensure_placeholder`](crate::models::Block::ensure_placeholder).

use crate::models::{Attributes, Block, Inline};

/// Byte offset of the `chars`-th character
fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len())
}

pub fn contents_len(contents: &[Inline]) -> usize {
    contents.iter().map(Inline::len).sum()
}

/// Split into the runs before and after `index`. An inline straddling the
/// boundary keeps its id on the left; the right half gets a fresh id.
pub fn split_contents(contents: &[Inline], index: usize) -> (Vec<Inline>, Vec<Inline>) {
    let mut first = Vec::new();
    let mut last = Vec::new();
    let mut start = 0;

    for inline in contents {
        let end = start + inline.len();
        if end <= index {
            first.push(inline.clone());
        } else if start >= index {
            last.push(inline.clone());
        } else {
            let at = byte_offset(&inline.text, index - start);
            let mut left = inline.clone();
            left.text.truncate(at);
            let mut right = inline.with_fresh_id();
            right.text = inline.text[at..].to_string();
            first.push(left);
            last.push(right);
        }
        start = end;
    }

    (first, last)
}

/// Remove the characters in `[index, index + length)`, dropping inlines
/// that become empty.
pub fn delete_contents(contents: &[Inline], index: usize, length: usize) -> Vec<Inline> {
    let end = index.saturating_add(length);
    let mut start = 0;
    let mut result = Vec::with_capacity(contents.len());

    for inline in contents {
        let inline_len = inline.len();
        let inline_end = start + inline_len;
        if inline_end <= index || start >= end {
            result.push(inline.clone());
        } else {
            let from = index.saturating_sub(start);
            let to = (end - start).min(inline_len);
            let from_byte = byte_offset(&inline.text, from);
            let to_byte = byte_offset(&inline.text, to);
            let mut kept = inline.clone();
            kept.text.replace_range(from_byte..to_byte, "");
            if !kept.text.is_empty() {
                result.push(kept);
            }
        }
        start = inline_end;
    }

    result
}

/// The runs covering `[index, index + length)`, trimmed to the span
pub fn slice_contents(contents: &[Inline], index: usize, length: usize) -> Vec<Inline> {
    let (_, rest) = split_contents(contents, index);
    let (span, _) = split_contents(&rest, length);
    span.into_iter().filter(|inline| !inline.is_empty()).collect()
}

/// Insert plain text at `index`, continuing the formatting of the run that
/// ends at the insertion point.
pub fn insert_text(contents: &[Inline], index: usize, text: &str) -> Vec<Inline> {
    let mut result = contents.to_vec();
    if text.is_empty() {
        return result;
    }

    let mut start = 0;
    for inline in result.iter_mut() {
        let end = start + inline.len();
        if index >= start && index <= end {
            let at = byte_offset(&inline.text, index - start);
            inline.text.insert_str(at, text);
            return result;
        }
        start = end;
    }

    result.push(Inline::text(text));
    result
}

/// Splice `inlines` in at `index`
pub fn insert_inlines(contents: &[Inline], index: usize, inlines: &[Inline]) -> Vec<Inline> {
    let (mut first, last) = split_contents(contents, index);
    first.extend(inlines.iter().cloned());
    first.extend(last);
    first
}

/// Merge `attributes` into every run inside `[index, index + length)`.
/// A JSON `null` removes the key.
pub fn format_range(
    contents: &[Inline],
    index: usize,
    length: usize,
    attributes: &Attributes,
) -> Vec<Inline> {
    let (mut result, rest) = split_contents(contents, index);
    let (middle, last) = split_contents(&rest, length);

    for mut inline in middle {
        for (key, value) in attributes {
            if value.is_null() {
                inline.attributes.remove(key);
            } else {
                inline.attributes.insert(key.clone(), value.clone());
            }
        }
        result.push(inline);
    }
    result.extend(last);
    normalize(&result)
}

/// Merge adjacent runs with identical formatting and drop empty runs.
/// The first run of a merged group keeps its id.
pub fn normalize(contents: &[Inline]) -> Vec<Inline> {
    let mut result: Vec<Inline> = Vec::with_capacity(contents.len());

    for inline in contents.iter().filter(|inline| !inline.is_empty()) {
        match result.last_mut() {
            Some(prev) if prev.same_format(inline) => prev.text.push_str(&inline.text),
            _ => result.push(inline.clone()),
        }
    }

    if result.is_empty()
        && let Some(first) = contents.first()
    {
        result.push(first.clone());
    }
    result
}

/// Attributes shared by every run covering the span. A collapsed span at
/// `index` reads the run the caret is typing into.
pub fn formats_at(contents: &[Inline], index: usize, length: usize) -> Attributes {
    let covered: Vec<&Inline> = if length == 0 {
        run_at(contents, index).into_iter().collect()
    } else {
        let end = index.saturating_add(length);
        let mut start = 0;
        contents
            .iter()
            .filter(|inline| {
                let inline_start = start;
                start += inline.len();
                !inline.is_empty() && inline_start < end && start > index
            })
            .collect()
    };

    let Some((first, rest)) = covered.split_first() else {
        return Attributes::new();
    };

    first
        .attributes
        .iter()
        .filter(|(key, value)| {
            rest.iter()
                .all(|inline| inline.attributes.get(*key) == Some(*value))
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn run_at(contents: &[Inline], index: usize) -> Option<&Inline> {
    if index == 0 {
        return contents.first();
    }
    let mut start = 0;
    for inline in contents {
        let end = start + inline.len();
        if index > start && index <= end {
            return Some(inline);
        }
        start = end;
    }
    contents.last()
}

/// Plain-text projection of a run of blocks, one line per block
pub fn blocks_to_text(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(Block::text)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn inlines_to_text(inlines: &[Inline]) -> String {
    inlines.iter().map(|inline| inline.text.as_str()).collect()
}
