use crate::models::{Block, BlockId, BlockKind};

/// `listNumber` for every block, in document order; `None` for blocks that
/// are not ordered-list items.
///
/// Counters are kept per indent level. Going back out resets the deeper
/// counters, a bullet item resets its own level and deeper, and any
/// non-list block ends the list.
pub fn compute_list_numbers(blocks: &[Block]) -> Vec<(BlockId, Option<u32>)> {
    let mut counters: Vec<u32> = Vec::new();

    blocks
        .iter()
        .map(|block| {
            let indent = block.indent() as usize;
            let number = match block.kind {
                BlockKind::OrderedList => {
                    counters.resize(indent + 1, 0);
                    counters[indent] += 1;
                    Some(counters[indent])
                }
                BlockKind::BulletList => {
                    counters.truncate(indent);
                    None
                }
                _ => {
                    counters.clear();
                    None
                }
            };
            (block.id.clone(), number)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStyle {
    Decimal,
    Alphabet,
    Roman,
}

impl ListStyle {
    /// Styles cycle with nesting depth
    pub fn for_indent(indent: u32) -> Self {
        match indent % 3 {
            0 => ListStyle::Decimal,
            1 => ListStyle::Alphabet,
            _ => ListStyle::Roman,
        }
    }
}

/// Marker shown in front of an ordered-list item, e.g. `3.`, `c.`, `iii.`
pub fn list_label(number: u32, indent: u32) -> String {
    let number = number.max(1);
    let body = match ListStyle::for_indent(indent) {
        ListStyle::Decimal => number.to_string(),
        ListStyle::Alphabet => to_alphabet(number),
        ListStyle::Roman => to_roman(number),
    };
    format!("{body}.")
}

fn to_alphabet(mut number: u32) -> String {
    let mut letters = Vec::new();
    while number > 0 {
        number -= 1;
        letters.push(char::from(b'a' + (number % 26) as u8));
        number /= 26;
    }
    letters.iter().rev().collect()
}

fn to_roman(mut number: u32) -> String {
    const NUMERALS: [(u32, &str); 13] = [
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    let mut roman = String::new();
    for (value, numeral) in NUMERALS {
        while number >= value {
            roman.push_str(numeral);
            number -= value;
        }
    }
    roman
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn item(kind: BlockKind, indent: u32) -> Block {
        let mut block = Block::new(kind);
        if indent > 0 {
            block.attributes.insert("indent".to_string(), indent.into());
        }
        block
    }

    fn numbers(blocks: &[Block]) -> Vec<Option<u32>> {
        compute_list_numbers(blocks)
            .into_iter()
            .map(|(_, number)| number)
            .collect()
    }

    #[test]
    fn test_nested_numbering() {
        let blocks = vec![
            item(BlockKind::OrderedList, 0),
            item(BlockKind::OrderedList, 1),
            item(BlockKind::OrderedList, 1),
            item(BlockKind::OrderedList, 0),
            item(BlockKind::OrderedList, 1),
        ];
        assert_eq!(
            numbers(&blocks),
            vec![Some(1), Some(1), Some(2), Some(2), Some(1)]
        );
    }

    #[test]
    fn test_paragraph_restarts_list() {
        let blocks = vec![
            item(BlockKind::OrderedList, 0),
            item(BlockKind::OrderedList, 0),
            item(BlockKind::Paragraph, 0),
            item(BlockKind::OrderedList, 0),
        ];
        assert_eq!(numbers(&blocks), vec![Some(1), Some(2), None, Some(1)]);
    }

    #[test]
    fn test_bullet_resets_its_level_only() {
        let blocks = vec![
            item(BlockKind::OrderedList, 0),
            item(BlockKind::OrderedList, 1),
            item(BlockKind::BulletList, 1),
            item(BlockKind::OrderedList, 1),
            item(BlockKind::OrderedList, 0),
        ];
        assert_eq!(
            numbers(&blocks),
            vec![Some(1), Some(1), None, Some(1), Some(2)]
        );
    }

    #[rstest]
    #[case(1, 0, "1.")]
    #[case(12, 0, "12.")]
    #[case(1, 1, "a.")]
    #[case(26, 1, "z.")]
    #[case(27, 1, "aa.")]
    #[case(4, 2, "iv.")]
    #[case(1994, 2, "mcmxciv.")]
    #[case(3, 3, "3.")]
    fn test_list_label(#[case] number: u32, #[case] indent: u32, #[case] expected: &str) {
        assert_eq!(list_label(number, indent), expected);
    }
}
