//! Line-oriented command scripts.
//!
//! One command per line; blank lines and lines starting with `#` are
//! skipped. Block ids are the ids in the loaded document.

use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use blockpad_engine::{BlockId, BlockKind, CaretRequest, ClipboardData, EditorController};

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptCommand {
    Split { id: BlockId, index: usize, length: usize },
    Merge { target: BlockId, source: BlockId },
    Insert { id: BlockId, index: usize, text: String },
    Erase { id: BlockId, index: usize, length: usize },
    Create { after: Option<BlockId> },
    Delete { id: BlockId },
    Caret { id: BlockId, index: usize, length: usize },
    Format { kind: BlockKind },
    Indent,
    Outdent,
    SelectAll,
    Copy,
    Cut,
    Paste,
    Undo,
    Redo,
    Wait { ms: u64 },
}

impl FromStr for ScriptCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or_else(|| anyhow!("empty command"))?;
        let args: Vec<&str> = words.collect();

        let id = |at: usize| -> Result<BlockId> {
            args.get(at)
                .map(|id| BlockId::from(*id))
                .ok_or_else(|| anyhow!("`{name}` needs a block id"))
        };
        let number = |at: usize, default: Option<usize>| -> Result<usize> {
            match (args.get(at), default) {
                (Some(raw), _) => raw
                    .parse()
                    .with_context(|| format!("`{name}`: `{raw}` is not a number")),
                (None, Some(default)) => Ok(default),
                (None, None) => bail!("`{name}` is missing argument {}", at + 1),
            }
        };

        let command = match name {
            "split" => ScriptCommand::Split {
                id: id(0)?,
                index: number(1, None)?,
                length: number(2, Some(0))?,
            },
            "merge" => ScriptCommand::Merge {
                target: id(0)?,
                source: id(1)?,
            },
            "insert" => {
                let index = number(1, None)?;
                // Text keeps its inner spacing
                let text = line
                    .splitn(4, char::is_whitespace)
                    .nth(3)
                    .ok_or_else(|| anyhow!("`insert` needs text"))?;
                ScriptCommand::Insert {
                    id: id(0)?,
                    index,
                    text: text.to_string(),
                }
            }
            "erase" => ScriptCommand::Erase {
                id: id(0)?,
                index: number(1, None)?,
                length: number(2, None)?,
            },
            "create" => ScriptCommand::Create {
                after: args.first().map(|id| BlockId::from(*id)),
            },
            "delete" => ScriptCommand::Delete { id: id(0)? },
            "caret" => ScriptCommand::Caret {
                id: id(0)?,
                index: number(1, None)?,
                length: number(2, Some(0))?,
            },
            "format" => ScriptCommand::Format {
                kind: BlockKind::from(
                    *args
                        .first()
                        .ok_or_else(|| anyhow!("`format` needs a block kind"))?,
                ),
            },
            "indent" => ScriptCommand::Indent,
            "outdent" => ScriptCommand::Outdent,
            "select-all" => ScriptCommand::SelectAll,
            "copy" => ScriptCommand::Copy,
            "cut" => ScriptCommand::Cut,
            "paste" => ScriptCommand::Paste,
            "undo" => ScriptCommand::Undo,
            "redo" => ScriptCommand::Redo,
            "wait" => ScriptCommand::Wait {
                ms: number(0, None)? as u64,
            },
            other => bail!("unknown command `{other}`"),
        };
        Ok(command)
    }
}

/// Parse a whole script, reporting the first bad line by number
pub fn parse_script(source: &str) -> Result<Vec<ScriptCommand>> {
    source
        .lines()
        .enumerate()
        .map(|(number, line)| (number + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(number, line)| line.parse().with_context(|| format!("line {number}: {line}")))
        .collect()
}

/// A controller plus the clipboard a host would keep for it
pub struct Session {
    pub controller: EditorController,
    clipboard: Option<ClipboardData>,
}

impl Session {
    pub fn new(controller: EditorController) -> Self {
        Self {
            controller,
            clipboard: None,
        }
    }

    /// Run one command; returns whether the engine reported a change
    pub fn run(&mut self, command: &ScriptCommand) -> bool {
        let controller = &mut self.controller;
        let applied = match command {
            ScriptCommand::Split { id, index, length } => {
                controller.split_block(id, *index, *length).is_some()
            }
            ScriptCommand::Merge { target, source } => controller.merge_block(target, source),
            ScriptCommand::Insert { id, index, text } => controller.insert_text(id, *index, text),
            ScriptCommand::Erase { id, index, length } => {
                controller.delete_text(id, *index, *length)
            }
            ScriptCommand::Create { after } => controller.create_block(after.as_ref()).is_some(),
            ScriptCommand::Delete { id } => controller.delete_block(Some(id)),
            ScriptCommand::Caret { id, index, length } => {
                controller.set_caret_position(CaretRequest::span(id.clone(), *index, *length))
            }
            ScriptCommand::Format { kind } => controller.format_block(kind.clone()),
            ScriptCommand::Indent => controller.indent(),
            ScriptCommand::Outdent => controller.outdent(),
            ScriptCommand::SelectAll => {
                controller.select_all();
                !controller.selected_block_ids().is_empty()
            }
            ScriptCommand::Copy => {
                self.clipboard = controller.copy();
                self.clipboard.is_some()
            }
            ScriptCommand::Cut => {
                self.clipboard = controller.cut();
                self.clipboard.is_some()
            }
            ScriptCommand::Paste => match &self.clipboard {
                Some(data) => controller.paste(data),
                None => false,
            },
            ScriptCommand::Undo => controller.undo(),
            ScriptCommand::Redo => controller.redo(),
            ScriptCommand::Wait { ms } => {
                controller.advance_time(*ms);
                true
            }
        };
        if !applied {
            log::info!("no change from {command:?}");
        }
        applied
    }

    /// Run every command, then let deferred work settle
    pub fn run_all(&mut self, commands: &[ScriptCommand]) {
        for command in commands {
            self.run(command);
        }
        self.controller.flush_deferred();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockpad_engine::Block;
    use pretty_assertions::assert_eq;

    fn block(id: &str, text: &str) -> Block {
        Block {
            id: BlockId::from(id),
            ..Block::paragraph(text)
        }
    }

    #[test]
    fn test_parse_commands() {
        let script = "
            # split then merge back
            split b1 5
            insert b1 0 two  words
            caret b1 1 2
            wait 20
            format HEADER2
        ";

        let commands = parse_script(script).unwrap();

        assert_eq!(
            commands,
            vec![
                ScriptCommand::Split {
                    id: BlockId::from("b1"),
                    index: 5,
                    length: 0
                },
                ScriptCommand::Insert {
                    id: BlockId::from("b1"),
                    index: 0,
                    text: "two  words".to_string()
                },
                ScriptCommand::Caret {
                    id: BlockId::from("b1"),
                    index: 1,
                    length: 2
                },
                ScriptCommand::Wait { ms: 20 },
                ScriptCommand::Format {
                    kind: BlockKind::Header(2)
                },
            ]
        );
    }

    #[test]
    fn test_parse_error_names_the_line() {
        let err = parse_script("undo\nsplit b1 x\n").unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));

        assert!(parse_script("explode").is_err());
        assert!(parse_script("merge b1").is_err());
    }

    #[test]
    fn test_session_copy_paste() {
        let controller = EditorController::new(vec![block("b1", "hello"), block("b2", "world")]);
        let mut session = Session::new(controller);
        let commands = parse_script("caret b1 0 5\ncopy\ncaret b2 5\npaste\n").unwrap();

        session.run_all(&commands);

        let texts: Vec<String> = session.controller.blocks().iter().map(Block::text).collect();
        assert_eq!(texts, vec!["hello", "worldhello"]);
    }

    #[test]
    fn test_session_split_and_undo() {
        let controller = EditorController::new(vec![block("b1", "hello world")]);
        let mut session = Session::new(controller);

        session.run_all(&parse_script("split b1 5\nundo\n").unwrap());

        assert_eq!(session.controller.plain_text(), "hello world");
    }
}
