//! Caret-mode key bindings.

use crate::context::EditorContext;
use crate::models::BlockId;

use super::editor::EditorModule;
use super::history::HistoryModule;
use super::keymap::{self, Key, KeyBinding, KeyEvent};
use super::{Module, ModuleName};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardAction {
    Split,
    Backspace,
    Indent,
    Outdent,
    LineUp,
    LineDown,
    Undo,
    Redo,
}

const BINDINGS: [KeyBinding<KeyboardAction>; 9] = [
    KeyBinding::plain(Key::Enter, KeyboardAction::Split),
    KeyBinding::plain(Key::Backspace, KeyboardAction::Backspace),
    KeyBinding::plain(Key::Tab, KeyboardAction::Indent),
    KeyBinding::plain(Key::Tab, KeyboardAction::Outdent).with_shift(),
    KeyBinding::plain(Key::ArrowUp, KeyboardAction::LineUp),
    KeyBinding::plain(Key::ArrowDown, KeyboardAction::LineDown),
    KeyBinding::short(Key::Char('z'), KeyboardAction::Undo),
    KeyBinding::short(Key::Char('z'), KeyboardAction::Redo).with_shift(),
    KeyBinding::short(Key::Char('y'), KeyboardAction::Redo),
];

#[derive(Debug, Default)]
pub struct KeyboardModule {}

impl Module for KeyboardModule {
    fn name(&self) -> ModuleName {
        ModuleName::Keyboard
    }
}

impl KeyboardModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Which action an event maps to on this platform
    pub fn action_for(&self, ctx: &EditorContext, event: &KeyEvent) -> Option<KeyboardAction> {
        keymap::dispatch(&BINDINGS, event, ctx.settings.platform)
    }

    /// Returns whether the event was consumed. Unconsumed events are left
    /// to the host's text input.
    pub fn on_key_down(
        &mut self,
        ctx: &mut EditorContext,
        editor: &mut EditorModule,
        history: &mut HistoryModule,
        event: &KeyEvent,
    ) -> bool {
        let Some(action) = self.action_for(ctx, event) else {
            return false;
        };
        match action {
            KeyboardAction::Undo => return history.undo(ctx),
            KeyboardAction::Redo => return history.redo(ctx),
            _ => {}
        }

        let Some(caret) = ctx.caret_position().cloned() else {
            return false;
        };
        match action {
            KeyboardAction::Split => editor
                .split_block(ctx, &caret.block_id, caret.index, caret.length)
                .is_some(),
            KeyboardAction::Backspace => {
                if !caret.collapsed {
                    return editor.delete_text(ctx, &caret.block_id, caret.index, caret.length);
                }
                if caret.index > 0 {
                    return false;
                }
                self.backspace_at_start(ctx, editor, &caret.block_id)
            }
            KeyboardAction::Indent => editor.indent(ctx),
            KeyboardAction::Outdent => editor.outdent(ctx),
            KeyboardAction::LineUp => caret.is_top && editor.caret_prev(ctx, None),
            KeyboardAction::LineDown => caret.is_bottom && editor.caret_next(ctx, Some(0)),
            KeyboardAction::Undo | KeyboardAction::Redo => false,
        }
    }

    /// Empty blocks are removed; otherwise the block joins the one before
    /// it when that one holds text.
    fn backspace_at_start(
        &mut self,
        ctx: &mut EditorContext,
        editor: &mut EditorModule,
        id: &BlockId,
    ) -> bool {
        let Some(index) = ctx.store.block_index(id).filter(|index| *index > 0) else {
            return false;
        };
        let prev = ctx.store.get_blocks()[index - 1].clone();
        let current_empty = ctx.store.get_block_length(id) == 0;

        if current_empty {
            return editor.delete_block(ctx, Some(id));
        }
        if !ctx.registry.resolve(&prev.kind).text_editable {
            return editor.caret_prev(ctx, None);
        }
        editor.merge_block(ctx, &prev.id, id)
    }
}
