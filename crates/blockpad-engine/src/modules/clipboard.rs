//! Copy, cut and paste of blocks and inline spans.
//!
//! A copy always writes two entries: the plain-text projection under
//! `text/plain`, and a JSON payload under [`FORMATS_MIME`] that carries the
//! full blocks or inlines. Only the structured entry is read back on
//! paste; plain-text pastes are the host's business.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::context::EditorContext;
use crate::editing::contents;
use crate::error::{EngineError, Result};
use crate::events::{EditorEvent, Source};
use crate::models::{Block, BlockId, CaretRequest, Inline};
use crate::scheduler::TaskSlot;

use super::editor::EditorModule;
use super::{Module, ModuleName};

pub const FORMATS_MIME: &str = "application/x-blockpad-formats";
pub const TEXT_MIME: &str = "text/plain";

/// MIME type to serialized content
pub type ClipboardData = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ClipboardPayload {
    Blocks(Vec<Block>),
    Inlines(Vec<Inline>),
}

impl ClipboardPayload {
    pub fn plain_text(&self) -> String {
        match self {
            ClipboardPayload::Blocks(blocks) => contents::blocks_to_text(blocks),
            ClipboardPayload::Inlines(inlines) => contents::inlines_to_text(inlines),
        }
    }

    pub fn to_data(&self) -> Result<ClipboardData> {
        let mut data = ClipboardData::new();
        data.insert(FORMATS_MIME.to_string(), serde_json::to_string(self)?);
        data.insert(TEXT_MIME.to_string(), self.plain_text());
        Ok(data)
    }

    /// `Ok(None)` when there is no structured entry at all
    pub fn from_data(data: &ClipboardData) -> Result<Option<Self>> {
        data.get(FORMATS_MIME)
            .map(|raw| serde_json::from_str(raw).map_err(EngineError::from))
            .transpose()
    }
}

#[derive(Debug, Default)]
pub struct ClipboardModule {}

impl Module for ClipboardModule {
    fn name(&self) -> ModuleName {
        ModuleName::Clipboard
    }
}

impl ClipboardModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize the block range, or the caret's span. `None` when there
    /// is nothing selected.
    pub fn on_copy(&mut self, ctx: &mut EditorContext) -> Option<ClipboardData> {
        let payload = self.capture(ctx)?;
        self.serialize(ctx, &payload)
    }

    /// Copy, then remove what was copied
    pub fn on_cut(
        &mut self,
        ctx: &mut EditorContext,
        editor: &mut EditorModule,
    ) -> Option<ClipboardData> {
        let payload = self.capture(ctx)?;
        let data = self.serialize(ctx, &payload)?;

        ctx.optimize_op();
        match payload {
            ClipboardPayload::Blocks(blocks) => {
                let ids: Vec<BlockId> = blocks.into_iter().map(|block| block.id).collect();
                ctx.caret.clear_range();
                ctx.bus.publish(EditorEvent::BlocksSelected { ids: Vec::new() });
                editor.delete_blocks(ctx, &ids);
            }
            ClipboardPayload::Inlines(_) => {
                if let Some(caret) = ctx.caret_position().cloned() {
                    editor.delete_text(ctx, &caret.block_id, caret.index, caret.length);
                }
            }
        }
        ctx.optimize_op();
        Some(data)
    }

    /// Paste a structured payload at the caret. Returns whether anything
    /// was inserted; a missing or malformed payload is a no-op.
    pub fn on_paste(
        &mut self,
        ctx: &mut EditorContext,
        editor: &mut EditorModule,
        data: &ClipboardData,
    ) -> bool {
        let payload = match ClipboardPayload::from_data(data) {
            Ok(Some(payload)) => payload,
            Ok(None) => return false,
            Err(err) => {
                ctx.bus.warning(format!("paste ignored: {err}"));
                return false;
            }
        };

        ctx.optimize_op();
        let pasted = match payload {
            ClipboardPayload::Blocks(blocks) => self.paste_blocks(ctx, editor, &blocks),
            ClipboardPayload::Inlines(inlines) => self.paste_inlines(ctx, &inlines),
        };
        ctx.optimize_op();
        pasted
    }

    fn paste_blocks(
        &mut self,
        ctx: &mut EditorContext,
        editor: &mut EditorModule,
        blocks: &[Block],
    ) -> bool {
        if blocks.is_empty() {
            return false;
        }
        let after = ctx
            .current_block_id()
            .or_else(|| ctx.caret.selected_ids().last().cloned());
        let Some(after) = after else {
            return false;
        };
        editor.insert_blocks(ctx, &after, blocks).is_some()
    }

    fn paste_inlines(&mut self, ctx: &mut EditorContext, inlines: &[Inline]) -> bool {
        let Some(caret) = ctx.caret_position().cloned() else {
            return false;
        };
        let Some(block) = ctx.store.get_block(&caret.block_id).cloned() else {
            return false;
        };
        if !ctx.registry.resolve(&block.kind).text_editable || inlines.is_empty() {
            return false;
        }

        let fresh: Vec<Inline> = inlines.iter().map(Inline::with_fresh_id).collect();
        let pasted_len = contents::contents_len(&fresh);
        let remaining = contents::delete_contents(&block.contents, caret.index, caret.length);

        let mut updated = block;
        updated.contents = contents::insert_inlines(&remaining, caret.index, &fresh);
        ctx.update_block(updated, Source::User);
        ctx.render(vec![caret.block_id.clone()]);

        ctx.scheduler.cancel_slot(TaskSlot::Caret);
        ctx.set_caret_position(
            &CaretRequest::at(caret.block_id, caret.index + pasted_len),
            Source::User,
        );
        true
    }

    fn capture(&self, ctx: &EditorContext) -> Option<ClipboardPayload> {
        if ctx.caret.is_block_range() {
            let selected = ctx.caret.selected_ids();
            let blocks: Vec<Block> = ctx
                .store
                .get_blocks()
                .iter()
                .filter(|block| selected.contains(&block.id))
                .cloned()
                .collect();
            return (!blocks.is_empty()).then_some(ClipboardPayload::Blocks(blocks));
        }

        let caret = ctx.caret_position()?;
        if caret.collapsed {
            return None;
        }
        let block = ctx.store.get_block(&caret.block_id)?;
        let span = contents::slice_contents(&block.contents, caret.index, caret.length);
        (!span.is_empty()).then_some(ClipboardPayload::Inlines(span))
    }

    fn serialize(&self, ctx: &EditorContext, payload: &ClipboardPayload) -> Option<ClipboardData> {
        match payload.to_data() {
            Ok(data) => Some(data),
            Err(err) => {
                ctx.bus.error(format!("copy failed: {err}"));
                None
            }
        }
    }
}
