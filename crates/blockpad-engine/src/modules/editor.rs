//! Block lifecycle and text commands.
//!
//! Structural commands (create, delete, merge, split, kind and indent
//! changes) seal the open history step before and after they record, so
//! each one undoes on its own. They renumber lists, schedule the caret for
//! after layout and ask for a re-render before returning.

use crate::context::EditorContext;
use crate::editing::contents;
use crate::events::Source;
use crate::models::{Attributes, Block, BlockId, BlockKind, CaretRequest};
use crate::scheduler::TaskSlot;

use super::{Module, ModuleName};

#[derive(Debug, Default)]
pub struct EditorModule {}

impl Module for EditorModule {
    fn name(&self) -> ModuleName {
        ModuleName::Editor
    }

    fn on_init(&mut self, ctx: &mut EditorContext) {
        let renumbered = ctx.numbering_list();
        if !renumbered.is_empty() {
            ctx.bus.info(format!("numbered {} list items", renumbered.len()));
        }
    }

    fn on_destroy(&mut self, ctx: &mut EditorContext) {
        ctx.scheduler.cancel_slot(TaskSlot::Caret);
    }
}

impl EditorModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an empty paragraph after `after` (or the caret's block) and
    /// move the caret into it.
    pub fn create_block(
        &mut self,
        ctx: &mut EditorContext,
        after: Option<&BlockId>,
    ) -> BlockId {
        let after = after.cloned().or_else(|| ctx.current_block_id());
        ctx.optimize_op();
        let id = ctx.create_block(Block::new(BlockKind::Paragraph), after.as_ref(), Source::User);
        self.finish(ctx, vec![id.clone()], Some(CaretRequest::at(id.clone(), 0)));
        id
    }

    /// Insert copies of `blocks` in order after `after`; returns the id of
    /// the last one inserted.
    pub fn insert_blocks(
        &mut self,
        ctx: &mut EditorContext,
        after: &BlockId,
        blocks: &[Block],
    ) -> Option<BlockId> {
        ctx.store.get_block(after)?;
        ctx.optimize_op();

        let mut last = after.clone();
        let mut inserted = Vec::with_capacity(blocks.len());
        for block in blocks {
            last = ctx.create_block(block.with_fresh_ids(), Some(&last), Source::User);
            inserted.push(last.clone());
        }
        let end = ctx.store.get_block_length(&last);
        self.finish(ctx, inserted, Some(CaretRequest::at(last.clone(), end)));
        Some(last)
    }

    /// Remove one block, moving the caret to the end of the block before
    /// it. The first block and the only block are never removed here.
    pub fn delete_block(&mut self, ctx: &mut EditorContext, id: Option<&BlockId>) -> bool {
        let Some(id) = id.cloned().or_else(|| ctx.current_block_id()) else {
            return false;
        };
        let Some(index) = ctx.store.block_index(&id) else {
            return false;
        };
        if ctx.store.len() <= 1 || index < 1 {
            return false;
        }

        let prev = &ctx.store.get_blocks()[index - 1];
        let caret = CaretRequest::at(prev.id.clone(), prev.len());
        ctx.optimize_op();
        ctx.delete_blocks(&[id], Source::User);
        self.finish(ctx, Vec::new(), Some(caret));
        true
    }

    /// Remove every listed block. The caret lands at the end of the block
    /// before the first removed one, or at the start of the document.
    pub fn delete_blocks(&mut self, ctx: &mut EditorContext, ids: &[BlockId]) -> bool {
        let Some(first) = ids.iter().filter_map(|id| ctx.store.block_index(id)).min() else {
            return false;
        };
        let prev = first
            .checked_sub(1)
            .map(|index| ctx.store.get_blocks()[index].id.clone());

        ctx.optimize_op();
        ctx.delete_blocks(ids, Source::User);

        let caret = match prev {
            Some(prev) => {
                let end = ctx.store.get_block_length(&prev);
                CaretRequest::at(prev, end)
            }
            None => CaretRequest::at(ctx.store.first_block().id.clone(), 0),
        };
        self.finish(ctx, Vec::new(), Some(caret));
        true
    }

    /// Append `other` to `source` and remove `other`. The caret goes to
    /// where `source` used to end.
    pub fn merge_block(
        &mut self,
        ctx: &mut EditorContext,
        source: &BlockId,
        other: &BlockId,
    ) -> bool {
        if source == other {
            return false;
        }
        let (Some(target), Some(removed)) =
            (ctx.store.get_block(source), ctx.store.get_block(other))
        else {
            return false;
        };

        let offset = target.len();
        let mut merged = target.clone();
        let mut joined = target.contents.clone();
        joined.extend(removed.contents.iter().cloned());
        merged.contents = contents::normalize(&joined);

        ctx.optimize_op();
        ctx.delete_blocks(std::slice::from_ref(other), Source::User);
        ctx.update_block(merged, Source::User);
        self.finish(
            ctx,
            vec![source.clone()],
            Some(CaretRequest::at(source.clone(), offset)),
        );
        true
    }

    /// Split `id` at `index`, first removing `[index, index + length)`.
    /// The tail becomes a new block after it, keeping the attributes; list
    /// items stay list items, anything else continues as a paragraph.
    /// Returns the new block's id.
    pub fn split_block(
        &mut self,
        ctx: &mut EditorContext,
        id: &BlockId,
        index: usize,
        length: usize,
    ) -> Option<BlockId> {
        let block = ctx.store.get_block(id)?.clone();
        ctx.optimize_op();

        if !ctx.registry.resolve(&block.kind).text_editable {
            let new_id = ctx.create_block(Block::new(BlockKind::Paragraph), Some(id), Source::User);
            self.finish(ctx, vec![new_id.clone()], Some(CaretRequest::at(new_id.clone(), 0)));
            return Some(new_id);
        }

        let index = index.min(block.len());
        let length = length.min(block.len() - index);
        let remaining = contents::delete_contents(&block.contents, index, length);
        let (first, last) = contents::split_contents(&remaining, index);

        let kind = if block.kind.is_list() {
            block.kind.clone()
        } else {
            BlockKind::Paragraph
        };
        let tail = Block::with_contents(kind, last, block.attributes.clone());
        let mut head = block;
        head.contents = first;

        let new_id = ctx.create_block(tail, Some(id), Source::User);
        ctx.update_block(head, Source::User);
        self.finish(
            ctx,
            vec![id.clone(), new_id.clone()],
            Some(CaretRequest::at(new_id.clone(), 0)),
        );
        Some(new_id)
    }

    /// Typing path: insert `text` and put the caret after it
    pub fn insert_text(
        &mut self,
        ctx: &mut EditorContext,
        id: &BlockId,
        index: usize,
        text: &str,
    ) -> bool {
        let Some(block) = self.editable(ctx, id) else {
            return false;
        };
        let index = index.min(block.len());
        let mut updated = block.clone();
        updated.contents = contents::insert_text(&block.contents, index, text);

        ctx.update_block(updated, Source::User);
        ctx.render(vec![id.clone()]);
        self.place_caret_now(ctx, CaretRequest::at(id.clone(), index + text.chars().count()))
    }

    /// Remove `[index, index + length)` and put the caret at `index`
    pub fn delete_text(
        &mut self,
        ctx: &mut EditorContext,
        id: &BlockId,
        index: usize,
        length: usize,
    ) -> bool {
        let Some(block) = self.editable(ctx, id) else {
            return false;
        };
        let index = index.min(block.len());
        let length = length.min(block.len() - index);
        let mut updated = block.clone();
        updated.contents = contents::delete_contents(&block.contents, index, length);

        ctx.update_block(updated, Source::User);
        ctx.render(vec![id.clone()]);
        self.place_caret_now(ctx, CaretRequest::at(id.clone(), index))
    }

    /// Apply inline attributes over the caret's span. A `null` value
    /// removes the attribute. Skipped for kinds without decorations.
    pub fn format_inline(&mut self, ctx: &mut EditorContext, attributes: &Attributes) -> bool {
        let Some(caret) = ctx.caret_position().cloned() else {
            return false;
        };
        if caret.collapsed {
            return false;
        }
        let Some(block) = ctx.store.get_block(&caret.block_id).cloned() else {
            return false;
        };
        if !ctx.registry.resolve(&block.kind).decorations {
            return false;
        }

        let mut updated = block.clone();
        updated.contents =
            contents::format_range(&block.contents, caret.index, caret.length, attributes);
        ctx.update_block(updated, Source::User);
        ctx.optimize_op();
        ctx.render(vec![block.id.clone()]);
        self.place_caret_now(ctx, CaretRequest::span(block.id, caret.index, caret.length))
    }

    /// Change the kind of the selected blocks, or the caret's block.
    /// Indentation is dropped from blocks whose new kind cannot indent.
    pub fn format_block(&mut self, ctx: &mut EditorContext, kind: BlockKind) -> bool {
        let indentable = ctx.registry.resolve(&kind).indentable;
        self.update_targets(ctx, |block| {
            if block.kind == kind {
                return false;
            }
            block.kind = kind.clone();
            if !indentable {
                block.attributes.remove("indent");
            }
            true
        })
    }

    pub fn indent(&mut self, ctx: &mut EditorContext) -> bool {
        let max_indent = ctx.settings.max_indent;
        self.shift_indent(ctx, |indent| (indent + 1).min(max_indent))
    }

    pub fn outdent(&mut self, ctx: &mut EditorContext) -> bool {
        self.shift_indent(ctx, |indent| indent.saturating_sub(1))
    }

    /// Move to the previous block, at `index` or its end
    pub fn caret_prev(&mut self, ctx: &mut EditorContext, index: Option<usize>) -> bool {
        let Some(current) = ctx.current_block_id().and_then(|id| ctx.store.block_index(&id)) else {
            return false;
        };
        let Some(prev) = current.checked_sub(1).map(|prev| &ctx.store.get_blocks()[prev]) else {
            return false;
        };
        let request = CaretRequest::at(prev.id.clone(), index.unwrap_or(prev.len()));
        self.place_caret_now(ctx, request)
    }

    /// Move to the next block, at `index` or its start
    pub fn caret_next(&mut self, ctx: &mut EditorContext, index: Option<usize>) -> bool {
        let Some(current) = ctx.current_block_id().and_then(|id| ctx.store.block_index(&id)) else {
            return false;
        };
        let Some(next) = ctx.store.get_blocks().get(current + 1) else {
            return false;
        };
        let request = CaretRequest::at(next.id.clone(), index.unwrap_or(0));
        self.place_caret_now(ctx, request)
    }

    pub fn create_child_block(
        &mut self,
        ctx: &mut EditorContext,
        parent: &BlockId,
        block: Block,
        after: Option<&BlockId>,
    ) -> Option<BlockId> {
        ctx.optimize_op();
        let id = ctx.create_child_block(parent, block, after, Source::User)?;
        ctx.optimize_op();
        ctx.render_children(parent.clone(), vec![id.clone()]);
        Some(id)
    }

    /// Content edits to a child coalesce like typing
    pub fn update_child_block(&mut self, ctx: &mut EditorContext, parent: &BlockId, block: Block) {
        let id = block.id.clone();
        ctx.update_child_block(parent, block, Source::User);
        ctx.render_children(parent.clone(), vec![id]);
    }

    pub fn delete_child_block(&mut self, ctx: &mut EditorContext, parent: &BlockId, id: &BlockId) {
        ctx.optimize_op();
        ctx.delete_child_block(parent, id, Source::User);
        ctx.optimize_op();
        ctx.render_children(parent.clone(), Vec::new());
    }

    fn editable<'a>(&self, ctx: &'a EditorContext, id: &BlockId) -> Option<&'a Block> {
        let block = ctx.store.get_block(id)?;
        ctx.registry
            .resolve(&block.kind)
            .text_editable
            .then_some(block)
    }

    fn shift_indent(&mut self, ctx: &mut EditorContext, shift: impl Fn(u32) -> u32) -> bool {
        let registry = ctx.registry.clone();
        self.update_targets(ctx, |block| {
            if !registry.resolve(&block.kind).indentable {
                return false;
            }
            let indent = shift(block.indent());
            if indent == block.indent() {
                return false;
            }
            if indent == 0 {
                block.attributes.remove("indent");
            } else {
                block.attributes.insert("indent".to_string(), indent.into());
            }
            true
        })
    }

    /// Rewrite the selected blocks (or the caret's block) with `change`,
    /// which returns whether it changed anything.
    fn update_targets(
        &mut self,
        ctx: &mut EditorContext,
        mut change: impl FnMut(&mut Block) -> bool,
    ) -> bool {
        let targets: Vec<BlockId> = if ctx.caret.is_block_range() {
            ctx.caret.selected_ids().to_vec()
        } else {
            ctx.current_block_id().into_iter().collect()
        };

        ctx.optimize_op();
        let mut changed = Vec::new();
        for id in targets {
            let Some(mut block) = ctx.store.get_block(&id).cloned() else {
                continue;
            };
            if change(&mut block) {
                ctx.update_block(block, Source::User);
                changed.push(id);
            }
        }
        if changed.is_empty() {
            return false;
        }

        let caret = ctx
            .caret_position()
            .map(|caret| CaretRequest::span(caret.block_id.clone(), caret.index, caret.length));
        self.finish(ctx, changed, caret);
        true
    }

    fn place_caret_now(&mut self, ctx: &mut EditorContext, request: CaretRequest) -> bool {
        ctx.scheduler.cancel_slot(TaskSlot::Caret);
        ctx.set_caret_position(&request, Source::User)
    }

    /// Common tail of every structural command
    fn finish(
        &mut self,
        ctx: &mut EditorContext,
        mut ids: Vec<BlockId>,
        caret: Option<CaretRequest>,
    ) {
        for id in ctx.numbering_list() {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ctx.optimize_op();
        if let Some(caret) = caret {
            ctx.schedule_caret(caret);
        }
        ctx.render(ids);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Inline;
    use crate::settings::EditorSettings;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn block(id: &str, text: &str) -> Block {
        Block {
            id: BlockId::from(id),
            ..Block::paragraph(text)
        }
    }

    fn context(blocks: Vec<Block>) -> EditorContext {
        EditorContext::new(EditorSettings::default(), blocks)
    }

    fn texts(ctx: &EditorContext) -> Vec<String> {
        ctx.store.get_blocks().iter().map(Block::text).collect()
    }

    fn pending_caret(ctx: &mut EditorContext) -> Option<CaretRequest> {
        let horizon = ctx.scheduler.horizon()?;
        while let Some(task) = ctx.scheduler.pop_due(horizon) {
            if let crate::scheduler::DeferredTask::PlaceCaret(request) = task {
                return Some(request);
            }
        }
        None
    }

    #[test]
    fn test_split_inherits_attributes_and_moves_caret() {
        let mut source = block("b1", "hello world");
        source.attributes.insert("align".to_string(), "center".into());
        let mut ctx = context(vec![source]);
        let mut editor = EditorModule::new();

        let new_id = editor.split_block(&mut ctx, &BlockId::from("b1"), 5, 0).unwrap();

        assert_eq!(texts(&ctx), vec!["hello", " world"]);
        let tail = ctx.store.get_block(&new_id).unwrap();
        assert_eq!(tail.kind, BlockKind::Paragraph);
        assert_eq!(tail.attributes.get("align"), Some(&"center".into()));
        assert_eq!(pending_caret(&mut ctx), Some(CaretRequest::at(new_id, 0)));
        assert_eq!(ctx.history.undo_depth(), 1);
    }

    #[test]
    fn test_split_replaces_span_and_keeps_placeholder() {
        let mut ctx = context(vec![block("b1", "abcdef")]);
        let mut editor = EditorModule::new();

        editor.split_block(&mut ctx, &BlockId::from("b1"), 0, 3).unwrap();

        assert_eq!(texts(&ctx), vec!["", "def"]);
        assert_eq!(ctx.store.get_blocks()[0].contents.len(), 1);
    }

    #[test]
    fn test_oversized_lengths_clamp_to_block_end() {
        let mut ctx = context(vec![block("b1", "hello world")]);
        let mut editor = EditorModule::new();
        let id = BlockId::from("b1");

        assert!(editor.delete_text(&mut ctx, &id, 9, usize::MAX));
        assert_eq!(texts(&ctx), vec!["hello wor"]);

        let new_id = editor.split_block(&mut ctx, &id, 5, usize::MAX).unwrap();
        assert_eq!(texts(&ctx), vec!["hello", ""]);
        assert_eq!(ctx.store.get_block(&new_id).unwrap().contents.len(), 1);
    }

    #[rstest]
    #[case(BlockKind::OrderedList, BlockKind::OrderedList)]
    #[case(BlockKind::BulletList, BlockKind::BulletList)]
    #[case(BlockKind::Header(2), BlockKind::Paragraph)]
    #[case(BlockKind::Blockquote, BlockKind::Paragraph)]
    fn test_split_kind(#[case] kind: BlockKind, #[case] expected: BlockKind) {
        let mut source = block("b1", "ab");
        source.kind = kind;
        let mut ctx = context(vec![source]);

        let new_id = EditorModule::new()
            .split_block(&mut ctx, &BlockId::from("b1"), 1, 0)
            .unwrap();
        assert_eq!(ctx.store.get_block(&new_id).unwrap().kind, expected);
    }

    #[test]
    fn test_split_embedded_block_adds_paragraph() {
        let mut image = block("img", "");
        image.kind = BlockKind::Image;
        let mut ctx = context(vec![image]);

        let new_id = EditorModule::new()
            .split_block(&mut ctx, &BlockId::from("img"), 0, 0)
            .unwrap();

        assert_eq!(ctx.store.len(), 2);
        assert_eq!(ctx.store.get_blocks()[0].kind, BlockKind::Image);
        assert_eq!(ctx.store.get_blocks()[1].id, new_id);
    }

    #[test]
    fn test_merge_places_caret_at_old_end() {
        let mut ctx = context(vec![block("b1", "foo"), block("b2", "bar")]);
        let mut editor = EditorModule::new();

        assert!(editor.merge_block(&mut ctx, &BlockId::from("b1"), &BlockId::from("b2")));
        assert_eq!(texts(&ctx), vec!["foobar"]);
        assert_eq!(ctx.store.get_blocks()[0].contents.len(), 1);
        assert_eq!(
            pending_caret(&mut ctx),
            Some(CaretRequest::at(BlockId::from("b1"), 3))
        );
    }

    #[test]
    fn test_delete_block_guards() {
        let mut ctx = context(vec![block("b1", "a"), block("b2", "bc")]);
        let mut editor = EditorModule::new();

        assert!(!editor.delete_block(&mut ctx, Some(&BlockId::from("b1"))));
        assert!(!editor.delete_block(&mut ctx, Some(&BlockId::from("nope"))));
        assert!(editor.delete_block(&mut ctx, Some(&BlockId::from("b2"))));
        assert_eq!(texts(&ctx), vec!["a"]);
        assert_eq!(
            pending_caret(&mut ctx),
            Some(CaretRequest::at(BlockId::from("b1"), 1))
        );
        assert!(!editor.delete_block(&mut ctx, Some(&BlockId::from("b1"))));
    }

    #[test]
    fn test_delete_blocks_caret_after_leading_delete() {
        let mut ctx = context(vec![block("b1", "a"), block("b2", "b"), block("b3", "c")]);
        let mut editor = EditorModule::new();

        assert!(editor.delete_blocks(&mut ctx, &[BlockId::from("b1"), BlockId::from("b2")]));
        assert_eq!(texts(&ctx), vec!["c"]);
        assert_eq!(
            pending_caret(&mut ctx),
            Some(CaretRequest::at(BlockId::from("b3"), 0))
        );
    }

    #[test]
    fn test_delete_blocks_renumbers_list() {
        let mut items: Vec<Block> = ["one", "two", "three"]
            .iter()
            .enumerate()
            .map(|(index, text)| {
                let mut item = block(&format!("o{index}"), text);
                item.kind = BlockKind::OrderedList;
                item
            })
            .collect();
        items.insert(0, block("p", "intro"));
        let mut ctx = context(items);
        let mut editor = EditorModule::new();
        editor.on_init(&mut ctx);

        editor.delete_blocks(&mut ctx, &[BlockId::from("o0")]);

        let numbers: Vec<Option<u32>> =
            ctx.store.get_blocks().iter().map(Block::list_number).collect();
        assert_eq!(numbers, vec![None, Some(1), Some(2)]);
    }

    #[test]
    fn test_typing_coalesces_into_one_step() {
        let mut ctx = context(vec![block("b1", "")]);
        let mut editor = EditorModule::new();
        let id = BlockId::from("b1");

        for (index, ch) in "abc".chars().enumerate() {
            assert!(editor.insert_text(&mut ctx, &id, index, &ch.to_string()));
        }

        assert_eq!(texts(&ctx), vec!["abc"]);
        assert_eq!(ctx.history.undo_depth(), 1);
        assert_eq!(ctx.caret_position().unwrap().index, 3);
    }

    #[test]
    fn test_format_inline_needs_a_span() {
        let mut ctx = context(vec![block("b1", "hello")]);
        let mut editor = EditorModule::new();
        let mut bold = Attributes::new();
        bold.insert("bold".to_string(), true.into());

        ctx.set_caret_position(&CaretRequest::at(BlockId::from("b1"), 2), Source::User);
        assert!(!editor.format_inline(&mut ctx, &bold));

        ctx.set_caret_position(&CaretRequest::span(BlockId::from("b1"), 1, 3), Source::User);
        assert!(editor.format_inline(&mut ctx, &bold));
        let contents: Vec<(&str, bool)> = ctx.store.get_blocks()[0]
            .contents
            .iter()
            .map(|inline: &Inline| (inline.text.as_str(), inline.attributes.contains_key("bold")))
            .collect();
        assert_eq!(contents, vec![("h", false), ("ell", true), ("o", false)]);
    }

    #[test]
    fn test_code_block_has_no_decorations() {
        let mut code = block("c", "let x");
        code.kind = BlockKind::CodeBlock;
        let mut ctx = context(vec![code]);
        let mut bold = Attributes::new();
        bold.insert("bold".to_string(), true.into());

        ctx.set_caret_position(&CaretRequest::span(BlockId::from("c"), 0, 3), Source::User);
        assert!(!EditorModule::new().format_inline(&mut ctx, &bold));
    }

    #[test]
    fn test_indent_is_bounded() {
        let mut item = block("l", "item");
        item.kind = BlockKind::BulletList;
        let mut settings = EditorSettings::default();
        settings.max_indent = 1;
        let mut ctx = EditorContext::new(settings, vec![item]);
        let mut editor = EditorModule::new();
        ctx.set_caret_position(&CaretRequest::at(BlockId::from("l"), 0), Source::User);

        assert!(editor.indent(&mut ctx));
        assert!(!editor.indent(&mut ctx));
        assert_eq!(ctx.store.get_blocks()[0].indent(), 1);
        assert!(editor.outdent(&mut ctx));
        assert!(!ctx.store.get_blocks()[0].attributes.contains_key("indent"));
    }

    #[test]
    fn test_paragraph_does_not_indent() {
        let mut ctx = context(vec![block("p", "text")]);
        ctx.set_caret_position(&CaretRequest::at(BlockId::from("p"), 0), Source::User);
        assert!(!EditorModule::new().indent(&mut ctx));
    }

    #[test]
    fn test_caret_navigation() {
        let mut ctx = context(vec![block("b1", "abc"), block("b2", "de")]);
        let mut editor = EditorModule::new();
        ctx.set_caret_position(&CaretRequest::at(BlockId::from("b2"), 1), Source::User);

        assert!(editor.caret_prev(&mut ctx, None));
        assert_eq!(ctx.caret_position().unwrap().index, 3);
        assert!(!editor.caret_prev(&mut ctx, None));
        assert!(editor.caret_next(&mut ctx, None));
        assert_eq!(ctx.current_block_id(), Some(BlockId::from("b2")));
        assert_eq!(ctx.caret_position().unwrap().index, 0);
    }
}
