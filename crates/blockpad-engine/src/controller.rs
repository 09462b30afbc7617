//! The one API surface the presentation layer talks to.
//!
//! [`EditorController`] owns the [`EditorContext`] and the module registry.
//! Commands are routed to the module that owns them; a command whose module
//! is not registered does nothing and logs a warning. Deferred tasks queued
//! by the modules run when the host advances time.

use crate::context::EditorContext;
use crate::editing::{DocumentStore, contents, numbering};
use crate::events::{EditorEvent, EventBus, EventKind, Source, SubscriptionId};
use crate::history::Operation;
use crate::models::{
    Attributes, Block, BlockId, BlockKind, BlockSpec, CaretPosition, CaretRequest,
};
use crate::modules::{
    ClipboardData, CollaboratorModule, EditorModule, KeyEvent, Module, ModuleName, ModuleSet,
    SelectorModule,
};
use crate::scheduler::{DeferredTask, TaskSlot};
use crate::selection::{LayoutProvider, NoLayout, PointerEvent, SelectionState};
use crate::settings::EditorSettings;

pub struct ControllerBuilder {
    blocks: Vec<Block>,
    settings: EditorSettings,
    layout: Box<dyn LayoutProvider>,
    modules: Vec<ModuleName>,
    extensions: Vec<(BlockKind, BlockSpec)>,
    bus: Option<EventBus>,
}

impl ControllerBuilder {
    pub fn settings(mut self, settings: EditorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn layout(mut self, layout: impl LayoutProvider + 'static) -> Self {
        self.layout = Box::new(layout);
        self
    }

    /// Register only these modules (and their dependencies)
    pub fn modules(mut self, names: &[ModuleName]) -> Self {
        self.modules = names.to_vec();
        self
    }

    /// Give an extension block kind its own capabilities
    pub fn register_kind(mut self, kind: BlockKind, spec: BlockSpec) -> Self {
        self.extensions.push((kind, spec));
        self
    }

    /// Use an existing bus, so subscribers attached beforehand see
    /// `EditorCreated`
    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn build(self) -> EditorController {
        let mut ctx = EditorContext::new(self.settings, self.blocks);
        ctx.layout = self.layout;
        if let Some(bus) = self.bus {
            ctx.bus = bus;
        }
        for (kind, spec) in self.extensions {
            ctx.registry.register(kind, spec);
        }

        let mut modules = ModuleSet::with(&self.modules);
        modules.init_all(&mut ctx);
        ctx.bus.publish(EditorEvent::EditorCreated);
        ctx.bus.info(format!(
            "editor created with {} blocks, modules: {:?}",
            ctx.store.len(),
            modules.names()
        ));

        EditorController {
            ctx,
            modules,
            destroyed: false,
        }
    }
}

pub struct EditorController {
    ctx: EditorContext,
    modules: ModuleSet,
    destroyed: bool,
}

impl std::fmt::Debug for EditorController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorController")
            .field("ctx", &self.ctx)
            .field("modules", &self.modules.names())
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

impl EditorController {
    /// Controller with every module and default settings
    pub fn new(blocks: Vec<Block>) -> Self {
        Self::builder(blocks).build()
    }

    pub fn builder(blocks: Vec<Block>) -> ControllerBuilder {
        ControllerBuilder {
            blocks,
            settings: EditorSettings::default(),
            layout: Box::new(NoLayout),
            modules: ModuleName::INIT_ORDER.to_vec(),
            extensions: Vec::new(),
            bus: None,
        }
    }

    // Queries

    pub fn context(&self) -> &EditorContext {
        &self.ctx
    }

    pub fn store(&self) -> &DocumentStore {
        &self.ctx.store
    }

    pub fn blocks(&self) -> &[Block] {
        self.ctx.store.get_blocks()
    }

    pub fn block(&self, id: &BlockId) -> Option<&Block> {
        self.ctx.store.get_block(id)
    }

    pub fn block_length(&self, id: &BlockId) -> usize {
        self.ctx.store.get_block_length(id)
    }

    pub fn child_blocks(&self, parent: &BlockId) -> &[Block] {
        self.ctx.store.get_child_blocks(parent)
    }

    pub fn caret_position(&self) -> Option<&CaretPosition> {
        self.ctx.caret_position()
    }

    pub fn selection_state(&self) -> &SelectionState {
        self.ctx.caret.state()
    }

    pub fn selected_block_ids(&self) -> &[BlockId] {
        self.ctx.caret.selected_ids()
    }

    pub fn selected_blocks(&self) -> Vec<Block> {
        match &self.modules.selector {
            Some(selector) => selector.get_selected_blocks(&self.ctx),
            None => Vec::new(),
        }
    }

    /// Attributes common to the whole span
    pub fn get_formats(&self, id: &BlockId, index: usize, length: usize) -> Attributes {
        self.ctx
            .store
            .get_block(id)
            .map(|block| contents::formats_at(&block.contents, index, length))
            .unwrap_or_default()
    }

    /// Marker for an ordered-list item, e.g. `2.` or `b.`
    pub fn list_label(&self, id: &BlockId) -> Option<String> {
        let block = self.ctx.store.get_block(id)?;
        let number = block.list_number()?;
        Some(numbering::list_label(number, block.indent()))
    }

    pub fn plain_text(&self) -> String {
        contents::blocks_to_text(self.ctx.store.get_blocks())
    }

    pub fn can_undo(&self) -> bool {
        self.ctx.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.ctx.history.can_redo()
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.ctx.bus
    }

    pub fn subscribe<F>(&self, kind: EventKind, callback: F) -> SubscriptionId
    where
        F: FnMut(&EditorEvent) + 'static,
    {
        self.ctx.bus.subscribe(kind, callback)
    }

    /// Module lookup by name
    pub fn module(&self, name: ModuleName) -> Option<&dyn Module> {
        self.modules.get(name)
    }

    pub fn module_names(&self) -> Vec<ModuleName> {
        self.modules.names()
    }

    pub fn selector(&self) -> Option<&SelectorModule> {
        self.modules.selector.as_ref()
    }

    pub fn collaborator(&self) -> Option<&CollaboratorModule> {
        self.modules.collaborator.as_ref()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    // Rendering and caret

    pub fn render(&self, ids: Vec<BlockId>) {
        self.ctx.render(ids);
    }

    pub fn render_all(&self) {
        self.ctx.render_all();
    }

    pub fn render_force(&self, ids: Vec<BlockId>) {
        self.ctx.render_force(ids);
    }

    pub fn set_caret_position(&mut self, request: CaretRequest) -> bool {
        self.ctx.scheduler.cancel_slot(TaskSlot::Caret);
        self.ctx.set_caret_position(&request, Source::User)
    }

    pub fn blur(&mut self) {
        self.ctx.blur();
    }

    // Editor commands

    pub fn create_block(&mut self, after: Option<&BlockId>) -> Option<BlockId> {
        self.with_editor(None, |editor, ctx| Some(editor.create_block(ctx, after)))
    }

    pub fn delete_block(&mut self, id: Option<&BlockId>) -> bool {
        self.with_editor(false, |editor, ctx| editor.delete_block(ctx, id))
    }

    pub fn delete_blocks(&mut self, ids: &[BlockId]) -> bool {
        self.with_editor(false, |editor, ctx| editor.delete_blocks(ctx, ids))
    }

    pub fn merge_block(&mut self, source: &BlockId, other: &BlockId) -> bool {
        self.with_editor(false, |editor, ctx| editor.merge_block(ctx, source, other))
    }

    pub fn split_block(&mut self, id: &BlockId, index: usize, length: usize) -> Option<BlockId> {
        self.with_editor(None, |editor, ctx| editor.split_block(ctx, id, index, length))
    }

    pub fn insert_text(&mut self, id: &BlockId, index: usize, text: &str) -> bool {
        self.with_editor(false, |editor, ctx| editor.insert_text(ctx, id, index, text))
    }

    pub fn delete_text(&mut self, id: &BlockId, index: usize, length: usize) -> bool {
        self.with_editor(false, |editor, ctx| editor.delete_text(ctx, id, index, length))
    }

    pub fn format_inline(&mut self, attributes: &Attributes) -> bool {
        self.with_editor(false, |editor, ctx| editor.format_inline(ctx, attributes))
    }

    pub fn format_block(&mut self, kind: BlockKind) -> bool {
        self.with_editor(false, |editor, ctx| editor.format_block(ctx, kind))
    }

    pub fn indent(&mut self) -> bool {
        self.with_editor(false, |editor, ctx| editor.indent(ctx))
    }

    pub fn outdent(&mut self) -> bool {
        self.with_editor(false, |editor, ctx| editor.outdent(ctx))
    }

    pub fn caret_prev(&mut self, index: Option<usize>) -> bool {
        self.with_editor(false, |editor, ctx| editor.caret_prev(ctx, index))
    }

    pub fn caret_next(&mut self, index: Option<usize>) -> bool {
        self.with_editor(false, |editor, ctx| editor.caret_next(ctx, index))
    }

    pub fn create_child_block(
        &mut self,
        parent: &BlockId,
        block: Block,
        after: Option<&BlockId>,
    ) -> Option<BlockId> {
        self.with_editor(None, |editor, ctx| {
            editor.create_child_block(ctx, parent, block, after)
        })
    }

    pub fn update_child_block(&mut self, parent: &BlockId, block: Block) {
        self.with_editor((), |editor, ctx| {
            editor.update_child_block(ctx, parent, block)
        })
    }

    pub fn delete_child_block(&mut self, parent: &BlockId, id: &BlockId) {
        self.with_editor((), |editor, ctx| editor.delete_child_block(ctx, parent, id))
    }

    // History

    pub fn undo(&mut self) -> bool {
        match self.modules.history.as_mut() {
            Some(history) => history.undo(&mut self.ctx),
            None => missing(&self.ctx.bus, ModuleName::History),
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.modules.history.as_mut() {
            Some(history) => history.redo(&mut self.ctx),
            None => missing(&self.ctx.bus, ModuleName::History),
        }
    }

    pub fn optimize_op(&mut self) {
        self.ctx.optimize_op();
    }

    // Clipboard

    pub fn copy(&mut self) -> Option<ClipboardData> {
        match self.modules.clipboard.as_mut() {
            Some(clipboard) => clipboard.on_copy(&mut self.ctx),
            None => {
                missing(&self.ctx.bus, ModuleName::Clipboard);
                None
            }
        }
    }

    pub fn cut(&mut self) -> Option<ClipboardData> {
        match (self.modules.clipboard.as_mut(), self.modules.editor.as_mut()) {
            (Some(clipboard), Some(editor)) => clipboard.on_cut(&mut self.ctx, editor),
            _ => {
                missing(&self.ctx.bus, ModuleName::Clipboard);
                None
            }
        }
    }

    pub fn paste(&mut self, data: &ClipboardData) -> bool {
        match (self.modules.clipboard.as_mut(), self.modules.editor.as_mut()) {
            (Some(clipboard), Some(editor)) => clipboard.on_paste(&mut self.ctx, editor, data),
            _ => missing(&self.ctx.bus, ModuleName::Clipboard),
        }
    }

    // Pointer and keyboard input

    /// Pointer pressed. On a block the caret goes to the hit offset (or
    /// the block's end); anywhere else an area drag may begin.
    pub fn pointer_down(&mut self, event: PointerEvent) {
        let Some(selector) = self.modules.selector.as_mut() else {
            missing(&self.ctx.bus, ModuleName::Selector);
            return;
        };

        let hit = event
            .block_id
            .clone()
            .filter(|id| event.inside_editor && self.ctx.store.get_block(id).is_some());
        match hit {
            Some(id) => {
                selector.mouse_down(&mut self.ctx, &event);
                let index = event
                    .index
                    .unwrap_or_else(|| self.ctx.store.get_block_length(&id));
                self.ctx.scheduler.cancel_slot(TaskSlot::Caret);
                self.ctx
                    .set_caret_position(&CaretRequest::at(id, index), Source::User);
            }
            None => {
                self.ctx.blur();
                selector.area_start(&mut self.ctx, &event);
            }
        }
    }

    pub fn pointer_move(&mut self, event: PointerEvent) {
        if let Some(selector) = self.modules.selector.as_mut() {
            selector.mouse_move(&mut self.ctx, event);
        }
    }

    pub fn pointer_up(&mut self) {
        if let Some(selector) = self.modules.selector.as_mut() {
            selector.mouse_up(&mut self.ctx);
        }
    }

    /// Click outside the editing surface: drop any block range (unless a
    /// drag just produced it) and the caret.
    pub fn click_outside(&mut self) {
        if let Some(selector) = self.modules.selector.as_mut() {
            selector.reset(&mut self.ctx);
        }
        self.ctx.blur();
    }

    pub fn reset_selection(&mut self) -> bool {
        match self.modules.selector.as_mut() {
            Some(selector) => selector.reset(&mut self.ctx),
            None => missing(&self.ctx.bus, ModuleName::Selector),
        }
    }

    pub fn select_all(&mut self) {
        if let Some(selector) = self.modules.selector.as_mut() {
            selector.select_all(&mut self.ctx);
        }
    }

    /// Route a key press: selector bindings first, then caret bindings.
    /// Returns whether the engine consumed it.
    pub fn key_down(&mut self, event: KeyEvent) -> bool {
        if let (Some(selector), Some(editor)) =
            (self.modules.selector.as_mut(), self.modules.editor.as_mut())
            && selector.on_key_down(&mut self.ctx, editor, &event)
        {
            return true;
        }
        match (
            self.modules.keyboard.as_mut(),
            self.modules.editor.as_mut(),
            self.modules.history.as_mut(),
        ) {
            (Some(keyboard), Some(editor), Some(history)) => {
                keyboard.on_key_down(&mut self.ctx, editor, history, &event)
            }
            _ => false,
        }
    }

    // Collaboration

    pub fn apply_remote(&mut self, op: Operation) -> bool {
        match self.modules.collaborator.as_mut() {
            Some(collaborator) => collaborator.apply_remote(&mut self.ctx, op),
            None => missing(&self.ctx.bus, ModuleName::Collaborator),
        }
    }

    pub fn drain_outgoing(&mut self) -> Vec<Operation> {
        self.modules
            .collaborator
            .as_mut()
            .map(CollaboratorModule::drain_outgoing)
            .unwrap_or_default()
    }

    pub fn update_collaborator(&mut self, collaborator_id: &str, position: Option<CaretPosition>) {
        if let Some(collaborator) = self.modules.collaborator.as_mut() {
            collaborator.update_position(&mut self.ctx, collaborator_id, position);
        }
    }

    pub fn remove_collaborators(&mut self) {
        if let Some(collaborator) = self.modules.collaborator.as_mut() {
            collaborator.remove_all(&mut self.ctx);
        }
    }

    // Deferred work

    pub fn now(&self) -> u64 {
        self.ctx.scheduler.now()
    }

    pub fn pending_tasks(&self) -> usize {
        self.ctx.scheduler.pending()
    }

    /// Move the clock forward, running every task that comes due in order
    pub fn advance_time(&mut self, ms: u64) {
        let target = self.ctx.scheduler.now().saturating_add(ms);
        while let Some(task) = self.ctx.scheduler.pop_due(target) {
            self.run_task(task);
        }
        self.ctx.scheduler.advance_clock(target);
    }

    /// Run everything pending, including tasks queued while flushing
    pub fn flush_deferred(&mut self) {
        while let Some(horizon) = self.ctx.scheduler.horizon() {
            let delay = horizon.saturating_sub(self.ctx.scheduler.now());
            self.advance_time(delay);
        }
    }

    fn run_task(&mut self, task: DeferredTask) {
        match task {
            DeferredTask::PlaceCaret(request) => {
                if !self.ctx.set_caret_position(&request, Source::User) {
                    self.ctx
                        .bus
                        .info(format!("caret target {} is gone", request.block_id));
                }
            }
            DeferredTask::SealHistory => self.ctx.optimize_op(),
            DeferredTask::SelectorMove(event) => {
                if let Some(selector) = self.modules.selector.as_mut() {
                    selector.trailing_move(&mut self.ctx, &event);
                }
            }
            DeferredTask::SelectorSettle => {
                if let Some(selector) = self.modules.selector.as_mut() {
                    selector.settle();
                }
            }
        }
    }

    // Lifecycle

    /// Tear every module down in reverse order. Their subscriptions are
    /// revoked and nothing scheduled runs afterwards.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.modules.destroy_all(&mut self.ctx);
        self.ctx.scheduler.clear();
        self.destroyed = true;
    }

    fn with_editor<R>(
        &mut self,
        fallback: R,
        command: impl FnOnce(&mut EditorModule, &mut EditorContext) -> R,
    ) -> R {
        match self.modules.editor.as_mut() {
            Some(editor) => command(editor, &mut self.ctx),
            None => {
                missing(&self.ctx.bus, ModuleName::Editor);
                fallback
            }
        }
    }
}

fn missing(bus: &EventBus, name: ModuleName) -> bool {
    bus.warning(format!("module {name} is not registered"));
    false
}

impl Drop for EditorController {
    fn drop(&mut self) {
        self.destroy();
    }
}
