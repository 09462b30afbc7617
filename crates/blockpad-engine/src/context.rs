//! Shared state handed to every command module.
//!
//! There are no globals: the controller owns one `EditorContext` and passes
//! it by `&mut` into each module call. Mutations made through the context
//! are recorded in history and announced on the bus in one place.

use crate::editing::{DocumentStore, numbering};
use crate::events::{EditorEvent, EventBus, Source};
use crate::history::{History, Operation};
use crate::models::{Block, BlockId, CaretPosition, CaretRequest, KindRegistry};
use crate::scheduler::{DeferredTask, Scheduler, TaskSlot};
use crate::selection::{CaretController, LayoutProvider, NoLayout};
use crate::settings::EditorSettings;

pub struct EditorContext {
    pub(crate) store: DocumentStore,
    pub(crate) history: History,
    pub(crate) bus: EventBus,
    pub(crate) caret: CaretController,
    pub(crate) scheduler: Scheduler,
    pub(crate) settings: EditorSettings,
    pub(crate) registry: KindRegistry,
    pub(crate) layout: Box<dyn LayoutProvider>,
}

impl std::fmt::Debug for EditorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorContext")
            .field("store", &self.store)
            .field("caret", &self.caret)
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}

impl EditorContext {
    pub fn new(settings: EditorSettings, blocks: Vec<Block>) -> Self {
        Self {
            store: DocumentStore::new(blocks),
            history: History::new(settings.history.max_depth),
            bus: EventBus::new(),
            caret: CaretController::new(),
            scheduler: Scheduler::new(),
            registry: KindRegistry::from_settings(&settings),
            settings,
            layout: Box::new(NoLayout),
        }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn caret(&self) -> &CaretController {
        &self.caret
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn registry(&self) -> &KindRegistry {
        &self.registry
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn caret_position(&self) -> Option<&CaretPosition> {
        self.caret.caret()
    }

    /// Block the caret is in
    pub fn current_block_id(&self) -> Option<BlockId> {
        self.caret.caret().map(|position| position.block_id.clone())
    }

    /// Record operations and announce them. User operations go on the undo
    /// stack; collaborator operations only notify; silent ones do neither.
    pub(crate) fn record(&mut self, ops: Vec<Operation>, source: Source) {
        if ops.is_empty() || source == Source::Silent {
            return;
        }
        let position = self.caret.caret().cloned();
        let mut content_update = false;

        for mut op in ops {
            if op.position().is_none() {
                op.set_position(position.clone());
            }
            content_update |= op.is_content_update();
            if source == Source::User {
                self.history.push(op.clone());
            }
            self.bus.publish(EditorEvent::HistoryPushed {
                operation: op,
                source,
            });
        }

        if source == Source::User && content_update && self.history.is_open() {
            self.scheduler.schedule_slot(
                TaskSlot::HistorySeal,
                self.settings.history.coalesce_delay_ms,
                DeferredTask::SealHistory,
            );
        }
        self.bus.publish(EditorEvent::EditorChanged { source });
    }

    pub(crate) fn create_block(
        &mut self,
        block: Block,
        after: Option<&BlockId>,
        source: Source,
    ) -> BlockId {
        let op = self.store.create_block(block, after);
        let id = op.block_id().clone();
        self.record(vec![op], source);
        id
    }

    pub(crate) fn update_block(&mut self, block: Block, source: Source) {
        let ops = self.store.update_block(block);
        self.record(ops, source);
    }

    pub(crate) fn delete_blocks(&mut self, ids: &[BlockId], source: Source) {
        let ops = self.store.delete_blocks(ids);
        self.record(ops, source);
    }

    pub(crate) fn create_child_block(
        &mut self,
        parent: &BlockId,
        block: Block,
        after: Option<&BlockId>,
        source: Source,
    ) -> Option<BlockId> {
        let op = self.store.create_child_block(parent, block, after)?;
        let id = op.block_id().clone();
        self.record(vec![op], source);
        Some(id)
    }

    pub(crate) fn update_child_block(&mut self, parent: &BlockId, block: Block, source: Source) {
        let ops = self.store.update_child_block(parent, block);
        self.record(ops, source);
    }

    pub(crate) fn delete_child_block(&mut self, parent: &BlockId, id: &BlockId, source: Source) {
        if let Some(op) = self.store.delete_child_block(parent, id) {
            self.record(vec![op], source);
        }
    }

    /// Seal the open history step
    pub(crate) fn optimize_op(&mut self) {
        self.history.optimize_op();
        self.scheduler.cancel_slot(TaskSlot::HistorySeal);
    }

    /// Recompute `meta.listNumber`; returns the blocks whose number changed
    pub(crate) fn numbering_list(&mut self) -> Vec<BlockId> {
        let numbers = numbering::compute_list_numbers(self.store.get_blocks());
        let mut changed = Vec::new();

        for (id, number) in numbers {
            let Some(block) = self.store.get_block(&id) else {
                continue;
            };
            let mut meta = block.meta.clone().unwrap_or_default();
            match number {
                Some(number) => {
                    meta.insert("listNumber".to_string(), number.into());
                }
                None => {
                    meta.remove("listNumber");
                }
            }
            let meta = (!meta.is_empty()).then_some(meta);
            if self.store.set_meta(&id, meta) {
                changed.push(id);
            }
        }
        changed
    }

    pub(crate) fn render(&self, ids: Vec<BlockId>) {
        self.bus.publish(EditorEvent::BlocksRerender {
            ids,
            block_count: self.store.len(),
        });
    }

    pub(crate) fn render_all(&self) {
        let ids = self
            .store
            .get_blocks()
            .iter()
            .map(|block| block.id.clone())
            .collect();
        self.render(ids);
    }

    pub(crate) fn render_force(&self, ids: Vec<BlockId>) {
        self.bus.publish(EditorEvent::BlocksRerenderForce { ids });
    }

    pub(crate) fn render_children(&self, parent_id: BlockId, ids: Vec<BlockId>) {
        self.bus
            .publish(EditorEvent::ChildBlocksRerender { parent_id, ids });
    }

    /// Place the caret now. Returns false if the block does not exist.
    pub(crate) fn set_caret_position(&mut self, request: &CaretRequest, source: Source) -> bool {
        let Some(position) =
            CaretController::position_for(&self.store, self.layout.as_ref(), request)
        else {
            return false;
        };
        self.caret.set_caret(position.clone());
        if source != Source::Collaborator {
            self.bus.publish(EditorEvent::SelectionChanged {
                position: Some(position),
                source,
            });
        }
        true
    }

    /// Place the caret once layout has caught up, superseding any caret
    /// placement still pending.
    pub(crate) fn schedule_caret(&mut self, request: CaretRequest) {
        self.scheduler.schedule_slot(
            TaskSlot::Caret,
            self.settings.caret_delay_ms,
            DeferredTask::PlaceCaret(request),
        );
    }

    pub(crate) fn blur(&mut self) {
        if self.caret.blur() {
            self.bus.publish(EditorEvent::SelectionChanged {
                position: None,
                source: Source::User,
            });
        }
    }
}
