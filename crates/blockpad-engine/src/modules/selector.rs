//! Multi-block range selection driven by pointer drags and keys.
//!
//! A drag starts with [`SelectorModule::mouse_down`] on a block or
//! [`SelectorModule::area_start`] in the gutter or outside the editor.
//! Pointer moves are sampled at an interval that widens with document
//! size; a sample dropped by the throttle is replayed once the interval
//! has passed so the final pointer position is never lost.
//!
//! After a release the selection is marked as just changed until a
//! zero-delay settle task runs, so the click that ends a drag does not
//! immediately reset what it selected.

use std::cell::Cell;
use std::rc::Rc;

use crate::context::EditorContext;
use crate::events::{EditorEvent, EventKind, SubscriptionSet};
use crate::models::{Block, BlockId};
use crate::scheduler::{DeferredTask, TaskSlot};
use crate::selection::{PointerEvent, covered_blocks};

use super::editor::EditorModule;
use super::keymap::{self, Key, KeyBinding, KeyEvent};
use super::{Module, ModuleName};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectorAction {
    DeleteSelected,
    Reset,
    SelectAll,
}

const BINDINGS: [KeyBinding<SelectorAction>; 4] = [
    KeyBinding::plain(Key::Backspace, SelectorAction::DeleteSelected),
    KeyBinding::plain(Key::Delete, SelectorAction::DeleteSelected),
    KeyBinding::plain(Key::Escape, SelectorAction::Reset).any_shift(),
    KeyBinding::short(Key::Char('a'), SelectorAction::SelectAll),
];

#[derive(Debug)]
pub struct SelectorModule {
    anchor: Option<BlockId>,
    pressed: bool,
    /// Selection changed by the current or just-released drag
    changed: bool,
    /// Drag began outside any block
    area: bool,
    last_move_ms: Option<u64>,
    interval_ms: Rc<Cell<u64>>,
    subscriptions: SubscriptionSet,
}

impl Default for SelectorModule {
    fn default() -> Self {
        Self {
            anchor: None,
            pressed: false,
            changed: false,
            area: false,
            last_move_ms: None,
            interval_ms: Rc::new(Cell::new(0)),
            subscriptions: SubscriptionSet::default(),
        }
    }
}

impl Module for SelectorModule {
    fn name(&self) -> ModuleName {
        ModuleName::Selector
    }

    fn on_init(&mut self, ctx: &mut EditorContext) {
        let tiers = ctx.settings.selector.clone();
        self.interval_ms.set(tiers.interval_for(ctx.store.len()));

        let interval_ms = self.interval_ms.clone();
        let id = ctx.bus.subscribe(EventKind::BlocksRerender, move |event| {
            if let EditorEvent::BlocksRerender { block_count, .. } = event {
                interval_ms.set(tiers.interval_for(*block_count));
            }
        });
        self.subscriptions.add(id);
    }

    fn on_destroy(&mut self, ctx: &mut EditorContext) {
        self.subscriptions.unsubscribe_all(&ctx.bus);
        ctx.scheduler.cancel_slot(TaskSlot::SelectorMove);
        ctx.scheduler.cancel_slot(TaskSlot::SelectorSettle);
        self.pressed = false;
    }
}

impl SelectorModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current move-sampling interval
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms.get()
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn is_enabled(&self, ctx: &EditorContext) -> bool {
        ctx.caret.is_block_range()
    }

    /// Pointer pressed on a block: any previous range is dropped and a
    /// drag may start from this block.
    pub fn mouse_down(&mut self, ctx: &mut EditorContext, event: &PointerEvent) {
        self.reset(ctx);
        self.begin(ctx, event.block_id.clone(), false);
    }

    /// Pointer pressed in the gutter or outside the editor. The anchor is
    /// the first block the drag reaches.
    pub fn area_start(&mut self, ctx: &mut EditorContext, event: &PointerEvent) {
        self.reset(ctx);
        let anchor = event
            .block_id
            .clone()
            .filter(|id| ctx.store.get_block(id).is_some());
        self.begin(ctx, anchor, true);
    }

    fn begin(&mut self, ctx: &mut EditorContext, anchor: Option<BlockId>, area: bool) {
        ctx.scheduler.cancel_slot(TaskSlot::SelectorMove);
        self.anchor = anchor;
        self.pressed = true;
        self.area = area;
        self.last_move_ms = None;
    }

    /// Throttled move. A sample arriving within the interval of the last
    /// processed one is deferred, replacing any sample already deferred.
    pub fn mouse_move(&mut self, ctx: &mut EditorContext, event: PointerEvent) {
        if !self.pressed {
            return;
        }
        let interval = self.interval_ms.get();
        if let Some(last) = self.last_move_ms
            && event.time_ms < last.saturating_add(interval)
        {
            let delay = last.saturating_add(interval) - event.time_ms;
            ctx.scheduler
                .schedule_slot(TaskSlot::SelectorMove, delay, DeferredTask::SelectorMove(event));
            return;
        }

        ctx.scheduler.cancel_slot(TaskSlot::SelectorMove);
        self.last_move_ms = Some(event.time_ms);
        self.process_move(ctx, &event);
    }

    /// A deferred sample coming due
    pub(crate) fn trailing_move(&mut self, ctx: &mut EditorContext, event: &PointerEvent) {
        if !self.pressed {
            return;
        }
        self.last_move_ms = Some(event.time_ms.max(self.last_move_ms.unwrap_or(0)));
        self.process_move(ctx, event);
    }

    /// Recompute the covered blocks for one pointer sample
    pub fn process_move(&mut self, ctx: &mut EditorContext, event: &PointerEvent) {
        if !self.pressed {
            return;
        }
        let hit = event
            .block_id
            .as_ref()
            .and_then(|id| ctx.store.block_index(id));

        if self.anchor.is_none() {
            self.anchor = match hit {
                Some(index) => Some(ctx.store.get_blocks()[index].id.clone()),
                None => block_at(ctx, event.y),
            };
        }
        let Some(anchor) = self.anchor.clone() else {
            return;
        };
        let Some(anchor_index) = ctx.store.block_index(&anchor) else {
            return;
        };

        let ids = covered_blocks(ctx.store.get_blocks(), anchor_index, hit, event.y, |id| {
            ctx.layout.block_bounds(id)
        });
        // Once the range is on, shrinking back to the anchor keeps that block
        let enough = if self.area || ctx.caret.is_block_range() {
            !ids.is_empty()
        } else {
            ids.len() > 1
        };

        if !enough {
            if ctx.caret.clear_range() {
                self.changed = true;
                ctx.bus.publish(EditorEvent::BlocksSelected { ids: Vec::new() });
            }
            return;
        }
        if ctx.caret.selected_ids() == ids.as_slice() {
            return;
        }

        let focus = if ids.first() == Some(&anchor) {
            ids.last()
        } else {
            ids.first()
        }
        .cloned()
        .unwrap_or_else(|| anchor.clone());

        ctx.blur();
        ctx.caret.select_range(ids.clone(), anchor, focus);
        self.changed = true;
        ctx.bus.publish(EditorEvent::BlocksSelected { ids });
    }

    /// End the drag. A range it produced stays selected.
    pub fn mouse_up(&mut self, ctx: &mut EditorContext) {
        if !self.pressed {
            return;
        }
        self.pressed = false;
        self.anchor = None;
        ctx.scheduler.cancel_slot(TaskSlot::SelectorMove);

        if self.changed {
            ctx.scheduler
                .schedule_slot(TaskSlot::SelectorSettle, 0, DeferredTask::SelectorSettle);
        }
    }

    pub(crate) fn settle(&mut self) {
        self.changed = false;
    }

    /// Clear the range and announce an empty selection. Ignored right
    /// after a drag changed the selection. Returns whether it ran.
    pub fn reset(&mut self, ctx: &mut EditorContext) -> bool {
        if self.changed {
            return false;
        }
        self.anchor = None;
        self.pressed = false;
        self.area = false;
        self.last_move_ms = None;
        ctx.scheduler.cancel_slot(TaskSlot::SelectorMove);
        ctx.caret.clear_range();
        ctx.bus.publish(EditorEvent::BlocksSelected { ids: Vec::new() });
        true
    }

    pub fn select_all(&mut self, ctx: &mut EditorContext) {
        let ids: Vec<BlockId> = ctx
            .store
            .get_blocks()
            .iter()
            .map(|block| block.id.clone())
            .collect();
        let (Some(anchor), Some(focus)) = (ids.first().cloned(), ids.last().cloned()) else {
            return;
        };
        ctx.blur();
        ctx.caret.select_range(ids.clone(), anchor, focus);
        ctx.bus.publish(EditorEvent::BlocksSelected { ids });
    }

    pub fn get_selected_blocks(&self, ctx: &EditorContext) -> Vec<Block> {
        let selected = ctx.caret.selected_ids();
        ctx.store
            .get_blocks()
            .iter()
            .filter(|block| selected.contains(&block.id))
            .cloned()
            .collect()
    }

    pub fn delete_selected(&mut self, ctx: &mut EditorContext, editor: &mut EditorModule) -> bool {
        let ids = ctx.caret.selected_ids().to_vec();
        if ids.is_empty() {
            return false;
        }
        ctx.caret.clear_range();
        self.changed = false;
        ctx.bus.publish(EditorEvent::BlocksSelected { ids: Vec::new() });
        editor.delete_blocks(ctx, &ids)
    }

    /// Handle a key press while blocks are selected. Short-key+A also
    /// selects every block from caret mode once the caret already spans
    /// its whole block.
    pub fn on_key_down(
        &mut self,
        ctx: &mut EditorContext,
        editor: &mut EditorModule,
        event: &KeyEvent,
    ) -> bool {
        let Some(action) = keymap::dispatch(&BINDINGS, event, ctx.settings.platform) else {
            return false;
        };

        match action {
            SelectorAction::SelectAll => {
                let whole_block = ctx.caret_position().is_some_and(|caret| {
                    caret.index == 0 && caret.length == ctx.store.get_block_length(&caret.block_id)
                });
                if !ctx.caret.is_block_range() && !whole_block {
                    return false;
                }
                self.select_all(ctx);
                true
            }
            _ if !ctx.caret.is_block_range() => false,
            SelectorAction::DeleteSelected => self.delete_selected(ctx, editor),
            SelectorAction::Reset => {
                self.changed = false;
                self.reset(ctx)
            }
        }
    }
}

/// Block whose bounds contain `y`, if layout reports one
fn block_at(ctx: &EditorContext, y: f64) -> Option<BlockId> {
    ctx.store
        .get_blocks()
        .iter()
        .find(|block| {
            ctx.layout
                .block_bounds(&block.id)
                .is_some_and(|rect| rect.contains_y(y))
        })
        .map(|block| block.id.clone())
}
