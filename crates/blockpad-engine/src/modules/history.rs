use crate::context::EditorContext;
use crate::events::{EditorEvent, Source};
use crate::history::Direction;
use crate::models::CaretRequest;
use crate::scheduler::TaskSlot;

use super::{Module, ModuleName};

/// Undo/redo commands over the shared [`History`](crate::history::History)
#[derive(Debug, Default)]
pub struct HistoryModule {}

impl Module for HistoryModule {
    fn name(&self) -> ModuleName {
        ModuleName::History
    }

    fn on_destroy(&mut self, ctx: &mut EditorContext) {
        ctx.scheduler.cancel_slot(TaskSlot::HistorySeal);
    }
}

impl HistoryModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn undo(&mut self, ctx: &mut EditorContext) -> bool {
        self.replay(ctx, Direction::Undo)
    }

    pub fn redo(&mut self, ctx: &mut EditorContext) -> bool {
        self.replay(ctx, Direction::Redo)
    }

    /// Seal the step currently being built
    pub fn optimize_op(&mut self, ctx: &mut EditorContext) {
        ctx.optimize_op();
    }

    pub fn can_undo(&self, ctx: &EditorContext) -> bool {
        ctx.history.can_undo()
    }

    pub fn can_redo(&self, ctx: &EditorContext) -> bool {
        ctx.history.can_redo()
    }

    fn replay(&mut self, ctx: &mut EditorContext, direction: Direction) -> bool {
        ctx.scheduler.cancel_slot(TaskSlot::HistorySeal);
        ctx.scheduler.cancel_slot(TaskSlot::Caret);

        let result = match direction {
            Direction::Undo => ctx.history.undo(&mut ctx.store),
            Direction::Redo => ctx.history.redo(&mut ctx.store),
        };
        let replay = match result {
            Ok(Some(replay)) => replay,
            Ok(None) => return false,
            Err(err) => {
                ctx.bus
                    .warning(format!("{direction:?} failed, step dropped: {err}"));
                return false;
            }
        };

        ctx.numbering_list();
        ctx.render_all();
        for (parent, child) in replay.child_block_ids {
            ctx.render_children(parent, vec![child]);
        }

        if let Some(position) = replay.position {
            let request = CaretRequest::span(position.block_id, position.index, position.length);
            if !ctx.set_caret_position(&request, Source::User) {
                ctx.blur();
            }
        }
        ctx.bus.publish(EditorEvent::EditorChanged {
            source: Source::User,
        });
        true
    }
}
