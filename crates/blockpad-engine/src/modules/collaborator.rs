//! Merge boundary with remote editors.
//!
//! Locally recorded operations are queued for the transport to collect.
//! Remote operations are replayed through the history engine without
//! touching the local undo stack, and are announced with
//! [`Source::Collaborator`] so hosts can suppress selection side effects.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::context::EditorContext;
use crate::events::{EditorEvent, EventKind, Source, SubscriptionSet};
use crate::history::Operation;
use crate::models::{CaretPosition, CaretRequest};

use super::{Module, ModuleName};

#[derive(Debug, Default)]
pub struct CollaboratorModule {
    outbox: Rc<RefCell<Vec<Operation>>>,
    positions: BTreeMap<String, CaretPosition>,
    subscriptions: SubscriptionSet,
}

impl Module for CollaboratorModule {
    fn name(&self) -> ModuleName {
        ModuleName::Collaborator
    }

    fn on_init(&mut self, ctx: &mut EditorContext) {
        let outbox = self.outbox.clone();
        let id = ctx.bus.subscribe(EventKind::HistoryPushed, move |event| {
            if let EditorEvent::HistoryPushed {
                operation,
                source: Source::User,
            } = event
            {
                outbox.borrow_mut().push(operation.clone());
            }
        });
        self.subscriptions.add(id);
    }

    fn on_destroy(&mut self, ctx: &mut EditorContext) {
        self.subscriptions.unsubscribe_all(&ctx.bus);
        self.outbox.borrow_mut().clear();
    }
}

impl CollaboratorModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every locally authored operation recorded since the last call
    pub fn drain_outgoing(&mut self) -> Vec<Operation> {
        std::mem::take(&mut *self.outbox.borrow_mut())
    }

    /// Apply an operation authored elsewhere. Returns false, with a
    /// warning on the bus, if it does not apply to the current document.
    pub fn apply_remote(&mut self, ctx: &mut EditorContext, op: Operation) -> bool {
        let replay = match ctx.history.apply_external(&mut ctx.store, &op) {
            Ok(replay) => replay,
            Err(err) => {
                ctx.bus.warning(format!("remote {:?} rejected: {err}", op.kind()));
                return false;
            }
        };

        ctx.bus.publish(EditorEvent::HistoryPushed {
            operation: op,
            source: Source::Collaborator,
        });
        let mut ids = replay.block_ids;
        ids.extend(ctx.numbering_list());
        ctx.render(ids);
        for (parent, child) in replay.child_block_ids {
            ctx.render_children(parent, vec![child]);
        }
        self.refresh_caret(ctx);
        ctx.bus.publish(EditorEvent::EditorChanged {
            source: Source::Collaborator,
        });
        true
    }

    /// Re-resolve the local caret against the new content without
    /// announcing it
    fn refresh_caret(&self, ctx: &mut EditorContext) {
        let Some(caret) = ctx.caret_position().cloned() else {
            return;
        };
        let request = CaretRequest::span(caret.block_id, caret.index, caret.length);
        if !ctx.set_caret_position(&request, Source::Collaborator) {
            ctx.caret.clear();
        }
    }

    /// Show (or with `None`, hide) a remote participant's caret
    pub fn update_position(
        &mut self,
        ctx: &mut EditorContext,
        collaborator_id: &str,
        position: Option<CaretPosition>,
    ) {
        match &position {
            Some(position) => {
                self.positions
                    .insert(collaborator_id.to_string(), position.clone());
            }
            None => {
                self.positions.remove(collaborator_id);
            }
        }
        ctx.bus.publish(EditorEvent::CollaboratorPosition {
            collaborator_id: collaborator_id.to_string(),
            position,
        });
    }

    pub fn positions(&self) -> &BTreeMap<String, CaretPosition> {
        &self.positions
    }

    pub fn remove_all(&mut self, ctx: &mut EditorContext) {
        self.positions.clear();
        ctx.bus.publish(EditorEvent::CollaboratorsCleared);
    }
}
