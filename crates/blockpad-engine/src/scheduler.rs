//! Deferred work on a virtual clock.
//!
//! Nothing here sleeps. The host advances time (`EditorController::advance_time`)
//! and due tasks run in due-time order, ties broken by scheduling order.
//! Tasks are plain data so they can be dispatched against the controller
//! that owns the scheduler.

use std::collections::{BTreeMap, HashMap};

use crate::models::CaretRequest;
use crate::selection::PointerEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum DeferredTask {
    PlaceCaret(CaretRequest),
    SealHistory,
    /// Trailing pointer sample dropped by the move throttle
    SelectorMove(PointerEvent),
    /// Clears the selector's just-dragged flag after a release
    SelectorSettle,
}

/// At most one task is pending per slot; scheduling into a slot supersedes
/// whatever was waiting there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskSlot {
    Caret,
    HistorySeal,
    SelectorMove,
    SelectorSettle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle {
    due: u64,
    seq: u64,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now: u64,
    next_seq: u64,
    queue: BTreeMap<TaskHandle, DeferredTask>,
    slots: HashMap<TaskSlot, TaskHandle>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn schedule(&mut self, delay_ms: u64, task: DeferredTask) -> TaskHandle {
        self.next_seq += 1;
        let handle = TaskHandle {
            due: self.now.saturating_add(delay_ms),
            seq: self.next_seq,
        };
        self.queue.insert(handle, task);
        handle
    }

    pub fn schedule_slot(
        &mut self,
        slot: TaskSlot,
        delay_ms: u64,
        task: DeferredTask,
    ) -> TaskHandle {
        self.cancel_slot(slot);
        let handle = self.schedule(delay_ms, task);
        self.slots.insert(slot, handle);
        handle
    }

    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        self.slots.retain(|_, pending| *pending != handle);
        self.queue.remove(&handle).is_some()
    }

    pub fn cancel_slot(&mut self, slot: TaskSlot) -> bool {
        match self.slots.remove(&slot) {
            Some(handle) => self.queue.remove(&handle).is_some(),
            None => false,
        }
    }

    pub fn is_pending(&self, slot: TaskSlot) -> bool {
        self.slots.contains_key(&slot)
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Earliest task due at or before `until`; the clock moves to its due
    /// time.
    pub fn pop_due(&mut self, until: u64) -> Option<DeferredTask> {
        let (&handle, _) = self.queue.first_key_value()?;
        if handle.due > until {
            return None;
        }
        let task = self.queue.remove(&handle)?;
        self.slots.retain(|_, pending| *pending != handle);
        self.now = self.now.max(handle.due);
        Some(task)
    }

    /// Due time of the latest pending task
    pub fn horizon(&self) -> Option<u64> {
        self.queue.last_key_value().map(|(handle, _)| handle.due)
    }

    pub fn advance_clock(&mut self, to: u64) {
        self.now = self.now.max(to);
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.slots.clear();
    }
}
