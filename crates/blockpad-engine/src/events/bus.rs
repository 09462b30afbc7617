use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use super::event::{EditorEvent, EventKind, LogLevel};

type Callback = Rc<RefCell<dyn FnMut(&EditorEvent)>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

struct Listener {
    id: SubscriptionId,
    kind: EventKind,
    callback: Callback,
}

#[derive(Default)]
struct BusState {
    listeners: Vec<Listener>,
    queue: VecDeque<EditorEvent>,
    dispatching: bool,
    next_id: u64,
}

/// Synchronous publish/subscribe channel shared by every component.
///
/// Cloning gives another handle to the same bus. Delivery happens in
/// subscription order before `publish` returns; an event published from
/// inside a callback is queued and delivered after the current event has
/// reached all of its subscribers.
#[derive(Clone, Default)]
pub struct EventBus {
    state: Rc<RefCell<BusState>>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("EventBus")
            .field("listeners", &state.listeners.len())
            .field("queued", &state.queue.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, kind: EventKind, callback: F) -> SubscriptionId
    where
        F: FnMut(&EditorEvent) + 'static,
    {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = SubscriptionId(state.next_id);
        let callback: Callback = Rc::new(RefCell::new(callback));
        state.listeners.push(Listener { id, kind, callback });
        id
    }

    /// Revoke a subscription; it receives nothing further, including events
    /// already queued.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.listeners.len();
        state.listeners.retain(|listener| listener.id != id);
        state.listeners.len() != before
    }

    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.state
            .borrow()
            .listeners
            .iter()
            .any(|listener| listener.id == id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    pub fn publish(&self, event: EditorEvent) {
        {
            let mut state = self.state.borrow_mut();
            state.queue.push_back(event);
            if state.dispatching {
                return;
            }
            state.dispatching = true;
        }

        loop {
            let next = {
                let mut state = self.state.borrow_mut();
                let next = state.queue.pop_front();
                if next.is_none() {
                    state.dispatching = false;
                }
                next
            };
            let Some(event) = next else {
                break;
            };

            let kind = event.kind();
            let targets: Vec<(SubscriptionId, Callback)> = self
                .state
                .borrow()
                .listeners
                .iter()
                .filter(|listener| listener.kind == kind)
                .map(|listener| (listener.id, listener.callback.clone()))
                .collect();

            for (id, callback) in targets {
                if !self.is_subscribed(id) {
                    continue;
                }
                if let Ok(mut callback) = callback.try_borrow_mut() {
                    let callback = &mut *callback;
                    callback(&event);
                }
            }
        }
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.publish(EditorEvent::Log {
            level,
            message: message.into(),
        });
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.log(LogLevel::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }
}

/// The subscriptions a module holds, revoked together on teardown
#[derive(Debug, Default)]
pub struct SubscriptionSet {
    ids: Vec<SubscriptionId>,
}

impl SubscriptionSet {
    pub fn add(&mut self, id: SubscriptionId) {
        self.ids.push(id);
    }

    pub fn unsubscribe_all(&mut self, bus: &EventBus) {
        for id in self.ids.drain(..) {
            bus.unsubscribe(id);
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
