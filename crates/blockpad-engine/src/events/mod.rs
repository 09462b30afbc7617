mod bus;
mod event;

pub use bus::{EventBus, SubscriptionId, SubscriptionSet};
pub use event::{EditorEvent, EventKind, LogLevel, Source};
