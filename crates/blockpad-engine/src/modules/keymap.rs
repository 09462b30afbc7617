//! Declarative key bindings.
//!
//! A module lists `(key, modifier predicate) -> action` rows and asks
//! [`dispatch`] which action, if any, an event triggers. The "short key" is
//! Cmd on macOS and Ctrl elsewhere.

use serde::{Deserialize, Serialize};

use crate::settings::Platform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Enter,
    Backspace,
    Delete,
    Escape,
    Tab,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Char(char),
}

impl Key {
    fn same_key(self, other: Key) -> bool {
        match (self, other) {
            (Key::Char(a), Key::Char(b)) => a.eq_ignore_ascii_case(&b),
            _ => self == other,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::default(),
        }
    }

    pub fn shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }

    pub fn ctrl(mut self) -> Self {
        self.modifiers.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.modifiers.meta = true;
        self
    }

    /// The platform's command modifier is held
    pub fn short_key(&self, platform: Platform) -> bool {
        match platform {
            Platform::Mac => self.modifiers.meta,
            Platform::Other => self.modifiers.ctrl,
        }
    }
}

/// One row of a binding table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding<A> {
    pub key: Key,
    pub short_key: bool,
    /// `None` accepts either state
    pub shift: Option<bool>,
    pub action: A,
}

impl<A: Copy> KeyBinding<A> {
    pub const fn plain(key: Key, action: A) -> Self {
        Self {
            key,
            short_key: false,
            shift: Some(false),
            action,
        }
    }

    pub const fn short(key: Key, action: A) -> Self {
        Self {
            key,
            short_key: true,
            shift: Some(false),
            action,
        }
    }

    pub const fn with_shift(mut self) -> Self {
        self.shift = Some(true);
        self
    }

    pub const fn any_shift(mut self) -> Self {
        self.shift = None;
        self
    }

    pub fn matches(&self, event: &KeyEvent, platform: Platform) -> bool {
        self.key.same_key(event.key)
            && self.short_key == event.short_key(platform)
            && self.shift.is_none_or(|shift| shift == event.modifiers.shift)
            && !event.modifiers.alt
    }
}

/// First action whose row matches the event
pub fn dispatch<A: Copy>(
    bindings: &[KeyBinding<A>],
    event: &KeyEvent,
    platform: Platform,
) -> Option<A> {
    bindings
        .iter()
        .find(|binding| binding.matches(event, platform))
        .map(|binding| binding.action)
}
