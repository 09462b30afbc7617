/*!
 * # Command Modules
 *
 * The command modules are the only code that mutates the document. Each one
 * owns a named slice of editing behaviour and receives the shared
 * [`EditorContext`] (store, history, bus, caret, scheduler) on every call.
 * Modules that need another module get it as an argument.
 *
 * ## Lifecycle
 *
 * Modules are constructed, then initialised in [`ModuleName::INIT_ORDER`]:
 * logger, editor, keyboard, selector, clipboard, history, collaborator.
 * Teardown runs in reverse. A module keeps the subscriptions it makes in a
 * `SubscriptionSet` and revokes them all in `on_destroy`.
 */

use std::fmt;
use std::str::FromStr;

use crate::context::EditorContext;

pub mod clipboard;
pub mod collaborator;
pub mod editor;
pub mod history;
pub mod keyboard;
pub mod keymap;
pub mod logger;
pub mod selector;

pub use clipboard::{ClipboardData, ClipboardModule, ClipboardPayload};
pub use collaborator::CollaboratorModule;
pub use editor::EditorModule;
pub use history::HistoryModule;
pub use keyboard::KeyboardModule;
pub use keymap::{Key, KeyBinding, KeyEvent, Modifiers};
pub use logger::LoggerModule;
pub use selector::SelectorModule;

/// The closed set of modules a controller can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModuleName {
    Logger,
    Editor,
    Keyboard,
    Selector,
    Clipboard,
    History,
    Collaborator,
}

impl ModuleName {
    pub const INIT_ORDER: [ModuleName; 7] = [
        ModuleName::Logger,
        ModuleName::Editor,
        ModuleName::Keyboard,
        ModuleName::Selector,
        ModuleName::Clipboard,
        ModuleName::History,
        ModuleName::Collaborator,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ModuleName::Logger => "logger",
            ModuleName::Editor => "editor",
            ModuleName::Keyboard => "keyboard",
            ModuleName::Selector => "selector",
            ModuleName::Clipboard => "clipboard",
            ModuleName::History => "history",
            ModuleName::Collaborator => "collaborator",
        }
    }

    /// Modules this one calls into
    pub fn dependencies(self) -> &'static [ModuleName] {
        match self {
            ModuleName::Keyboard => &[ModuleName::Editor, ModuleName::History],
            ModuleName::Selector | ModuleName::Clipboard => &[ModuleName::Editor],
            _ => &[],
        }
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModuleName::INIT_ORDER
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| format!("unknown module: {s}"))
    }
}

pub trait Module: fmt::Debug {
    fn name(&self) -> ModuleName;

    fn on_init(&mut self, _ctx: &mut EditorContext) {}

    fn on_destroy(&mut self, _ctx: &mut EditorContext) {}
}

/// Typed registry: one optional slot per module name
#[derive(Debug, Default)]
pub struct ModuleSet {
    pub(crate) logger: Option<LoggerModule>,
    pub(crate) editor: Option<EditorModule>,
    pub(crate) keyboard: Option<KeyboardModule>,
    pub(crate) selector: Option<SelectorModule>,
    pub(crate) clipboard: Option<ClipboardModule>,
    pub(crate) history: Option<HistoryModule>,
    pub(crate) collaborator: Option<CollaboratorModule>,
}

impl ModuleSet {
    pub fn all() -> Self {
        Self::with(&ModuleName::INIT_ORDER)
    }

    /// The named modules plus whatever they depend on
    pub fn with(names: &[ModuleName]) -> Self {
        let mut wanted: Vec<ModuleName> = names.to_vec();
        let mut index = 0;
        while index < wanted.len() {
            for dependency in wanted[index].dependencies() {
                if !wanted.contains(dependency) {
                    wanted.push(*dependency);
                }
            }
            index += 1;
        }

        let mut set = Self::default();
        for name in wanted {
            match name {
                ModuleName::Logger => set.logger = Some(LoggerModule::new()),
                ModuleName::Editor => set.editor = Some(EditorModule::new()),
                ModuleName::Keyboard => set.keyboard = Some(KeyboardModule::new()),
                ModuleName::Selector => set.selector = Some(SelectorModule::new()),
                ModuleName::Clipboard => set.clipboard = Some(ClipboardModule::new()),
                ModuleName::History => set.history = Some(HistoryModule::new()),
                ModuleName::Collaborator => set.collaborator = Some(CollaboratorModule::new()),
            }
        }
        set
    }

    pub fn get(&self, name: ModuleName) -> Option<&dyn Module> {
        match name {
            ModuleName::Logger => self.logger.as_ref().map(|m| m as &dyn Module),
            ModuleName::Editor => self.editor.as_ref().map(|m| m as &dyn Module),
            ModuleName::Keyboard => self.keyboard.as_ref().map(|m| m as &dyn Module),
            ModuleName::Selector => self.selector.as_ref().map(|m| m as &dyn Module),
            ModuleName::Clipboard => self.clipboard.as_ref().map(|m| m as &dyn Module),
            ModuleName::History => self.history.as_ref().map(|m| m as &dyn Module),
            ModuleName::Collaborator => self.collaborator.as_ref().map(|m| m as &dyn Module),
        }
    }

    fn get_mut(&mut self, name: ModuleName) -> Option<&mut dyn Module> {
        match name {
            ModuleName::Logger => self.logger.as_mut().map(|m| m as &mut dyn Module),
            ModuleName::Editor => self.editor.as_mut().map(|m| m as &mut dyn Module),
            ModuleName::Keyboard => self.keyboard.as_mut().map(|m| m as &mut dyn Module),
            ModuleName::Selector => self.selector.as_mut().map(|m| m as &mut dyn Module),
            ModuleName::Clipboard => self.clipboard.as_mut().map(|m| m as &mut dyn Module),
            ModuleName::History => self.history.as_mut().map(|m| m as &mut dyn Module),
            ModuleName::Collaborator => self.collaborator.as_mut().map(|m| m as &mut dyn Module),
        }
    }

    pub fn contains(&self, name: ModuleName) -> bool {
        self.get(name).is_some()
    }

    /// Registered modules in initialisation order
    pub fn names(&self) -> Vec<ModuleName> {
        ModuleName::INIT_ORDER
            .into_iter()
            .filter(|name| self.contains(*name))
            .collect()
    }

    pub(crate) fn init_all(&mut self, ctx: &mut EditorContext) {
        for name in ModuleName::INIT_ORDER {
            if let Some(module) = self.get_mut(name) {
                log::debug!("init module {name}");
                module.on_init(ctx);
            }
        }
    }

    /// Destroy every module in reverse order and drop it
    pub(crate) fn destroy_all(&mut self, ctx: &mut EditorContext) {
        for name in ModuleName::INIT_ORDER.into_iter().rev() {
            if let Some(module) = self.get_mut(name) {
                log::debug!("destroy module {name}");
                module.on_destroy(ctx);
            }
        }
        *self = Self::default();
    }
}
