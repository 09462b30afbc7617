pub mod context;
pub mod controller;
pub mod editing;
pub mod error;
pub mod events;
pub mod history;
pub mod models;
pub mod modules;
pub mod scheduler;
pub mod selection;
pub mod settings;

// Re-export key types for easier usage
pub use context::EditorContext;
pub use controller::{ControllerBuilder, EditorController};
pub use editing::DocumentStore;
pub use error::{EngineError, Result};
pub use events::*;
pub use history::{History, Operation, OperationKind};
pub use models::*;
pub use modules::{ClipboardData, Key, KeyEvent, Modifiers, Module, ModuleName};
pub use selection::{LayoutProvider, NoLayout, PointerEvent, SelectionState, StaticLayout};
pub use settings::*;
