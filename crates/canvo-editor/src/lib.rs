pub mod adapter;
pub mod clipboard;
pub mod editor;
pub mod error;
pub mod history;
pub mod memory;
pub mod selection;
pub mod shortcuts;
pub mod viewport;
mod wiring;

pub use adapter::{Brush, ImageInfo, LoadError, LoadTicket, LoadedImage, SceneAdapter, SceneEvent};
pub use editor::Editor;
pub use error::{EditorError, EditorResult};
pub use history::{History, HistoryState};
pub use memory::MemoryScene;
pub use shortcuts::{ShortcutAction, ShortcutMap};
