//! UI state machine (pure).
//!
//! All state transitions are pure functions testable without TUI. I/O requested by a
//! transition comes back as an [`Effect`].

pub mod app_state;
pub mod colon;
pub mod command_handler;
pub mod navigation;
pub mod prompt;
pub mod view_config;

// Re-export for convenience
pub use app_state::{AppState, StatusMessage};
pub use colon::{run_command, ColonEffect};
pub use command_handler::{apply_search_outcome, handle_command, submit_prompt, Effect};
pub use navigation::{MoveTag, Navigator};
pub use prompt::{Prompt, PromptKind};
pub use view_config::{BinaryGlyphs, ByteOrder, ColumnFit, ViewConfig};
