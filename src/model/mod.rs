//! Domain model types (pure).
//!
//! All types in this module are plain data with smart constructors.

pub mod command;
pub mod display;
pub mod error;
pub mod pattern;
pub mod range;

// Re-export for convenience
pub use command::{ColumnChange, Command, Motion, PageMotion, PromptRequest, Toggle};
pub use display::{Direction, DisplayMode, ElementWidth};
pub use error::{AppError, CommandError, SourceError};
pub use pattern::{Pattern, PatternError, PatternMode};
pub use range::ByteRange;
