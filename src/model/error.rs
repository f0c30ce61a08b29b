//! Error types for hexpager.
//!
//! A small `thiserror` taxonomy. Errors that abort startup ([`SourceError`], config and
//! logging failures) surface from `main`; everything raised while the pager is running is
//! rendered on the status line and the session continues.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error returned from the binary entry point
//!   - [`SourceError`] - Opening or sizing the target file or device
//!   - [`ConfigError`] - The configuration file could not be read or parsed
//!   - [`LoggingError`] - The log file could not be set up
//!   - `std::io::Error` - Terminal failures
//! - [`CommandError`] - A colon command or prompt value could not be applied (never fatal)
//!
//! Expression and pattern errors live next to their parsers
//! ([`crate::expr::ExprError`], [`crate::model::pattern::PatternError`]) and convert into
//! [`CommandError`] via `From`.

use crate::config::ConfigError;
use crate::expr::ExprError;
use crate::logging::LoggingError;
use crate::model::pattern::PatternError;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error.
///
/// Every variant is fatal: the terminal is restored and the message is printed to stderr.
#[derive(Debug, Error)]
pub enum AppError {
    /// The target could not be opened or sized.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The configuration file is unreadable or malformed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The log file could not be opened.
    #[error(transparent)]
    Logging(#[from] LoggingError),

    /// Terminal or TUI rendering error.
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Errors raised while opening the viewed file or device.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The path does not exist.
    #[error("File not found: {path}")]
    NotFound {
        /// Path that was requested.
        path: PathBuf,
    },

    /// The path exists but could not be opened for reading.
    #[error("Cannot open {path}: {source}")]
    Open {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A block device whose size the platform could not report.
    #[error("Cannot determine size of device {path}: {source}")]
    DeviceSize {
        /// Device path.
        path: PathBuf,
        /// Underlying ioctl error.
        #[source]
        source: std::io::Error,
    },

    /// Any other I/O failure while inspecting the target.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path being inspected.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by colon commands and prompt submissions.
///
/// All of these are non-fatal and end up on the status line.
#[derive(Debug, Error)]
pub enum CommandError {
    /// No command name starts with the given text.
    #[error("unknown command: {0}")]
    Unknown(String),

    /// Several command names start with the given text.
    #[error("ambiguous command: {name} (matches {candidates})")]
    Ambiguous {
        /// The prefix typed by the user.
        name: String,
        /// Comma-separated list of matching commands.
        candidates: String,
    },

    /// Wrong number or shape of arguments.
    #[error("{command}: {reason}")]
    InvalidArguments {
        /// Command name.
        command: &'static str,
        /// What was wrong.
        reason: String,
    },

    /// `set` named a variable that does not exist.
    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    /// A value outside what the target variable accepts.
    #[error("invalid value for {name}: {value}")]
    InvalidValue {
        /// Variable name.
        name: String,
        /// The rejected value.
        value: String,
    },

    /// An offset outside `0..=file_size`.
    #[error("offset out of range: {0}")]
    OffsetOutOfRange(i64),

    /// A write operation was requested while writes are disabled.
    #[error("writes are disabled (set allowWrite=true)")]
    WriteDisabled,

    /// An arithmetic expression failed to evaluate.
    #[error(transparent)]
    Expr(#[from] ExprError),

    /// A search or patch pattern failed to parse.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// An export or patch failed at the I/O layer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
