//! Tracing subscriber initialization.
//!
//! The terminal belongs to the pager, so logs go to a file. Follow them with `tail -f`
//! in another terminal; `RUST_LOG=debug` shows paging, search, and sparse-index detail.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why file logging could not be set up.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The log directory could not be created.
    #[error("cannot create log directory {path:?}: {source}")]
    DirectoryCreation {
        /// Directory hexpager tried to create.
        path: PathBuf,
        /// Cause.
        #[source]
        source: std::io::Error,
    },

    /// The log path has no usable file name.
    #[error("log path has no file name: {0:?}")]
    InvalidPath(PathBuf),

    /// The log path is a filesystem root.
    #[error("log path has no parent directory: {0:?}")]
    NoParentDirectory(PathBuf),

    /// Another global subscriber was installed first.
    #[error("a tracing subscriber is already installed")]
    SubscriberAlreadySet,
}

/// Split `log_path` into the directory to create and the file name to append to.
///
/// A bare file name logs into the current directory.
///
/// # Errors
///
/// Returns [`LoggingError::InvalidPath`] when the path has no UTF-8 file name and
/// [`LoggingError::NoParentDirectory`] for a root path.
pub fn log_target(log_path: &Path) -> Result<(PathBuf, String), LoggingError> {
    let file_name = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| LoggingError::InvalidPath(log_path.to_path_buf()))?;

    let directory = log_path
        .parent()
        .ok_or_else(|| LoggingError::NoParentDirectory(log_path.to_path_buf()))?;
    let directory = if directory.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        directory.to_path_buf()
    };

    Ok((directory, file_name.to_string()))
}

/// Install a global subscriber appending to `log_path`, filtered by `RUST_LOG` (default
/// `info`). The directory is created first.
///
/// # Errors
///
/// Returns [`LoggingError`] if the path is unusable, the directory cannot be created,
/// or a subscriber is already installed.
pub fn init(log_path: &Path) -> Result<(), LoggingError> {
    use tracing_subscriber::EnvFilter;

    let (directory, file_name) = log_target(log_path)?;
    std::fs::create_dir_all(&directory).map_err(|source| LoggingError::DirectoryCreation {
        path: directory.clone(),
        source,
    })?;

    let file_appender = tracing_appender::rolling::never(&directory, file_name);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(file_appender)
        .with_ansi(false)
        .with_thread_names(true)
        .try_init()
        .map_err(|_| LoggingError::SubscriberAlreadySet)
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
