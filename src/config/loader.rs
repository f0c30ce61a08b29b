//! Reads `config.toml` and folds it together with the environment and command line.

use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "HEXPAGER_CONFIG";

/// Environment variable overriding `dedup` (`0`/`false`/`no` disables).
pub const DEDUP_ENV: &str = "HEXPAGER_DEDUP";

/// A config file that exists but cannot be used.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read config {path}: {reason}")]
    ReadError {
        /// Config file.
        path: PathBuf,
        /// The I/O error text.
        reason: String,
    },

    /// Bad TOML, or a key hexpager does not know.
    #[error("bad config {path}: {reason}")]
    ParseError {
        /// Config file.
        path: PathBuf,
        /// What the TOML parser reported.
        reason: String,
    },
}

/// Contents of `~/.config/hexpager/config.toml`. Absent keys keep their defaults.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Collapse repeated rows.
    #[serde(default)]
    pub dedup: Option<bool>,

    /// Bytes per row; `0` fits the screen.
    #[serde(default)]
    pub columns: Option<u64>,

    /// Page-down step in bytes; `0` pages by screen.
    #[serde(default)]
    pub page_size: Option<u64>,

    /// Show the hex column.
    #[serde(default)]
    pub show_hex: Option<bool>,

    /// Show the binary column.
    #[serde(default)]
    pub show_binary: Option<bool>,

    /// Show the ASCII column.
    #[serde(default)]
    pub show_ascii: Option<bool>,

    /// Permit the `patch` command.
    #[serde(default)]
    pub allow_write: Option<bool>,

    /// Where tracing output is appended.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Directory holding the command and search history files.
    #[serde(default)]
    pub history_dir: Option<PathBuf>,
}

/// Settings in effect for the session: defaults, then file, then environment, then flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Collapse repeated rows.
    pub dedup: bool,
    /// Bytes per row; `0` fits the screen.
    pub columns: u64,
    /// Page-down step in bytes; `0` pages by screen.
    pub page_size: u64,
    /// Show the hex column.
    pub show_hex: bool,
    /// Show the binary column.
    pub show_binary: bool,
    /// Show the ASCII column.
    pub show_ascii: bool,
    /// Permit the `patch` command.
    pub allow_write: bool,
    /// Where tracing output is appended.
    pub log_file_path: PathBuf,
    /// Directory holding the history files.
    pub history_dir: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            dedup: true,
            columns: 0,
            page_size: 0,
            show_hex: true,
            show_binary: false,
            show_ascii: true,
            allow_write: false,
            log_file_path: default_log_path(),
            history_dir: default_history_dir(),
        }
    }
}

/// Flags given on the command line; `None` leaves the configured value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    /// `--cols`.
    pub columns: Option<u64>,
    /// `--page-size`.
    pub page_size: Option<u64>,
    /// `--no-dedup`.
    pub dedup: Option<bool>,
    /// `--binary`.
    pub show_binary: Option<bool>,
    /// `--no-hex`.
    pub show_hex: Option<bool>,
    /// `--no-ascii`.
    pub show_ascii: Option<bool>,
    /// `--write`.
    pub allow_write: Option<bool>,
}

/// `~/.local/state/hexpager/hexpager.log` on Linux, the platform state directory
/// elsewhere, or `hexpager.log` when there is none.
pub fn default_log_path() -> PathBuf {
    dirs::state_dir()
        .map(|dir| dir.join("hexpager").join("hexpager.log"))
        .unwrap_or_else(|| PathBuf::from("hexpager.log"))
}

/// Resolve default history directory (`~/.config/hexpager`).
pub fn default_history_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("hexpager"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Parse the config at `path`; a missing file is `Ok(None)`.
///
/// # Errors
///
/// [`ConfigError`] when the file exists but is unreadable or malformed.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    toml::from_str::<ConfigFile>(&text)
        .map(Some)
        .map_err(|e| ConfigError::ParseError {
            path,
            reason: e.to_string(),
        })
}

/// Resolve default config file path (`~/.config/hexpager/config.toml` on Linux).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("hexpager").join("config.toml"))
}

/// Find and parse the config file.
///
/// `--config` wins over `HEXPAGER_CONFIG`, which wins over the default path. Whichever
/// is chosen may be missing, which yields `Ok(None)`.
///
/// # Errors
///
/// See [`load_config_file`].
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    let chosen = config_path
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
        .or_else(default_config_path);
    match chosen {
        Some(path) => load_config_file(path),
        None => Ok(None),
    }
}

/// Apply `HEXPAGER_DEDUP`; values [`parse_flag`] rejects are logged and ignored.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(value) = std::env::var(DEDUP_ENV) {
        match parse_flag(&value) {
            Some(dedup) => config.dedup = dedup,
            None => tracing::warn!(value = %value, "Ignoring unrecognised {}", DEDUP_ENV),
        }
    }

    config
}

/// Parse a yes/no flag the way `set allowWrite=` does.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Some(true),
        "false" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Fill every key the file leaves out from [`ResolvedConfig::default`].
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();
    let Some(config) = config_file else {
        return defaults;
    };
    ResolvedConfig {
        dedup: config.dedup.unwrap_or(defaults.dedup),
        columns: config.columns.unwrap_or(defaults.columns),
        page_size: config.page_size.unwrap_or(defaults.page_size),
        show_hex: config.show_hex.unwrap_or(defaults.show_hex),
        show_binary: config.show_binary.unwrap_or(defaults.show_binary),
        show_ascii: config.show_ascii.unwrap_or(defaults.show_ascii),
        allow_write: config.allow_write.unwrap_or(defaults.allow_write),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
        history_dir: config.history_dir.unwrap_or(defaults.history_dir),
    }
}

/// Command-line flags go last and beat everything else.
pub fn apply_cli_overrides(mut config: ResolvedConfig, cli: &CliOverrides) -> ResolvedConfig {
    if let Some(columns) = cli.columns {
        config.columns = columns;
    }
    if let Some(page_size) = cli.page_size {
        config.page_size = page_size;
    }
    if let Some(dedup) = cli.dedup {
        config.dedup = dedup;
    }
    if let Some(show_binary) = cli.show_binary {
        config.show_binary = show_binary;
    }
    if let Some(show_hex) = cli.show_hex {
        config.show_hex = show_hex;
    }
    if let Some(show_ascii) = cli.show_ascii {
        config.show_ascii = show_ascii;
    }
    if let Some(allow_write) = cli.allow_write {
        config.allow_write = allow_write;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
