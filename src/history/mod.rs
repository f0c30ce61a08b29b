//! Persistent command and search history.
//!
//! Each store is a JSON array of `{value, timestamp}` entries. Stores load on a background
//! thread and become usable once [`HistoryStore::poll`] sees the result; additions before
//! that are dropped. Every addition is written back on a detached thread. If the file
//! changed on disk since it was loaded (another pager saved in the meantime), the writer
//! reloads it, appends its own entries, sorts by timestamp, drops duplicate timestamps,
//! and keeps the newest [`MAX_HISTORY_ENTRIES`].

use crate::model::{Pattern, PatternMode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, warn};

/// Entries kept on disk per store.
pub const MAX_HISTORY_ENTRIES: usize = 1024;

/// File name of the colon-command history.
pub const COMMAND_HISTORY_FILE: &str = "command_history.json";

/// File name of the search history.
pub const SEARCH_HISTORY_FILE: &str = "search_history.json";

/// Errors reading or writing a history file.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Filesystem failure.
    #[error("history file {path}: {source}")]
    Io {
        /// History file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not a JSON entry list.
    #[error("history file {path} is corrupt: {source}")]
    Json {
        /// History file.
        path: PathBuf,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
}

/// Values that can be stored in a history.
pub trait HistoryValue: Clone + PartialEq + Serialize + DeserializeOwned + Send + 'static {
    /// Blank values are never recorded.
    fn is_blank(&self) -> bool;
}

impl HistoryValue for String {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

/// A search as the user submitted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRecord {
    /// How the pattern was typed.
    pub mode: PatternMode,
    /// Bytes searched for.
    pub pattern: Pattern,
}

impl HistoryValue for SearchRecord {
    fn is_blank(&self) -> bool {
        self.pattern.is_empty()
    }
}

/// One recorded value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry<T> {
    /// The recorded value.
    pub value: T,
    /// Nanoseconds since the Unix epoch; unique within a file.
    pub timestamp: i64,
}

/// Modification time and length of a history file when it was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: Option<SystemTime>,
    len: u64,
}

impl FileStamp {
    fn of(path: &Path) -> Option<Self> {
        let meta = fs::metadata(path).ok()?;
        Some(Self {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

/// Entries read from disk plus the stamp they were read at.
#[derive(Debug)]
pub struct Snapshot<T> {
    entries: Vec<HistoryEntry<T>>,
    stamp: Option<FileStamp>,
}

/// Read a history file. A missing file is an empty history.
///
/// # Errors
///
/// Returns [`HistoryError`] if the file exists but cannot be read or decoded.
pub fn read_history<T: HistoryValue>(path: &Path) -> Result<Snapshot<T>, HistoryError> {
    let stamp = FileStamp::of(path);
    if stamp.is_none() {
        return Ok(Snapshot {
            entries: Vec::new(),
            stamp: None,
        });
    }
    let file = File::open(path).map_err(|source| HistoryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let entries = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
        HistoryError::Json {
            path: path.to_path_buf(),
            source,
        }
    })?;
    Ok(Snapshot { entries, stamp })
}

fn write_history<T: HistoryValue>(
    path: &Path,
    entries: &[HistoryEntry<T>],
) -> Result<(), HistoryError> {
    let io_err = |source: std::io::Error| HistoryError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let mut writer = BufWriter::new(File::create(path).map_err(io_err)?);
    serde_json::to_writer(&mut writer, entries).map_err(|source| HistoryError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(io_err)
}

/// Sort by timestamp, drop entries sharing a timestamp, keep the newest `cap`.
fn sort_dedup_cap<T>(entries: &mut Vec<HistoryEntry<T>>, cap: usize) {
    entries.sort_by_key(|e| e.timestamp);
    entries.dedup_by_key(|e| e.timestamp);
    if entries.len() > cap {
        entries.drain(..entries.len() - cap);
    }
}

/// Write `entries`, merging with the file first if it changed since `loaded`.
fn save<T: HistoryValue>(
    path: &Path,
    mut entries: Vec<HistoryEntry<T>>,
    loaded: Option<FileStamp>,
) -> Result<(), HistoryError> {
    let current = FileStamp::of(path);
    if current.is_some() && current != loaded {
        debug!(path = %path.display(), "History changed on disk, merging");
        let mut merged = read_history::<T>(path)?.entries;
        merged.append(&mut entries);
        entries = merged;
        sort_dedup_cap(&mut entries, usize::MAX);
    }
    if entries.len() > MAX_HISTORY_ENTRIES {
        entries.drain(..entries.len() - MAX_HISTORY_ENTRIES);
    }
    write_history(path, &entries)
}

enum LoadState<T> {
    Loading(Receiver<Result<Snapshot<T>, HistoryError>>),
    Ready,
}

/// An in-memory history with a browse cursor, backed by an optional file.
pub struct HistoryStore<T> {
    path: Option<PathBuf>,
    entries: Vec<HistoryEntry<T>>,
    stamp: Option<FileStamp>,
    cursor: usize,
    last_timestamp: i64,
    state: LoadState<T>,
    save_lock: Arc<Mutex<()>>,
}

impl<T: HistoryValue> HistoryStore<T> {
    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Vec::new(),
            stamp: None,
            cursor: 0,
            last_timestamp: 0,
            state: LoadState::Ready,
            save_lock: Arc::default(),
        }
    }

    /// Start loading `path` on a background thread.
    pub fn spawn_load(path: PathBuf) -> Self {
        let (tx, rx) = mpsc::channel();
        let thread_path = path.clone();
        let spawned = thread::Builder::new()
            .name("history-load".to_string())
            .spawn(move || {
                let _ = tx.send(read_history::<T>(&thread_path));
            });
        let state = match spawned {
            Ok(_) => LoadState::Loading(rx),
            Err(e) => {
                warn!(error = %e, "Could not spawn history loader");
                LoadState::Ready
            }
        };
        Self {
            path: Some(path),
            entries: Vec::new(),
            stamp: None,
            cursor: 0,
            last_timestamp: 0,
            state,
            save_lock: Arc::default(),
        }
    }

    fn install(&mut self, result: Result<Snapshot<T>, HistoryError>) {
        match result {
            Ok(snapshot) => {
                debug!(entries = snapshot.entries.len(), "History loaded");
                self.entries = snapshot.entries;
                self.stamp = snapshot.stamp;
            }
            Err(e) => warn!(error = %e, "Ignoring unreadable history"),
        }
        self.last_timestamp = self.entries.last().map_or(0, |e| e.timestamp);
        self.cursor = self.entries.len();
        self.state = LoadState::Ready;
    }

    /// Pick up the background load if it has finished. Returns whether the store is ready.
    pub fn poll(&mut self) -> bool {
        let state = std::mem::replace(&mut self.state, LoadState::Ready);
        match state {
            LoadState::Ready => {}
            LoadState::Loading(rx) => match rx.try_recv() {
                Ok(result) => self.install(result),
                Err(TryRecvError::Empty) => self.state = LoadState::Loading(rx),
                Err(TryRecvError::Disconnected) => self.install(Ok(Snapshot {
                    entries: Vec::new(),
                    stamp: None,
                })),
            },
        }
        self.is_ready()
    }

    /// Block until the background load has finished.
    pub fn wait_loaded(&mut self) {
        let state = std::mem::replace(&mut self.state, LoadState::Ready);
        if let LoadState::Loading(rx) = state {
            let result = rx.recv().unwrap_or_else(|_| {
                Ok(Snapshot {
                    entries: Vec::new(),
                    stamp: None,
                })
            });
            self.install(result);
        }
    }

    /// Whether the load has completed.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, LoadState::Ready)
    }

    /// Recorded values, oldest first.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|e| &e.value)
    }

    /// Number of recorded values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record `value` and save in the background.
    ///
    /// Blank values, repeats of the newest entry, and additions before the load finished
    /// are ignored. Returns the save thread, if one was started.
    pub fn add(&mut self, value: T) -> Option<JoinHandle<()>> {
        self.poll();
        if !self.is_ready() || value.is_blank() {
            return None;
        }
        if self.entries.last().is_some_and(|e| e.value == value) {
            self.cursor = self.entries.len();
            return None;
        }

        let now = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let timestamp = now.max(self.last_timestamp + 1);
        self.last_timestamp = timestamp;
        self.entries.push(HistoryEntry { value, timestamp });
        self.cursor = self.entries.len();

        let path = self.path.clone()?;
        let entries = self.entries.clone();
        let stamp = self.stamp;
        let lock = Arc::clone(&self.save_lock);
        thread::Builder::new()
            .name("history-save".to_string())
            .spawn(move || {
                // Saves from one store run one at a time.
                let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                if let Err(e) = save(&path, entries, stamp) {
                    warn!(error = %e, "Failed to save history");
                }
            })
            .map_err(|e| warn!(error = %e, "Could not spawn history writer"))
            .ok()
    }

    /// Start browsing from the newest entry again.
    pub fn reset_cursor(&mut self) {
        self.poll();
        self.cursor = self.entries.len();
    }

    /// Step to the previous (older) entry.
    pub fn prev(&mut self) -> Option<&T> {
        if !self.is_ready() || self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor).map(|e| &e.value)
    }

    /// Step to the next (newer) entry. `None` past the newest.
    pub fn next(&mut self) -> Option<&T> {
        if !self.is_ready() || self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor).map(|e| &e.value)
    }
}

impl<T> std::fmt::Debug for HistoryStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("path", &self.path)
            .field("entries", &self.entries.len())
            .field("cursor", &self.cursor)
            .field("ready", &matches!(self.state, LoadState::Ready))
            .finish()
    }
}

/// Command history in `dir`.
pub fn command_history(dir: &Path) -> HistoryStore<String> {
    HistoryStore::spawn_load(dir.join(COMMAND_HISTORY_FILE))
}

/// Search history in `dir`.
pub fn search_history(dir: &Path) -> HistoryStore<SearchRecord> {
    HistoryStore::spawn_load(dir.join(SEARCH_HISTORY_FILE))
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
