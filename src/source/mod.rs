//! Byte sources for the viewed target.
//!
//! This module provides:
//! - [`ByteSource`], the random-access read interface everything else consumes
//! - [`FileSource`] for regular files and devices without alignment rules
//! - [`AlignedReader`] for raw devices that only accept sector-aligned reads
//! - [`MemorySource`] for in-memory buffers
//! - [`open_target`], which inspects a path and picks the right stack
//! - [`export`] helpers behind the `write` and `patch` commands

use crate::model::error::SourceError;
use crate::platform::{DeviceQueries, NativeDevice};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub mod aligned;
pub mod export;
pub mod file;
pub mod memory;

pub use aligned::AlignedReader;
pub use file::FileSource;
pub use memory::MemorySource;

/// Result of a positional read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadAt {
    /// Bytes placed at the front of the caller's buffer.
    pub len: usize,
    /// The requested offset was at or past the end of the source.
    pub eof: bool,
}

impl ReadAt {
    /// A read that delivered `len` bytes.
    pub fn filled(len: usize) -> Self {
        Self { len, eof: false }
    }

    /// A read that started at or past the end.
    pub fn end() -> Self {
        Self { len: 0, eof: true }
    }
}

/// Random-access byte source of known size.
///
/// `Read + Seek` give the sequential view used by forward search; [`ByteSource::read_at`]
/// is the positional view used by paging and backward search.
pub trait ByteSource: Read + Seek {
    /// Read up to `buf.len()` bytes starting at `offset`.
    ///
    /// Returns fewer bytes only when the source ends first. A read starting at or past
    /// the end returns [`ReadAt::end`].
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<ReadAt>;

    /// Total size in bytes, fixed for the session.
    fn size(&self) -> u64;

    /// The descriptor behind this source, if it reads from one.
    fn file(&self) -> Option<&File> {
        None
    }
}

/// Apply a [`SeekFrom`] to a cursor over `size` bytes.
pub(crate) fn resolve_seek(pos: SeekFrom, current: u64, size: u64) -> io::Result<u64> {
    let target = match pos {
        SeekFrom::Start(n) => Some(n),
        SeekFrom::Current(delta) => current.checked_add_signed(delta),
        SeekFrom::End(delta) => size.checked_add_signed(delta),
    };
    target.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "seek before start"))
}

/// What [`open_target`] learned about the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetInfo {
    /// Path after resolving symlinks.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// True for raw disks.
    pub is_block_device: bool,
    /// Required read alignment, `0` for none.
    pub alignment: u64,
}

/// An opened target ready for viewing.
pub struct Target {
    /// Reader stack for the target.
    pub source: Box<dyn ByteSource>,
    /// Facts about the target.
    pub info: TargetInfo,
}

impl std::fmt::Debug for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Target").field("info", &self.info).finish()
    }
}

/// Open `path` for viewing.
///
/// Resolves symlinks, sizes the target (device ioctl for raw disks, metadata otherwise)
/// and wraps it in an [`AlignedReader`] when the device demands aligned reads.
///
/// # Errors
///
/// Returns [`SourceError`] if the path is missing, unreadable, or a device that cannot
/// be sized.
pub fn open_target(path: &Path) -> Result<Target, SourceError> {
    open_target_with(path, &NativeDevice)
}

/// [`open_target`] with explicit device queries.
///
/// # Errors
///
/// See [`open_target`].
pub fn open_target_with<D: DeviceQueries>(path: &Path, device: &D) -> Result<Target, SourceError> {
    let resolved = std::fs::canonicalize(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            SourceError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            SourceError::Open {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let file = File::open(&resolved).map_err(|source| SourceError::Open {
        path: resolved.clone(),
        source,
    })?;

    let is_block_device = device.is_block_device(&resolved);
    let (size, alignment) = if is_block_device {
        let size = device
            .device_size(&file)
            .map_err(|source| SourceError::DeviceSize {
                path: resolved.clone(),
                source,
            })?;
        (size, device.device_alignment(&file))
    } else {
        let metadata = file.metadata().map_err(|source| SourceError::Io {
            path: resolved.clone(),
            source,
        })?;
        (metadata.len(), 0)
    };

    info!(
        path = %resolved.display(),
        size,
        is_block_device,
        alignment,
        "Opened target"
    );

    let file_source = FileSource::new(file, size);
    let source: Box<dyn ByteSource> = if alignment > 1 {
        debug!(alignment, "Using aligned reader");
        Box::new(AlignedReader::new(file_source, alignment))
    } else {
        Box::new(file_source)
    };

    Ok(Target {
        source,
        info: TargetInfo {
            path: resolved,
            size,
            is_block_device,
            alignment,
        },
    })
}
