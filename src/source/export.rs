//! Copying a byte range out to a file, and patching bytes in place.

use super::ByteSource;
use crate::monitor::{ScanMonitor, Throttle, PROGRESS_INTERVAL};
use std::fs::{File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::{debug, info};

/// Chunk size for [`export_range`].
pub const EXPORT_CHUNK: usize = 8 * 1024 * 1024;

/// Copy `len` bytes starting at `offset` into a new file at `dest`.
///
/// Stops early at the end of the source. Returns the number of bytes written.
/// `monitor` is polled between chunks; progress is reported as a source offset.
///
/// # Errors
///
/// Returns any error from creating `dest` or from reading or writing. A cancelled
/// export fails with [`io::ErrorKind::Interrupted`], leaving the bytes copied so far
/// in `dest`.
pub fn export_range<S: ByteSource + ?Sized, M: ScanMonitor + ?Sized>(
    source: &mut S,
    dest: &Path,
    offset: u64,
    len: u64,
    monitor: &mut M,
) -> io::Result<u64> {
    let mut out = File::create(dest)?;
    let mut chunk = vec![0u8; EXPORT_CHUNK.min(usize::try_from(len).unwrap_or(EXPORT_CHUNK))];
    let mut written = 0u64;
    let mut throttle = Throttle::new(PROGRESS_INTERVAL);

    while written < len {
        if monitor.cancelled() {
            out.flush()?;
            debug!(dest = %dest.display(), written, "Export interrupted");
            return Err(io::Error::new(
                io::ErrorKind::Interrupted,
                format!("export interrupted after {written:#x} bytes"),
            ));
        }
        if throttle.ready() {
            monitor.progress(offset + written);
        }
        let want = chunk.len().min(usize::try_from(len - written).unwrap_or(usize::MAX));
        let got = source.read_at(&mut chunk[..want], offset + written)?;
        if got.len == 0 {
            break;
        }
        out.write_all(&chunk[..got.len])?;
        written += got.len as u64;
    }
    out.flush()?;

    info!(dest = %dest.display(), offset, written, "Exported range");
    Ok(written)
}

/// Overwrite `len` bytes of the file at `path` starting at `offset`, repeating `data`.
///
/// The final repetition is truncated so exactly `len` bytes are written. Callers are
/// responsible for range and permission checks.
///
/// # Errors
///
/// Returns any error from opening the file for writing or from the writes.
pub fn patch_range(path: &Path, offset: u64, len: u64, data: &[u8]) -> io::Result<()> {
    if data.is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty patch data"));
    }
    let mut file = OpenOptions::new().write(true).open(path)?;
    file.seek(SeekFrom::Start(offset))?;

    let mut remaining = len;
    while remaining > 0 {
        let take = data.len().min(usize::try_from(remaining).unwrap_or(usize::MAX));
        file.write_all(&data[..take])?;
        remaining -= take as u64;
    }
    file.flush()?;

    info!(path = %path.display(), offset, len, "Patched range");
    Ok(())
}
