//! Pattern search over the viewed source.
//!
//! Forward search streams through a buffered reader in 2 MiB chunks, carrying the last
//! `len - 1` bytes of each chunk into the next so matches spanning a boundary are found.
//! Backward search reads 2 MiB windows positionally, walking toward offset 0. Both skip
//! known holes without reading them and check for cancellation before every chunk.

use crate::model::Pattern;
use crate::monitor::{ScanMonitor, Throttle, PROGRESS_INTERVAL};
use crate::source::ByteSource;
use crate::sparse::SparseIndex;
use memchr::memmem;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use tracing::debug;

/// Bytes scanned per step.
pub const SEARCH_CHUNK: usize = 2 * 1024 * 1024;

/// Capacity of the reader wrapped around the source during forward search.
const READER_CAPACITY: usize = 64 * 1024;

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// First byte of the match.
    Found(u64),
    /// Reached the end (or start) of the source without a match.
    NotFound,
    /// The monitor reported a cancellation.
    Interrupted,
}

/// Find the first match starting strictly after `from`.
///
/// # Errors
///
/// Returns the first read or seek error.
pub fn search_forward<S, M>(
    source: &mut S,
    sparse: &SparseIndex,
    pattern: &Pattern,
    from: u64,
    monitor: &mut M,
) -> io::Result<SearchOutcome>
where
    S: ByteSource + ?Sized,
    M: ScanMonitor + ?Sized,
{
    let size = source.size();
    let needle = pattern.as_bytes();
    let carry = needle.len() - 1;
    let mut pos = from.saturating_add(1);
    if pos >= size {
        return Ok(SearchOutcome::NotFound);
    }

    let mut reader = BufReader::with_capacity(READER_CAPACITY, &mut *source);
    reader.seek(SeekFrom::Start(pos))?;
    let mut chunk = vec![0u8; SEARCH_CHUNK];
    let mut window: Vec<u8> = Vec::with_capacity(SEARCH_CHUNK + carry);
    let mut throttle = Throttle::new(PROGRESS_INTERVAL);

    while pos < size {
        if monitor.cancelled() {
            debug!(pos, "Forward search interrupted");
            return Ok(SearchOutcome::Interrupted);
        }
        if let Some(data) = sparse.find_next_data(pos) {
            debug!(from = pos, to = data, "Forward search skipping hole");
            pos = data;
            window.clear();
            if pos >= size {
                break;
            }
            reader.seek(SeekFrom::Start(pos))?;
        }
        if throttle.ready() {
            monitor.progress(pos);
        }

        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        let window_start = pos - window.len() as u64;
        window.extend_from_slice(&chunk[..n]);
        if let Some(at) = memmem::find(&window, needle) {
            return Ok(SearchOutcome::Found(window_start + at as u64));
        }
        let keep = carry.min(window.len());
        window.drain(..window.len() - keep);
        pos += n as u64;
    }
    Ok(SearchOutcome::NotFound)
}

/// Find the last match starting strictly before `from`.
///
/// # Errors
///
/// Returns the first read error, or `UnexpectedEof` if the source is shorter than its
/// reported size.
pub fn search_backward<S, M>(
    source: &mut S,
    sparse: &SparseIndex,
    pattern: &Pattern,
    from: u64,
    monitor: &mut M,
) -> io::Result<SearchOutcome>
where
    S: ByteSource + ?Sized,
    M: ScanMonitor + ?Sized,
{
    let size = source.size();
    let needle = pattern.as_bytes();
    // A match starting at `from - 1` ends at `from + len - 1`.
    let mut end = from.saturating_add(needle.len() as u64 - 1).min(size);
    let mut chunk = vec![0u8; SEARCH_CHUNK];
    let mut window: Vec<u8> = Vec::with_capacity(SEARCH_CHUNK + needle.len());
    let mut throttle = Throttle::new(PROGRESS_INTERVAL);

    while end > 0 {
        if monitor.cancelled() {
            debug!(end, "Backward search interrupted");
            return Ok(SearchOutcome::Interrupted);
        }
        if let Some(hole_start) = sparse.find_prev_data(end) {
            debug!(from = end, to = hole_start, "Backward search skipping hole");
            end = hole_start;
            window.clear();
            continue;
        }
        if throttle.ready() {
            monitor.progress(end);
        }

        let start = end.saturating_sub(SEARCH_CHUNK as u64);
        let len = (end - start) as usize;
        let got = source.read_at(&mut chunk[..len], start)?.len;
        if got < len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("short read at {start:#x}"),
            ));
        }
        window.splice(0..0, chunk[..len].iter().copied());
        if let Some(at) = memmem::rfind(&window, needle) {
            return Ok(SearchOutcome::Found(start + at as u64));
        }
        window.truncate(needle.len() - 1);
        end = start;
    }
    Ok(SearchOutcome::NotFound)
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;
