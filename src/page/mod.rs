//! Page assembly: cutting the byte stream into rows and collapsing repeats.
//!
//! [`paginate`] reads forward from a start offset and produces at most `max_rows` rows.
//! In dump mode with dedup on, a row equal to the one before it becomes a single `*`
//! marker and the rest of the run is skipped; the skipped span is recorded in the
//! [`SkipMap`] once a differing row closes it. When a run crosses into a known hole the
//! paginator jumps to the row containing the hole's end instead of comparing zeros.
//!
//! Reads go through a chunk buffer sized for a full page and refilled at the cursor
//! whenever the next row would run past what is buffered.

use crate::model::{ByteRange, DisplayMode};
use crate::monitor::{ScanMonitor, Throttle, PROGRESS_INTERVAL};
use crate::source::ByteSource;
use crate::sparse::SparseIndex;
use std::io;
use std::time::Duration;
use tracing::debug;

pub mod skip_map;

pub use skip_map::{SkipKey, SkipMap};

/// One displayed row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    /// Bytes shown literally.
    Data {
        /// Offset of the first byte.
        offset: u64,
        /// Row contents; shorter than a full row only at end of file or in text mode.
        bytes: Vec<u8>,
    },
    /// Start of a collapsed run of rows equal to the previous one.
    Repeat {
        /// Offset of the first collapsed row.
        offset: u64,
    },
    /// The end-of-file offset, shown when the page has room after the last row.
    End {
        /// File size.
        offset: u64,
    },
}

impl Row {
    /// Offset the row is labelled with.
    pub fn offset(&self) -> u64 {
        match self {
            Row::Data { offset, .. } | Row::Repeat { offset } | Row::End { offset } => *offset,
        }
    }
}

/// Layout inputs for [`paginate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLayout {
    /// Bytes per row in dump mode.
    pub columns: u64,
    /// Row cutting mode.
    pub mode: DisplayMode,
    /// Collapse repeated rows (dump mode only).
    pub dedup: bool,
    /// Longest text-mode row, in bytes.
    pub max_text_width: usize,
}

/// A page request.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest<'a> {
    /// Offset of the first row.
    pub start: u64,
    /// Row budget, including markers and the end row.
    pub max_rows: usize,
    /// Row layout.
    pub layout: PageLayout,
    /// Hole map consulted while skipping runs.
    pub sparse: Option<&'a SparseIndex>,
    /// Minimum time between progress checks.
    pub poll_interval: Duration,
}

impl<'a> PageRequest<'a> {
    /// Request `max_rows` rows from `start` with the default poll interval.
    pub fn new(start: u64, max_rows: usize, layout: PageLayout) -> Self {
        Self {
            start,
            max_rows,
            layout,
            sparse: None,
            poll_interval: PROGRESS_INTERVAL,
        }
    }

    /// Attach a hole map.
    pub fn with_sparse(mut self, sparse: &'a SparseIndex) -> Self {
        self.sparse = Some(sparse);
        self
    }
}

/// An assembled page.
#[derive(Debug)]
pub struct Page {
    /// Rows in display order.
    pub rows: Vec<Row>,
    /// Where the next page starts.
    pub next_offset: u64,
    /// The user cancelled while a run was being skipped.
    pub interrupted: bool,
    /// A read failed; `rows` holds what was assembled before it.
    pub error: Option<io::Error>,
}

impl Page {
    fn empty(start: u64) -> Self {
        Self {
            rows: Vec::new(),
            next_offset: start,
            interrupted: false,
            error: None,
        }
    }
}

/// True for bytes that end a text-mode row.
pub fn is_line_break(byte: u8) -> bool {
    matches!(byte, b'\r' | b'\n' | 0)
}

/// Length of the text row at the front of `window`: up to and including the first run of
/// line breaks, capped at `max_width`.
pub fn text_row_len(window: &[u8], max_width: usize) -> usize {
    let limit = window.len().min(max_width.max(1));
    match memchr::memchr3(b'\n', b'\r', 0, &window[..limit]) {
        None => limit,
        Some(first) => {
            let mut end = first + 1;
            while end < limit && is_line_break(window[end]) {
                end += 1;
            }
            end
        }
    }
}

/// Page-sized read buffer positioned somewhere in the source.
struct Chunk {
    buf: Vec<u8>,
    start: u64,
    filled: usize,
}

impl Chunk {
    fn end(&self) -> u64 {
        self.start + self.filled as u64
    }

    fn load<S: ByteSource + ?Sized>(&mut self, source: &mut S, at: u64) -> io::Result<()> {
        self.start = at;
        self.filled = source.read_at(&mut self.buf, at)?.len;
        Ok(())
    }

    /// True if a `want`-byte row at `cursor` is not fully buffered but more can be read.
    fn needs_refill(&self, cursor: u64, want: usize, size: u64) -> bool {
        if cursor < self.start || cursor >= self.end() {
            return cursor < size;
        }
        cursor + want as u64 > self.end() && self.end() < size
    }

    fn window(&self, cursor: u64, want: usize) -> &[u8] {
        if cursor < self.start || cursor >= self.end() {
            return &[];
        }
        let lo = (cursor - self.start) as usize;
        let hi = (lo + want).min(self.filled);
        &self.buf[lo..hi]
    }
}

/// Assemble one page.
///
/// Never fails: a read error ends the page early and is returned in [`Page::error`], and
/// a cancellation ends it with [`Page::interrupted`] set and `next_offset` at the point
/// reached.
pub fn paginate<S, M>(
    source: &mut S,
    request: &PageRequest<'_>,
    skips: &mut SkipMap,
    monitor: &mut M,
) -> Page
where
    S: ByteSource + ?Sized,
    M: ScanMonitor + ?Sized,
{
    let size = source.size();
    let start = request.start.min(size);
    let layout = request.layout;
    let columns = layout.columns.max(1);
    let text_mode = layout.mode == DisplayMode::Text;
    let dedup = layout.dedup && !text_mode;
    let row_width = if text_mode {
        layout.max_text_width.max(1)
    } else {
        usize::try_from(columns).unwrap_or(usize::MAX)
    };

    let mut page = Page::empty(start);
    if request.max_rows == 0 {
        return page;
    }

    let chunk_len = (row_width as u64)
        .saturating_mul(request.max_rows as u64)
        .min(size - start);
    let mut chunk = Chunk {
        buf: vec![0; usize::try_from(chunk_len).unwrap_or(usize::MAX)],
        start,
        filled: 0,
    };
    if let Err(e) = chunk.load(source, start) {
        page.error = Some(e);
        return page;
    }

    let mut cursor = start;
    let mut previous: Vec<u8> = Vec::with_capacity(row_width);
    let mut run_start: Option<u64> = None;
    let mut throttle = Throttle::new(request.poll_interval);

    while page.rows.len() < request.max_rows {
        if throttle.ready() {
            monitor.progress(cursor);
            if monitor.cancelled() {
                debug!(cursor, "Page assembly interrupted");
                page.interrupted = true;
                break;
            }
        }

        let first_row = page.rows.is_empty();
        if !first_row && cursor >= size {
            break;
        }

        if text_mode && !first_row {
            match skip_line_breaks(source, &mut chunk, cursor, size) {
                Ok(next) => cursor = next,
                Err(e) => {
                    page.error = Some(e);
                    break;
                }
            }
            if cursor >= size {
                break;
            }
        }

        if chunk.needs_refill(cursor, row_width, size) {
            if let Err(e) = chunk.load(source, cursor) {
                page.error = Some(e);
                break;
            }
        }

        let window = chunk.window(cursor, row_width);
        if window.is_empty() && !first_row {
            break;
        }
        let row_len = if text_mode {
            text_row_len(window, row_width)
        } else {
            window.len()
        };
        let row = &window[..row_len];

        if dedup && !first_row && row == previous.as_slice() {
            match run_start {
                None => {
                    run_start = Some(cursor);
                    page.rows.push(Row::Repeat { offset: cursor });
                }
                Some(_) => {
                    if let Some(target) = sparse_jump(request.sparse, cursor, columns) {
                        cursor = target;
                        chunk.filled = 0;
                        continue;
                    }
                }
            }
            cursor += row_len as u64;
            continue;
        }

        if let Some(run) = run_start.take() {
            skips.insert(ByteRange::new(run, cursor));
        }
        page.rows.push(Row::Data {
            offset: cursor,
            bytes: row.to_vec(),
        });
        previous.clear();
        previous.extend_from_slice(row);
        // Only the first row of a page starting at end of file can be empty.
        if row_len == 0 {
            break;
        }
        cursor += row_len as u64;
    }

    page.next_offset = cursor.min(size);
    let closed = !page.interrupted && page.error.is_none();
    if closed && page.rows.len() < request.max_rows && start < size {
        page.rows.push(Row::End { offset: size });
    }
    page
}

/// Where to resume a run that has reached a hole: the first row, in the current row
/// phase, that contains the hole's end. `None` unless that is beyond the next row.
fn sparse_jump(sparse: Option<&SparseIndex>, cursor: u64, columns: u64) -> Option<u64> {
    let data = sparse?.find_next_data(cursor)?;
    let target = data - (data - cursor) % columns;
    (target > cursor + columns).then_some(target)
}

fn skip_line_breaks<S: ByteSource + ?Sized>(
    source: &mut S,
    chunk: &mut Chunk,
    mut cursor: u64,
    size: u64,
) -> io::Result<u64> {
    while cursor < size {
        if chunk.needs_refill(cursor, 1, size) {
            chunk.load(source, cursor)?;
        }
        match chunk.window(cursor, 1).first() {
            Some(&b) if is_line_break(b) => cursor += 1,
            _ => break,
        }
    }
    Ok(cursor)
}

#[cfg(test)]
#[path = "page_tests.rs"]
mod tests;
