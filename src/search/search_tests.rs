//! Tests for forward and backward search.

use super::*;
use crate::model::ByteRange;
use crate::monitor::Unmonitored;
use crate::source::memory::BadSectorSource;
use crate::source::{MemorySource, ReadAt};

fn pattern(bytes: &[u8]) -> Pattern {
    Pattern::new(bytes.to_vec()).unwrap()
}

fn no_holes() -> SparseIndex {
    SparseIndex::new()
}

/// Records the span of every read that returned data.
struct RecordingSource {
    inner: MemorySource,
    position: u64,
    reads: Vec<ByteRange>,
}

impl RecordingSource {
    fn new(bytes: Vec<u8>) -> Self {
        Self {
            inner: MemorySource::new(bytes),
            position: 0,
            reads: Vec::new(),
        }
    }
}

impl Read for RecordingSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let got = self.read_at(buf, self.position)?;
        self.position += got.len as u64;
        Ok(got.len)
    }
}

impl Seek for RecordingSource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.position = self.inner.seek(pos)?;
        Ok(self.position)
    }
}

impl ByteSource for RecordingSource {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<ReadAt> {
        let got = self.inner.read_at(buf, offset)?;
        if got.len > 0 {
            self.reads.push(ByteRange::new(offset, offset + got.len as u64));
        }
        Ok(got)
    }

    fn size(&self) -> u64 {
        self.inner.size()
    }
}

/// Monitor that cancels on the first check.
struct Cancel;

impl ScanMonitor for Cancel {
    fn cancelled(&mut self) -> bool {
        true
    }
}

#[test]
fn forward_finds_first_match_after_start() {
    let mut source = MemorySource::new(b"xxabcxxabcxx".to_vec());

    let found = search_forward(&mut source, &no_holes(), &pattern(b"abc"), 0, &mut Unmonitored);

    assert_eq!(found.unwrap(), SearchOutcome::Found(2));
}

#[test]
fn forward_skips_match_at_start_offset() {
    let mut source = MemorySource::new(b"xxabcxxabcxx".to_vec());

    let found = search_forward(&mut source, &no_holes(), &pattern(b"abc"), 2, &mut Unmonitored);

    assert_eq!(found.unwrap(), SearchOutcome::Found(7));
}

#[test]
fn forward_reports_not_found() {
    let mut source = MemorySource::new(b"nothing here".to_vec());

    let found = search_forward(&mut source, &no_holes(), &pattern(b"zz"), 0, &mut Unmonitored);

    assert_eq!(found.unwrap(), SearchOutcome::NotFound);
}

#[test]
fn forward_finds_match_spanning_chunk_boundary() {
    let mut bytes = vec![0u8; SEARCH_CHUNK * 2];
    let at = SEARCH_CHUNK - 2;
    bytes[at..at + 4].copy_from_slice(b"WXYZ");
    let mut source = MemorySource::new(bytes);

    let found = search_forward(&mut source, &no_holes(), &pattern(b"WXYZ"), 0, &mut Unmonitored);

    assert_eq!(found.unwrap(), SearchOutcome::Found(at as u64));
}

#[test]
fn backward_finds_last_match_before_start() {
    let mut source = MemorySource::new(b"xxabcxxabcxx".to_vec());

    let found = search_backward(&mut source, &no_holes(), &pattern(b"abc"), 7, &mut Unmonitored);

    assert_eq!(found.unwrap(), SearchOutcome::Found(2));
}

#[test]
fn backward_from_just_past_match_finds_it() {
    let mut source = MemorySource::new(b"xxabcxxabcxx".to_vec());

    let found = search_backward(&mut source, &no_holes(), &pattern(b"abc"), 8, &mut Unmonitored);

    assert_eq!(found.unwrap(), SearchOutcome::Found(7));
}

#[test]
fn backward_from_zero_finds_nothing() {
    let mut source = MemorySource::new(b"abc".to_vec());

    let found = search_backward(&mut source, &no_holes(), &pattern(b"abc"), 0, &mut Unmonitored);

    assert_eq!(found.unwrap(), SearchOutcome::NotFound);
}

#[test]
fn backward_finds_match_spanning_chunk_boundary() {
    let len = SEARCH_CHUNK * 2 + 100;
    let mut bytes = vec![0u8; len];
    // The first backward window covers [len - SEARCH_CHUNK, len).
    let at = len - SEARCH_CHUNK - 2;
    bytes[at..at + 4].copy_from_slice(b"WXYZ");
    let mut source = MemorySource::new(bytes);

    let found = search_backward(
        &mut source,
        &no_holes(),
        &pattern(b"WXYZ"),
        len as u64,
        &mut Unmonitored,
    );

    assert_eq!(found.unwrap(), SearchOutcome::Found(at as u64));
}

#[test]
fn forward_never_reads_inside_a_hole() {
    let hole = ByteRange::new(4 * 1024 * 1024, 12 * 1024 * 1024);
    let mut bytes = vec![0u8; 14 * 1024 * 1024];
    let target = 13 * 1024 * 1024;
    bytes[target..target + 3].copy_from_slice(b"END");
    let sparse = SparseIndex::from_holes(vec![hole]);
    let mut source = RecordingSource::new(bytes);

    let found = search_forward(&mut source, &sparse, &pattern(b"END"), 0, &mut Unmonitored);

    assert_eq!(found.unwrap(), SearchOutcome::Found(target as u64));
    for read in &source.reads {
        assert!(
            !(read.start >= hole.start && read.end <= hole.end),
            "read {read} lies entirely inside hole {hole}"
        );
    }
}

#[test]
fn backward_never_reads_inside_a_hole() {
    let hole = ByteRange::new(4 * 1024 * 1024, 12 * 1024 * 1024);
    let mut bytes = vec![0u8; 14 * 1024 * 1024];
    bytes[100..103].copy_from_slice(b"TOP");
    let sparse = SparseIndex::from_holes(vec![hole]);
    let mut source = RecordingSource::new(bytes);

    let found = search_backward(
        &mut source,
        &sparse,
        &pattern(b"TOP"),
        14 * 1024 * 1024,
        &mut Unmonitored,
    );

    assert_eq!(found.unwrap(), SearchOutcome::Found(100));
    for read in &source.reads {
        assert!(
            !(read.start >= hole.start && read.end <= hole.end),
            "read {read} lies entirely inside hole {hole}"
        );
    }
}

#[test]
fn cancellation_stops_both_directions() {
    let mut source = MemorySource::new(vec![0u8; 1024]);

    let forward = search_forward(&mut source, &no_holes(), &pattern(b"x"), 0, &mut Cancel);
    let backward = search_backward(&mut source, &no_holes(), &pattern(b"x"), 1000, &mut Cancel);

    assert_eq!(forward.unwrap(), SearchOutcome::Interrupted);
    assert_eq!(backward.unwrap(), SearchOutcome::Interrupted);
}

#[test]
fn forward_read_error_is_returned() {
    let mut bytes = vec![0u8; 4096];
    bytes[3000..3003].copy_from_slice(b"abc");
    let mut source = BadSectorSource::new(bytes, 2048);

    let result = search_forward(&mut source, &no_holes(), &pattern(b"abc"), 0, &mut Unmonitored);

    let err = result.unwrap_err();
    assert_eq!(err.to_string(), "bad sector");
}

#[test]
fn backward_read_error_is_returned() {
    let mut source = BadSectorSource::new(vec![0u8; 4096], 2048);

    let result =
        search_backward(&mut source, &no_holes(), &pattern(b"abc"), 4000, &mut Unmonitored);

    assert_eq!(result.unwrap_err().to_string(), "bad sector");
}

#[test]
fn backward_search_below_a_bad_region_still_succeeds() {
    // GIVEN a match well before the failing region
    let mut bytes = vec![0u8; 4096];
    bytes[100..103].copy_from_slice(b"abc");
    let mut source = BadSectorSource::new(bytes, 2048);

    // WHEN searching backward from below that region
    let outcome =
        search_backward(&mut source, &no_holes(), &pattern(b"abc"), 1000, &mut Unmonitored);

    // THEN only good bytes are read and the match is found
    assert_eq!(outcome.unwrap(), SearchOutcome::Found(100));
}
