//! Half-open byte ranges.

use std::fmt;

/// A half-open interval `[start, end)` of byte offsets.
///
/// Used both for sparse holes and for deduplicated row runs. Ordering is by `start`
/// first, which keeps ranges in a `BTreeSet` sorted by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteRange {
    /// First offset inside the range.
    pub start: u64,
    /// First offset past the range.
    pub end: u64,
}

impl ByteRange {
    /// Create a range. `start` must not exceed `end`.
    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(start <= end, "range start {start} past end {end}");
        Self { start, end }
    }

    /// Number of bytes covered.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// True if the range covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True if `offset` lies in `[start, end)`.
    pub fn contains(&self, offset: u64) -> bool {
        self.start <= offset && offset < self.end
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}..{:#x}", self.start, self.end)
    }
}
