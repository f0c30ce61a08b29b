//! Remembered runs of collapsed rows.
//!
//! When the paginator collapses a run of identical rows it records the hidden span here.
//! Navigation uses the spans to jump over a run in one keystroke instead of stepping
//! through it row by row. Spans are only meaningful for the layout that produced them,
//! so the map drops everything when the layout changes.

use crate::model::{ByteRange, DisplayMode};
use std::collections::BTreeSet;

/// Layout parameters that determine where row boundaries fall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SkipKey {
    /// Bytes per row.
    pub columns: u64,
    /// Element width in bytes.
    pub element_width: u64,
    /// Row cutting mode.
    pub mode: DisplayMode,
    /// Whether collapsing is on.
    pub dedup: bool,
}

/// Collapsed spans for one layout.
#[derive(Debug, Clone, Default)]
pub struct SkipMap {
    key: Option<SkipKey>,
    ranges: BTreeSet<ByteRange>,
}

impl SkipMap {
    /// An empty map bound to no layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to `key`, clearing all spans if it differs from the current layout.
    pub fn sync(&mut self, key: SkipKey) {
        if self.key != Some(key) {
            self.ranges.clear();
            self.key = Some(key);
        }
    }

    /// Drop all spans but keep the layout binding.
    pub fn clear(&mut self) {
        self.ranges.clear();
    }

    /// Record a span. Empty spans are ignored.
    pub fn insert(&mut self, range: ByteRange) {
        if !range.is_empty() {
            self.ranges.insert(range);
        }
    }

    /// The span containing `offset`, if any.
    pub fn containing(&self, offset: u64) -> Option<ByteRange> {
        self.ranges
            .range(..=ByteRange::new(offset, u64::MAX))
            .rev()
            .find(|r| r.contains(offset))
            .copied()
    }

    /// Number of spans.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// True if there are no spans.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Spans in offset order.
    pub fn iter(&self) -> impl Iterator<Item = &ByteRange> {
        self.ranges.iter()
    }
}
