//! Current offset, breadcrumbs, and bookmarks.
//!
//! Every move pushes the offset it left onto the breadcrumb stack, tagged with the kind of
//! move, so `Back` can retrace any path and `PageUp` can exactly undo a `PageDown`.
//! Directional moves with dedup on snap past collapsed runs recorded in the skip map.

use crate::model::{CommandError, Direction};
use crate::page::SkipMap;

/// Number of bookmark slots (`0..=9`).
pub const BOOKMARK_SLOTS: usize = 10;

/// The kind of move that produced a breadcrumb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveTag {
    /// Element or byte left/right.
    Horizontal,
    /// Row up/down.
    Vertical,
    /// Page down.
    PageDown,
    /// Page up.
    PageUp,
    /// Home.
    Home,
    /// End.
    End,
    /// Goto prompt or command.
    Goto,
    /// Bookmark jump.
    Bookmark,
    /// Search hit.
    Search,
}

/// A previous position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breadcrumb {
    /// Offset before the move.
    pub offset: u64,
    /// What moved away from it.
    pub tag: MoveTag,
}

/// Skip-map snapping applied after directional moves.
#[derive(Debug, Clone, Copy)]
pub struct Snap<'a> {
    /// Collapsed runs for the current layout.
    pub skips: &'a SkipMap,
    /// Bytes per row.
    pub columns: u64,
}

/// Offset plus history for one viewed target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    offset: u64,
    file_size: u64,
    breadcrumbs: Vec<Breadcrumb>,
    bookmarks: [u64; BOOKMARK_SLOTS],
}

impl Navigator {
    /// Start at `offset` (clamped to the file).
    pub fn new(file_size: u64, offset: u64) -> Self {
        Self {
            offset: offset.min(file_size),
            file_size,
            breadcrumbs: Vec::new(),
            bookmarks: [0; BOOKMARK_SLOTS],
        }
    }

    /// Current offset.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Size of the viewed target.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Breadcrumbs, oldest first.
    pub fn breadcrumbs(&self) -> &[Breadcrumb] {
        &self.breadcrumbs
    }

    fn push(&mut self, tag: MoveTag) {
        self.breadcrumbs.push(Breadcrumb {
            offset: self.offset,
            tag,
        });
    }

    fn snap_and_clamp(&mut self, direction: Direction, snap: Option<Snap<'_>>) {
        if let Some(snap) = snap {
            if let Some(run) = snap.skips.containing(self.offset) {
                self.offset = match direction {
                    Direction::Forward => run.end,
                    Direction::Backward => run.start.saturating_sub(snap.columns),
                };
            }
        }
        self.offset = self.offset.min(self.file_size);
    }

    /// Move by `delta` bytes, clamping at both ends.
    pub fn step(&mut self, delta: i64, tag: MoveTag, snap: Option<Snap<'_>>) {
        self.push(tag);
        let direction = if delta < 0 {
            Direction::Backward
        } else {
            Direction::Forward
        };
        self.offset = if delta < 0 {
            self.offset.saturating_sub(delta.unsigned_abs())
        } else {
            self.offset.saturating_add(delta.unsigned_abs())
        };
        self.snap_and_clamp(direction, snap);
    }

    /// Page forward: by `page_size` bytes when set, else to where the last page ended.
    pub fn page_down(&mut self, page_size: u64, next_offset: u64, snap: Option<Snap<'_>>) {
        self.push(MoveTag::PageDown);
        self.offset = if page_size == 0 {
            next_offset
        } else {
            self.offset.saturating_add(page_size)
        };
        self.snap_and_clamp(Direction::Forward, snap);
    }

    /// Page back.
    ///
    /// If the last move was a page-down, restores the offset it left exactly. Otherwise
    /// moves back `page_size` bytes, or `rows * columns` when `page_size` is zero.
    pub fn page_up(&mut self, page_size: u64, rows: u64, columns: u64, snap: Option<Snap<'_>>) {
        if let Some(&Breadcrumb {
            offset,
            tag: MoveTag::PageDown,
        }) = self.breadcrumbs.last()
        {
            self.breadcrumbs.pop();
            self.offset = offset;
            return;
        }

        self.push(MoveTag::PageUp);
        let step = if page_size == 0 {
            rows.saturating_mul(columns)
        } else {
            page_size
        };
        self.offset = self.offset.saturating_sub(step);
        self.snap_and_clamp(Direction::Backward, snap);
    }

    /// Jump to offset 0.
    pub fn home(&mut self) {
        self.push(MoveTag::Home);
        self.offset = 0;
    }

    /// Jump to the start of the last page.
    pub fn end(&mut self, rows: u64, columns: u64) {
        self.push(MoveTag::End);
        self.offset = last_page_offset(self.file_size, self.offset, rows, columns);
    }

    /// Jump to an absolute offset.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::OffsetOutOfRange`] for offsets past the end; the current
    /// offset is left unchanged.
    pub fn jump(&mut self, offset: u64, tag: MoveTag) -> Result<(), CommandError> {
        if offset > self.file_size {
            return Err(CommandError::OffsetOutOfRange(
                i64::try_from(offset).unwrap_or(i64::MAX),
            ));
        }
        self.push(tag);
        self.offset = offset;
        Ok(())
    }

    /// Return to the most recent breadcrumb. False if there is none.
    pub fn back(&mut self) -> bool {
        match self.breadcrumbs.pop() {
            Some(crumb) => {
                self.offset = crumb.offset.min(self.file_size);
                true
            }
            None => false,
        }
    }

    /// Store the current offset in `slot`. Out-of-range slots are ignored.
    pub fn set_bookmark(&mut self, slot: usize) {
        if let Some(mark) = self.bookmarks.get_mut(slot) {
            *mark = self.offset;
        }
    }

    /// The offset stored in `slot`.
    pub fn bookmark(&self, slot: usize) -> Option<u64> {
        self.bookmarks.get(slot).copied()
    }

    /// Jump to the offset stored in `slot`.
    pub fn goto_bookmark(&mut self, slot: usize) -> bool {
        match self.bookmark(slot) {
            Some(offset) => self.jump(offset, MoveTag::Bookmark).is_ok(),
            None => false,
        }
    }
}

/// Start of the last full page, keeping the current row phase.
///
/// `max(0, size - size % columns - (rows - 1) * columns + offset % columns)`
pub fn last_page_offset(file_size: u64, offset: u64, rows: u64, columns: u64) -> u64 {
    let columns = i128::from(columns.max(1));
    let size = i128::from(file_size);
    let rows = i128::from(rows.saturating_sub(1));
    let start = size - size % columns - rows * columns + i128::from(offset) % columns;
    u64::try_from(start.max(0)).unwrap_or(0).min(file_size)
}

/// Offset for `percent` of the file, keeping the phase of `offset` within an element.
pub fn percent_offset(file_size: u64, percent: u64, offset: u64, element_width: u64) -> u64 {
    let target = (u128::from(file_size) * u128::from(percent.min(100)) / 100) as u64;
    if element_width > 1 {
        (target - target % element_width + offset % element_width).min(file_size)
    } else {
        target
    }
}

#[cfg(test)]
#[path = "navigation_tests.rs"]
mod tests;
