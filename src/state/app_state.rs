//! Application state.
//!
//! [`AppState`] is the single state structure owned by the event loop. Commands mutate it
//! through the handlers in this module's siblings; the view reads it to draw a page.
//!
//! # State
//!
//! - **View**: columns, element width, display mode, visible columns, address translation
//! - **Navigation**: current offset, breadcrumbs, bookmarks
//! - **Skips**: collapsed runs recorded by the last pages drawn with the current layout
//! - **Prompt**: the open line-input prompt, if any
//! - **Search**: last pattern and the mode it was typed in
//! - **Status**: the last message or error, shown until the next key press

use crate::model::{Pattern, PatternMode};
use crate::page::SkipMap;
use crate::state::navigation::{Navigator, Snap};
use crate::state::prompt::Prompt;
use crate::state::view_config::ViewConfig;
use std::fmt::Display;

/// Minimum number of hex digits in the offset column.
pub const MIN_OFFSET_WIDTH: usize = 8;

/// The status line's message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    /// Informational text.
    Info(String),
    /// An error, drawn in red.
    Error(String),
}

/// Application state. Pure data, no I/O.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Layout and labelling.
    pub view: ViewConfig,

    /// Offset, breadcrumbs, bookmarks.
    pub nav: Navigator,

    /// Collapsed runs valid for `view`'s current layout.
    pub skips: SkipMap,

    /// Offset following the last row drawn; where page-down goes when `page_size` is 0.
    pub next_offset: u64,

    /// Rows available for data on screen.
    pub page_rows: u64,

    /// Open prompt, if any.
    pub prompt: Option<Prompt>,

    /// Pattern of the last search.
    pub search_pattern: Option<Pattern>,

    /// Mode the next search prompt opens in.
    pub search_mode: PatternMode,

    /// Path of the target as shown on the status line.
    pub file_name: String,

    status: Option<StatusMessage>,
    bell: bool,
}

impl AppState {
    /// State for a target of `file_size` bytes, starting at `offset`.
    pub fn new(
        file_name: impl Into<String>,
        file_size: u64,
        offset: u64,
        view: ViewConfig,
    ) -> Self {
        Self {
            view,
            nav: Navigator::new(file_size, offset),
            skips: SkipMap::new(),
            next_offset: offset.min(file_size),
            page_rows: 1,
            prompt: None,
            search_pattern: None,
            search_mode: PatternMode::default(),
            file_name: file_name.into(),
            status: None,
            bell: false,
        }
    }

    /// Size of the target.
    pub fn file_size(&self) -> u64 {
        self.nav.file_size()
    }

    /// Current offset.
    pub fn offset(&self) -> u64 {
        self.nav.offset()
    }

    /// Effective address of the current offset.
    pub fn here(&self) -> i64 {
        self.view.effective_address(self.nav.offset())
    }

    /// Hex digits used for offsets: enough for the file size, at least eight.
    pub fn offset_width(&self) -> usize {
        let digits = format!("{:X}", self.file_size()).len();
        digits.max(MIN_OFFSET_WIDTH)
    }

    /// Drop recorded skips if the layout changed since they were recorded.
    pub fn sync_skips(&mut self) {
        self.skips.sync(self.view.skip_key());
    }

    /// Run a move on the navigator with skip snapping when dedup is on.
    pub fn navigate<R>(&mut self, motion: impl FnOnce(&mut Navigator, Option<Snap<'_>>) -> R) -> R {
        let snap = self.view.dedup.then_some(Snap {
            skips: &self.skips,
            columns: self.view.columns.max(1),
        });
        motion(&mut self.nav, snap)
    }

    /// Current status line message.
    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Show an informational message.
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.status = Some(StatusMessage::Info(message.into()));
    }

    /// Show an error and ring the bell.
    pub fn set_error(&mut self, error: impl Display) {
        self.status = Some(StatusMessage::Error(error.to_string()));
        self.bell = true;
    }

    /// Clear the status line.
    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// Request a bell on the next draw.
    pub fn ring(&mut self) {
        self.bell = true;
    }

    /// Take the pending bell request.
    pub fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.bell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ByteRange, CommandError};

    #[test]
    fn offset_width_grows_with_file_size() {
        let small = AppState::new("a", 0x100, 0, ViewConfig::default());
        let large = AppState::new("b", 0x12_3456_7890, 0, ViewConfig::default());

        assert_eq!(small.offset_width(), 8);
        assert_eq!(large.offset_width(), 10);
    }

    #[test]
    fn start_offset_is_clamped() {
        let state = AppState::new("a", 100, 500, ViewConfig::default());
        assert_eq!(state.offset(), 100);
    }

    #[test]
    fn errors_ring_the_bell_once() {
        let mut state = AppState::new("a", 100, 0, ViewConfig::default());

        state.set_error(CommandError::WriteDisabled);

        assert!(matches!(state.status(), Some(StatusMessage::Error(_))));
        assert!(state.take_bell());
        assert!(!state.take_bell());
    }

    #[test]
    fn layout_change_clears_skips() {
        let mut view = ViewConfig::default();
        view.columns = 16;
        let mut state = AppState::new("a", 10_000, 0, view);
        state.sync_skips();
        state.skips.insert(ByteRange::new(16, 256));

        state.view.columns = 32;
        state.sync_skips();

        assert!(state.skips.is_empty());
    }

    #[test]
    fn snapping_only_with_dedup() {
        let mut state = AppState::new("a", 100, 0, ViewConfig::default());
        assert!(state.navigate(|_, snap| snap.is_some()));

        state.view.dedup = false;
        assert!(state.navigate(|_, snap| snap.is_none()));
    }
}
