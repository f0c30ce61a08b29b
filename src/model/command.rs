//! User intents independent of key bindings.
//!
//! The mapping from `crossterm::event::KeyEvent` to [`Command`] lives in
//! [`crate::config::keybindings::KeyBindings`]; the state layer only ever sees commands.

use crate::model::display::{Direction, ElementWidth};

/// Single-step cursor motions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Motion {
    /// One element toward lower offsets.
    Left,
    /// One element toward higher offsets.
    Right,
    /// One byte toward lower offsets.
    FineLeft,
    /// One byte toward higher offsets.
    FineRight,
    /// One row up.
    Up,
    /// One row down.
    Down,
}

/// Page-sized and absolute jumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageMotion {
    /// Next page, or `page_size` bytes forward when set.
    Down,
    /// Undo the last page-down if that was the last move, else a page back.
    Up,
    /// Offset 0.
    Home,
    /// Last full page of the file.
    End,
    /// Pop the last breadcrumb.
    Back,
}

/// Display toggles that do not change the byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Toggle {
    /// Switch between dump and text rows.
    DisplayMode,
    /// Hex column on/off.
    Hex,
    /// Binary column on/off.
    Binary,
    /// Binary glyphs `01` vs `_X`.
    BinaryGlyphs,
    /// ASCII column on/off.
    Ascii,
    /// UTF-16 column on/off.
    Utf16,
    /// UTF-16 byte order.
    Utf16Order,
    /// Alternate hex colouring.
    AltColor,
    /// Collapse repeated rows.
    Dedup,
}

/// Column count adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnChange {
    /// One element fewer.
    Shrink,
    /// One element more.
    Grow,
    /// Half as many columns.
    Halve,
    /// Twice as many columns.
    Double,
    /// Refit to the screen, alternating power-of-two and tight fits.
    Fit,
}

/// Prompts that collect a line of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptRequest {
    /// Offset expression or percentage.
    Goto,
    /// Column count.
    Columns,
    /// Page-down step.
    PageSize,
    /// Colon command line.
    Command,
    /// Colon command line pre-filled with a `write` export.
    Export,
    /// Search pattern, then search in the given direction.
    Search(Direction),
}

/// A user intent produced by a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Single-step move.
    Move(Motion),
    /// Page or absolute move.
    PageMove(PageMotion),
    /// Display toggle.
    Toggle(Toggle),
    /// Column count change.
    Columns(ColumnChange),
    /// Element width change.
    SetElementWidth(ElementWidth),
    /// Store the current offset in bookmark slot `0..=9`.
    SetBookmark(usize),
    /// Jump to bookmark slot `0..=9`.
    GotoBookmark(usize),
    /// Open a prompt.
    Prompt(PromptRequest),
    /// Repeat the last search.
    SearchAgain(Direction),
    /// Leave the pager.
    Quit,
}
