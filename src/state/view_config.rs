//! Display settings that the user changes while viewing.

use crate::config::ResolvedConfig;
use crate::model::{ColumnChange, CommandError, DisplayMode, ElementWidth};
use crate::page::{PageLayout, SkipKey};

/// Largest bytes-per-row setting; keeps a page read within a few megabytes.
pub const MAX_COLUMNS: u64 = 4096;

/// How automatic column fitting shrinks the row until it fits the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnFit {
    /// Halve from the next power of two above the screen width.
    #[default]
    PowerOfTwo,
    /// Step down one column at a time.
    Tight,
}

impl ColumnFit {
    /// The other strategy.
    pub fn toggled(self) -> Self {
        match self {
            ColumnFit::PowerOfTwo => ColumnFit::Tight,
            ColumnFit::Tight => ColumnFit::PowerOfTwo,
        }
    }
}

/// Glyphs used in the binary column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BinaryGlyphs {
    /// `0` and `1`.
    #[default]
    Digits,
    /// `_` and `X`.
    Blocks,
}

/// Byte order for the UTF-16 column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    /// Least significant byte first.
    #[default]
    Little,
    /// Most significant byte first.
    Big,
}

/// Everything about how the page is laid out and labelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewConfig {
    /// Bytes per row; `0` means fit to the screen on the next draw.
    pub columns: u64,
    /// Strategy for the next automatic fit.
    pub fit: ColumnFit,
    /// Element width for grouping and horizontal moves.
    pub element_width: ElementWidth,
    /// Dump or text rows.
    pub mode: DisplayMode,
    /// Added to offsets to form effective addresses.
    pub base: i64,
    /// Offsets are multiplied by this before adding `base`.
    pub base_mult: i64,
    /// Page-down step in bytes; `0` means one screen.
    pub page_size: u64,
    /// Collapse repeated rows.
    pub dedup: bool,
    /// Show the hex column.
    pub show_hex: bool,
    /// Show the binary column.
    pub show_binary: bool,
    /// Show the ASCII column.
    pub show_ascii: bool,
    /// Show the UTF-16 column.
    pub show_utf16: bool,
    /// Binary column glyphs.
    pub binary_glyphs: BinaryGlyphs,
    /// UTF-16 column byte order.
    pub utf16_order: ByteOrder,
    /// Alternate hex colouring.
    pub alt_color: bool,
    /// Permit `patch`.
    pub allow_write: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            columns: 0,
            fit: ColumnFit::default(),
            element_width: ElementWidth::One,
            mode: DisplayMode::Dump,
            base: 0,
            base_mult: 1,
            page_size: 0,
            dedup: true,
            show_hex: true,
            show_binary: false,
            show_ascii: true,
            show_utf16: false,
            binary_glyphs: BinaryGlyphs::default(),
            utf16_order: ByteOrder::default(),
            alt_color: false,
            allow_write: false,
        }
    }
}

impl ViewConfig {
    /// Initial settings from the resolved configuration.
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self {
            columns: config.columns.min(MAX_COLUMNS),
            page_size: config.page_size,
            dedup: config.dedup,
            show_hex: config.show_hex,
            show_binary: config.show_binary,
            show_ascii: config.show_ascii,
            allow_write: config.allow_write,
            ..Self::default()
        }
    }

    /// Element width in bytes.
    pub fn element_bytes(&self) -> u64 {
        self.element_width.bytes()
    }

    /// Layout key for the skip map.
    pub fn skip_key(&self) -> SkipKey {
        SkipKey {
            columns: self.columns,
            element_width: self.element_bytes(),
            mode: self.mode,
            dedup: self.dedup,
        }
    }

    /// Paging layout with text rows capped at `max_text_width`.
    pub fn page_layout(&self, max_text_width: usize) -> PageLayout {
        PageLayout {
            columns: self.columns.max(1),
            mode: self.mode,
            dedup: self.dedup,
            max_text_width,
        }
    }

    /// `base + offset * base_mult`, wrapping.
    pub fn effective_address(&self, offset: u64) -> i64 {
        self.base
            .wrapping_add((offset as i64).wrapping_mul(self.base_mult))
    }

    /// Inverse of [`ViewConfig::effective_address`], checked against `file_size`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::OffsetOutOfRange`] when the offset falls outside
    /// `0..=file_size` or the division by `base_mult` overflows.
    pub fn offset_for_address(&self, address: i64, file_size: u64) -> Result<u64, CommandError> {
        let mult = if self.base_mult == 0 { 1 } else { self.base_mult };
        let offset = address
            .wrapping_sub(self.base)
            .checked_div(mult)
            .ok_or(CommandError::OffsetOutOfRange(address))?;
        match u64::try_from(offset) {
            Ok(off) if off <= file_size => Ok(off),
            _ => Err(CommandError::OffsetOutOfRange(offset)),
        }
    }

    /// Apply a column adjustment.
    ///
    /// `Fit` alternates the fitting strategy and requests a refit on the next draw.
    pub fn change_columns(&mut self, change: ColumnChange) {
        let step = self.element_bytes();
        match change {
            ColumnChange::Shrink => {
                if self.columns > step {
                    self.columns -= step;
                }
            }
            ColumnChange::Grow => self.columns = (self.columns + step).min(MAX_COLUMNS),
            ColumnChange::Halve => {
                if self.columns > 1 {
                    self.columns /= 2;
                }
            }
            ColumnChange::Double => self.columns = self.columns.saturating_mul(2).min(MAX_COLUMNS),
            ColumnChange::Fit => {
                self.fit = self.fit.toggled();
                self.columns = 0;
            }
        }
    }
}
