//! Display layout enums shared by the paging engine, state, and view.

use serde::{Deserialize, Serialize};

/// How rows are cut from the byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Fixed-width rows of `columns` bytes.
    #[default]
    Dump,
    /// Rows broken after runs of CR, LF, or NUL, capped at the screen width.
    Text,
}

impl DisplayMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::Dump => DisplayMode::Text,
            DisplayMode::Text => DisplayMode::Dump,
        }
    }
}

/// Size of one displayed element, in bytes.
///
/// Multi-byte elements are shown little-endian, most significant byte first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ElementWidth {
    /// Single bytes.
    #[default]
    One,
    /// 16-bit words.
    Two,
    /// 32-bit words.
    Four,
    /// 64-bit words.
    Eight,
    /// 128-bit words.
    Sixteen,
}

impl ElementWidth {
    /// Width in bytes.
    pub fn bytes(self) -> u64 {
        match self {
            ElementWidth::One => 1,
            ElementWidth::Two => 2,
            ElementWidth::Four => 4,
            ElementWidth::Eight => 8,
            ElementWidth::Sixteen => 16,
        }
    }

    /// Parse a byte count; only powers of two up to 16 are valid.
    pub fn from_bytes(bytes: u64) -> Option<Self> {
        match bytes {
            1 => Some(ElementWidth::One),
            2 => Some(ElementWidth::Two),
            4 => Some(ElementWidth::Four),
            8 => Some(ElementWidth::Eight),
            16 => Some(ElementWidth::Sixteen),
            _ => None,
        }
    }
}

/// Direction of a search or a directional move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Toward higher offsets.
    Forward,
    /// Toward lower offsets.
    Backward,
}

impl Direction {
    /// The opposite direction.
    pub fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}
