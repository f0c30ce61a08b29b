//! Search patterns and their hex text form.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use thiserror::Error;

/// Errors from building a [`Pattern`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// Nothing left after stripping whitespace and prefix.
    #[error("empty pattern")]
    Empty,

    /// A character that is not a hex digit.
    #[error("invalid hex pattern {text:?}: {reason}")]
    InvalidHex {
        /// Input as typed.
        text: String,
        /// Decoder message.
        reason: String,
    },
}

/// How the user typed a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternMode {
    /// Hex digits, e.g. `de ad be ef`.
    #[default]
    Hex,
    /// Literal text, matched as its UTF-8 bytes.
    Text,
}

impl PatternMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            PatternMode::Hex => PatternMode::Text,
            PatternMode::Text => PatternMode::Hex,
        }
    }
}

/// A non-empty byte sequence to search for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Pattern(Vec<u8>);

impl Pattern {
    /// Wrap raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Empty`] for an empty slice.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, PatternError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(PatternError::Empty);
        }
        Ok(Self(bytes))
    }

    /// Parse hex text. See [`from_hex`].
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] for empty input or bad digits.
    pub fn from_hex(text: &str) -> Result<Self, PatternError> {
        Self::new(from_hex(text)?)
    }

    /// Parse user input in the given mode.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] for empty input or bad hex digits.
    pub fn parse(text: &str, mode: PatternMode) -> Result<Self, PatternError> {
        match mode {
            PatternMode::Hex => Self::from_hex(text),
            PatternMode::Text => Self::new(text.as_bytes()),
        }
    }

    /// Render for editing in the given mode.
    pub fn display(&self, mode: PatternMode) -> String {
        match mode {
            PatternMode::Hex => to_hex(&self.0, self.0.len(), 1),
            PatternMode::Text => String::from_utf8_lossy(&self.0).into_owned(),
        }
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Pattern length in bytes (never zero).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<u8>> for Pattern {
    type Error = PatternError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        Self::new(bytes)
    }
}

impl From<Pattern> for Vec<u8> {
    fn from(pattern: Pattern) -> Self {
        pattern.0
    }
}

/// Decode hex text into bytes.
///
/// Whitespace anywhere is ignored, a leading `0x` is dropped, and an odd digit count is
/// padded with a leading zero so `"abc"` decodes as `0a bc`.
///
/// # Errors
///
/// Returns [`PatternError::Empty`] when no digits remain and
/// [`PatternError::InvalidHex`] for non-hex characters.
pub fn from_hex(text: &str) -> Result<Vec<u8>, PatternError> {
    let mut digits: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.starts_with("0x") || digits.starts_with("0X") {
        digits.drain(..2);
    }
    if digits.is_empty() {
        return Err(PatternError::Empty);
    }
    if digits.len() % 2 == 1 {
        digits.insert(0, '0');
    }
    hex::decode(&digits).map_err(|e| PatternError::InvalidHex {
        text: text.to_string(),
        reason: e.to_string(),
    })
}

/// Render `bytes` as hex grouped into `width`-byte elements over `columns` byte slots.
///
/// Complete elements print most significant byte first (little-endian reading). A partial
/// trailing element prints in memory order, and slots past the end of `bytes` are padded
/// with spaces so rows line up. Single-byte groups get an extra gap every eight bytes.
pub fn to_hex(bytes: &[u8], columns: usize, width: usize) -> String {
    let width = width.max(1);
    let mut out = String::with_capacity(columns * 3);
    let mut group = 0;
    while group < columns {
        if width == 1 && group > 0 && group % 8 == 0 {
            out.push(' ');
        }
        if group + width <= bytes.len() {
            for byte in bytes[group..group + width].iter().rev() {
                let _ = write!(out, "{byte:02x}");
            }
        } else {
            for slot in group..group + width {
                match bytes.get(slot) {
                    Some(byte) => {
                        let _ = write!(out, "{byte:02x}");
                    }
                    None => out.push_str("  "),
                }
            }
        }
        out.push(' ');
        group += width;
    }
    out.pop();
    out
}
