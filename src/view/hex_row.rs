//! Drawing a page row.
//!
//! A dump row is laid out left to right as
//!
//! ```text
//! OFFSET: [binary] [hex] [utf-16] [ascii]
//! ```
//!
//! with each visible column followed by one blank cell. When the row is narrower than the
//! screen and hex or binary is shown, the ASCII column is pinned to the right edge (and a
//! UTF-16 column shown without ASCII is pinned to the right half of that space).
//!
//! Text rows show the offset and the row's glyphs only.

use crate::model::DisplayMode;
use crate::page::Row;
use crate::state::view_config::{BinaryGlyphs, ByteOrder, ColumnFit, ViewConfig};
use crate::view::styles::HexStyles;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthChar;

/// Stand-in for characters that cannot be shown in one or two cells.
pub const REPLACEMENT: char = '·';

const fn glyph_or_dot(code: u32) -> char {
    match char::from_u32(code) {
        Some(c) => c,
        None => REPLACEMENT,
    }
}

const fn build_glyphs() -> [char; 256] {
    let mut table = [' '; 256];
    let mut b = 0;
    while b < 256 {
        table[b] = match b {
            0x00 => ' ',
            0x01..=0x09 => glyph_or_dot(0x2080 + b as u32),
            0x0a => 'ₐ',
            0x0b..=0x1f => REPLACEMENT,
            0x20..=0x7e => b as u8 as char,
            0x7f => '⡿',
            _ => glyph_or_dot(0x2800 + b as u32),
        };
        b += 1;
    }
    table
}

/// One glyph per byte value for the ASCII column.
///
/// Printable ASCII shows as itself. `0x01..=0x0a` are subscript digits (`ₐ` for LF),
/// other control bytes a middle dot, and `0x7f..=0xff` braille patterns whose dots spell
/// the byte's bits.
pub const ASCII_GLYPHS: [char; 256] = build_glyphs();

/// Decode UTF-16 code units, replacing unpaired surrogates with [`REPLACEMENT`].
///
/// A trailing odd byte is ignored.
pub fn decode_utf16(bytes: &[u8], order: ByteOrder) -> String {
    let units = bytes.chunks_exact(2).map(|pair| match order {
        ByteOrder::Little => u16::from_le_bytes([pair[0], pair[1]]),
        ByteOrder::Big => u16::from_be_bytes([pair[0], pair[1]]),
    });
    char::decode_utf16(units)
        .map(|unit| unit.unwrap_or(REPLACEMENT))
        .collect()
}

fn hex_digit(nibble: u8) -> char {
    char::from_digit(u32::from(nibble), 16).unwrap_or('?')
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Cell {
    Blank,
    Glyph(char, Style),
    /// Right half of a double-width glyph.
    Covered,
}

/// Sparse cell grid for one row, clipped at `max_width`.
struct Cells {
    cells: Vec<Cell>,
    max_width: usize,
}

impl Cells {
    fn new(max_width: usize) -> Self {
        Self {
            cells: Vec::new(),
            max_width,
        }
    }

    /// Place `ch` at `x`; returns the cells it occupies.
    fn put(&mut self, x: usize, ch: char, style: Style) -> usize {
        let (ch, width) = match ch.width() {
            Some(width @ 1..=2) => (ch, width),
            _ => (REPLACEMENT, 1),
        };
        if x + width > self.max_width {
            return width;
        }
        if self.cells.len() < x + width {
            self.cells.resize(x + width, Cell::Blank);
        }
        self.cells[x] = Cell::Glyph(ch, style);
        if width == 2 {
            self.cells[x + 1] = Cell::Covered;
        }
        width
    }

    fn put_str(&mut self, x: usize, text: &str, style: Style) -> usize {
        text.chars().fold(0, |used, ch| used + self.put(x + used, ch, style))
    }

    fn into_line(self) -> Line<'static> {
        let mut spans = Vec::new();
        let mut run = String::new();
        let mut run_style = Style::default();
        for cell in self.cells {
            let (ch, style) = match cell {
                Cell::Blank => (' ', Style::default()),
                Cell::Glyph(ch, style) => (ch, style),
                Cell::Covered => continue,
            };
            if style != run_style && !run.is_empty() {
                spans.push(Span::styled(std::mem::take(&mut run), run_style));
            }
            run_style = style;
            run.push(ch);
        }
        if !run.is_empty() {
            spans.push(Span::styled(run, run_style));
        }
        Line::from(spans)
    }
}

/// Lays out rows for one draw.
#[derive(Debug, Clone, Copy)]
pub struct RowRenderer<'a> {
    view: &'a ViewConfig,
    styles: &'a HexStyles,
    offset_width: usize,
    max_width: usize,
    columns: usize,
    pin_right: bool,
}

impl<'a> RowRenderer<'a> {
    /// Renderer for a screen `max_width` cells wide.
    pub fn new(
        view: &'a ViewConfig,
        styles: &'a HexStyles,
        offset_width: usize,
        max_width: usize,
    ) -> Self {
        let columns = usize::try_from(view.columns.max(1)).unwrap_or(usize::MAX);
        Self {
            view,
            styles,
            offset_width,
            max_width,
            columns,
            pin_right: columns < max_width && (view.show_hex || view.show_binary),
        }
    }

    /// Render one row.
    pub fn line(&self, row: &Row) -> Line<'static> {
        let mut cells = Cells::new(self.max_width);
        match row {
            Row::Data { offset, bytes } => {
                self.label(&mut cells, *offset);
                match self.view.mode {
                    DisplayMode::Dump => {
                        self.dump(&mut cells, bytes);
                    }
                    DisplayMode::Text => self.text(&mut cells, bytes),
                }
            }
            Row::Repeat { .. } => {
                cells.put(0, '*', self.styles.normal);
            }
            Row::End { offset } => self.label(&mut cells, *offset),
        }
        cells.into_line()
    }

    fn label(&self, cells: &mut Cells, offset: u64) {
        let address = self.view.effective_address(offset);
        let label = format!("{address:0width$X}:", width = self.offset_width);
        cells.put_str(0, &label, self.styles.normal);
    }

    /// Lay out the dump columns; returns the cell after the last column.
    fn dump(&self, cells: &mut Cells, bytes: &[u8]) -> usize {
        let mut x = self.offset_width + 2;

        if self.view.show_binary {
            x = self.binary(cells, x, bytes) + 1;
            if x >= self.max_width {
                return x;
            }
        }

        if self.view.show_hex {
            x = self.hex(cells, x, bytes) + 1;
            if x >= self.max_width {
                return x;
            }
        }

        if self.view.show_utf16 {
            let text = decode_utf16(bytes, self.view.utf16_order);
            let start = if self.pin_right && !self.view.show_ascii {
                self.max_width.saturating_sub(self.columns / 2)
            } else {
                x
            };
            x += cells.put_str(start, &text, self.styles.normal) + 1;
        }

        if self.view.show_ascii {
            let start = if self.pin_right {
                self.max_width.saturating_sub(self.columns)
            } else {
                x
            };
            self.glyphs(cells, start, bytes);
            x += bytes.len() + 1;
        }
        x
    }

    fn text(&self, cells: &mut Cells, bytes: &[u8]) {
        let x = self.offset_width + 2;
        if self.view.show_utf16 {
            cells.put_str(x, &decode_utf16(bytes, self.view.utf16_order), self.styles.normal);
        } else {
            self.glyphs(cells, x, bytes);
        }
    }

    fn glyphs(&self, cells: &mut Cells, x: usize, bytes: &[u8]) {
        for (i, &byte) in bytes.iter().enumerate() {
            let style = if byte < 0x20 {
                self.styles.dim
            } else {
                self.styles.normal
            };
            cells.put(x + i, ASCII_GLYPHS[usize::from(byte)], style);
        }
    }

    fn element_width(&self) -> usize {
        usize::try_from(self.view.element_bytes()).unwrap_or(1)
    }

    fn hex(&self, cells: &mut Cells, mut x: usize, bytes: &[u8]) -> usize {
        let width = self.element_width();
        for (group, chunk) in bytes.chunks(width).enumerate() {
            if width == 1 && group > 0 && group % 8 == 0 {
                x += 1;
            }
            // Elements read most significant byte first; zeros before the first
            // significant digit are dimmed.
            let mut leading = width > 1 || chunk[0] == 0;
            for &byte in chunk.iter().rev() {
                let base = if width == 1 && self.view.alt_color && byte < 0x10 {
                    self.styles.dim
                } else {
                    self.styles.normal
                };
                for nibble in [byte >> 4, byte & 0x0f] {
                    let style = if leading && nibble == 0 {
                        self.styles.dim
                    } else {
                        leading = false;
                        base
                    };
                    cells.put(x, hex_digit(nibble), style);
                    x += 1;
                }
            }
            x += 1;
            if x >= self.max_width {
                break;
            }
        }
        x
    }

    fn binary(&self, cells: &mut Cells, mut x: usize, bytes: &[u8]) -> usize {
        let width = self.element_width();
        let (zero, one) = match self.view.binary_glyphs {
            BinaryGlyphs::Digits => ('0', '1'),
            BinaryGlyphs::Blocks => ('_', 'X'),
        };
        for (group, chunk) in bytes.chunks(width).enumerate() {
            if width == 1 && group > 0 && group % 8 == 0 {
                x += 1;
            }
            for &byte in chunk.iter().rev() {
                for bit in (0..8).rev() {
                    if byte >> bit & 1 == 1 {
                        cells.put(x, one, self.styles.normal);
                    } else {
                        cells.put(x, zero, self.styles.dim);
                    }
                    x += 1;
                }
            }
            x += 1;
            if x >= self.max_width {
                break;
            }
        }
        x
    }
}

/// Cells a dump row of `columns` bytes needs, with every column at its natural place.
pub fn measure_row(view: &ViewConfig, offset_width: usize, columns: u64) -> usize {
    let styles = HexStyles::default();
    let columns_usize = usize::try_from(columns).unwrap_or(usize::MAX);
    let renderer = RowRenderer {
        view,
        styles: &styles,
        offset_width,
        max_width: usize::MAX / 2,
        columns: columns_usize,
        pin_right: false,
    };
    let mut cells = Cells::new(0);
    renderer.dump(&mut cells, &vec![0u8; columns_usize])
}

/// Column count for a screen `screen_width` cells wide.
///
/// Starts from the smallest power of two not below the screen width and shrinks it, by
/// halving or by one depending on [`ColumnFit`], until a row fits. The result is aligned
/// down to the element width and is at least 1.
pub fn fit_columns(view: &ViewConfig, offset_width: usize, screen_width: usize) -> u64 {
    if screen_width == 0 {
        return view.element_bytes().max(1);
    }
    let mut columns = screen_width.next_power_of_two() as u64;
    // Bounded so a screen too narrow for any row still terminates.
    for _ in 0..0x1000 {
        if columns <= 1 || measure_row(view, offset_width, columns) <= screen_width {
            break;
        }
        columns = match view.fit {
            ColumnFit::PowerOfTwo => columns / 2,
            ColumnFit::Tight => columns - 1,
        };
    }
    let element = view.element_bytes();
    if columns % element != 0 {
        columns -= columns % element;
    }
    columns.max(1)
}

/// Longest text-mode row for a screen `screen_width` cells wide.
///
/// Kept even when the UTF-16 column is shown so code units are never split.
pub fn text_row_width(view: &ViewConfig, offset_width: usize, screen_width: usize) -> usize {
    let mut width = screen_width.saturating_sub(offset_width + 2);
    if view.show_utf16 && width % 2 == 1 {
        width -= 1;
    }
    width.max(1)
}

#[cfg(test)]
#[path = "hex_row_tests.rs"]
mod tests;
