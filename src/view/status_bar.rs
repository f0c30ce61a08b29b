//! The bottom line: status, prompt, or scan progress.

use crate::state::{AppState, Prompt, StatusMessage};
use crate::view::styles::HexStyles;
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Progress positions are rounded down to this granularity for display.
pub const GAUGE_GRANULARITY: u64 = 0x10000;

/// Fit a path into `max_len` cells.
///
/// Long paths are cut to their file name; a file name that is still too long keeps its
/// tail behind an ellipsis.
pub fn shorten_file_name(name: &str, max_len: usize) -> String {
    if name.width() <= max_len {
        return name.to_string();
    }
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    if base.width() <= max_len {
        return base.to_string();
    }
    if max_len == 0 {
        return String::new();
    }

    let mut tail: Vec<char> = Vec::new();
    let mut used = 1;
    for ch in base.chars().rev() {
        let w = ch.width().unwrap_or(0);
        if used + w > max_len {
            break;
        }
        used += w;
        tail.push(ch);
    }
    std::iter::once('…').chain(tail.into_iter().rev()).collect()
}

fn truncate(text: &str, max: usize) -> String {
    let mut used = 0;
    text.chars()
        .take_while(|ch| {
            used += ch.width().unwrap_or(0);
            used <= max
        })
        .collect()
}

/// Status line: the current message or error on the left, the file name on the right.
pub fn status_line(state: &AppState, styles: &HexStyles, width: usize) -> Line<'static> {
    let name = shorten_file_name(&state.file_name, width.saturating_sub(10));
    let (left, left_style) = match state.status() {
        Some(StatusMessage::Error(text)) => (truncate(text, width), styles.error),
        Some(StatusMessage::Info(text)) => (truncate(text, width), styles.normal),
        None => (":".to_string(), styles.dim),
    };

    let gap = width
        .saturating_sub(left.width())
        .checked_sub(name.width())
        .filter(|_| !name.is_empty());
    match gap {
        Some(gap) => Line::from(vec![
            Span::styled(left, left_style),
            Span::raw(" ".repeat(gap)),
            Span::styled(name, styles.dim),
        ]),
        None => Line::from(Span::styled(left, left_style)),
    }
}

/// Prompt label and input with the cursor cell underlined.
pub fn prompt_line(prompt: &Prompt, styles: &HexStyles) -> Line<'static> {
    let mut spans = vec![Span::styled(prompt.label(), styles.normal)];
    let before: String = prompt.input().chars().take(prompt.cursor()).collect();
    let mut rest = prompt.input().chars().skip(prompt.cursor());
    let at = rest.next().unwrap_or(' ');
    let after: String = rest.collect();

    if !before.is_empty() {
        spans.push(Span::styled(before, styles.normal));
    }
    spans.push(Span::styled(at.to_string(), styles.cursor));
    if !after.is_empty() {
        spans.push(Span::styled(after, styles.normal));
    }
    Line::from(spans)
}

/// Progress gauge: the position reached, with a reversed bar proportional to it.
pub fn gauge_line(
    position: u64,
    file_size: u64,
    offset_width: usize,
    width: usize,
    styles: &HexStyles,
) -> Line<'static> {
    let shown = position - position % GAUGE_GRANULARITY;
    let mut text = format!("{shown:0offset_width$X}: ");
    let pad = width.saturating_sub(text.chars().count());
    text.extend(std::iter::repeat(' ').take(pad));

    let filled = if file_size == 0 {
        width
    } else {
        let cells = u128::from(position) * width as u128 / u128::from(file_size) + 1;
        usize::try_from(cells).unwrap_or(usize::MAX).min(width)
    };

    let bar: String = text.chars().take(filled).collect();
    let rest: String = text.chars().skip(filled).collect();
    Line::from(vec![
        Span::styled(bar, styles.gauge),
        Span::styled(rest, styles.normal),
    ])
}
