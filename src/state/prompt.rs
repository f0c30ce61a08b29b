//! Line-input prompt (pure state transitions).
//!
//! The prompt owns its text and a cursor counted in characters. Every edit function takes
//! the prompt by value and returns the updated prompt, the same way the search input
//! handlers do. An edit that cannot be applied leaves the text alone and sets
//! [`Prompt::rejected`] so the shell can ring the bell.
//!
//! A freshly opened prompt shows the current value. The first printable key other than
//! space replaces it instead of appending to it.

use crate::model::{Direction, Pattern, PatternMode};

/// Characters accepted by numeric prompts: digits, radix prefixes, `$`, operators, `%`.
pub const EXPR_CHARS: &str = "0123456789abcdefoxABCDEFOX $*/%+-&^|";

/// Characters accepted by a hex search prompt.
pub const HEX_CHARS: &str = "0123456789abcdefABCDEF ";

/// What a prompt is collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Offset expression (radix 16) or percentage.
    Goto,
    /// Column count (radix 10).
    Columns,
    /// Page-down step (radix 10).
    PageSize,
    /// Colon command line.
    Command,
    /// Search pattern.
    Search {
        /// Where to search once submitted.
        direction: Direction,
        /// Hex digits or literal text.
        mode: PatternMode,
    },
}

impl PromptKind {
    fn allowed(self) -> Option<&'static str> {
        match self {
            PromptKind::Goto | PromptKind::Columns | PromptKind::PageSize => Some(EXPR_CHARS),
            PromptKind::Search {
                mode: PatternMode::Hex,
                ..
            } => Some(HEX_CHARS),
            PromptKind::Command
            | PromptKind::Search {
                mode: PatternMode::Text,
                ..
            } => None,
        }
    }
}

/// An open prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    kind: PromptKind,
    input: String,
    cursor: usize,
    replace_on_type: bool,
    rejected: bool,
}

impl Prompt {
    /// Open a prompt showing `initial`, cursor at the end.
    pub fn new(kind: PromptKind, initial: impl Into<String>) -> Self {
        let input = initial.into();
        let cursor = input.chars().count();
        Self {
            kind,
            input,
            cursor,
            replace_on_type: true,
            rejected: false,
        }
    }

    /// What the prompt collects.
    pub fn kind(&self) -> PromptKind {
        self.kind
    }

    /// Current text.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether the last edit was refused.
    pub fn rejected(&self) -> bool {
        self.rejected
    }

    /// Text shown before the input.
    pub fn label(&self) -> String {
        match self.kind {
            PromptKind::Goto => "[hex] offset: ".to_string(),
            PromptKind::Columns => "cols: ".to_string(),
            PromptKind::PageSize => "page size (0 = auto): ".to_string(),
            PromptKind::Command => "command: ".to_string(),
            PromptKind::Search { direction, mode } => {
                let prefix = match direction {
                    Direction::Forward => '/',
                    Direction::Backward => '?',
                };
                let mode = match mode {
                    PatternMode::Hex => "hex : ",
                    PatternMode::Text => "text: ",
                };
                format!("{prefix}{mode}")
            }
        }
    }

    fn byte_index(&self, chars: usize) -> usize {
        self.input
            .char_indices()
            .nth(chars)
            .map_or(self.input.len(), |(i, _)| i)
    }

    fn char_len(&self) -> usize {
        self.input.chars().count()
    }
}

/// Insert `ch` at the cursor.
///
/// Characters outside the prompt's alphabet are rejected.
pub fn handle_char_input(mut prompt: Prompt, ch: char) -> Prompt {
    prompt.rejected = false;
    if prompt.kind.allowed().is_some_and(|allowed| !allowed.contains(ch)) {
        prompt.rejected = true;
        return prompt;
    }
    if prompt.replace_on_type && ch != ' ' {
        prompt.input.clear();
        prompt.cursor = 0;
    }
    prompt.replace_on_type = false;
    let at = prompt.byte_index(prompt.cursor);
    prompt.input.insert(at, ch);
    prompt.cursor += 1;
    prompt
}

/// Delete the character before the cursor.
pub fn handle_backspace(mut prompt: Prompt) -> Prompt {
    prompt.replace_on_type = false;
    prompt.rejected = prompt.cursor == 0;
    if prompt.cursor > 0 {
        let at = prompt.byte_index(prompt.cursor - 1);
        prompt.input.remove(at);
        prompt.cursor -= 1;
    }
    prompt
}

/// Move the cursor one character left.
pub fn handle_cursor_left(mut prompt: Prompt) -> Prompt {
    prompt.replace_on_type = false;
    prompt.rejected = prompt.cursor == 0;
    prompt.cursor = prompt.cursor.saturating_sub(1);
    prompt
}

/// Move the cursor one character right.
pub fn handle_cursor_right(mut prompt: Prompt) -> Prompt {
    prompt.replace_on_type = false;
    let len = prompt.char_len();
    prompt.rejected = prompt.cursor >= len;
    prompt.cursor = (prompt.cursor + 1).min(len);
    prompt
}

/// Move the cursor to the start of the line.
pub fn handle_home(mut prompt: Prompt) -> Prompt {
    prompt.replace_on_type = false;
    prompt.rejected = false;
    prompt.cursor = 0;
    prompt
}

/// Move the cursor to the end of the line.
pub fn handle_end(mut prompt: Prompt) -> Prompt {
    prompt.replace_on_type = false;
    prompt.rejected = false;
    prompt.cursor = prompt.char_len();
    prompt
}

/// Replace the text, e.g. with a history entry. The cursor goes to the end.
pub fn replace_input(mut prompt: Prompt, text: impl Into<String>) -> Prompt {
    prompt.input = text.into();
    prompt.cursor = prompt.char_len();
    prompt.replace_on_type = false;
    prompt.rejected = false;
    prompt
}

/// Switch a search prompt between hex and text, converting what was typed.
///
/// Input that does not parse in the current mode is dropped. Other prompts are unchanged.
pub fn toggle_search_mode(prompt: Prompt) -> Prompt {
    let PromptKind::Search { direction, mode } = prompt.kind else {
        return prompt;
    };
    let next = mode.toggled();
    let converted = Pattern::parse(&prompt.input, mode)
        .map(|p| p.display(next))
        .unwrap_or_default();
    let replace_on_type = prompt.replace_on_type;
    let mut prompt = replace_input(
        Prompt {
            kind: PromptKind::Search {
                direction,
                mode: next,
            },
            ..prompt
        },
        converted,
    );
    prompt.replace_on_type = replace_on_type;
    prompt
}

/// Open a search prompt in `mode` showing `pattern`, if any.
pub fn search_prompt(direction: Direction, mode: PatternMode, pattern: Option<&Pattern>) -> Prompt {
    let initial = pattern.map(|p| p.display(mode)).unwrap_or_default();
    Prompt::new(PromptKind::Search { direction, mode }, initial)
}

#[cfg(test)]
#[path = "prompt_tests.rs"]
mod tests;
