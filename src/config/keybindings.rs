//! Keyboard bindings configuration.

use crate::model::{
    ColumnChange, Command, Direction, ElementWidth, Motion, PageMotion, PromptRequest, Toggle,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Shifted digit row, in bookmark slot order `1..=9, 0`.
const BOOKMARK_SYMBOLS: [char; 10] = ['!', '@', '#', '$', '%', '^', '&', '*', '(', ')'];

/// Maps keyboard events to commands.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: HashMap<KeyEvent, Command>,
}

impl KeyBindings {
    /// Look up the command for a key event.
    ///
    /// Terminals disagree on whether shifted characters carry `SHIFT`, so it is ignored for
    /// character keys.
    pub fn get(&self, key: KeyEvent) -> Option<Command> {
        let modifiers = match key.code {
            KeyCode::Char(_) => key.modifiers - KeyModifiers::SHIFT,
            _ => key.modifiers,
        };
        self.bindings
            .get(&KeyEvent::new(key.code, modifiers))
            .copied()
    }

    fn bind(&mut self, code: KeyCode, modifiers: KeyModifiers, command: Command) {
        self.bindings.insert(KeyEvent::new(code, modifiers), command);
    }

    fn bind_char(&mut self, c: char, command: Command) {
        self.bind(KeyCode::Char(c), KeyModifiers::NONE, command);
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut keys = Self {
            bindings: HashMap::new(),
        };
        let none = KeyModifiers::NONE;

        // Single steps
        keys.bind(KeyCode::Left, none, Command::Move(Motion::Left));
        keys.bind(KeyCode::Right, none, Command::Move(Motion::Right));
        keys.bind(KeyCode::Left, KeyModifiers::SHIFT, Command::Move(Motion::FineLeft));
        keys.bind(KeyCode::Right, KeyModifiers::SHIFT, Command::Move(Motion::FineRight));
        keys.bind(KeyCode::Up, none, Command::Move(Motion::Up));
        keys.bind(KeyCode::Down, none, Command::Move(Motion::Down));

        // Pages and jumps
        keys.bind(KeyCode::PageDown, none, Command::PageMove(PageMotion::Down));
        keys.bind_char(' ', Command::PageMove(PageMotion::Down));
        keys.bind(KeyCode::PageUp, none, Command::PageMove(PageMotion::Up));
        keys.bind(KeyCode::Home, none, Command::PageMove(PageMotion::Home));
        keys.bind(KeyCode::End, none, Command::PageMove(PageMotion::End));
        keys.bind_char('G', Command::PageMove(PageMotion::End));
        keys.bind(KeyCode::Backspace, none, Command::PageMove(PageMotion::Back));

        // Display mode
        keys.bind(KeyCode::Tab, none, Command::Toggle(Toggle::DisplayMode));
        keys.bind(KeyCode::Enter, none, Command::Toggle(Toggle::DisplayMode));

        // Quit
        keys.bind(KeyCode::Esc, none, Command::Quit);
        keys.bind(KeyCode::Char('c'), KeyModifiers::CONTROL, Command::Quit);
        keys.bind_char('q', Command::Quit);
        keys.bind_char('Q', Command::Quit);

        // Bookmarks: Alt+digit jumps, shifted digit stores
        for (i, symbol) in BOOKMARK_SYMBOLS.iter().enumerate() {
            let slot = (i + 1) % 10;
            let digit = char::from(b'0' + slot as u8);
            keys.bind(KeyCode::Char(digit), KeyModifiers::ALT, Command::GotoBookmark(slot));
            keys.bind_char(*symbol, Command::SetBookmark(slot));
        }

        // Columns
        keys.bind_char('-', Command::Columns(ColumnChange::Shrink));
        keys.bind_char('=', Command::Columns(ColumnChange::Grow));
        keys.bind_char('_', Command::Columns(ColumnChange::Halve));
        keys.bind_char('+', Command::Columns(ColumnChange::Double));
        keys.bind_char('0', Command::Columns(ColumnChange::Fit));
        keys.bind_char('c', Command::Prompt(PromptRequest::Columns));
        keys.bind_char('w', Command::Prompt(PromptRequest::Columns));

        // Element width
        keys.bind_char('1', Command::SetElementWidth(ElementWidth::One));
        keys.bind_char('2', Command::SetElementWidth(ElementWidth::Two));
        keys.bind_char('4', Command::SetElementWidth(ElementWidth::Four));
        keys.bind_char('8', Command::SetElementWidth(ElementWidth::Eight));
        keys.bind_char('9', Command::SetElementWidth(ElementWidth::Sixteen));

        // Column toggles
        keys.bind_char('a', Command::Toggle(Toggle::Ascii));
        keys.bind_char('b', Command::Toggle(Toggle::Binary));
        keys.bind_char('B', Command::Toggle(Toggle::BinaryGlyphs));
        keys.bind_char('C', Command::Toggle(Toggle::AltColor));
        keys.bind_char('h', Command::Toggle(Toggle::Hex));
        keys.bind_char('u', Command::Toggle(Toggle::Utf16));
        keys.bind_char('U', Command::Toggle(Toggle::Utf16Order));
        keys.bind_char('d', Command::Toggle(Toggle::Dedup));

        // Prompts
        keys.bind_char(':', Command::Prompt(PromptRequest::Command));
        keys.bind_char('g', Command::Prompt(PromptRequest::Goto));
        keys.bind(KeyCode::Char('g'), KeyModifiers::CONTROL, Command::Prompt(PromptRequest::Goto));
        keys.bind_char('p', Command::Prompt(PromptRequest::PageSize));
        keys.bind_char('W', Command::Prompt(PromptRequest::Export));

        // Search
        keys.bind_char('/', Command::Prompt(PromptRequest::Search(Direction::Forward)));
        keys.bind_char('?', Command::Prompt(PromptRequest::Search(Direction::Backward)));
        keys.bind_char('n', Command::SearchAgain(Direction::Forward));
        keys.bind_char('N', Command::SearchAgain(Direction::Backward));

        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shifted_symbols_match_with_or_without_shift() {
        let bindings = KeyBindings::default();

        assert_eq!(
            bindings.get(KeyEvent::new(KeyCode::Char('@'), KeyModifiers::SHIFT)),
            Some(Command::SetBookmark(2))
        );
        assert_eq!(
            bindings.get(KeyEvent::new(KeyCode::Char('@'), KeyModifiers::NONE)),
            Some(Command::SetBookmark(2))
        );
    }

    #[test]
    fn uppercase_letters_are_distinct_from_lowercase() {
        let bindings = KeyBindings::default();

        assert_eq!(
            bindings.get(KeyEvent::new(KeyCode::Char('n'), KeyModifiers::NONE)),
            Some(Command::SearchAgain(Direction::Forward))
        );
        assert_eq!(
            bindings.get(KeyEvent::new(KeyCode::Char('N'), KeyModifiers::SHIFT)),
            Some(Command::SearchAgain(Direction::Backward))
        );
    }

    #[test]
    fn shift_arrows_are_fine_moves() {
        let bindings = KeyBindings::default();

        assert_eq!(
            bindings.get(KeyEvent::new(KeyCode::Left, KeyModifiers::SHIFT)),
            Some(Command::Move(Motion::FineLeft))
        );
        assert_eq!(
            bindings.get(KeyEvent::new(KeyCode::Left, KeyModifiers::NONE)),
            Some(Command::Move(Motion::Left))
        );
    }

    #[test]
    fn alt_digits_jump_to_bookmarks() {
        let bindings = KeyBindings::default();

        assert_eq!(
            bindings.get(KeyEvent::new(KeyCode::Char('0'), KeyModifiers::ALT)),
            Some(Command::GotoBookmark(0))
        );
        assert_eq!(
            bindings.get(KeyEvent::new(KeyCode::Char('7'), KeyModifiers::ALT)),
            Some(Command::GotoBookmark(7))
        );
        assert_eq!(
            bindings.get(KeyEvent::new(KeyCode::Char(')'), KeyModifiers::NONE)),
            Some(Command::SetBookmark(0))
        );
    }

    #[test]
    fn ctrl_c_quits_but_c_prompts_for_columns() {
        let bindings = KeyBindings::default();

        assert_eq!(
            bindings.get(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Command::Quit)
        );
        assert_eq!(
            bindings.get(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)),
            Some(Command::Prompt(PromptRequest::Columns))
        );
    }

    #[test]
    fn unbound_key_is_none() {
        let bindings = KeyBindings::default();
        assert_eq!(
            bindings.get(KeyEvent::new(KeyCode::Char('z'), KeyModifiers::NONE)),
            None
        );
    }
}
