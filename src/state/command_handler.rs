//! Command dispatch.
//!
//! Turns a [`Command`] from the key bindings, or a submitted [`Prompt`], into state
//! changes. Anything that needs the open source (searching, exporting, patching) or the
//! terminal comes back as an [`Effect`] for the event loop to carry out.

use crate::expr::{evaluate, EvalContext};
use crate::model::{
    Command, CommandError, Direction, Motion, PageMotion, Pattern, PromptRequest, Toggle,
};
use crate::search::SearchOutcome;
use crate::state::app_state::AppState;
use crate::state::colon::{run_command, ColonEffect};
use crate::state::navigation::{percent_offset, MoveTag};
use crate::state::prompt::{search_prompt, Prompt, PromptKind};
use crate::state::view_config::{BinaryGlyphs, ByteOrder, MAX_COLUMNS};

/// Work the event loop has to do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Nothing beyond redrawing.
    None,
    /// Leave the pager.
    Quit,
    /// Search for `search_pattern` from the current offset.
    Search(Direction),
    /// Export or patch requested by a colon command.
    Colon(ColonEffect),
}

/// Apply a key command.
pub fn handle_command(state: &mut AppState, command: Command) -> Effect {
    state.sync_skips();
    match command {
        Command::Move(motion) => handle_motion(state, motion),
        Command::PageMove(motion) => handle_page_motion(state, motion),
        Command::Toggle(toggle) => handle_toggle(state, toggle),
        Command::Columns(change) => {
            state.view.change_columns(change);
            state.sync_skips();
        }
        Command::SetElementWidth(width) => state.view.element_width = width,
        Command::SetBookmark(slot) => state.nav.set_bookmark(slot),
        Command::GotoBookmark(slot) => {
            if !state.nav.goto_bookmark(slot) {
                state.ring();
            }
        }
        Command::Prompt(request) => state.prompt = Some(open_prompt(state, request)),
        Command::SearchAgain(direction) => {
            if state.search_pattern.is_none() {
                state.prompt = Some(search_prompt(direction, state.search_mode, None));
            } else {
                return Effect::Search(direction);
            }
        }
        Command::Quit => return Effect::Quit,
    }
    Effect::None
}

fn handle_motion(state: &mut AppState, motion: Motion) {
    let element = state.view.element_bytes() as i64;
    let row = state.view.columns.max(1) as i64;
    match motion {
        // Horizontal moves shift the row phase, which invalidates every recorded run.
        Motion::Left | Motion::Right | Motion::FineLeft | Motion::FineRight => {
            let delta = match motion {
                Motion::Left => -element,
                Motion::Right => element,
                Motion::FineLeft => -1,
                _ => 1,
            };
            state.skips.clear();
            state.nav.step(delta, MoveTag::Horizontal, None);
        }
        Motion::Up => state.navigate(|nav, snap| nav.step(-row, MoveTag::Vertical, snap)),
        Motion::Down => state.navigate(|nav, snap| nav.step(row, MoveTag::Vertical, snap)),
    }
}

fn handle_page_motion(state: &mut AppState, motion: PageMotion) {
    let page_size = state.view.page_size;
    let next_offset = state.next_offset;
    let rows = state.page_rows;
    let columns = state.view.columns.max(1);
    match motion {
        PageMotion::Down => state.navigate(|nav, snap| nav.page_down(page_size, next_offset, snap)),
        PageMotion::Up => state.navigate(|nav, snap| nav.page_up(page_size, rows, columns, snap)),
        PageMotion::Home => state.nav.home(),
        PageMotion::End => state.nav.end(rows, columns),
        PageMotion::Back => {
            if !state.nav.back() {
                state.ring();
            }
        }
    }
}

fn handle_toggle(state: &mut AppState, toggle: Toggle) {
    let view = &mut state.view;
    match toggle {
        Toggle::DisplayMode => view.mode = view.mode.toggled(),
        Toggle::Hex => view.show_hex = !view.show_hex,
        Toggle::Binary => view.show_binary = !view.show_binary,
        Toggle::BinaryGlyphs => {
            view.binary_glyphs = match view.binary_glyphs {
                BinaryGlyphs::Digits => BinaryGlyphs::Blocks,
                BinaryGlyphs::Blocks => BinaryGlyphs::Digits,
            }
        }
        Toggle::Ascii => view.show_ascii = !view.show_ascii,
        Toggle::Utf16 => view.show_utf16 = !view.show_utf16,
        Toggle::Utf16Order => {
            view.utf16_order = match view.utf16_order {
                ByteOrder::Little => ByteOrder::Big,
                ByteOrder::Big => ByteOrder::Little,
            }
        }
        Toggle::AltColor => view.alt_color = !view.alt_color,
        Toggle::Dedup => view.dedup = !view.dedup,
    }
    state.sync_skips();
}

fn open_prompt(state: &AppState, request: PromptRequest) -> Prompt {
    match request {
        PromptRequest::Goto => Prompt::new(PromptKind::Goto, format!("{:x}", state.here().max(0))),
        PromptRequest::Columns => Prompt::new(PromptKind::Columns, state.view.columns.to_string()),
        PromptRequest::PageSize => {
            Prompt::new(PromptKind::PageSize, state.view.page_size.to_string())
        }
        PromptRequest::Command => Prompt::new(PromptKind::Command, ""),
        PromptRequest::Export => Prompt::new(
            PromptKind::Command,
            format!(
                "write {:0width$x}.bin 1000",
                state.offset(),
                width = state.offset_width()
            ),
        ),
        PromptRequest::Search(direction) => {
            search_prompt(direction, state.search_mode, state.search_pattern.as_ref())
        }
    }
}

/// Apply the text of a submitted prompt.
///
/// Empty input closes the prompt without doing anything.
///
/// # Errors
///
/// Returns [`CommandError`] if the input does not evaluate or does not apply; the state
/// is left unchanged.
pub fn submit_prompt(state: &mut AppState, prompt: &Prompt) -> Result<Effect, CommandError> {
    let input = prompt.input().trim();
    if input.is_empty() {
        return Ok(Effect::None);
    }
    match prompt.kind() {
        PromptKind::Goto => {
            submit_goto(state, input)?;
            Ok(Effect::None)
        }
        PromptKind::Columns => {
            let columns = eval_count(input, "cols", state.view.columns)?;
            if columns > MAX_COLUMNS {
                return Err(CommandError::InvalidValue {
                    name: "cols".to_string(),
                    value: input.to_string(),
                });
            }
            state.view.columns = columns;
            state.sync_skips();
            Ok(Effect::None)
        }
        PromptKind::PageSize => {
            state.view.page_size = eval_count(input, "pageSize", state.view.page_size)?;
            Ok(Effect::None)
        }
        PromptKind::Command => match run_command(state, input)? {
            ColonEffect::None => Ok(Effect::None),
            ColonEffect::Beep => {
                state.ring();
                Ok(Effect::None)
            }
            effect => Ok(Effect::Colon(effect)),
        },
        PromptKind::Search { direction, mode } => {
            // Text patterns keep their spaces.
            let pattern = Pattern::parse(prompt.input(), mode)?;
            state.search_pattern = Some(pattern);
            state.search_mode = mode;
            Ok(Effect::Search(direction))
        }
    }
}

fn submit_goto(state: &mut AppState, input: &str) -> Result<(), CommandError> {
    let offset = match input.strip_suffix('%') {
        Some(percent) => {
            let value = evaluate(percent, &EvalContext::new(10, 0))?;
            let percent = u64::try_from(value).map_err(|_| CommandError::InvalidValue {
                name: "percent".to_string(),
                value: input.to_string(),
            })?;
            percent_offset(
                state.file_size(),
                percent,
                state.offset(),
                state.view.element_bytes(),
            )
        }
        None => {
            let address = evaluate(input, &EvalContext::new(16, state.here()))?;
            state.view.offset_for_address(address, state.file_size())?
        }
    };
    state.nav.jump(offset, MoveTag::Goto)
}

/// A decimal count where `$` is the current value.
fn eval_count(input: &str, name: &str, current: u64) -> Result<u64, CommandError> {
    let here = i64::try_from(current).unwrap_or(i64::MAX);
    let value = evaluate(input, &EvalContext::new(10, here))?;
    u64::try_from(value).map_err(|_| CommandError::InvalidValue {
        name: name.to_string(),
        value: input.to_string(),
    })
}

/// Move to a search hit, or report why there is none.
pub fn apply_search_outcome(state: &mut AppState, outcome: SearchOutcome) {
    match outcome {
        SearchOutcome::Found(offset) => {
            if let Err(err) = state.nav.jump(offset, MoveTag::Search) {
                state.set_error(err);
            }
        }
        SearchOutcome::NotFound => state.set_error("pattern not found"),
        SearchOutcome::Interrupted => state.set_message("search interrupted"),
    }
}

#[cfg(test)]
#[path = "command_handler_tests.rs"]
mod tests;
