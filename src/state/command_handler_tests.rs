//! Tests for command dispatch and prompt submission.

use super::*;
use crate::model::{ByteRange, ColumnChange, DisplayMode, ElementWidth, PatternMode};
use crate::state::app_state::StatusMessage;
use crate::state::prompt::{handle_char_input, replace_input};
use crate::state::view_config::ViewConfig;

fn state() -> AppState {
    let view = ViewConfig {
        columns: 16,
        ..ViewConfig::default()
    };
    let mut state = AppState::new("disk.img", 0x1000, 0, view);
    state.page_rows = 10;
    state
}

fn submit(state: &mut AppState, kind: PromptKind, text: &str) -> Result<Effect, CommandError> {
    let prompt = replace_input(Prompt::new(kind, ""), text);
    submit_prompt(state, &prompt)
}

#[test]
fn right_and_left_step_one_element() {
    let mut state = state();
    state.view.element_width = ElementWidth::Four;

    handle_command(&mut state, Command::Move(Motion::Right));
    assert_eq!(state.offset(), 4);

    handle_command(&mut state, Command::Move(Motion::FineLeft));
    assert_eq!(state.offset(), 3);
}

#[test]
fn horizontal_moves_drop_recorded_runs() {
    let mut state = state();
    state.sync_skips();
    state.skips.insert(ByteRange::new(16, 256));

    handle_command(&mut state, Command::Move(Motion::FineRight));

    assert!(state.skips.is_empty());
    assert_eq!(state.offset(), 1);
}

#[test]
fn down_snaps_past_a_collapsed_run() {
    // GIVEN: rows 1..16 repeat row 0 and were collapsed on the last draw
    let mut state = state();
    state.sync_skips();
    state.skips.insert(ByteRange::new(16, 256));

    // WHEN: moving down one row
    handle_command(&mut state, Command::Move(Motion::Down));

    // THEN: the cursor lands on the first distinct row
    assert_eq!(state.offset(), 256);
}

#[test]
fn up_stops_at_zero() {
    let mut state = state();
    handle_command(&mut state, Command::Move(Motion::Up));
    assert_eq!(state.offset(), 0);
}

#[test]
fn page_down_follows_last_drawn_page() {
    let mut state = state();
    state.next_offset = 0x300;

    handle_command(&mut state, Command::PageMove(PageMotion::Down));
    assert_eq!(state.offset(), 0x300);

    handle_command(&mut state, Command::PageMove(PageMotion::Up));
    assert_eq!(state.offset(), 0);
}

#[test]
fn page_size_sets_page_step() {
    let mut state = state();
    state.view.page_size = 0x200;

    handle_command(&mut state, Command::PageMove(PageMotion::Down));

    assert_eq!(state.offset(), 0x200);
}

#[test]
fn end_then_home() {
    let mut state = state();

    handle_command(&mut state, Command::PageMove(PageMotion::End));
    assert_eq!(state.offset(), 0x1000 - 9 * 16);

    handle_command(&mut state, Command::PageMove(PageMotion::Home));
    assert_eq!(state.offset(), 0);
}

#[test]
fn back_with_no_history_rings() {
    let mut state = state();

    handle_command(&mut state, Command::PageMove(PageMotion::Back));

    assert!(state.take_bell());
}

#[test]
fn toggles_flip_view_settings() {
    let mut state = state();

    handle_command(&mut state, Command::Toggle(Toggle::DisplayMode));
    handle_command(&mut state, Command::Toggle(Toggle::Binary));
    handle_command(&mut state, Command::Toggle(Toggle::Utf16Order));
    handle_command(&mut state, Command::Toggle(Toggle::Dedup));

    assert_eq!(state.view.mode, DisplayMode::Text);
    assert!(state.view.show_binary);
    assert_eq!(state.view.utf16_order, ByteOrder::Big);
    assert!(!state.view.dedup);
}

#[test]
fn column_change_clears_runs() {
    let mut state = state();
    state.sync_skips();
    state.skips.insert(ByteRange::new(16, 256));

    handle_command(&mut state, Command::Columns(ColumnChange::Double));

    assert_eq!(state.view.columns, 32);
    assert!(state.skips.is_empty());
}

#[test]
fn bookmarks_round_trip() {
    let mut state = state();
    state.nav.jump(0x123, MoveTag::Goto).unwrap();
    handle_command(&mut state, Command::SetBookmark(3));
    handle_command(&mut state, Command::PageMove(PageMotion::Home));

    handle_command(&mut state, Command::GotoBookmark(3));

    assert_eq!(state.offset(), 0x123);
}

#[test]
fn quit_is_an_effect() {
    let mut state = state();
    assert_eq!(handle_command(&mut state, Command::Quit), Effect::Quit);
}

#[test]
fn goto_prompt_shows_current_address() {
    let mut state = state();
    state.nav.jump(0x1f0, MoveTag::Goto).unwrap();
    state.view.base = 0x8000;

    handle_command(&mut state, Command::Prompt(PromptRequest::Goto));

    let prompt = state.prompt.as_ref().unwrap();
    assert_eq!(prompt.kind(), PromptKind::Goto);
    assert_eq!(prompt.input(), "81f0");
}

#[test]
fn export_prompt_prefills_write_command() {
    let mut state = state();
    state.nav.jump(0x40, MoveTag::Goto).unwrap();

    handle_command(&mut state, Command::Prompt(PromptRequest::Export));

    let prompt = state.prompt.as_ref().unwrap();
    assert_eq!(prompt.kind(), PromptKind::Command);
    assert_eq!(prompt.input(), "write 00000040.bin 1000");
}

#[test]
fn search_again_without_pattern_opens_prompt() {
    let mut state = state();

    let effect = handle_command(&mut state, Command::SearchAgain(Direction::Backward));

    assert_eq!(effect, Effect::None);
    assert_eq!(
        state.prompt.as_ref().map(Prompt::kind),
        Some(PromptKind::Search {
            direction: Direction::Backward,
            mode: PatternMode::Hex,
        })
    );
}

#[test]
fn search_again_with_pattern_searches() {
    let mut state = state();
    state.search_pattern = Some(Pattern::new(vec![0x7f]).unwrap());

    let effect = handle_command(&mut state, Command::SearchAgain(Direction::Forward));

    assert_eq!(effect, Effect::Search(Direction::Forward));
}

#[test]
fn goto_submission_jumps() {
    let mut state = state();

    submit(&mut state, PromptKind::Goto, "$+80").unwrap();

    assert_eq!(state.offset(), 0x80);
}

#[test]
fn goto_percentage_keeps_element_phase() {
    let mut state = state();
    state.view.element_width = ElementWidth::Four;
    state.nav.jump(2, MoveTag::Goto).unwrap();

    submit(&mut state, PromptKind::Goto, "50%").unwrap();

    assert_eq!(state.offset(), 0x802);
}

#[test]
fn goto_out_of_range_is_an_error() {
    let mut state = state();
    assert!(matches!(
        submit(&mut state, PromptKind::Goto, "ffff"),
        Err(CommandError::OffsetOutOfRange(0xffff))
    ));
    assert_eq!(state.offset(), 0);
}

#[test]
fn columns_submission_is_decimal() {
    let mut state = state();

    submit(&mut state, PromptKind::Columns, "$*2").unwrap();
    assert_eq!(state.view.columns, 32);

    submit(&mut state, PromptKind::Columns, "24").unwrap();
    assert_eq!(state.view.columns, 24);
}

#[test]
fn columns_submission_past_the_limit_is_rejected() {
    let mut state = state();

    assert!(matches!(
        submit(&mut state, PromptKind::Columns, "1000000000"),
        Err(CommandError::InvalidValue { .. })
    ));
    assert_eq!(state.view.columns, 16);
}

#[test]
fn goto_submission_with_overflowing_division_is_an_error() {
    let mut state = state();
    state.view.base = 1;
    state.view.base_mult = -1;

    assert!(matches!(
        submit(&mut state, PromptKind::Goto, "0-7fffffffffffffff"),
        Err(CommandError::OffsetOutOfRange(_))
    ));
    assert_eq!(state.offset(), 0);
}

#[test]
fn negative_page_size_is_rejected() {
    let mut state = state();
    assert!(matches!(
        submit(&mut state, PromptKind::PageSize, "1-5"),
        Err(CommandError::InvalidValue { .. })
    ));
    assert_eq!(state.view.page_size, 0);
}

#[test]
fn empty_submission_does_nothing() {
    let mut state = state();
    let prompt = Prompt::new(PromptKind::Command, "");
    assert_eq!(submit_prompt(&mut state, &prompt).unwrap(), Effect::None);
}

#[test]
fn command_submission_passes_file_work_through() {
    let mut state = state();

    let effect = submit(&mut state, PromptKind::Command, "write a.bin 10").unwrap();

    assert!(matches!(effect, Effect::Colon(ColonEffect::Export { len: 0x10, .. })));
}

#[test]
fn beep_command_rings() {
    let mut state = state();

    let effect = submit(&mut state, PromptKind::Command, "beep").unwrap();

    assert_eq!(effect, Effect::None);
    assert!(state.take_bell());
}

#[test]
fn search_submission_records_pattern_and_mode() {
    let mut state = state();
    let kind = PromptKind::Search {
        direction: Direction::Forward,
        mode: PatternMode::Text,
    };
    let prompt = "MZ".chars().fold(Prompt::new(kind, ""), handle_char_input);

    let effect = submit_prompt(&mut state, &prompt).unwrap();

    assert_eq!(effect, Effect::Search(Direction::Forward));
    assert_eq!(state.search_pattern.as_ref().unwrap().as_bytes(), b"MZ");
    assert_eq!(state.search_mode, PatternMode::Text);
}

#[test]
fn search_hit_moves_and_can_be_undone() {
    let mut state = state();

    apply_search_outcome(&mut state, SearchOutcome::Found(0x400));
    assert_eq!(state.offset(), 0x400);

    handle_command(&mut state, Command::PageMove(PageMotion::Back));
    assert_eq!(state.offset(), 0);
}

#[test]
fn search_miss_is_an_error() {
    let mut state = state();

    apply_search_outcome(&mut state, SearchOutcome::NotFound);

    assert!(matches!(state.status(), Some(StatusMessage::Error(_))));
    assert!(state.take_bell());
}
