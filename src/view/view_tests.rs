//! Event-loop tests against a TestBackend.

use super::*;
use crate::model::PatternMode;
use crate::source::MemorySource;
use ratatui::backend::TestBackend;
use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

fn session(bytes: Vec<u8>, path: PathBuf, columns: u64) -> Session {
    let size = bytes.len() as u64;
    Session {
        source: Box::new(MemorySource::new(bytes)),
        info: TargetInfo {
            path,
            size,
            is_block_device: false,
            alignment: 0,
        },
        view: ViewConfig {
            columns,
            ..ViewConfig::default()
        },
        start_offset: 0,
        sparse: Arc::new(SparseIndex::from_holes(Vec::new())),
        command_history: HistoryStore::in_memory(),
        search_history: HistoryStore::in_memory(),
        styles: HexStyles::with_color_config(ColorConfig::new(true)),
    }
}

fn app_with(bytes: Vec<u8>, columns: u64) -> TuiApp<TestBackend> {
    let session = session(bytes, PathBuf::from("mem.bin"), columns);
    TuiApp::with_backend(TestBackend::new(80, 10), session).unwrap()
}

fn counting(bytes: usize) -> Vec<u8> {
    (0..=255u8).cycle().take(bytes).collect()
}

fn press(app: &mut TuiApp<TestBackend>, code: KeyCode) -> bool {
    app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn type_text(app: &mut TuiApp<TestBackend>, text: &str) {
    for ch in text.chars() {
        press(app, KeyCode::Char(ch));
    }
}

fn command(app: &mut TuiApp<TestBackend>, line: &str) {
    press(app, KeyCode::Char(':'));
    type_text(app, line);
    press(app, KeyCode::Enter);
}

fn row_text(app: &TuiApp<TestBackend>, y: u16) -> String {
    let buffer = app.terminal().backend().buffer();
    (0..buffer.area.width)
        .map(|x| buffer[(x, y)].symbol())
        .collect()
}

fn bell_counter(app: &mut TuiApp<TestBackend>) -> Rc<Cell<u32>> {
    let rings = Rc::new(Cell::new(0));
    let counter = Rc::clone(&rings);
    app.set_bell(move || counter.set(counter.get() + 1));
    rings
}

#[test]
fn first_draw_shows_rows_and_status() {
    let mut app = app_with(counting(0x400), 16);

    app.draw().unwrap();

    assert!(row_text(&app, 0).starts_with("00000000: 00 01 02 03"));
    assert!(row_text(&app, 8).starts_with("00000080: 80 81"));
    let status = row_text(&app, 9);
    assert!(status.starts_with(':'));
    assert!(status.trim_end().ends_with("mem.bin"));
    assert_eq!(app.state().page_rows, 9);
    assert_eq!(app.state().next_offset, 0x90);
}

#[test]
fn columns_are_fitted_on_first_draw_and_refitted_on_resize() {
    let mut app = app_with(counting(0x400), 0);

    app.draw().unwrap();
    assert_eq!(app.state().view.columns, 16);

    app.handle_resize(200, 10);
    assert_eq!(app.state().view.columns, 0);
}

#[test]
fn chosen_columns_survive_resize() {
    let mut app = app_with(counting(0x400), 0);
    app.draw().unwrap();
    command(&mut app, "set cols=8");

    app.handle_resize(200, 10);

    assert_eq!(app.state().view.columns, 8);
}

#[test]
fn quit_keys_end_the_session() {
    let mut app = app_with(counting(16), 16);
    assert!(press(&mut app, KeyCode::Char('q')));
    assert!(press(&mut app, KeyCode::Esc));
    assert!(!press(&mut app, KeyCode::Down));
}

#[test]
fn goto_prompt_replaces_prefill_and_jumps() {
    let mut app = app_with(counting(0x400), 16);

    press(&mut app, KeyCode::Char('g'));
    assert_eq!(app.state().prompt.as_ref().map(Prompt::input), Some("0"));
    type_text(&mut app, "100");
    press(&mut app, KeyCode::Enter);
    app.draw().unwrap();

    assert!(app.state().prompt.is_none());
    assert_eq!(app.state().offset(), 0x100);
    assert!(row_text(&app, 0).starts_with("00000100: 00 01"));
}

#[test]
fn escape_closes_a_prompt_without_quitting() {
    let mut app = app_with(counting(0x400), 16);

    press(&mut app, KeyCode::Char('g'));
    let quit = press(&mut app, KeyCode::Esc);

    assert!(!quit);
    assert!(app.state().prompt.is_none());
}

#[test]
fn out_of_range_goto_rings_and_reports() {
    let mut app = app_with(counting(0x400), 16);
    let rings = bell_counter(&mut app);

    press(&mut app, KeyCode::Char('g'));
    type_text(&mut app, "fff");
    press(&mut app, KeyCode::Enter);
    app.draw().unwrap();

    assert_eq!(rings.get(), 1);
    assert!(app.last_error().unwrap().starts_with("offset out of range"));
    assert!(row_text(&app, 9).starts_with("offset out of range"));
}

#[test]
fn rejected_prompt_character_rings() {
    let mut app = app_with(counting(0x400), 16);
    let rings = bell_counter(&mut app);

    press(&mut app, KeyCode::Char('g'));
    press(&mut app, KeyCode::Char('z'));
    app.draw().unwrap();

    assert_eq!(rings.get(), 1);
    assert_eq!(app.state().prompt.as_ref().map(Prompt::input), Some("0"));
}

#[test]
fn open_prompt_replaces_status_line() {
    let mut app = app_with(counting(0x400), 16);

    press(&mut app, KeyCode::Char('c'));
    app.draw().unwrap();

    assert!(row_text(&app, 9).starts_with("cols: 16"));
}

#[test]
fn repeated_rows_collapse_to_a_star() {
    let mut app = app_with(vec![0; 0x1000], 16);

    app.draw().unwrap();

    assert!(row_text(&app, 0).starts_with("00000000: 00 00"));
    assert_eq!(row_text(&app, 1).trim_end(), "*");
}

#[test]
fn search_finds_pattern_then_reports_no_more() {
    let mut bytes = vec![0u8; 0x1000];
    bytes[0x700] = 0xde;
    bytes[0x701] = 0xad;
    let mut app = app_with(bytes, 16);

    press(&mut app, KeyCode::Char('/'));
    type_text(&mut app, "dead");
    press(&mut app, KeyCode::Enter);

    assert_eq!(app.state().offset(), 0x700);
    assert_eq!(app.search_history.len(), 1);

    press(&mut app, KeyCode::Char('n'));

    assert_eq!(app.state().offset(), 0x700);
    assert_eq!(app.last_error(), Some("pattern not found"));
}

#[test]
fn interrupted_search_leaves_offset_alone() {
    let mut app = app_with(vec![0; 0x1000], 16);
    app.set_interrupt(|| true);
    app.state.search_pattern = Some(Pattern::from_hex("ff").unwrap());

    press(&mut app, KeyCode::Char('n'));

    assert_eq!(app.state().offset(), 0);
    assert_eq!(
        app.state().status(),
        Some(&StatusMessage::Info("search interrupted".to_string()))
    );
}

#[test]
fn command_history_is_browsable_and_returns_to_origin() {
    let mut app = app_with(counting(0x400), 16);
    command(&mut app, "set cols=8");
    assert_eq!(app.state().view.columns, 8);

    press(&mut app, KeyCode::Char(':'));
    press(&mut app, KeyCode::Up);
    assert_eq!(app.state().prompt.as_ref().map(Prompt::input), Some("set cols=8"));

    press(&mut app, KeyCode::Down);
    assert_eq!(app.state().prompt.as_ref().map(Prompt::input), Some(""));
}

#[test]
fn browsing_past_history_rings() {
    let mut app = app_with(counting(0x400), 16);
    let rings = bell_counter(&mut app);

    press(&mut app, KeyCode::Char(':'));
    press(&mut app, KeyCode::Up);
    app.draw().unwrap();

    assert_eq!(rings.get(), 1);
}

#[test]
fn recalled_search_keeps_its_mode() {
    // GIVEN a text search in history
    let mut app = app_with(counting(0x400), 16);
    let _ = app.search_history.add(SearchRecord {
        mode: PatternMode::Text,
        pattern: Pattern::parse("MZ", PatternMode::Text).unwrap(),
    });

    // WHEN a hex search prompt recalls it
    press(&mut app, KeyCode::Char('/'));
    press(&mut app, KeyCode::Up);

    // THEN the prompt switches to text mode
    let prompt = app.state().prompt.clone().unwrap();
    assert_eq!(
        prompt.kind(),
        PromptKind::Search {
            direction: Direction::Forward,
            mode: PatternMode::Text
        }
    );
    assert_eq!(prompt.input(), "MZ");
}

#[test]
fn write_command_exports_a_range() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("out.bin");
    let bytes = counting(0x400);
    let mut app = app_with(bytes.clone(), 16);

    command(&mut app, &format!("write {} 10", dest.display()));

    assert_eq!(std::fs::read(&dest).unwrap(), bytes[..0x10]);
    match app.state().status() {
        Some(StatusMessage::Info(text)) => assert!(text.starts_with("wrote 0x10 bytes")),
        other => panic!("unexpected status {other:?}"),
    }
}

#[test]
fn patch_command_writes_through_to_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("disk.img");
    std::fs::write(&path, vec![0u8; 0x100]).unwrap();
    let session = session(vec![0u8; 0x100], path.clone(), 16);
    let mut app = TuiApp::with_backend(TestBackend::new(80, 10), session).unwrap();

    command(&mut app, "patch ab 4");
    assert!(app.last_error().unwrap().starts_with("writes are disabled"));

    command(&mut app, "set allowWrite=y");
    command(&mut app, "patch ab 4");

    let written = std::fs::read(&path).unwrap();
    assert_eq!(written[..5], [0xab, 0xab, 0xab, 0xab, 0x00]);
    assert!(app.last_error().is_none());
}

#[test]
fn interrupt_keys() {
    let key = |code, modifiers| KeyEvent::new(code, modifiers);
    assert!(is_interrupt_key(key(KeyCode::Esc, KeyModifiers::NONE)));
    assert!(is_interrupt_key(key(KeyCode::Char('Q'), KeyModifiers::SHIFT)));
    assert!(is_interrupt_key(key(KeyCode::Char('c'), KeyModifiers::CONTROL)));
    assert!(!is_interrupt_key(key(KeyCode::Char('c'), KeyModifiers::NONE)));
}
