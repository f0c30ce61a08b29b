//! Integration tests: drive the pager over a real file with a TestBackend.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use hexpager::history::HistoryStore;
use hexpager::source::open_target;
use hexpager::sparse::SparseIndex;
use hexpager::state::ViewConfig;
use hexpager::view::{ColorConfig, HexStyles, Session, TuiApp};
use ratatui::backend::TestBackend;
use std::sync::Arc;

fn open_app(bytes: &[u8], view: ViewConfig) -> (tempfile::TempDir, TuiApp<TestBackend>) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fixture.bin");
    std::fs::write(&path, bytes).unwrap();
    let target = open_target(&path).unwrap();

    let session = Session {
        source: target.source,
        info: target.info,
        view,
        start_offset: 0,
        sparse: Arc::new(SparseIndex::from_holes(Vec::new())),
        command_history: HistoryStore::in_memory(),
        search_history: HistoryStore::in_memory(),
        styles: HexStyles::with_color_config(ColorConfig::new(false)),
    };
    let app = TuiApp::with_backend(TestBackend::new(80, 12), session).unwrap();
    (dir, app)
}

fn press(app: &mut TuiApp<TestBackend>, code: KeyCode) -> bool {
    let quit = app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    app.draw().unwrap();
    quit
}

fn first_row(app: &TuiApp<TestBackend>) -> String {
    let buffer = app.terminal().backend().buffer();
    (0..buffer.area.width)
        .map(|x| buffer[(x, 0)].symbol())
        .collect()
}

#[test]
fn paging_down_and_back_up_over_collapsed_runs() {
    // GIVEN a file with a long run of identical rows between two distinct regions
    let mut bytes: Vec<u8> = (0..=255u8).collect();
    bytes.extend(std::iter::repeat(0x5a).take(0x4000));
    bytes.extend((0..=255u8).rev());
    let (_dir, mut app) = open_app(&bytes, ViewConfig::default());
    app.draw().unwrap();

    // WHEN paging down twice then up twice
    press(&mut app, KeyCode::PageDown);
    let second_page = app.state().offset();
    press(&mut app, KeyCode::PageDown);
    press(&mut app, KeyCode::PageUp);
    assert_eq!(app.state().offset(), second_page);
    press(&mut app, KeyCode::PageUp);

    // THEN the first page is back exactly
    assert_eq!(app.state().offset(), 0);
    assert!(first_row(&app).starts_with("00000000: 00 01 02"));
}

#[test]
fn end_key_shows_the_tail_of_the_file() {
    let bytes: Vec<u8> = (0..0x1000u32).map(|i| (i % 251) as u8).collect();
    let view = ViewConfig {
        columns: 16,
        ..ViewConfig::default()
    };
    let (_dir, mut app) = open_app(&bytes, view);
    app.draw().unwrap();

    press(&mut app, KeyCode::End);

    // Eleven rows fit above the status line; the last one is the end label.
    assert_eq!(app.state().offset(), 0x1000 - 10 * 16);
    assert!(first_row(&app).starts_with("00000F60:"));
}

#[test]
fn text_mode_toggle_redraws_as_text() {
    let (_dir, mut app) = open_app(b"hello\nworld\n", ViewConfig::default());
    app.draw().unwrap();

    press(&mut app, KeyCode::Tab);

    assert!(first_row(&app).starts_with("00000000: helloₐ"));
}
