//! TUI rendering and terminal management (impure shell)
//!
//! [`TuiApp`] owns the terminal and the byte source. Keys are turned into commands by
//! [`KeyBindings`], applied to [`AppState`] by the pure handlers in [`crate::state`], and
//! whatever I/O they ask for (searching, exporting, patching) happens here. Long scans
//! draw a progress gauge on the bottom line and stop when the user presses Esc, `q` or
//! Ctrl-C.

pub mod hex_row;
pub mod status_bar;
pub mod styles;

pub use hex_row::{fit_columns, text_row_width, RowRenderer};
pub use status_bar::{gauge_line, prompt_line, status_line};
pub use styles::{ColorConfig, HexStyles};

use crate::config::keybindings::KeyBindings;
use crate::history::{HistoryStore, SearchRecord};
use crate::model::{AppError, CommandError, Direction, Pattern};
use crate::monitor::ScanMonitor;
use crate::page::{paginate, PageRequest};
use crate::search::{search_backward, search_forward};
use crate::source::export::{export_range, patch_range};
use crate::source::{ByteSource, TargetInfo};
use crate::sparse::SparseIndex;
use crate::state::prompt::{
    handle_backspace, handle_char_input, handle_cursor_left, handle_cursor_right, handle_end,
    handle_home, replace_input, search_prompt, toggle_search_mode,
};
use crate::state::{
    apply_search_outcome, handle_command, submit_prompt, AppState, ColonEffect, Effect, Prompt,
    PromptKind, StatusMessage, ViewConfig,
};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{Clear, Paragraph},
    Terminal,
};
use std::io::{self, Stdout, Write};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// How often the idle loop wakes up to collect background work.
const TICK: Duration = Duration::from_millis(250);

/// Everything a pager session needs besides the terminal.
pub struct Session {
    /// Reader for the target.
    pub source: Box<dyn ByteSource>,
    /// Facts about the target.
    pub info: TargetInfo,
    /// Initial layout.
    pub view: ViewConfig,
    /// First offset shown.
    pub start_offset: u64,
    /// Hole map, possibly still being built.
    pub sparse: Arc<SparseIndex>,
    /// Colon command history.
    pub command_history: HistoryStore<String>,
    /// Search history.
    pub search_history: HistoryStore<SearchRecord>,
    /// Colours.
    pub styles: HexStyles,
}

/// True for the keys that stop a long scan.
pub fn is_interrupt_key(key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Drain pending terminal input, reporting whether an interrupt key was among it.
fn poll_interrupt() -> bool {
    while let Ok(true) = event::poll(Duration::ZERO) {
        match event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                if is_interrupt_key(key) {
                    return true;
                }
            }
            Ok(_) => {}
            Err(e) => {
                debug!(error = %e, "reading input during scan failed");
                return false;
            }
        }
    }
    false
}

fn ring_terminal_bell() {
    let mut stdout = io::stdout();
    if let Err(e) = stdout.write_all(b"\x07").and_then(|()| stdout.flush()) {
        debug!(error = %e, "bell failed");
    }
}

/// Scan observer that paints the gauge straight to the backend.
///
/// The gauge bypasses ratatui's double buffering, so the owner must clear the terminal
/// before the next full draw once `shown` is set.
struct TerminalMonitor<'a, B: Backend> {
    terminal: &'a mut Terminal<B>,
    styles: &'a HexStyles,
    interrupt: &'a mut dyn FnMut() -> bool,
    file_size: u64,
    offset_width: usize,
    shown: bool,
}

impl<B: Backend> TerminalMonitor<'_, B> {
    fn draw_gauge(&mut self, offset: u64) -> io::Result<()> {
        let size = self.terminal.size()?;
        if size.height == 0 || size.width == 0 {
            return Ok(());
        }
        let y = size.height - 1;
        let line = gauge_line(
            offset,
            self.file_size,
            self.offset_width,
            usize::from(size.width),
            self.styles,
        );
        let mut row = Buffer::empty(Rect::new(0, y, size.width, 1));
        row.set_line(0, y, &line, size.width);

        let backend = self.terminal.backend_mut();
        backend.draw(
            row.content
                .iter()
                .enumerate()
                .map(|(x, cell)| (x as u16, y, cell)),
        )?;
        Backend::flush(backend)?;
        self.shown = true;
        Ok(())
    }
}

impl<B: Backend> ScanMonitor for TerminalMonitor<'_, B> {
    fn progress(&mut self, offset: u64) {
        if let Err(e) = self.draw_gauge(offset) {
            debug!(error = %e, "gauge draw failed");
        }
    }

    fn cancelled(&mut self) -> bool {
        (self.interrupt)()
    }
}

/// Main TUI application
///
/// Generic over backend to support testing with TestBackend
pub struct TuiApp<B>
where
    B: Backend,
{
    terminal: Terminal<B>,
    state: AppState,
    source: Box<dyn ByteSource>,
    info: TargetInfo,
    sparse: Arc<SparseIndex>,
    key_bindings: KeyBindings,
    styles: HexStyles,
    command_history: HistoryStore<String>,
    search_history: HistoryStore<SearchRecord>,
    /// The prompt as first opened, restored when history browsing runs past the newest.
    prompt_origin: Option<Prompt>,
    /// Column count chosen by the last automatic fit, refitted on resize.
    fitted_columns: Option<u64>,
    /// A gauge was painted outside ratatui's buffers.
    stale_screen: bool,
    interrupt: Box<dyn FnMut() -> bool>,
    bell: Box<dyn FnMut()>,
}

impl TuiApp<CrosstermBackend<Stdout>> {
    /// Create and initialize a new TUI application
    ///
    /// Sets up terminal in raw mode with alternate screen
    pub fn new(session: Session) -> Result<Self, AppError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let mut app = Self::with_backend(CrosstermBackend::new(stdout), session)?;
        app.interrupt = Box::new(poll_interrupt);
        app.bell = Box::new(ring_terminal_bell);
        Ok(app)
    }
}

impl<B> TuiApp<B>
where
    B: Backend,
{
    /// Build an app on any backend. Scans are never interrupted and the bell is silent
    /// until hooks are installed.
    pub fn with_backend(backend: B, session: Session) -> Result<Self, AppError> {
        let terminal = Terminal::new(backend)?;
        let state = AppState::new(
            session.info.path.display().to_string(),
            session.info.size,
            session.start_offset,
            session.view,
        );
        Ok(Self {
            terminal,
            state,
            source: session.source,
            info: session.info,
            sparse: session.sparse,
            key_bindings: KeyBindings::default(),
            styles: session.styles,
            command_history: session.command_history,
            search_history: session.search_history,
            prompt_origin: None,
            fitted_columns: None,
            stale_screen: false,
            interrupt: Box::new(|| false),
            bell: Box::new(|| {}),
        })
    }

    /// Replace the hook polled for cancellation during long scans.
    pub fn set_interrupt(&mut self, interrupt: impl FnMut() -> bool + 'static) {
        self.interrupt = Box::new(interrupt);
    }

    /// Replace the hook that rings the bell.
    pub fn set_bell(&mut self, bell: impl FnMut() + 'static) {
        self.bell = Box::new(bell);
    }

    /// Pager state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The terminal, for inspecting what was drawn.
    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    /// The error on the status line, if any.
    pub fn last_error(&self) -> Option<&str> {
        match self.state.status() {
            Some(StatusMessage::Error(text)) => Some(text),
            _ => None,
        }
    }

    /// Run the main event loop
    ///
    /// Returns when user quits. Redraws after every key and resize; idle ticks only
    /// collect background history loads.
    pub fn run(&mut self) -> Result<(), AppError> {
        self.draw()?;

        loop {
            if !event::poll(TICK)? {
                self.command_history.poll();
                self.search_history.poll();
                continue;
            }
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if self.handle_key(key) {
                        return Ok(());
                    }
                }
                Event::Resize(width, height) => self.handle_resize(width, height),
                _ => continue,
            }
            self.draw()?;
        }
    }

    fn handle_resize(&mut self, width: u16, height: u16) {
        debug!(width, height, "Terminal resized");
        if self.fitted_columns == Some(self.state.view.columns) {
            self.state.view.columns = 0;
        }
    }

    /// Handle a single keyboard event
    ///
    /// Returns true if app should quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.state.prompt.is_some() {
            self.handle_prompt_key(key);
            return false;
        }

        self.state.clear_status();
        let Some(command) = self.key_bindings.get(key) else {
            debug!(?key, "unbound key");
            return false;
        };
        debug!(?command, "command");

        let effect = handle_command(&mut self.state, command);
        if let Some(prompt) = &self.state.prompt {
            self.prompt_origin = Some(prompt.clone());
            self.command_history.reset_cursor();
            self.search_history.reset_cursor();
        }
        self.apply_effect(effect)
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        let Some(prompt) = self.state.prompt.take() else {
            return;
        };
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        let next = match key.code {
            KeyCode::Esc => None,
            KeyCode::Char('c') if ctrl => None,
            KeyCode::Enter => {
                self.submit(prompt);
                return;
            }
            KeyCode::Tab => Some(toggle_search_mode(prompt)),
            KeyCode::Up => Some(self.history_prev(prompt)),
            KeyCode::Down => Some(self.history_next(prompt)),
            KeyCode::Left => Some(handle_cursor_left(prompt)),
            KeyCode::Right => Some(handle_cursor_right(prompt)),
            KeyCode::Home => Some(handle_home(prompt)),
            KeyCode::End => Some(handle_end(prompt)),
            KeyCode::Backspace => Some(handle_backspace(prompt)),
            KeyCode::Char(ch) if !ctrl => Some(handle_char_input(prompt, ch)),
            _ => Some(prompt),
        };

        match next {
            Some(prompt) => {
                if prompt.rejected() {
                    self.state.ring();
                }
                self.state.prompt = Some(prompt);
            }
            None => self.prompt_origin = None,
        }
    }

    fn recalled_search(direction: Direction, record: &SearchRecord) -> Prompt {
        let text = record.pattern.display(record.mode);
        replace_input(search_prompt(direction, record.mode, None), text)
    }

    fn history_prev(&mut self, prompt: Prompt) -> Prompt {
        let recalled = match prompt.kind() {
            PromptKind::Command => self
                .command_history
                .prev()
                .map(|cmd| replace_input(prompt.clone(), cmd.clone())),
            PromptKind::Search { direction, .. } => self
                .search_history
                .prev()
                .map(|record| Self::recalled_search(direction, record)),
            _ => None,
        };
        recalled.unwrap_or_else(|| {
            self.state.ring();
            prompt
        })
    }

    fn history_next(&mut self, prompt: Prompt) -> Prompt {
        let recalled = match prompt.kind() {
            PromptKind::Command => self
                .command_history
                .next()
                .map(|cmd| replace_input(prompt.clone(), cmd.clone())),
            PromptKind::Search { direction, .. } => self
                .search_history
                .next()
                .map(|record| Self::recalled_search(direction, record)),
            _ => None,
        };
        if let Some(recalled) = recalled {
            return recalled;
        }

        // Past the newest entry: back to what the prompt first showed.
        match self.prompt_origin.clone() {
            Some(origin) if origin.input() != prompt.input() => {
                let text = origin.input().to_string();
                replace_input(origin, text)
            }
            _ => {
                self.state.ring();
                prompt
            }
        }
    }

    fn submit(&mut self, prompt: Prompt) {
        self.prompt_origin = None;
        match prompt.kind() {
            PromptKind::Command if !prompt.input().trim().is_empty() => {
                let _ = self.command_history.add(prompt.input().trim().to_string());
            }
            PromptKind::Search { mode, .. } => {
                if let Ok(pattern) = Pattern::parse(prompt.input(), mode) {
                    let _ = self.search_history.add(SearchRecord { mode, pattern });
                }
            }
            _ => {}
        }

        match submit_prompt(&mut self.state, &prompt) {
            Ok(effect) => {
                self.apply_effect(effect);
            }
            Err(e) => {
                debug!(error = %e, "prompt rejected");
                self.state.set_error(e);
            }
        }
    }

    /// Carry out the I/O a transition asked for. Returns true to quit.
    fn apply_effect(&mut self, effect: Effect) -> bool {
        match effect {
            Effect::None => false,
            Effect::Quit => true,
            Effect::Search(direction) => {
                self.run_search(direction);
                false
            }
            Effect::Colon(colon) => {
                self.run_colon(colon);
                false
            }
        }
    }

    fn run_search(&mut self, direction: Direction) {
        let Some(pattern) = self.state.search_pattern.clone() else {
            return;
        };
        let from = self.state.offset();
        let mut monitor = TerminalMonitor {
            terminal: &mut self.terminal,
            styles: &self.styles,
            interrupt: &mut *self.interrupt,
            file_size: self.info.size,
            offset_width: self.state.offset_width(),
            shown: false,
        };

        let result = match direction {
            Direction::Forward => search_forward(
                self.source.as_mut(),
                &self.sparse,
                &pattern,
                from,
                &mut monitor,
            ),
            Direction::Backward => search_backward(
                self.source.as_mut(),
                &self.sparse,
                &pattern,
                from,
                &mut monitor,
            ),
        };
        self.stale_screen |= monitor.shown;

        match result {
            Ok(outcome) => {
                debug!(?outcome, ?direction, from, "search finished");
                apply_search_outcome(&mut self.state, outcome);
            }
            Err(e) => {
                warn!(error = %e, "search failed");
                self.state.set_error(CommandError::Io(e));
            }
        }
    }

    fn run_colon(&mut self, colon: ColonEffect) {
        match colon {
            ColonEffect::None | ColonEffect::Beep => {}
            ColonEffect::Export { path, offset, len } => {
                let mut monitor = TerminalMonitor {
                    terminal: &mut self.terminal,
                    styles: &self.styles,
                    interrupt: &mut *self.interrupt,
                    file_size: self.info.size,
                    offset_width: self.state.offset_width(),
                    shown: false,
                };
                let result = export_range(self.source.as_mut(), &path, offset, len, &mut monitor);
                self.stale_screen |= monitor.shown;
                match result {
                    Ok(written) => self
                        .state
                        .set_message(format!("wrote {written:#x} bytes to {}", path.display())),
                    Err(e) => {
                        warn!(error = %e, path = %path.display(), "export failed");
                        self.state.set_error(CommandError::Io(e));
                    }
                }
            }
            ColonEffect::Patch { offset, len, data } => {
                match patch_range(&self.info.path, offset, len, data.as_bytes()) {
                    Ok(()) => {
                        self.state.skips.clear();
                        self.state
                            .set_message(format!("patched {len:#x} bytes at {offset:#x}"));
                    }
                    Err(e) => {
                        warn!(error = %e, offset, len, "patch failed");
                        self.state.set_error(CommandError::Io(e));
                    }
                }
            }
        }
    }

    /// Render the current frame
    ///
    /// Assembles the page for the current offset (fitting columns first if none are
    /// set), then draws it with the status or prompt line below.
    pub fn draw(&mut self) -> Result<(), AppError> {
        let size = self.terminal.size()?;
        let width = usize::from(size.width.max(1));
        let rows = size.height.saturating_sub(1).max(1);
        let offset_width = self.state.offset_width();

        if self.state.view.columns == 0 {
            let columns = fit_columns(&self.state.view, offset_width, width);
            debug!(columns, width, "Fitted columns");
            self.state.view.columns = columns;
            self.fitted_columns = Some(columns);
        }
        self.state.sync_skips();
        self.state.page_rows = u64::from(rows);

        let layout = self
            .state
            .view
            .page_layout(text_row_width(&self.state.view, offset_width, width));
        let request = PageRequest::new(self.state.offset(), usize::from(rows), layout)
            .with_sparse(&self.sparse);
        let mut monitor = TerminalMonitor {
            terminal: &mut self.terminal,
            styles: &self.styles,
            interrupt: &mut *self.interrupt,
            file_size: self.info.size,
            offset_width,
            shown: false,
        };
        let page = paginate(
            self.source.as_mut(),
            &request,
            &mut self.state.skips,
            &mut monitor,
        );
        self.stale_screen |= monitor.shown;

        self.state.next_offset = page.next_offset;
        if let Some(e) = page.error {
            warn!(error = %e, offset = page.next_offset, "read failed");
            self.state.set_error(format!("read error at {:#x}: {e}", page.next_offset));
        }
        if page.interrupted {
            info!(offset = page.next_offset, "page interrupted");
            self.state.set_message("interrupted");
        }
        if self.state.take_bell() {
            (self.bell)();
        }

        let renderer = RowRenderer::new(&self.state.view, &self.styles, offset_width, width);
        let lines: Vec<Line<'static>> = page.rows.iter().map(|row| renderer.line(row)).collect();
        let bottom = match &self.state.prompt {
            Some(prompt) => prompt_line(prompt, &self.styles),
            None => status_line(&self.state, &self.styles, width),
        };

        if std::mem::take(&mut self.stale_screen) {
            self.terminal.clear()?;
        }
        self.terminal.draw(|frame| {
            let area = frame.area();
            let [page_area, status_area] =
                Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);
            frame.render_widget(Clear, area);
            frame.render_widget(Paragraph::new(lines), page_area);
            frame.render_widget(Paragraph::new(bottom), status_area);
        })?;

        Ok(())
    }
}

/// Run a pager session on the real terminal.
///
/// The terminal is restored whether or not the session ends in an error. On a clean exit
/// the last status-line error, if any, is returned so the caller can print it.
pub fn run_session(session: Session) -> Result<Option<String>, AppError> {
    let mut app = TuiApp::new(session)?;
    let result = app.run();
    let last_error = app.last_error().map(str::to_string);
    drop(app);
    restore_terminal()?;
    result.map(|()| last_error)
}

/// Restore terminal to normal state
pub fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(LeaveAlternateScreen)?;
    stdout.execute(cursor::Show)?;
    Ok(())
}

#[cfg(test)]
#[path = "view_tests.rs"]
mod tests;
