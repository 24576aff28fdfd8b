mod body_metrics;
mod dashboard;
mod form;
mod log_workout;
mod photos;
mod settings;
mod transfer;

pub use photos::read_image;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use crossterm::event::{self, KeyCode, KeyEvent, KeyEventKind};
use liftlog::auth::{AuthSession, Gate};
use liftlog::{Tracker, TrackerError};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph, Tabs},
};

const APP_TITLE: &str = "4-Day Live Training Tracker";

/// One tab of the app.
trait Screen {
    fn title(&self) -> &'static str;

    /// Re-reads everything the screen shows.
    fn reload(&mut self, tracker: &Tracker, auth: &AuthSession) -> Result<()>;

    fn render(&mut self, frame: &mut Frame, area: Rect, editing: bool);

    fn has_form(&self) -> bool {
        true
    }

    fn hints(&self) -> &'static str {
        "e: edit form"
    }

    /// Keys while the form has focus. Returns a status line once an action ran.
    fn handle_edit(
        &mut self,
        _key: KeyEvent,
        _tracker: &Tracker,
        _auth: &AuthSession,
    ) -> Result<Option<String>> {
        Ok(None)
    }

    /// Keys while browsing, for the screen's own tables and lists.
    fn handle_browse(
        &mut self,
        _key: KeyEvent,
        _tracker: &Tracker,
        _auth: &AuthSession,
    ) -> Result<Option<String>> {
        Ok(None)
    }
}

enum InputMode {
    Normal,
    Editing,
}

struct App<'a> {
    tracker: &'a Tracker,
    auth: AuthSession,
    screens: Vec<Box<dyn Screen>>,
    selected: usize,
    input_mode: InputMode,
    status_message: String,
    /// The footer shows a failure.
    status_error: bool,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

impl<'a> App<'a> {
    fn new(tracker: &'a Tracker, auth: AuthSession) -> Self {
        let today = today();
        let screens: Vec<Box<dyn Screen>> = vec![
            Box::new(dashboard::DashboardScreen::new(today)),
            Box::new(log_workout::LogWorkoutScreen::new(today)),
            Box::new(body_metrics::BodyMetricsScreen::new(today)),
            Box::new(photos::PhotosScreen::new(today)),
            Box::new(settings::SettingsScreen::new(today)),
            Box::new(transfer::TransferScreen::new()),
        ];
        let mut app = Self {
            tracker,
            auth,
            screens,
            selected: 0,
            input_mode: InputMode::Normal,
            status_message: String::new(),
            status_error: false,
        };
        app.select(0);
        app
    }

    fn normal_hints(&self) -> String {
        let screen = &self.screens[self.selected];
        format!(
            "←/→: switch tab | {} | r: reload | q: quit",
            screen.hints()
        )
    }

    fn show(&mut self, message: String) {
        self.status_message = message;
        self.status_error = false;
    }

    fn fail(&mut self, e: anyhow::Error) {
        log::warn!("Action failed: {e:#}");
        self.status_message = format!("Error: {e}");
        self.status_error = true;
    }

    fn select(&mut self, idx: usize) {
        self.selected = idx;
        self.input_mode = InputMode::Normal;
        match self.reload() {
            Ok(()) => {
                let hints = self.normal_hints();
                self.show(hints);
            }
            Err(e) => self.fail(e),
        }
    }

    fn reload(&mut self) -> Result<()> {
        let (tracker, auth) = (self.tracker, &self.auth);
        self.screens[self.selected].reload(tracker, auth)
    }

    fn draw(&mut self, frame: &mut Frame) {
        let chunks = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

        // Header with tabs
        let titles: Vec<&str> = self.screens.iter().map(|s| s.title()).collect();
        let tabs = Tabs::new(titles)
            .select(self.selected)
            .highlight_style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .block(Block::default().borders(Borders::ALL).title(APP_TITLE));
        frame.render_widget(tabs, chunks[0]);

        let editing = matches!(self.input_mode, InputMode::Editing);
        self.screens[self.selected].render(frame, chunks[1], editing);

        // Footer with status
        let color = if self.status_error {
            Color::Red
        } else {
            Color::White
        };
        let footer = Paragraph::new(self.status_message.as_str())
            .style(Style::default().fg(color))
            .block(Block::default().borders(Borders::ALL).title("Status"));
        frame.render_widget(footer, chunks[2]);
    }

    /// Returns false once the user quits. Failures land in the footer.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let (tracker, auth) = (self.tracker, &self.auth);
        match self.input_mode {
            InputMode::Normal => match key.code {
                KeyCode::Char('q') | KeyCode::Char('Q') => return false,
                KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => {
                    self.select((self.selected + 1) % self.screens.len());
                }
                KeyCode::Left | KeyCode::Char('h') | KeyCode::BackTab => {
                    let len = self.screens.len();
                    self.select((self.selected + len - 1) % len);
                }
                KeyCode::Char(c @ '1'..='6') => {
                    let idx = c as usize - '1' as usize;
                    if idx < self.screens.len() {
                        self.select(idx);
                    }
                }
                KeyCode::Char('r') | KeyCode::Char('R') => match self.reload() {
                    Ok(()) => self.show("Reloaded.".to_string()),
                    Err(e) => self.fail(e),
                },
                KeyCode::Char('e') | KeyCode::Char('E') | KeyCode::Enter
                    if self.screens[self.selected].has_form() =>
                {
                    self.input_mode = InputMode::Editing;
                    self.show(
                        "Tab/↑/↓: field | ←/→: adjust | Enter: submit | Esc: done".to_string(),
                    );
                }
                _ => {
                    let outcome = self.screens[self.selected].handle_browse(key, tracker, auth);
                    self.apply(outcome);
                }
            },
            InputMode::Editing => match key.code {
                KeyCode::Esc => {
                    self.input_mode = InputMode::Normal;
                    let hints = self.normal_hints();
                    self.show(hints);
                }
                _ => {
                    let outcome = self.screens[self.selected].handle_edit(key, tracker, auth);
                    self.apply(outcome);
                }
            },
        }
        true
    }

    /// Shows the result of a screen action and re-runs the screen, so
    /// every view reflects the write that just happened.
    fn apply(&mut self, outcome: Result<Option<String>>) {
        match outcome {
            Ok(Some(message)) => match self.reload() {
                Ok(()) => self.show(message),
                Err(e) => self.fail(e),
            },
            Ok(None) => {}
            Err(e) => self.fail(e),
        }
    }
}

/// Asks for the passcode until it matches. `None` when the user gives up.
fn run_lock_screen(terminal: &mut DefaultTerminal, gate: &Gate) -> Result<Option<AuthSession>> {
    let mut input_buffer = String::new();
    let mut status_message = "Enter: unlock | Esc: quit".to_string();

    loop {
        terminal.draw(|frame| {
            let chunks = Layout::vertical([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(3),
            ])
            .split(frame.area());

            let header = Paragraph::new(APP_TITLE)
                .style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(header, chunks[0]);

            let masked = "*".repeat(input_buffer.chars().count());
            let input_widget = Paragraph::new(masked)
                .style(Style::default().fg(Color::Yellow))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title("Enter passcode"),
                );
            frame.render_widget(input_widget, chunks[1]);

            let footer = Paragraph::new(status_message.as_str())
                .style(Style::default().fg(Color::White))
                .block(Block::default().borders(Borders::ALL).title("Status"));
            frame.render_widget(footer, chunks[3]);
        })?;

        if let event::Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Esc => return Ok(None),
                KeyCode::Enter => match gate.unlock(&input_buffer) {
                    Ok(auth) => return Ok(Some(auth)),
                    Err(TrackerError::WrongPasscode) => {
                        input_buffer.clear();
                        status_message = "Wrong passcode".to_string();
                    }
                    Err(e) => return Err(e.into()),
                },
                KeyCode::Char(c) => input_buffer.push(c),
                KeyCode::Backspace => {
                    input_buffer.pop();
                }
                _ => {}
            }
        }
    }
}

pub fn run(mut terminal: DefaultTerminal, tracker: &Tracker) -> Result<()> {
    let auth = match tracker.gate().open_session() {
        Some(auth) => auth,
        None => match run_lock_screen(&mut terminal, tracker.gate())? {
            Some(auth) => auth,
            None => return Ok(()),
        },
    };

    let mut app = App::new(tracker, auth);
    loop {
        terminal.draw(|frame| app.draw(frame))?;

        if let event::Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if !app.handle_key(key) {
                return Ok(());
            }
        }
    }
}
