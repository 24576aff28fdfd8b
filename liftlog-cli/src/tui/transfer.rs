use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result, bail};
use crossterm::event::KeyEvent;
use liftlog::Tracker;
use liftlog::auth::AuthSession;
use liftlog::db::operations::Table;
use liftlog::transfer::WORKOUT_IMPORT_COLUMNS;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
};

use super::Screen;
use super::form::{Field, Form, FormEvent};

const ACTION: usize = 0;
const PATH: usize = 1;

const EXPORT: usize = 0;
const DEFAULT_EXPORT_DIR: &str = "export";
const DEFAULT_IMPORT_FILE: &str = "export/workouts.csv";

pub struct TransferScreen {
    form: Form,
    counts: Vec<(Table, usize)>,
}

impl TransferScreen {
    pub fn new() -> Self {
        let form = Form::new(vec![
            Field::choice(
                "Action",
                vec!["Export CSVs".to_string(), "Import Workouts CSV".to_string()],
                EXPORT,
            ),
            Field::text("Directory / file", DEFAULT_EXPORT_DIR),
        ]);
        Self {
            form,
            counts: Vec::new(),
        }
    }

    fn run(&self, tracker: &Tracker, auth: &AuthSession) -> Result<String> {
        let path = Path::new(self.form.text(PATH));
        if path.as_os_str().is_empty() {
            bail!("Enter a directory or file path");
        }

        if self.form.selected(ACTION) == EXPORT {
            let written = tracker.export_all(auth, path)?;
            let summary: Vec<String> = written
                .iter()
                .map(|(file, rows)| format!("{} ({} rows)", file.display(), rows))
                .collect();
            Ok(format!("Exported {}", summary.join(", ")))
        } else {
            let file =
                File::open(path).with_context(|| format!("opening {}", path.display()))?;
            let imported = tracker.import_workouts_csv(auth, file)?;
            Ok(format!("Imported {} rows.", imported))
        }
    }
}

impl Screen for TransferScreen {
    fn title(&self) -> &'static str {
        "Data Export/Import"
    }

    fn reload(&mut self, tracker: &Tracker, auth: &AuthSession) -> Result<()> {
        self.counts = tracker.row_counts(auth)?;
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, editing: bool) {
        let chunks = Layout::vertical([Constraint::Length(4), Constraint::Min(4)]).split(area);
        self.form.render(frame, chunks[0], "Export or import", editing);

        let mut lines: Vec<Line> = self
            .counts
            .iter()
            .map(|(table, rows)| Line::from(format!("{}: {} rows", table, rows)))
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(
            "Export writes workouts.csv, body_metrics.csv and photos_meta.csv.",
        ));
        lines.push(Line::from(format!(
            "Import columns: {}",
            WORKOUT_IMPORT_COLUMNS.join(", ")
        )));
        let info = Paragraph::new(lines)
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL).title("Tables"));
        frame.render_widget(info, chunks[1]);
    }

    fn handle_edit(
        &mut self,
        key: KeyEvent,
        tracker: &Tracker,
        auth: &AuthSession,
    ) -> Result<Option<String>> {
        match self.form.handle_key(key) {
            FormEvent::Edited(ACTION) => {
                let path = if self.form.selected(ACTION) == EXPORT {
                    DEFAULT_EXPORT_DIR
                } else {
                    DEFAULT_IMPORT_FILE
                };
                self.form.set_value(PATH, path);
                Ok(None)
            }
            FormEvent::Submit => self.run(tracker, auth).map(Some),
            _ => Ok(None),
        }
    }
}
