use anyhow::Result;
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};
use liftlog::Tracker;
use liftlog::auth::AuthSession;
use liftlog::db::models::{BodyMetric, NewBodyMetric};
use liftlog::limits::{self, BODY_WEIGHT, INTAKE, SLEEP, STEPS, WAIST};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph, Row, Table, TableState},
};

use super::Screen;
use super::form::{Field, Form, FormEvent};

const DATE: usize = 0;
const WEIGHT_FIELD: usize = 1;
const WAIST_FIELD: usize = 2;
const SLEEP_FIELD: usize = 3;
const STEPS_FIELD: usize = 4;
const CALORIES: usize = 5;

pub struct BodyMetricsScreen {
    today: NaiveDate,
    form: Form,
    history: Vec<BodyMetric>,
    table_state: TableState,
}

impl BodyMetricsScreen {
    pub fn new(today: NaiveDate) -> Self {
        let form = Form::new(vec![
            Field::date("Date", today),
            Field::number("Body weight (kg)", BODY_WEIGHT),
            Field::number("Waist (cm @ navel)", WAIST),
            Field::number("Sleep (hours)", SLEEP),
            Field::integer("Steps", STEPS),
            Field::integer("Calories (kcal)", INTAKE),
        ]);
        Self {
            today,
            form,
            history: Vec::new(),
            table_state: TableState::default(),
        }
    }

    fn roll_over(&mut self, now: NaiveDate) {
        self.form.roll_date(DATE, self.today, now);
        self.today = now;
    }

    fn metric(&self) -> Result<NewBodyMetric> {
        let metric = NewBodyMetric {
            metric_date: self.form.date(DATE)?,
            weight_kg: self.form.number(WEIGHT_FIELD)?,
            waist_cm: self.form.number(WAIST_FIELD)?,
            sleep_h: self.form.number(SLEEP_FIELD)?,
            steps: self.form.integer(STEPS_FIELD)?,
            calories: self.form.integer(CALORIES)?,
        };
        limits::check_body_metric(&metric)?;
        Ok(metric)
    }
}

impl Screen for BodyMetricsScreen {
    fn title(&self) -> &'static str {
        "Body Metrics"
    }

    fn reload(&mut self, tracker: &Tracker, auth: &AuthSession) -> Result<()> {
        self.roll_over(super::today());
        self.history = tracker.body_metric_history(auth)?;
        if self.history.is_empty() {
            self.table_state.select(None);
        } else {
            let selected = self.table_state.selected().unwrap_or(0);
            self.table_state
                .select(Some(selected.min(self.history.len() - 1)));
        }
        Ok(())
    }

    fn hints(&self) -> &'static str {
        "e: add entry | j/k: scroll history"
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, editing: bool) {
        let chunks = Layout::vertical([Constraint::Length(8), Constraint::Min(3)]).split(area);
        self.form.render(frame, chunks[0], "Add new entry", editing);

        if self.history.is_empty() {
            let empty_msg = Paragraph::new("No body metrics recorded yet.")
                .style(Style::default().fg(Color::Gray))
                .block(Block::default().borders(Borders::ALL).title("History"));
            frame.render_widget(empty_msg, chunks[1]);
            return;
        }

        let rows: Vec<Row> = self
            .history
            .iter()
            .map(|m| {
                Row::new(vec![
                    m.metric_date.to_string(),
                    format!("{:.1}", m.weight_kg),
                    format!("{:.1}", m.waist_cm),
                    format!("{:.1}", m.sleep_h),
                    m.steps.to_string(),
                    m.calories.to_string(),
                ])
            })
            .collect();
        let table = Table::new(rows, [Constraint::Ratio(1, 6); 6])
            .header(
                Row::new(vec![
                    "metric_date",
                    "weight_kg",
                    "waist_cm",
                    "sleep_h",
                    "steps",
                    "calories",
                ])
                .style(Style::default().add_modifier(Modifier::BOLD)),
            )
            .row_highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("History ({} entries)", self.history.len())),
            );
        frame.render_stateful_widget(table, chunks[1], &mut self.table_state);
    }

    fn handle_edit(
        &mut self,
        key: KeyEvent,
        tracker: &Tracker,
        auth: &AuthSession,
    ) -> Result<Option<String>> {
        match self.form.handle_key(key) {
            FormEvent::Submit => {
                let metric = self.metric()?;
                tracker.record_body_metric(auth, &metric)?;
                Ok(Some("Saved.".to_string()))
            }
            _ => Ok(None),
        }
    }

    fn handle_browse(
        &mut self,
        key: KeyEvent,
        _tracker: &Tracker,
        _auth: &AuthSession,
    ) -> Result<Option<String>> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.table_state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.table_state.select_previous(),
            _ => {}
        }
        Ok(None)
    }
}
