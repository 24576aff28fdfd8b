use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use crossterm::event::KeyEvent;
use liftlog::Tracker;
use liftlog::auth::AuthSession;
use liftlog::db::models::{NewWorkoutEntry, WorkoutEntry};
use liftlog::limits::{self, REPS, RIR, SETS, WEIGHT};
use liftlog::metrics::estimated_one_rep_max;
use liftlog::program::{PROGRAM, ProgramDay, SetScheme, day_for_weekday};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph, Row, Table},
};

use super::Screen;
use super::form::{Field, Form, FormEvent};

const DATE: usize = 0;
const DAY: usize = 1;
const EXERCISE: usize = 2;
const SETS_FIELD: usize = 3;
const REPS_FIELD: usize = 4;
const WEIGHT_FIELD: usize = 5;
const RIR_FIELD: usize = 6;
const NOTES: usize = 7;

pub struct LogWorkoutScreen {
    today: NaiveDate,
    form: Form,
    todays_log: Vec<WorkoutEntry>,
}

fn exercise_names(day: &ProgramDay) -> Vec<String> {
    day.exercises.iter().map(|e| e.name.to_string()).collect()
}

fn day_names() -> Vec<String> {
    PROGRAM.iter().map(|d| d.name.to_string()).collect()
}

/// The day trained on `date`, or the first program day on rest days.
fn default_day(date: NaiveDate) -> usize {
    day_for_weekday(date.weekday())
        .and_then(|d| PROGRAM.iter().position(|p| p.name == d.name))
        .unwrap_or(0)
}

impl LogWorkoutScreen {
    pub fn new(today: NaiveDate) -> Self {
        let day_idx = default_day(today);
        let form = Form::new(vec![
            Field::date("Session Date", today),
            Field::choice("Day / Session", day_names(), day_idx),
            Field::choice("Exercise", exercise_names(&PROGRAM[day_idx]), 0),
            Field::integer("Sets completed", SETS),
            Field::integer("Reps per set (avg)", REPS),
            Field::number("Weight (kg) (per DB if applicable)", WEIGHT),
            Field::number("RIR (reps in reserve)", RIR),
            Field::text("Notes (PR, tempo, etc.)", ""),
        ]);
        let mut screen = Self {
            today,
            form,
            todays_log: Vec::new(),
        };
        screen.apply_scheme();
        screen
    }

    /// Carries an untouched session date and day over to a new `now`.
    fn roll_over(&mut self, now: NaiveDate) {
        if now == self.today {
            return;
        }
        let default_day_kept = self.form.selected(DAY) == default_day(self.today);
        if self.form.roll_date(DATE, self.today, now) && default_day_kept {
            self.form.set_options(DAY, day_names(), default_day(now));
            self.sync_exercises();
        }
        self.today = now;
    }

    fn day(&self) -> &'static ProgramDay {
        &PROGRAM[self.form.selected(DAY)]
    }

    fn sync_exercises(&mut self) {
        let day = self.day();
        self.form.set_options(EXERCISE, exercise_names(day), 0);
        self.apply_scheme();
    }

    /// Prefills sets and reps from the selected exercise's program scheme.
    fn apply_scheme(&mut self) {
        let Some(exercise) = self.day().exercise(self.form.text(EXERCISE)) else {
            return;
        };
        if let Ok(scheme) = SetScheme::parse(exercise.scheme) {
            let sets = f64::from(scheme.sets).clamp(SETS.min, SETS.max);
            let reps = f64::from(scheme.reps_low).clamp(REPS.min, REPS.max);
            self.form.set_value(SETS_FIELD, sets);
            self.form.set_value(REPS_FIELD, reps);
        }
    }

    fn entry(&self) -> Result<NewWorkoutEntry> {
        let notes = self.form.text(NOTES);
        let entry = NewWorkoutEntry {
            session_date: self.form.date(DATE)?,
            day_name: self.day().name.to_string(),
            exercise: self.form.text(EXERCISE).to_string(),
            sets: Some(self.form.integer(SETS_FIELD)?),
            reps: Some(self.form.integer(REPS_FIELD)?),
            weight: Some(self.form.number(WEIGHT_FIELD)?),
            rir: Some(self.form.number(RIR_FIELD)?),
            notes: (!notes.is_empty()).then(|| notes.to_string()),
        };
        limits::check_workout(&entry)?;
        Ok(entry)
    }

    fn render_reference(&self, frame: &mut Frame, area: Rect) {
        let day = self.day();
        let selected = self.form.text(EXERCISE);
        let rows: Vec<Row> = day
            .exercises
            .iter()
            .map(|e| {
                let row = Row::new(vec![e.name, e.scheme, e.notes]);
                if e.name == selected {
                    row.style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                } else {
                    row
                }
            })
            .collect();
        let table = Table::new(
            rows,
            [
                Constraint::Percentage(45),
                Constraint::Percentage(20),
                Constraint::Percentage(35),
            ],
        )
        .header(
            Row::new(vec!["Exercise", "Sets x Reps", "Notes"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Program reference: {}", day.name)),
        );
        frame.render_widget(table, area);
    }

    fn render_log(&self, frame: &mut Frame, area: Rect) {
        let title = format!("Today's log ({})", self.form.text(DATE));
        if self.todays_log.is_empty() {
            let empty_msg = Paragraph::new("Nothing logged for this date yet.")
                .style(Style::default().fg(Color::Gray))
                .block(Block::default().borders(Borders::ALL).title(title));
            frame.render_widget(empty_msg, area);
            return;
        }

        let opt = |v: Option<String>| v.unwrap_or_default();
        let rows: Vec<Row> = self
            .todays_log
            .iter()
            .map(|w| {
                Row::new(vec![
                    w.id.to_string(),
                    w.exercise.clone(),
                    opt(w.sets.map(|s| s.to_string())),
                    opt(w.reps.map(|r| r.to_string())),
                    opt(w.weight.map(|kg| format!("{:.1}", kg))),
                    opt(w.rir.map(|r| format!("{:.1}", r))),
                    opt(estimated_one_rep_max(w.weight, w.reps).map(|e| format!("{:.1}", e))),
                    w.notes.clone().unwrap_or_default(),
                ])
            })
            .collect();
        let table = Table::new(
            rows,
            [
                Constraint::Length(5),
                Constraint::Percentage(30),
                Constraint::Length(5),
                Constraint::Length(5),
                Constraint::Length(8),
                Constraint::Length(5),
                Constraint::Length(7),
                Constraint::Min(10),
            ],
        )
        .header(
            Row::new(vec!["id", "exercise", "sets", "reps", "weight", "rir", "e1RM", "notes"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(table, area);
    }
}

impl Screen for LogWorkoutScreen {
    fn title(&self) -> &'static str {
        "Log Workout"
    }

    fn reload(&mut self, tracker: &Tracker, auth: &AuthSession) -> Result<()> {
        self.roll_over(super::today());
        self.todays_log = match self.form.date(DATE) {
            Ok(date) => tracker.todays_log(auth, date)?,
            Err(_) => Vec::new(),
        };
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, editing: bool) {
        let rows = Layout::vertical([Constraint::Length(10), Constraint::Min(3)]).split(area);
        let top = Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(rows[0]);
        self.form.render(frame, top[0], "Add Entry", editing);
        self.render_reference(frame, top[1]);
        self.render_log(frame, rows[1]);
    }

    fn handle_edit(
        &mut self,
        key: KeyEvent,
        tracker: &Tracker,
        auth: &AuthSession,
    ) -> Result<Option<String>> {
        match self.form.handle_key(key) {
            FormEvent::Edited(DAY) => {
                self.sync_exercises();
                Ok(None)
            }
            FormEvent::Edited(EXERCISE) => {
                self.apply_scheme();
                Ok(None)
            }
            FormEvent::Edited(DATE) => {
                self.reload(tracker, auth)?;
                Ok(None)
            }
            FormEvent::Submit => {
                let entry = self.entry()?;
                tracker.log_workout(auth, std::slice::from_ref(&entry))?;
                self.form.set_value(NOTES, "");
                Ok(Some(format!("Saved {}.", entry.exercise)))
            }
            _ => Ok(None),
        }
    }
}
