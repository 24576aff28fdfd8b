use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use crossterm::event::KeyEvent;
use liftlog::Tracker;
use liftlog::auth::AuthSession;
use liftlog::db::models::{SETTINGS_ROW_ID, Settings};
use liftlog::limits::{
    self, CARBS_FOOTBALL, CARBS_LIFT, CARBS_REST, CUT_CALORIES, FAT, PROTEIN, TDEE,
};
use liftlog::program::carb_day;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::Screen;
use super::form::{Field, Form, FormEvent};

const CARB_TIP: &str = "Tip: On Thursday (football) and Saturday (match), use football carbs \
                        target; on Mon/Tue/Fri use lift-day carbs; on rest use rest-day carbs.";

pub struct SettingsScreen {
    today: NaiveDate,
    form: Form,
    saved: Settings,
}

impl SettingsScreen {
    pub fn new(today: NaiveDate) -> Self {
        let form = Form::new(vec![
            Field::integer("Cut Calories", CUT_CALORIES),
            Field::integer("Protein (g)", PROTEIN),
            Field::integer("Fat (g)", FAT),
            Field::integer("Carbs Rest (g)", CARBS_REST),
            Field::integer("Carbs Lift Day (g)", CARBS_LIFT),
            Field::integer("Carbs Football Day (g)", CARBS_FOOTBALL),
            Field::integer("TDEE Estimate", TDEE),
        ]);
        Self {
            today,
            form,
            saved: Settings::default(),
        }
    }

    fn fill(&mut self, settings: &Settings) {
        let values = [
            settings.calories,
            settings.protein_g,
            settings.fat_g,
            settings.carb_g_rest,
            settings.carb_g_lift,
            settings.carb_g_football,
            settings.tdee,
        ];
        for (idx, value) in values.into_iter().enumerate() {
            self.form.set_value(idx, value);
        }
    }

    fn values(&self) -> Result<Settings> {
        let settings = Settings {
            id: SETTINGS_ROW_ID,
            calories: self.form.integer(0)?,
            protein_g: self.form.integer(1)?,
            fat_g: self.form.integer(2)?,
            carb_g_rest: self.form.integer(3)?,
            carb_g_lift: self.form.integer(4)?,
            carb_g_football: self.form.integer(5)?,
            tdee: self.form.integer(6)?,
        };
        limits::check_settings(&settings)?;
        Ok(settings)
    }
}

impl Screen for SettingsScreen {
    fn title(&self) -> &'static str {
        "Settings"
    }

    fn reload(&mut self, tracker: &Tracker, auth: &AuthSession) -> Result<()> {
        self.today = super::today();
        self.saved = tracker.settings(auth)?;
        let saved = self.saved;
        self.fill(&saved);
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, editing: bool) {
        let chunks = Layout::vertical([Constraint::Length(9), Constraint::Min(4)]).split(area);
        self.form
            .render(frame, chunks[0], "Nutrition targets & TDEE", editing);

        let day = carb_day(self.today.weekday());
        let deficit = self.saved.tdee - self.saved.calories;
        let info = Paragraph::new(vec![
            Line::from(CARB_TIP),
            Line::from(""),
            Line::from(format!(
                "Today is a {}: {} g carbs. Planned deficit: {} kcal/day.",
                day.label(),
                self.saved.carb_target(day),
                deficit
            )),
        ])
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(info, chunks[1]);
    }

    fn handle_edit(
        &mut self,
        key: KeyEvent,
        tracker: &Tracker,
        auth: &AuthSession,
    ) -> Result<Option<String>> {
        match self.form.handle_key(key) {
            FormEvent::Submit => {
                let values = self.values()?;
                tracker.save_settings(auth, &values)?;
                Ok(Some("Saved.".to_string()))
            }
            _ => Ok(None),
        }
    }
}
