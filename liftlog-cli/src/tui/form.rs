use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};
use liftlog::limits::Bound;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

pub enum FieldKind {
    Number(Bound),
    Integer(Bound),
    Date,
    Text,
    Choice(Vec<String>),
}

pub struct Field {
    label: &'static str,
    kind: FieldKind,
    value: String,
    choice: usize,
}

impl Field {
    pub fn number(label: &'static str, bound: Bound) -> Self {
        Self::new(label, FieldKind::Number(bound), format!("{:.1}", bound.default))
    }

    pub fn integer(label: &'static str, bound: Bound) -> Self {
        Self::new(label, FieldKind::Integer(bound), format!("{:.0}", bound.default))
    }

    pub fn date(label: &'static str, date: NaiveDate) -> Self {
        Self::new(label, FieldKind::Date, date.to_string())
    }

    pub fn text(label: &'static str, value: &str) -> Self {
        Self::new(label, FieldKind::Text, value.to_string())
    }

    pub fn choice(label: &'static str, options: Vec<String>, selected: usize) -> Self {
        let mut field = Self::new(label, FieldKind::Choice(Vec::new()), String::new());
        field.set_options(options, selected);
        field
    }

    fn new(label: &'static str, kind: FieldKind, value: String) -> Self {
        Self {
            label,
            kind,
            value,
            choice: 0,
        }
    }

    fn set_options(&mut self, options: Vec<String>, selected: usize) {
        self.choice = selected.min(options.len().saturating_sub(1));
        self.value = options.get(self.choice).cloned().unwrap_or_default();
        self.kind = FieldKind::Choice(options);
    }

    fn accepts(&self, c: char) -> bool {
        match self.kind {
            FieldKind::Number(_) => c.is_ascii_digit() || c == '.',
            FieldKind::Integer(_) => c.is_ascii_digit(),
            FieldKind::Date => c.is_ascii_digit() || c == '-',
            FieldKind::Text => true,
            FieldKind::Choice(_) => false,
        }
    }

    /// Left/Right: step a number, move a date by a day or cycle a choice.
    fn adjust(&mut self, up: bool) -> bool {
        match &self.kind {
            FieldKind::Number(bound) | FieldKind::Integer(bound) => {
                let current = self.value.trim().parse::<f64>().unwrap_or(bound.default);
                let next = if up {
                    bound.step_up(current)
                } else {
                    bound.step_down(current)
                };
                self.value = match self.kind {
                    FieldKind::Integer(_) => format!("{:.0}", next),
                    _ => format!("{:.1}", next),
                };
                true
            }
            FieldKind::Date => {
                let Ok(date) = NaiveDate::parse_from_str(self.value.trim(), "%Y-%m-%d") else {
                    return false;
                };
                let next = if up { date.succ_opt() } else { date.pred_opt() };
                match next {
                    Some(d) => {
                        self.value = d.to_string();
                        true
                    }
                    None => false,
                }
            }
            FieldKind::Choice(options) if !options.is_empty() => {
                let len = options.len();
                self.choice = if up {
                    (self.choice + 1) % len
                } else {
                    (self.choice + len - 1) % len
                };
                self.value = options[self.choice].clone();
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEvent {
    Ignored,
    Edited(usize),
    Submit,
}

pub struct Form {
    fields: Vec<Field>,
    focus: usize,
}

impl Form {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields, focus: 0 }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormEvent {
        let len = self.fields.len();
        if len == 0 {
            return FormEvent::Ignored;
        }
        let field = &mut self.fields[self.focus];

        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.focus = (self.focus + 1) % len;
                FormEvent::Ignored
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = (self.focus + len - 1) % len;
                FormEvent::Ignored
            }
            KeyCode::Enter => FormEvent::Submit,
            KeyCode::Left | KeyCode::Right => {
                if field.adjust(key.code == KeyCode::Right) {
                    FormEvent::Edited(self.focus)
                } else {
                    FormEvent::Ignored
                }
            }
            KeyCode::Char(c) if field.accepts(c) => {
                field.value.push(c);
                FormEvent::Edited(self.focus)
            }
            KeyCode::Backspace if !matches!(field.kind, FieldKind::Choice(_)) => {
                field.value.pop();
                FormEvent::Edited(self.focus)
            }
            _ => FormEvent::Ignored,
        }
    }

    pub fn set_value(&mut self, idx: usize, value: impl ToString) {
        self.fields[idx].value = value.to_string();
    }

    pub fn set_options(&mut self, idx: usize, options: Vec<String>, selected: usize) {
        self.fields[idx].set_options(options, selected);
    }

    pub fn text(&self, idx: usize) -> &str {
        self.fields[idx].value.trim()
    }

    /// Index of the selected option of a choice field.
    pub fn selected(&self, idx: usize) -> usize {
        self.fields[idx].choice
    }

    pub fn number(&self, idx: usize) -> Result<f64> {
        let field = &self.fields[idx];
        let value = field
            .value
            .trim()
            .parse::<f64>()
            .map_err(|_| anyhow!("{} must be a number", field.label))?;
        match &field.kind {
            FieldKind::Number(bound) | FieldKind::Integer(bound) => Ok(bound.check(value)?),
            _ => Ok(value),
        }
    }

    pub fn integer(&self, idx: usize) -> Result<i32> {
        let field = &self.fields[idx];
        let value = field
            .value
            .trim()
            .parse::<i32>()
            .map_err(|_| anyhow!("{} must be a whole number", field.label))?;
        match &field.kind {
            FieldKind::Number(bound) | FieldKind::Integer(bound) => Ok(bound.check_int(value)?),
            _ => Ok(value),
        }
    }

    pub fn date(&self, idx: usize) -> Result<NaiveDate> {
        let field = &self.fields[idx];
        NaiveDate::parse_from_str(field.value.trim(), "%Y-%m-%d")
            .map_err(|_| anyhow!("{} must be a date like 2025-03-03", field.label))
    }

    /// Moves a date field still showing `from` on to `to`. Dates the user
    /// typed in are left alone.
    pub fn roll_date(&mut self, idx: usize, from: NaiveDate, to: NaiveDate) -> bool {
        if matches!(self.date(idx), Ok(date) if date == from) {
            self.set_value(idx, to);
            true
        } else {
            false
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, title: &str, editing: bool) {
        let lines: Vec<Line> = self
            .fields
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                let focused = editing && idx == self.focus;
                let value = match field.kind {
                    FieldKind::Choice(_) => format!("< {} >", field.value),
                    _ if focused => format!("{}_", field.value),
                    _ => field.value.clone(),
                };
                let style = if focused {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                Line::from(vec![
                    Span::styled(format!("{}: ", field.label), Style::default().fg(Color::Gray)),
                    Span::styled(value, style),
                ])
            })
            .collect();

        let border = if editing { Color::Yellow } else { Color::White };
        let form = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(title.to_string()),
        );
        frame.render_widget(form, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use liftlog::limits::{REPS, RIR, WEIGHT};

    fn press(form: &mut Form, code: KeyCode) -> FormEvent {
        form.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(form: &mut Form, s: &str) {
        for c in s.chars() {
            press(form, KeyCode::Char(c));
        }
    }

    fn sample() -> Form {
        Form::new(vec![
            Field::integer("Reps", REPS),
            Field::number("Weight", WEIGHT),
            Field::choice("Day", vec!["Push".into(), "Pull".into()], 0),
            Field::date("Date", NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()),
            Field::text("Notes", ""),
        ])
    }

    #[test]
    fn roll_date_only_moves_untouched_dates() {
        let monday = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        let mut form = sample();
        assert!(form.roll_date(3, monday, tuesday));
        assert_eq!(form.date(3).unwrap(), tuesday);

        form.set_value(3, "2025-02-28");
        assert!(!form.roll_date(3, tuesday, monday));
        assert_eq!(form.text(3), "2025-02-28");
    }

    #[test]
    fn defaults_are_prefilled() {
        let form = sample();
        assert_eq!(form.integer(0).unwrap(), 8);
        assert_eq!(form.number(1).unwrap(), 0.0);
        assert_eq!(form.text(2), "Push");
        assert_eq!(form.date(3).unwrap(), NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
    }

    #[test]
    fn typing_respects_field_kind() {
        let mut form = sample();
        press(&mut form, KeyCode::Backspace);
        type_str(&mut form, "1x2");
        assert_eq!(form.text(0), "12");
        assert_eq!(form.integer(0).unwrap(), 12);

        press(&mut form, KeyCode::Tab);
        press(&mut form, KeyCode::Backspace);
        press(&mut form, KeyCode::Backspace);
        press(&mut form, KeyCode::Backspace);
        type_str(&mut form, "27.5");
        assert_eq!(form.number(1).unwrap(), 27.5);

        press(&mut form, KeyCode::BackTab);
        press(&mut form, KeyCode::BackTab);
        assert_eq!(press(&mut form, KeyCode::Char('x')), FormEvent::Edited(4));
        assert_eq!(form.text(4), "x");
        assert_eq!(press(&mut form, KeyCode::Enter), FormEvent::Submit);
    }

    #[test]
    fn values_outside_bounds_are_errors() {
        let mut form = sample();
        form.set_value(0, "31");
        let err = form.integer(0).unwrap_err();
        assert_eq!(err.to_string(), "reps must be between 1 and 30, got 31");

        form.set_value(1, "heavy");
        assert_eq!(form.number(1).unwrap_err().to_string(), "Weight must be a number");

        form.set_value(3, "03/03/2025");
        assert!(form.date(3).is_err());
    }

    #[test]
    fn arrows_step_and_cycle() {
        let mut form = Form::new(vec![
            Field::number("RIR", RIR),
            Field::choice("Day", vec!["Push".into(), "Pull".into()], 0),
            Field::date("Date", NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()),
        ]);
        assert_eq!(press(&mut form, KeyCode::Right), FormEvent::Edited(0));
        assert_eq!(form.number(0).unwrap(), 2.0);
        for _ in 0..10 {
            press(&mut form, KeyCode::Right);
        }
        assert_eq!(form.number(0).unwrap(), 4.0);

        press(&mut form, KeyCode::Down);
        press(&mut form, KeyCode::Left);
        assert_eq!(form.selected(1), 1);
        assert_eq!(form.text(1), "Pull");
        assert_eq!(press(&mut form, KeyCode::Char('a')), FormEvent::Ignored);

        press(&mut form, KeyCode::Down);
        press(&mut form, KeyCode::Right);
        assert_eq!(form.date(2).unwrap(), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
    }

    #[test]
    fn replacing_options_clamps_selection() {
        let mut form = sample();
        form.set_options(2, vec!["Legs".into()], 3);
        assert_eq!(form.selected(2), 0);
        assert_eq!(form.text(2), "Legs");
    }
}
