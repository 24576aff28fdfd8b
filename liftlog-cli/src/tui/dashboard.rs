use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use liftlog::Tracker;
use liftlog::auth::AuthSession;
use liftlog::metrics::{LiftSeries, WeeklyVolume};
use liftlog::program::day_names;
use liftlog::tracker::Dashboard;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::Line,
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph,
    },
};

use super::Screen;

const PALETTE: [Color; 6] = [
    Color::Cyan,
    Color::Magenta,
    Color::Yellow,
    Color::Green,
    Color::Blue,
    Color::Red,
];

/// Weeks shown on the volume chart.
const VOLUME_WEEKS: usize = 6;

pub struct DashboardScreen {
    today: NaiveDate,
    dashboard: Option<Dashboard>,
}

impl DashboardScreen {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            dashboard: None,
        }
    }
}

fn day_x(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

fn padded(min: f64, max: f64) -> [f64; 2] {
    if max - min < f64::EPSILON {
        [min - 1.0, max + 1.0]
    } else {
        let pad = (max - min) * 0.05;
        [min - pad, max + pad]
    }
}

fn date_axis<'a>(first: NaiveDate, last: NaiveDate) -> Axis<'a> {
    Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds(padded(day_x(first), day_x(last)))
        .labels(vec![first.to_string(), last.to_string()])
}

fn value_axis<'a>(bounds: [f64; 2]) -> Axis<'a> {
    let mid = (bounds[0] + bounds[1]) / 2.0;
    Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds(bounds)
        .labels(vec![
            format!("{:.1}", bounds[0]),
            format!("{:.1}", mid),
            format!("{:.1}", bounds[1]),
        ])
}

fn render_info(frame: &mut Frame, area: Rect, title: &str, message: &str) {
    let info = Paragraph::new(message)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL).title(title.to_string()));
    frame.render_widget(info, area);
}

fn render_line_chart(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    series: &[(NaiveDate, f64)],
    color: Color,
) {
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return;
    };
    let points: Vec<(f64, f64)> = series.iter().map(|(d, v)| (day_x(*d), *v)).collect();
    let (lo, hi) = points
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), (_, v)| (lo.min(*v), hi.max(*v)));

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points);
    let chart = Chart::new(vec![dataset])
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .x_axis(date_axis(first.0, last.0))
        .y_axis(value_axis(padded(lo, hi)));
    frame.render_widget(chart, area);
}

fn render_volume(frame: &mut Frame, area: Rect, volume: &[WeeklyVolume]) {
    let mut weeks: Vec<(NaiveDate, Vec<Bar>)> = Vec::new();
    for row in volume {
        let color_idx = day_names()
            .position(|d| d == row.day_name)
            .unwrap_or(PALETTE.len() - 1);
        let short: String = row.day_name.chars().take(3).collect();
        let bar = Bar::default()
            .value(row.volume.max(0.0).round() as u64)
            .label(Line::from(short))
            .style(Style::default().fg(PALETTE[color_idx % PALETTE.len()]));
        match weeks.last_mut() {
            Some((week, bars)) if *week == row.week_start => bars.push(bar),
            _ => weeks.push((row.week_start, vec![bar])),
        }
    }

    let skip = weeks.len().saturating_sub(VOLUME_WEEKS);
    let mut chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Weekly Volume by Session"),
        )
        .bar_width(5)
        .bar_gap(1)
        .group_gap(3);
    for (week, bars) in &weeks[skip..] {
        chart = chart.data(
            BarGroup::default()
                .label(Line::from(week.format("wk %m-%d").to_string()))
                .bars(bars),
        );
    }
    frame.render_widget(chart, area);
}

fn render_e1rm(frame: &mut Frame, area: Rect, lifts: &[LiftSeries]) {
    let all_dates = lifts.iter().flat_map(|l| l.points.iter().map(|(d, _)| *d));
    let (Some(first), Some(last)) = (all_dates.clone().min(), all_dates.max()) else {
        return;
    };

    // Scatter points and the two ends of the trend line, per lift.
    let series: Vec<(&str, Vec<(f64, f64)>, Vec<(f64, f64)>)> = lifts
        .iter()
        .map(|lift| {
            let points = lift.points.iter().map(|(d, v)| (day_x(*d), *v)).collect();
            let trend = lift
                .trend
                .map(|t| {
                    vec![
                        (day_x(first), t.value_at(first)),
                        (day_x(last), t.value_at(last)),
                    ]
                })
                .unwrap_or_default();
            (lift.exercise.as_str(), points, trend)
        })
        .collect();

    let (lo, hi) = series
        .iter()
        .flat_map(|(_, points, trend)| points.iter().chain(trend.iter()))
        .fold((f64::MAX, f64::MIN), |(lo, hi), (_, v)| (lo.min(*v), hi.max(*v)));

    let mut datasets = Vec::new();
    for (idx, (name, points, trend)) in series.iter().enumerate() {
        let color = PALETTE[idx % PALETTE.len()];
        datasets.push(
            Dataset::default()
                .name(name.to_string())
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(color))
                .data(points),
        );
        if !trend.is_empty() {
            datasets.push(
                Dataset::default()
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(color).add_modifier(Modifier::DIM))
                    .data(trend),
            );
        }
    }

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Estimated 1RM (selected lifts)"),
        )
        .x_axis(date_axis(first, last))
        .y_axis(value_axis(padded(lo, hi)));
    frame.render_widget(chart, area);
}

fn render_cards(frame: &mut Frame, area: Rect, dash: &Dashboard) {
    let cards = [
        ("Target Calories", dash.settings.calories.to_string()),
        ("Protein (g)", dash.settings.protein_g.to_string()),
        ("Fat (g)", dash.settings.fat_g.to_string()),
        ("TDEE est.", dash.settings.tdee.to_string()),
        (
            dash.carb_day.label(),
            format!("{} g carbs", dash.carb_target_g),
        ),
    ];
    let areas = Layout::horizontal([Constraint::Ratio(1, cards.len() as u32); 5]).split(area);
    for ((title, value), card_area) in cards.into_iter().zip(areas.iter()) {
        let card = Paragraph::new(value)
            .style(Style::default().add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(card, *card_area);
    }
}

impl Screen for DashboardScreen {
    fn title(&self) -> &'static str {
        "Dashboard"
    }

    fn reload(&mut self, tracker: &Tracker, auth: &AuthSession) -> Result<()> {
        self.today = super::today();
        self.dashboard = Some(tracker.dashboard(auth, self.today)?);
        Ok(())
    }

    fn has_form(&self) -> bool {
        false
    }

    fn hints(&self) -> &'static str {
        "overview"
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, _editing: bool) {
        let Some(dash) = &self.dashboard else {
            return;
        };
        let chunks = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Min(8),
            Constraint::Length(4),
        ])
        .split(area);

        render_cards(frame, chunks[0], dash);

        if dash.body.weight_kg.is_empty() {
            render_info(frame, chunks[1], "Overview", "Add body metrics to see charts.");
        } else {
            let halves =
                Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .split(chunks[1]);
            render_line_chart(
                frame,
                halves[0],
                "Body Weight (kg)",
                &dash.body.weight_kg,
                Color::Cyan,
            );
            render_line_chart(frame, halves[1], "Waist (cm)", &dash.body.waist_cm, Color::Magenta);
        }

        if dash.workout_count == 0 {
            render_info(
                frame,
                chunks[2],
                "Training Volume & e1RM",
                "Log workouts to see volume and e1RM charts.",
            );
        } else {
            let halves =
                Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .split(chunks[2]);
            render_volume(frame, halves[0], &dash.weekly_volume);
            if dash.e1rm.is_empty() {
                render_info(
                    frame,
                    halves[1],
                    "Estimated 1RM (selected lifts)",
                    "No sets logged for the key lifts yet.",
                );
            } else {
                render_e1rm(frame, halves[1], &dash.e1rm);
            }
        }

        let schedule: Vec<Line> = dash
            .football
            .iter()
            .map(|s| Line::from(format!("- {}: ~{} min, {}", s.name, s.duration_min, s.kind)))
            .collect();
        let football = Paragraph::new(schedule)
            .block(Block::default().borders(Borders::ALL).title("Football Schedule"));
        frame.render_widget(football, chunks[3]);
    }
}
