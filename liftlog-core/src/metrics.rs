//! Derived values computed from stored rows: estimated one-rep max, weekly
//! training volume and the chart series built from them. All functions are
//! pure.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::db::models::{BodyMetric, WorkoutEntry};

/// The Brzycki denominator reaches zero here; estimates at or past it are
/// rejected.
pub const BRZYCKI_REP_LIMIT: i32 = 37;

/// Brzycki estimate `weight * 36 / (37 - reps)`.
///
/// Returns `None` when either input is missing, `reps <= 0`, or
/// `reps >= 37` where the formula stops meaning anything.
pub fn estimated_one_rep_max(weight: Option<f64>, reps: Option<i32>) -> Option<f64> {
    let (weight, reps) = (weight?, reps?);
    if weight.is_nan() || reps <= 0 || reps >= BRZYCKI_REP_LIMIT {
        return None;
    }
    Some(weight * 36.0 / f64::from(BRZYCKI_REP_LIMIT - reps))
}

/// sets x reps x weight, or `None` if any factor is missing.
pub fn entry_volume(entry: &WorkoutEntry) -> Option<f64> {
    Some(f64::from(entry.sets?) * f64::from(entry.reps?) * entry.weight?)
}

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.weekday().num_days_from_monday()))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyVolume {
    pub week_start: NaiveDate,
    pub day_name: String,
    pub volume: f64,
}

/// Sums entry volume per (week, program day). Entries with a missing factor
/// still open their group but add nothing to it.
pub fn weekly_volume(entries: &[WorkoutEntry]) -> Vec<WeeklyVolume> {
    let mut groups: BTreeMap<(NaiveDate, &str), Vec<f64>> = BTreeMap::new();
    for entry in entries {
        groups
            .entry((week_start(entry.session_date), entry.day_name.as_str()))
            .or_default()
            .push(entry_volume(entry).unwrap_or(0.0));
    }

    groups
        .into_iter()
        .map(|((week_start, day_name), mut volumes)| {
            // sorted so the float sum does not depend on input order
            volumes.sort_by(f64::total_cmp);
            WeeklyVolume {
                week_start,
                day_name: day_name.to_string(),
                volume: volumes.iter().sum(),
            }
        })
        .collect()
}

/// Ordinary least squares line over (days since `origin`, value).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trend {
    pub origin: NaiveDate,
    pub slope_per_day: f64,
    pub intercept: f64,
}

impl Trend {
    pub fn value_at(&self, date: NaiveDate) -> f64 {
        let days = (date - self.origin).num_days() as f64;
        self.intercept + self.slope_per_day * days
    }
}

/// Needs at least two distinct dates.
pub fn linear_trend(points: &[(NaiveDate, f64)]) -> Option<Trend> {
    let origin = points.iter().map(|(d, _)| *d).min()?;
    if points.len() < 2 {
        return None;
    }

    let n = points.len() as f64;
    let xs: Vec<f64> = points
        .iter()
        .map(|(d, _)| (*d - origin).num_days() as f64)
        .collect();
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut sxx, mut sxy) = (0.0, 0.0);
    for (x, (_, y)) in xs.iter().zip(points) {
        sxx += (x - mean_x) * (x - mean_x);
        sxy += (x - mean_x) * (y - mean_y);
    }
    if sxx == 0.0 {
        return None;
    }

    let slope_per_day = sxy / sxx;
    Some(Trend {
        origin,
        slope_per_day,
        intercept: mean_y - slope_per_day * mean_x,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiftSeries {
    pub exercise: String,
    pub points: Vec<(NaiveDate, f64)>,
    pub trend: Option<Trend>,
}

/// e1RM points per lift, date ordered. Lifts with no usable sets are
/// left out; the rest keep the order of `lifts`.
pub fn e1rm_series(entries: &[WorkoutEntry], lifts: &[&str]) -> Vec<LiftSeries> {
    lifts
        .iter()
        .filter_map(|lift| {
            let mut points: Vec<(NaiveDate, f64)> = entries
                .iter()
                .filter(|e| e.exercise == *lift)
                .filter_map(|e| {
                    estimated_one_rep_max(e.weight, e.reps).map(|v| (e.session_date, v))
                })
                .collect();
            if points.is_empty() {
                return None;
            }
            points.sort_by_key(|(d, _)| *d);
            let trend = linear_trend(&points);
            Some(LiftSeries {
                exercise: lift.to_string(),
                points,
                trend,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BodySeries {
    pub weight_kg: Vec<(NaiveDate, f64)>,
    pub waist_cm: Vec<(NaiveDate, f64)>,
}

pub fn body_series(metrics: &[BodyMetric]) -> BodySeries {
    let mut sorted: Vec<&BodyMetric> = metrics.iter().collect();
    sorted.sort_by_key(|m| m.metric_date);
    BodySeries {
        weight_kg: sorted.iter().map(|m| (m.metric_date, m.weight_kg)).collect(),
        waist_cm: sorted.iter().map(|m| (m.metric_date, m.waist_cm)).collect(),
    }
}
