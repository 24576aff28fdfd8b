use chrono::NaiveDate;
use diesel::{AsChangeset, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::db::schema;

/// Row id of the only settings record.
pub const SETTINGS_ROW_ID: i32 = 1;

// Workout models
#[derive(Queryable, Serialize, Debug, Clone, PartialEq)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WorkoutEntry {
    pub id: i32,
    pub session_date: NaiveDate,
    pub day_name: String,
    pub exercise: String,
    pub sets: Option<i32>,
    /// Average reps per set.
    pub reps: Option<i32>,
    /// Kilograms, per dumbbell where that applies.
    pub weight: Option<f64>,
    pub rir: Option<f64>,
    pub notes: Option<String>,
}

impl fmt::Display for WorkoutEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rir_str = self.rir.map(|r| format!(" @{:.1} RIR", r)).unwrap_or_default();

        write!(
            f,
            "{}: {} x {} @ {:.1}kg{}",
            self.exercise,
            self.sets.map(|s| s.to_string()).unwrap_or_else(|| "?".into()),
            self.reps.map(|r| r.to_string()).unwrap_or_else(|| "?".into()),
            self.weight.unwrap_or(0.0),
            rir_str
        )
    }
}

#[derive(Insertable, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = schema::workouts)]
pub struct NewWorkoutEntry {
    pub session_date: NaiveDate,
    pub day_name: String,
    pub exercise: String,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub weight: Option<f64>,
    pub rir: Option<f64>,
    pub notes: Option<String>,
}

// Body metric models
#[derive(Queryable, Serialize, Debug, Clone, PartialEq)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BodyMetric {
    pub id: i32,
    pub metric_date: NaiveDate,
    pub weight_kg: f64,
    /// Measured at the navel.
    pub waist_cm: f64,
    pub sleep_h: f64,
    pub steps: i32,
    pub calories: i32,
}

#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = schema::body_metrics)]
pub struct NewBodyMetric {
    pub metric_date: NaiveDate,
    pub weight_kg: f64,
    pub waist_cm: f64,
    pub sleep_h: f64,
    pub steps: i32,
    pub calories: i32,
}

// Photo models
#[derive(Queryable, Debug, Clone)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Photo {
    pub id: i32,
    pub photo_date: NaiveDate,
    pub caption: String,
    /// Base64 of a JPEG no larger than 1280x1280.
    pub image_b64: String,
}

impl fmt::Display for Photo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.photo_date, self.caption)
    }
}

#[derive(Insertable)]
#[diesel(table_name = schema::photos)]
pub struct NewPhoto {
    pub photo_date: NaiveDate,
    pub caption: String,
    pub image_b64: String,
}

/// The exported view of a photo row; payloads stay in the store.
#[derive(Queryable, Serialize, Debug, Clone, PartialEq)]
pub struct PhotoMeta {
    pub photo_date: NaiveDate,
    pub caption: String,
}

// Settings model
#[derive(Queryable, Insertable, AsChangeset, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[diesel(table_name = schema::settings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Settings {
    pub id: i32,
    pub calories: i32,
    pub protein_g: i32,
    pub fat_g: i32,
    pub carb_g_rest: i32,
    pub carb_g_lift: i32,
    pub carb_g_football: i32,
    pub tdee: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            id: SETTINGS_ROW_ID,
            calories: 2450,
            protein_g: 190,
            fat_g: 60,
            carb_g_rest: 220,
            carb_g_lift: 280,
            carb_g_football: 320,
            tdee: 3000,
        }
    }
}
