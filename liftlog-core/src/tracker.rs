//! The request handlers behind every screen. Each one checks the caller's
//! session, opens a short-lived connection and delegates to the accessors.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use diesel::sqlite::SqliteConnection;
use log::debug;
use serde::Serialize;

use crate::auth::{AuthSession, Gate};
use crate::config::Config;
use crate::db::Store;
use crate::db::models::{BodyMetric, NewBodyMetric, NewWorkoutEntry, Photo, Settings, WorkoutEntry};
use crate::db::operations::{self, Table, TableRows};
use crate::metrics::{BodySeries, LiftSeries, WeeklyVolume, body_series, e1rm_series, weekly_volume};
use crate::photos::photo_dimensions;
use crate::program::{CarbDay, FOOTBALL, FootballSession, KEY_LIFTS, carb_day};
use crate::transfer::{self, Export};

pub struct Tracker {
    store: Store,
    gate: Gate,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub settings: Settings,
    pub today: NaiveDate,
    pub carb_day: CarbDay,
    pub carb_target_g: i32,
    pub body: BodySeries,
    pub weekly_volume: Vec<WeeklyVolume>,
    pub e1rm: Vec<LiftSeries>,
    pub football: &'static [FootballSession],
    pub workout_count: usize,
    pub metric_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryItem {
    pub id: i32,
    pub photo_date: NaiveDate,
    pub caption: String,
    pub width: u32,
    pub height: u32,
    /// Size of the stored JPEG.
    pub bytes: usize,
}

impl Tracker {
    pub fn new(store: Store, gate: Gate) -> Self {
        Self { store, gate }
    }

    /// Opens the configured database and gate.
    pub fn open(config: &Config) -> Result<Self> {
        let store = Store::open(&config.database_url)?;
        Ok(Self::new(store, Gate::new(config.passcode.clone())))
    }

    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    fn connect(&self, auth: &AuthSession) -> Result<SqliteConnection> {
        self.gate.verify(auth)?;
        self.store.connect()
    }

    pub fn dashboard(&self, auth: &AuthSession, today: NaiveDate) -> Result<Dashboard> {
        let mut conn = self.connect(auth)?;
        let settings = operations::get_settings(&mut conn)?;
        let workouts = operations::load_workouts(&mut conn)?;
        let metrics = operations::load_body_metrics(&mut conn)?;
        debug!(
            "Building dashboard from {} workouts and {} metrics",
            workouts.len(),
            metrics.len()
        );

        let carb_day = carb_day(today.weekday());
        Ok(Dashboard {
            settings,
            today,
            carb_day,
            carb_target_g: settings.carb_target(carb_day),
            body: body_series(&metrics),
            weekly_volume: weekly_volume(&workouts),
            e1rm: e1rm_series(&workouts, KEY_LIFTS),
            football: FOOTBALL,
            workout_count: workouts.len(),
            metric_count: metrics.len(),
        })
    }

    pub fn log_workout(
        &self,
        auth: &AuthSession,
        entries: &[NewWorkoutEntry],
    ) -> Result<Vec<WorkoutEntry>> {
        let mut conn = self.connect(auth)?;
        operations::write_workout_entries(&mut conn, entries)
    }

    pub fn todays_log(&self, auth: &AuthSession, date: NaiveDate) -> Result<Vec<WorkoutEntry>> {
        let mut conn = self.connect(auth)?;
        operations::load_workouts_for_date(&mut conn, date)
    }

    pub fn record_body_metric(
        &self,
        auth: &AuthSession,
        metric: &NewBodyMetric,
    ) -> Result<BodyMetric> {
        let mut conn = self.connect(auth)?;
        operations::write_body_metric(&mut conn, metric)
    }

    /// Newest date first.
    pub fn body_metric_history(&self, auth: &AuthSession) -> Result<Vec<BodyMetric>> {
        let mut conn = self.connect(auth)?;
        let mut metrics = operations::load_body_metrics(&mut conn)?;
        metrics.sort_by(|a, b| b.metric_date.cmp(&a.metric_date).then(b.id.cmp(&a.id)));
        Ok(metrics)
    }

    pub fn upload_photo(
        &self,
        auth: &AuthSession,
        photo_date: NaiveDate,
        caption: &str,
        bytes: &[u8],
    ) -> Result<Photo> {
        let mut conn = self.connect(auth)?;
        operations::write_photo(&mut conn, photo_date, caption, bytes)
    }

    pub fn gallery(&self, auth: &AuthSession) -> Result<Vec<GalleryItem>> {
        let mut conn = self.connect(auth)?;
        operations::load_photos(&mut conn)?
            .into_iter()
            .map(|photo| {
                let (width, height) = photo_dimensions(&photo.image_b64)?;
                Ok(GalleryItem {
                    id: photo.id,
                    photo_date: photo.photo_date,
                    // base64 carries 3 bytes in every 4 chars
                    bytes: photo.image_b64.len() / 4 * 3
                        - photo.image_b64.bytes().rev().take_while(|b| *b == b'=').count(),
                    caption: photo.caption,
                    width,
                    height,
                })
            })
            .collect()
    }

    pub fn photo(&self, auth: &AuthSession, photo_id: i32) -> Result<Option<Photo>> {
        let mut conn = self.connect(auth)?;
        operations::load_photo(&mut conn, photo_id)
    }

    pub fn settings(&self, auth: &AuthSession) -> Result<Settings> {
        let mut conn = self.connect(auth)?;
        operations::get_settings(&mut conn)
    }

    pub fn save_settings(&self, auth: &AuthSession, values: &Settings) -> Result<Settings> {
        let mut conn = self.connect(auth)?;
        operations::update_settings(&mut conn, values)
    }

    pub fn load_table(&self, auth: &AuthSession, table: Table) -> Result<TableRows> {
        let mut conn = self.connect(auth)?;
        operations::load_table(&mut conn, table)
    }

    pub fn row_counts(&self, auth: &AuthSession) -> Result<Vec<(Table, usize)>> {
        let mut conn = self.connect(auth)?;
        Table::ALL
            .into_iter()
            .map(|table| -> Result<(Table, usize)> {
                Ok((table, operations::count_rows(&mut conn, table)?))
            })
            .collect()
    }

    pub fn export_csv<W: Write>(
        &self,
        auth: &AuthSession,
        export: Export,
        writer: W,
    ) -> Result<usize> {
        let mut conn = self.connect(auth)?;
        transfer::export_csv(&mut conn, export, writer)
    }

    pub fn export_all(&self, auth: &AuthSession, dir: &Path) -> Result<Vec<(PathBuf, usize)>> {
        let mut conn = self.connect(auth)?;
        transfer::export_all(&mut conn, dir)
    }

    pub fn import_workouts_csv<R: Read>(&self, auth: &AuthSession, reader: R) -> Result<usize> {
        let mut conn = self.connect(auth)?;
        transfer::import_workouts_csv(&mut conn, reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::operations::tests::{date, entry};
    use crate::error::TrackerError;
    use crate::photos::tests::png_bytes;
    use tempfile::TempDir;

    fn tracker(passcode: Option<&str>) -> (TempDir, Tracker) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            database_url: dir.path().join("tracker.db").to_string_lossy().into_owned(),
            passcode: passcode.map(str::to_string),
            ..Config::default()
        };
        let tracker = Tracker::open(&config).unwrap();
        (dir, tracker)
    }

    fn metric(day: &str, weight_kg: f64, waist_cm: f64) -> NewBodyMetric {
        NewBodyMetric {
            metric_date: date(day),
            weight_kg,
            waist_cm,
            sleep_h: 7.5,
            steps: 9000,
            calories: 2450,
        }
    }

    #[test]
    fn handlers_refuse_foreign_sessions() {
        let (_dir, tracker) = tracker(Some("1234"));
        let other = Gate::new(None).open_session().unwrap();

        let err = tracker.settings(&other).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TrackerError>(),
            Some(TrackerError::ForeignSession)
        ));

        let auth = tracker.gate().unlock("1234").unwrap();
        assert_eq!(tracker.settings(&auth).unwrap(), Settings::default());
    }

    #[test]
    fn empty_dashboard() {
        let (_dir, tracker) = tracker(None);
        let auth = tracker.gate().open_session().unwrap();

        let dash = tracker.dashboard(&auth, date("2025-03-08")).unwrap();
        assert_eq!(dash.workout_count, 0);
        assert!(dash.body.weight_kg.is_empty());
        assert!(dash.weekly_volume.is_empty());
        assert!(dash.e1rm.is_empty());
        assert_eq!(dash.carb_day, CarbDay::Football);
        assert_eq!(dash.carb_target_g, 320);
        assert_eq!(dash.football.len(), 2);
    }

    #[test]
    fn dashboard_reflects_logged_data() {
        let (_dir, tracker) = tracker(None);
        let auth = tracker.gate().open_session().unwrap();

        tracker
            .log_workout(
                &auth,
                &[
                    entry("2025-03-03", "Incline DB Press", 4, 8, 25.0),
                    entry("2025-03-10", "Incline DB Press", 4, 9, 25.0),
                ],
            )
            .unwrap();
        tracker.record_body_metric(&auth, &metric("2025-03-10", 87.0, 92.5)).unwrap();
        tracker.record_body_metric(&auth, &metric("2025-03-03", 87.6, 93.0)).unwrap();

        let dash = tracker.dashboard(&auth, date("2025-03-12")).unwrap();
        assert_eq!(dash.carb_day, CarbDay::Rest);
        assert_eq!(dash.weekly_volume.len(), 2);
        assert_eq!(dash.e1rm.len(), 1);
        assert_eq!(dash.e1rm[0].points.len(), 2);
        assert_eq!(dash.body.weight_kg[0], (date("2025-03-03"), 87.6));

        let history = tracker.body_metric_history(&auth).unwrap();
        assert_eq!(history[0].metric_date, date("2025-03-10"));

        let json = serde_json::to_value(&dash).unwrap();
        assert_eq!(json["carb_day"], "rest");
        assert_eq!(json["settings"]["tdee"], 3000);
    }

    #[test]
    fn gallery_lists_bounded_photos() {
        let (_dir, tracker) = tracker(None);
        let auth = tracker.gate().open_session().unwrap();
        let photo = tracker
            .upload_photo(&auth, date("2025-03-03"), "Week 4", &png_bytes(2000, 2000))
            .unwrap();

        let gallery = tracker.gallery(&auth).unwrap();
        assert_eq!(gallery.len(), 1);
        assert_eq!((gallery[0].width, gallery[0].height), (1280, 1280));
        assert_eq!(gallery[0].caption, "Week 4");

        let stored = tracker.photo(&auth, photo.id).unwrap().unwrap();
        let jpeg = crate::photos::decode_photo(&stored.image_b64).unwrap();
        assert_eq!(gallery[0].bytes, jpeg.len());

        let counts = tracker.row_counts(&auth).unwrap();
        assert_eq!(
            counts,
            vec![
                (Table::Workouts, 0),
                (Table::BodyMetrics, 0),
                (Table::Photos, 1),
                (Table::Settings, 1),
            ]
        );
    }

    #[test]
    fn settings_round_trip_and_csv_handlers() {
        let (dir, tracker) = tracker(None);
        let auth = tracker.gate().open_session().unwrap();

        let saved = tracker
            .save_settings(
                &auth,
                &Settings {
                    tdee: 3100,
                    ..Settings::default()
                },
            )
            .unwrap();
        assert_eq!(tracker.settings(&auth).unwrap(), saved);

        let csv = "session_date,day_name,exercise,sets,reps,weight,rir,notes\n\
                   2025-03-04,Tuesday - Lower A (Squat),DB RDL,3,8,25,2,\n";
        assert_eq!(tracker.import_workouts_csv(&auth, csv.as_bytes()).unwrap(), 1);
        assert_eq!(tracker.todays_log(&auth, date("2025-03-04")).unwrap().len(), 1);
        assert_eq!(tracker.load_table(&auth, Table::Workouts).unwrap().len(), 1);

        let mut out = Vec::new();
        assert_eq!(tracker.export_csv(&auth, Export::Workouts, &mut out).unwrap(), 1);
        let written = tracker.export_all(&auth, &dir.path().join("out")).unwrap();
        assert_eq!(written.len(), 3);
    }
}
