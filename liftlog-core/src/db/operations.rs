use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use chrono::NaiveDate;
use diesel::prelude::*;
use log::{debug, info};

use crate::{
    db::models::{
        BodyMetric, NewBodyMetric, NewPhoto, NewWorkoutEntry, Photo, PhotoMeta, SETTINGS_ROW_ID,
        Settings, WorkoutEntry,
    },
    db::schema::{body_metrics, photos, settings, workouts},
    error::TrackerError,
    photos::prepare_photo,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Workouts,
    BodyMetrics,
    Photos,
    Settings,
}

impl Table {
    pub const ALL: [Table; 4] = [
        Table::Workouts,
        Table::BodyMetrics,
        Table::Photos,
        Table::Settings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Workouts => "workouts",
            Table::BodyMetrics => "body_metrics",
            Table::Photos => "photos",
            Table::Settings => "settings",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Table {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| TrackerError::UnknownTable(s.to_string()))
    }
}

/// Every row of one table, in insertion order.
#[derive(Debug, Clone)]
pub enum TableRows {
    Workouts(Vec<WorkoutEntry>),
    BodyMetrics(Vec<BodyMetric>),
    Photos(Vec<Photo>),
    Settings(Vec<Settings>),
}

impl TableRows {
    pub fn len(&self) -> usize {
        match self {
            TableRows::Workouts(rows) => rows.len(),
            TableRows::BodyMetrics(rows) => rows.len(),
            TableRows::Photos(rows) => rows.len(),
            TableRows::Settings(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn load_table(conn: &mut SqliteConnection, table: Table) -> Result<TableRows> {
    debug!("Loading table {}", table);
    Ok(match table {
        Table::Workouts => TableRows::Workouts(load_workouts(conn)?),
        Table::BodyMetrics => TableRows::BodyMetrics(load_body_metrics(conn)?),
        Table::Photos => TableRows::Photos(load_photos(conn)?),
        Table::Settings => TableRows::Settings(
            settings::table
                .order(settings::id.asc())
                .load::<Settings>(conn)?,
        ),
    })
}

/// Row count without loading the rows.
pub fn count_rows(conn: &mut SqliteConnection, table: Table) -> Result<usize> {
    let count: i64 = match table {
        Table::Workouts => workouts::table.count().get_result(conn)?,
        Table::BodyMetrics => body_metrics::table.count().get_result(conn)?,
        Table::Photos => photos::table.count().get_result(conn)?,
        Table::Settings => settings::table.count().get_result(conn)?,
    };
    Ok(usize::try_from(count)?)
}

// Workouts
pub fn load_workouts(conn: &mut SqliteConnection) -> Result<Vec<WorkoutEntry>> {
    workouts::table
        .order(workouts::id.asc())
        .load::<WorkoutEntry>(conn)
        .map_err(Into::into)
}

/// Entries logged for one session date, newest first.
pub fn load_workouts_for_date(
    conn: &mut SqliteConnection,
    date: NaiveDate,
) -> Result<Vec<WorkoutEntry>> {
    workouts::table
        .filter(workouts::session_date.eq(date))
        .order(workouts::id.desc())
        .load::<WorkoutEntry>(conn)
        .map_err(Into::into)
}

/// Appends entries in one transaction and returns the stored rows.
pub fn write_workout_entries(
    conn: &mut SqliteConnection,
    entries: &[NewWorkoutEntry],
) -> Result<Vec<WorkoutEntry>> {
    let written = conn.transaction::<_, diesel::result::Error, _>(|conn| {
        entries
            .iter()
            .map(|entry| {
                diesel::insert_into(workouts::table)
                    .values(entry)
                    .get_result::<WorkoutEntry>(conn)
            })
            .collect::<Result<Vec<_>, _>>()
    })?;
    info!("Appended {} workout entries", written.len());
    Ok(written)
}

// Body metrics
pub fn load_body_metrics(conn: &mut SqliteConnection) -> Result<Vec<BodyMetric>> {
    body_metrics::table
        .order(body_metrics::id.asc())
        .load::<BodyMetric>(conn)
        .map_err(Into::into)
}

pub fn write_body_metric(conn: &mut SqliteConnection, metric: &NewBodyMetric) -> Result<BodyMetric> {
    let written = diesel::insert_into(body_metrics::table)
        .values(metric)
        .get_result::<BodyMetric>(conn)?;
    info!("Recorded body metrics for {}", written.metric_date);
    Ok(written)
}

// Photos
pub fn load_photos(conn: &mut SqliteConnection) -> Result<Vec<Photo>> {
    photos::table
        .order(photos::id.asc())
        .load::<Photo>(conn)
        .map_err(Into::into)
}

pub fn load_photo(conn: &mut SqliteConnection, photo_id: i32) -> Result<Option<Photo>> {
    photos::table
        .find(photo_id)
        .first::<Photo>(conn)
        .optional()
        .map_err(Into::into)
}

pub fn load_photo_meta(conn: &mut SqliteConnection) -> Result<Vec<PhotoMeta>> {
    photos::table
        .order(photos::id.asc())
        .select((photos::photo_date, photos::caption))
        .load::<PhotoMeta>(conn)
        .map_err(Into::into)
}

/// Shrinks the upload to fit 1280x1280, re-encodes it and appends it.
pub fn write_photo(
    conn: &mut SqliteConnection,
    photo_date: NaiveDate,
    caption: &str,
    bytes: &[u8],
) -> Result<Photo> {
    let prepared = prepare_photo(bytes)?;
    let photo = diesel::insert_into(photos::table)
        .values(&NewPhoto {
            photo_date,
            caption: caption.to_string(),
            image_b64: prepared.image_b64,
        })
        .get_result::<Photo>(conn)?;
    info!(
        "Stored photo #{} ({}x{})",
        photo.id, prepared.width, prepared.height
    );
    Ok(photo)
}

// Settings
/// Returns the stored targets, or the defaults when the table is empty.
pub fn get_settings(conn: &mut SqliteConnection) -> Result<Settings> {
    let stored = settings::table
        .order(settings::id.asc())
        .first::<Settings>(conn)
        .optional()?;
    Ok(stored.unwrap_or_default())
}

/// Overwrites every field of the singleton row in one transaction.
pub fn update_settings(conn: &mut SqliteConnection, values: &Settings) -> Result<Settings> {
    let row = Settings {
        id: SETTINGS_ROW_ID,
        ..*values
    };

    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let updated = diesel::update(settings::table.find(SETTINGS_ROW_ID))
            .set(&row)
            .execute(conn)?;
        if updated == 0 {
            diesel::insert_into(settings::table)
                .values(&row)
                .execute(conn)?;
        }
        Ok(())
    })?;

    info!("Updated nutrition targets");
    Ok(row)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::tests::temp_store;
    use crate::photos::tests::png_bytes;
    use crate::photos::{MAX_PHOTO_SIDE, photo_dimensions};

    pub(crate) fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    pub(crate) fn entry(day: &str, exercise: &str, sets: i32, reps: i32, weight: f64) -> NewWorkoutEntry {
        NewWorkoutEntry {
            session_date: date(day),
            day_name: "Monday - Push".into(),
            exercise: exercise.into(),
            sets: Some(sets),
            reps: Some(reps),
            weight: Some(weight),
            rir: Some(1.5),
            notes: None,
        }
    }

    fn metric(day: &str, weight_kg: f64) -> NewBodyMetric {
        NewBodyMetric {
            metric_date: date(day),
            weight_kg,
            waist_cm: 93.0,
            sleep_h: 7.5,
            steps: 9000,
            calories: 2450,
        }
    }

    #[test]
    fn workout_entries_are_appended() {
        let (_dir, store) = temp_store();
        let mut conn = store.connect().unwrap();

        let written = write_workout_entries(
            &mut conn,
            &[
                entry("2025-03-03", "Incline DB Press", 4, 8, 25.0),
                entry("2025-03-03", "Flat DB Press", 3, 10, 22.5),
            ],
        )
        .unwrap();
        assert_eq!(written.len(), 2);
        assert!(written[0].id < written[1].id);

        write_workout_entries(&mut conn, &[entry("2025-03-03", "Incline DB Press", 4, 8, 25.0)])
            .unwrap();
        assert_eq!(load_workouts(&mut conn).unwrap().len(), 3);
    }

    #[test]
    fn todays_log_is_filtered_and_newest_first() {
        let (_dir, store) = temp_store();
        let mut conn = store.connect().unwrap();
        write_workout_entries(
            &mut conn,
            &[
                entry("2025-03-03", "Incline DB Press", 4, 8, 25.0),
                entry("2025-03-04", "DB RDL", 3, 8, 25.0),
                entry("2025-03-03", "Lateral Raise", 4, 15, 8.0),
            ],
        )
        .unwrap();

        let today = load_workouts_for_date(&mut conn, date("2025-03-03")).unwrap();
        let names: Vec<_> = today.iter().map(|w| w.exercise.as_str()).collect();
        assert_eq!(names, vec!["Lateral Raise", "Incline DB Press"]);
    }

    #[test]
    fn missing_numbers_are_stored_as_null() {
        let (_dir, store) = temp_store();
        let mut conn = store.connect().unwrap();
        let mut blank = entry("2025-03-03", "Ab Wheel (opt.)", 2, 10, 0.0);
        blank.weight = None;
        blank.rir = None;

        let written = write_workout_entries(&mut conn, &[blank]).unwrap();
        assert_eq!(written[0].weight, None);
        assert_eq!(written[0].rir, None);
        assert_eq!(written[0].notes, None);
    }

    #[test]
    fn same_day_metrics_are_not_merged() {
        let (_dir, store) = temp_store();
        let mut conn = store.connect().unwrap();
        write_body_metric(&mut conn, &metric("2025-03-03", 87.6)).unwrap();
        write_body_metric(&mut conn, &metric("2025-03-03", 87.2)).unwrap();

        let rows = load_body_metrics(&mut conn).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].weight_kg, 87.2);
    }

    #[test]
    fn stored_photo_fits_bound() {
        let (_dir, store) = temp_store();
        let mut conn = store.connect().unwrap();
        let photo = write_photo(&mut conn, date("2025-03-03"), "Week 4", &png_bytes(2600, 1800))
            .unwrap();

        let (w, h) = photo_dimensions(&photo.image_b64).unwrap();
        assert!(w <= MAX_PHOTO_SIDE && h <= MAX_PHOTO_SIDE);
        assert_eq!(load_photo(&mut conn, photo.id).unwrap().unwrap().caption, "Week 4");
        assert!(load_photo(&mut conn, photo.id + 1).unwrap().is_none());
        assert_eq!(
            load_photo_meta(&mut conn).unwrap(),
            vec![PhotoMeta {
                photo_date: date("2025-03-03"),
                caption: "Week 4".into()
            }]
        );
    }

    #[test]
    fn corrupt_photo_is_not_stored() {
        let (_dir, store) = temp_store();
        let mut conn = store.connect().unwrap();
        let err = write_photo(&mut conn, date("2025-03-03"), "", b"garbage").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TrackerError>(),
            Some(TrackerError::Image(_))
        ));
        assert!(load_photos(&mut conn).unwrap().is_empty());
    }

    #[test]
    fn settings_fall_back_to_defaults_when_table_is_empty() {
        let (_dir, store) = temp_store();
        let mut conn = store.connect().unwrap();
        diesel::delete(settings::table).execute(&mut conn).unwrap();
        assert_eq!(get_settings(&mut conn).unwrap(), Settings::default());
    }

    #[test]
    fn settings_update_overwrites_every_field() {
        let (_dir, store) = temp_store();
        let mut conn = store.connect().unwrap();
        let wanted = Settings {
            id: 42,
            calories: 2300,
            protein_g: 200,
            fat_g: 65,
            carb_g_rest: 180,
            carb_g_lift: 250,
            carb_g_football: 300,
            tdee: 2900,
        };

        let stored = update_settings(&mut conn, &wanted).unwrap();
        assert_eq!(stored.id, SETTINGS_ROW_ID);
        assert_eq!(get_settings(&mut conn).unwrap(), Settings { id: SETTINGS_ROW_ID, ..wanted });

        let count: i64 = settings::table.count().get_result(&mut conn).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn settings_update_recreates_missing_row() {
        let (_dir, store) = temp_store();
        let mut conn = store.connect().unwrap();
        diesel::delete(settings::table).execute(&mut conn).unwrap();

        let wanted = Settings {
            calories: 2000,
            ..Settings::default()
        };
        update_settings(&mut conn, &wanted).unwrap();
        assert_eq!(get_settings(&mut conn).unwrap().calories, 2000);
    }

    #[test]
    fn rolled_back_settings_update_leaves_all_fields() {
        let (_dir, store) = temp_store();
        let mut conn = store.connect().unwrap();
        let wanted = Settings {
            calories: 1800,
            protein_g: 220,
            fat_g: 50,
            carb_g_rest: 100,
            carb_g_lift: 150,
            carb_g_football: 200,
            tdee: 2500,
            ..Settings::default()
        };

        let outcome = conn.transaction::<(), diesel::result::Error, _>(|conn| {
            update_settings(conn, &wanted).map_err(|_| diesel::result::Error::RollbackTransaction)?;
            Err(diesel::result::Error::RollbackTransaction)
        });
        assert!(outcome.is_err());
        assert_eq!(get_settings(&mut conn).unwrap(), Settings::default());
    }

    #[test]
    fn load_table_by_name() {
        let (_dir, store) = temp_store();
        let mut conn = store.connect().unwrap();
        write_body_metric(&mut conn, &metric("2025-03-03", 87.6)).unwrap();

        let table: Table = "body_metrics".parse().unwrap();
        assert_eq!(load_table(&mut conn, table).unwrap().len(), 1);
        assert!(load_table(&mut conn, Table::Workouts).unwrap().is_empty());
        assert_eq!(load_table(&mut conn, Table::Settings).unwrap().len(), 1);
        assert_eq!(count_rows(&mut conn, table).unwrap(), 1);
        assert_eq!(count_rows(&mut conn, Table::Workouts).unwrap(), 0);
        assert_eq!(count_rows(&mut conn, Table::Settings).unwrap(), 1);
        assert!(matches!(
            "lifts".parse::<Table>(),
            Err(TrackerError::UnknownTable(name)) if name == "lifts"
        ));
    }
}
