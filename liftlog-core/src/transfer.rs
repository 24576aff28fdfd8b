//! CSV export of the tracker tables and CSV import of workouts.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use diesel::sqlite::SqliteConnection;
use log::{debug, info};
use serde::Serialize;

use crate::db::models::NewWorkoutEntry;
use crate::db::operations::{
    load_body_metrics, load_photo_meta, load_workouts, write_workout_entries,
};
use crate::error::TrackerError;

/// Columns a workouts import must carry, in export order.
pub const WORKOUT_IMPORT_COLUMNS: [&str; 8] = [
    "session_date",
    "day_name",
    "exercise",
    "sets",
    "reps",
    "weight",
    "rir",
    "notes",
];

const WORKOUT_COLUMNS: [&str; 9] = [
    "id",
    "session_date",
    "day_name",
    "exercise",
    "sets",
    "reps",
    "weight",
    "rir",
    "notes",
];
const BODY_METRIC_COLUMNS: [&str; 7] = [
    "id",
    "metric_date",
    "weight_kg",
    "waist_cm",
    "sleep_h",
    "steps",
    "calories",
];
const PHOTO_META_COLUMNS: [&str; 2] = ["photo_date", "caption"];

/// One exported CSV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Export {
    Workouts,
    BodyMetrics,
    /// Dates and captions only; image payloads are not exported.
    PhotosMeta,
}

impl Export {
    pub const ALL: [Export; 3] = [Export::Workouts, Export::BodyMetrics, Export::PhotosMeta];

    pub fn file_name(&self) -> &'static str {
        match self {
            Export::Workouts => "workouts.csv",
            Export::BodyMetrics => "body_metrics.csv",
            Export::PhotosMeta => "photos_meta.csv",
        }
    }

    fn columns(&self) -> &'static [&'static str] {
        match self {
            Export::Workouts => &WORKOUT_COLUMNS,
            Export::BodyMetrics => &BODY_METRIC_COLUMNS,
            Export::PhotosMeta => &PHOTO_META_COLUMNS,
        }
    }
}

/// Writes one table as CSV with a header row, even when the table is empty.
/// Returns the number of data rows.
pub fn export_csv<W: Write>(conn: &mut SqliteConnection, export: Export, writer: W) -> Result<usize> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(export.columns())?;

    let count = match export {
        Export::Workouts => write_rows(&mut wtr, &load_workouts(conn)?)?,
        Export::BodyMetrics => write_rows(&mut wtr, &load_body_metrics(conn)?)?,
        Export::PhotosMeta => write_rows(&mut wtr, &load_photo_meta(conn)?)?,
    };
    wtr.flush()?;
    debug!("Exported {} rows to {}", count, export.file_name());
    Ok(count)
}

fn write_rows<W: Write, T: Serialize>(wtr: &mut csv::Writer<W>, rows: &[T]) -> Result<usize> {
    for row in rows {
        wtr.serialize(row)?;
    }
    Ok(rows.len())
}

/// Writes every export file into `dir`.
pub fn export_all(conn: &mut SqliteConnection, dir: &Path) -> Result<Vec<(PathBuf, usize)>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(Export::ALL.len());
    for export in Export::ALL {
        let path = dir.join(export.file_name());
        let count = export_csv(conn, export, File::create(&path)?)?;
        written.push((path, count));
    }
    info!("Exported tracker data to {}", dir.display());
    Ok(written)
}

fn check_workout_headers(headers: &StringRecord) -> Result<(), TrackerError> {
    for column in WORKOUT_IMPORT_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(TrackerError::MissingColumn(column.to_string()));
        }
    }
    // an exported file carries ids; they are dropped and reassigned
    if let Some(extra) = headers
        .iter()
        .find(|h| *h != "id" && !WORKOUT_IMPORT_COLUMNS.contains(h))
    {
        return Err(TrackerError::UnexpectedColumn(extra.to_string()));
    }
    Ok(())
}

/// Appends every row of a workouts CSV in one transaction. Values are taken
/// as-is; nothing is checked against the program or input bounds.
pub fn import_workouts_csv<R: Read>(conn: &mut SqliteConnection, reader: R) -> Result<usize> {
    let mut rdr = ReaderBuilder::new().trim(Trim::Headers).from_reader(reader);
    check_workout_headers(rdr.headers()?)?;

    let rows = rdr
        .deserialize::<NewWorkoutEntry>()
        .collect::<Result<Vec<_>, _>>()?;
    let written = write_workout_entries(conn, &rows)?;
    info!("Imported {} workout rows", written.len());
    Ok(written.len())
}
