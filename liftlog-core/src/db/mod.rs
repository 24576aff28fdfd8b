pub mod models;
pub mod operations;
pub mod schema;

use anyhow::{Result, anyhow};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use log::{debug, info};

use crate::db::models::Settings;
use crate::db::schema::settings;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Handle on the tracker database file. Connections are opened per
/// operation and dropped when it finishes.
#[derive(Debug, Clone)]
pub struct Store {
    database_url: String,
}

impl Store {
    /// Opens the database at `database_url` and runs the startup routine.
    pub fn open(database_url: &str) -> Result<Self> {
        let store = Self {
            database_url: database_url.to_string(),
        };
        let mut conn = store.connect()?;
        init_database(&mut conn)?;
        Ok(store)
    }

    pub fn connect(&self) -> Result<SqliteConnection> {
        let mut conn = SqliteConnection::establish(&self.database_url)
            .map_err(|e| anyhow!("Failed to open database {}: {}", self.database_url, e))?;
        conn.batch_execute(
            "PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL; PRAGMA busy_timeout = 5000;",
        )?;
        Ok(conn)
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

/// Creates any missing tables and seeds the settings row. Safe to call on
/// every start.
pub fn init_database(conn: &mut SqliteConnection) -> Result<()> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow!("Failed to apply migrations: {}", e))?;

    if applied.is_empty() {
        debug!("No pending migrations");
    }
    for version in applied {
        info!("Migration {} applied successfully", version);
    }

    seed_settings(conn)?;
    Ok(())
}

fn seed_settings(conn: &mut SqliteConnection) -> Result<bool> {
    let count: i64 = settings::table.count().get_result(conn)?;
    if count > 0 {
        debug!("Settings already present, skipping seed");
        return Ok(false);
    }

    diesel::insert_into(settings::table)
        .values(&Settings::default())
        .execute(conn)?;
    info!("Seeded default nutrition targets");
    Ok(true)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::TempDir;

    pub(crate) fn temp_store() -> (TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracker.db");
        let store = Store::open(path.to_str().unwrap()).unwrap();
        (dir, store)
    }

    #[test]
    fn open_seeds_one_settings_row() {
        let (_dir, store) = temp_store();
        let mut conn = store.connect().unwrap();
        let rows: Vec<Settings> = settings::table.load(&mut conn).unwrap();
        assert_eq!(rows, vec![Settings::default()]);
    }

    #[test]
    fn reopening_is_idempotent() {
        let (_dir, store) = temp_store();
        let reopened = Store::open(store.database_url()).unwrap();

        let mut conn = reopened.connect().unwrap();
        init_database(&mut conn).unwrap();
        assert!(!seed_settings(&mut conn).unwrap());

        let count: i64 = settings::table.count().get_result(&mut conn).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn empty_settings_table_is_reseeded_on_start() {
        let (_dir, store) = temp_store();
        let mut conn = store.connect().unwrap();
        diesel::delete(settings::table).execute(&mut conn).unwrap();

        init_database(&mut conn).unwrap();
        let count: i64 = settings::table.count().get_result(&mut conn).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn existing_database_keeps_its_tables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracker.db");
        let url = path.to_str().unwrap();
        let mut conn = SqliteConnection::establish(url).unwrap();
        conn.batch_execute(
            "CREATE TABLE settings (id INTEGER PRIMARY KEY, calories INTEGER, \
             protein_g INTEGER, fat_g INTEGER, carb_g_rest INTEGER, carb_g_lift INTEGER, \
             carb_g_football INTEGER, tdee INTEGER); \
             INSERT INTO settings VALUES (1, 2300, 200, 65, 200, 260, 300, 2900);",
        )
        .unwrap();
        drop(conn);

        let store = Store::open(url).unwrap();
        let mut conn = store.connect().unwrap();
        let rows: Vec<Settings> = settings::table.load(&mut conn).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!((rows[0].calories, rows[0].tdee), (2300, 2900));

        // Rows with NULLs in NOT NULL columns cannot be loaded.
        conn.batch_execute("UPDATE settings SET tdee = NULL;").unwrap();
        assert!(settings::table.load::<Settings>(&mut conn).is_err());
    }
}
