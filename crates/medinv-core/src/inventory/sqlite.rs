//! SQLite-backed inventory store.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::MedicationStore;
use crate::error::StoreError;
use crate::label::rules::dates::format_canonical;
use crate::models::medication::{Medication, NewMedication};

const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SELECT_COLUMNS: &str =
    "SELECT id, name, manufacturer, active_ingredient, expiry_date, created_at FROM medications";

type RawRow = (i64, String, String, String, String, String);

/// Inventory stored in a single `medications` table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (and create if needed) a database file.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        debug!("Opened inventory database {}", path.display());
        Self::with_connection(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS medications (
                id                INTEGER PRIMARY KEY AUTOINCREMENT,
                name              TEXT NOT NULL,
                manufacturer      TEXT NOT NULL,
                active_ingredient TEXT NOT NULL,
                expiry_date       TEXT NOT NULL,
                created_at        TEXT NOT NULL DEFAULT (datetime('now'))
            );
            CREATE INDEX IF NOT EXISTS idx_medications_expiry ON medications(expiry_date);
            ",
        )?;
        Ok(Self { conn })
    }

    /// Look up one entry.
    pub fn get(&self, id: i64) -> Result<Option<Medication>, StoreError> {
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        let raw = self
            .conn
            .query_row(&sql, params![id], read_row)
            .optional()?;
        raw.map(into_medication).transpose()
    }
}

impl MedicationStore for SqliteStore {
    fn list(&self) -> Result<Vec<Medication>, StoreError> {
        let sql = format!(
            "{} ORDER BY expiry_date ASC, created_at DESC, id DESC",
            SELECT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], read_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(into_medication).collect()
    }

    fn create(&mut self, medication: NewMedication) -> Result<Medication, StoreError> {
        self.conn.execute(
            "INSERT INTO medications (name, manufacturer, active_ingredient, expiry_date)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                medication.name,
                medication.manufacturer,
                medication.active_ingredient,
                format_canonical(&medication.expiry_date),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!("Inserted medication row {}", id);

        self.get(id)?.ok_or(StoreError::NotFound(id))
    }

    fn delete(&mut self, id: i64) -> Result<(), StoreError> {
        let changes = self
            .conn
            .execute("DELETE FROM medications WHERE id = ?1", params![id])?;
        if changes == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn into_medication(raw: RawRow) -> Result<Medication, StoreError> {
    let (id, name, manufacturer, active_ingredient, expiry_date, created_at) = raw;

    let expiry_date = NaiveDate::parse_from_str(&expiry_date, "%Y-%m-%d").map_err(|e| {
        StoreError::Corrupt {
            id,
            reason: format!("expiry_date {:?}: {}", expiry_date, e),
        }
    })?;
    let created_at = NaiveDateTime::parse_from_str(&created_at, CREATED_AT_FORMAT).map_err(|e| {
        StoreError::Corrupt {
            id,
            reason: format!("created_at {:?}: {}", created_at, e),
        }
    })?;

    Ok(Medication {
        id,
        name,
        manufacturer,
        active_ingredient,
        expiry_date,
        created_at,
    })
}
