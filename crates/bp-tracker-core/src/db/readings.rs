//! Reading database operations.

use chrono::NaiveDateTime;
use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{Reading, ReadingType, STORAGE_FORMAT};

const READING_COLUMNS: &str =
    "id, systolic, diastolic, pulse, notes, reading_type, recorded_at, created_at";

impl Database {
    /// Insert a new reading.
    pub fn insert_reading(&self, reading: &Reading) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO readings (
                id, systolic, diastolic, pulse, notes, reading_type, recorded_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                reading.id,
                reading.systolic,
                reading.diastolic,
                reading.pulse,
                reading.notes,
                reading.reading_type.as_str(),
                reading.recorded_at.format(STORAGE_FORMAT).to_string(),
                reading.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get a reading by ID.
    pub fn get_reading(&self, id: &str) -> DbResult<Option<Reading>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM readings WHERE id = ?", READING_COLUMNS),
                [id],
                ReadingRow::from_row,
            )
            .optional()?;

        row.map(Reading::try_from).transpose()
    }

    /// Readings whose `recorded_at` falls within the inclusive bounds, oldest first.
    ///
    /// A `None` bound is open.
    pub fn list_readings_in_range(
        &self,
        since: Option<NaiveDateTime>,
        until: Option<NaiveDateTime>,
    ) -> DbResult<Vec<Reading>> {
        let since = since.map(|t| t.format(STORAGE_FORMAT).to_string());
        let until = until.map(|t| t.format(STORAGE_FORMAT).to_string());

        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {}
            FROM readings
            WHERE (?1 IS NULL OR recorded_at >= ?1)
              AND (?2 IS NULL OR recorded_at <= ?2)
            ORDER BY recorded_at ASC, created_at ASC
            "#,
            READING_COLUMNS
        ))?;

        let rows = stmt.query_map(params![since, until], ReadingRow::from_row)?;
        collect_readings(rows)
    }

    /// Every reading, newest first.
    pub fn list_all_readings(&self) -> DbResult<Vec<Reading>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM readings ORDER BY recorded_at DESC, created_at DESC",
            READING_COLUMNS
        ))?;

        let rows = stmt.query_map([], ReadingRow::from_row)?;
        collect_readings(rows)
    }

    /// Delete a reading by ID.
    pub fn delete_reading(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM readings WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    /// Number of stored readings.
    pub fn count_readings(&self) -> DbResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM readings", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn collect_readings(
    rows: impl Iterator<Item = rusqlite::Result<ReadingRow>>,
) -> DbResult<Vec<Reading>> {
    rows.map(|row| Reading::try_from(row?))
        .collect::<Result<Vec<_>, _>>()
}

/// Intermediate row struct for database mapping.
struct ReadingRow {
    id: String,
    systolic: u32,
    diastolic: u32,
    pulse: Option<u32>,
    notes: String,
    reading_type: String,
    recorded_at: String,
    created_at: String,
}

impl ReadingRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ReadingRow {
            id: row.get(0)?,
            systolic: row.get(1)?,
            diastolic: row.get(2)?,
            pulse: row.get(3)?,
            notes: row.get(4)?,
            reading_type: row.get(5)?,
            recorded_at: row.get(6)?,
            created_at: row.get(7)?,
        })
    }
}

impl TryFrom<ReadingRow> for Reading {
    type Error = DbError;

    fn try_from(row: ReadingRow) -> Result<Self, Self::Error> {
        let recorded_at = NaiveDateTime::parse_from_str(&row.recorded_at, STORAGE_FORMAT)
            .map_err(|e| {
                DbError::Constraint(format!(
                    "Bad recorded_at {:?} on reading {}: {}",
                    row.recorded_at, row.id, e
                ))
            })?;

        Ok(Reading {
            id: row.id,
            systolic: row.systolic,
            diastolic: row.diastolic,
            pulse: row.pulse,
            recorded_at,
            notes: row.notes,
            reading_type: ReadingType::parse_or_manual(&row.reading_type),
            created_at: row.created_at,
        })
    }
}
