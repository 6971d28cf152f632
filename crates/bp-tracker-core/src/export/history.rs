//! History table export (CSV download and JSON backup).

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::escape_csv;
use crate::db::{Database, DbResult};
use crate::models::Reading;
use crate::range::TimeRange;

/// CSV header, in column order.
pub const HISTORY_CSV_HEADER: &str = "Date,Time,Systolic,Diastolic,Pulse,Category,Notes,Type";

/// One row of the history table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryRow {
    pub id: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    pub systolic: u32,
    pub diastolic: u32,
    pub pulse: Option<u32>,
    pub category: String,
    pub notes: String,
    pub reading_type: String,
}

impl From<&Reading> for HistoryRow {
    fn from(reading: &Reading) -> Self {
        Self {
            id: reading.id.clone(),
            date: reading.recorded_at.format("%Y-%m-%d").to_string(),
            time: reading.recorded_at.format("%H:%M").to_string(),
            systolic: reading.systolic,
            diastolic: reading.diastolic,
            pulse: reading.pulse,
            category: reading.category().label().to_string(),
            notes: reading.notes.clone(),
            reading_type: reading.reading_type.as_str().to_string(),
        }
    }
}

/// Exported history, newest reading first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryExport {
    /// Export timestamp
    pub exported_at: String,
    /// Number of rows
    pub count: usize,
    pub readings: Vec<HistoryRow>,
}

impl HistoryExport {
    pub fn from_readings(readings: &[Reading]) -> Self {
        let readings: Vec<HistoryRow> = readings.iter().map(HistoryRow::from).collect();
        Self {
            exported_at: chrono::Utc::now().to_rfc3339(),
            count: readings.len(),
            readings,
        }
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV format.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();

        csv.push_str(HISTORY_CSV_HEADER);
        csv.push('\n');

        for row in &self.readings {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{}\n",
                row.date,
                row.time,
                row.systolic,
                row.diastolic,
                row.pulse.map(|p| p.to_string()).unwrap_or_default(),
                escape_csv(&row.category),
                escape_csv(&row.notes),
                row.reading_type,
            ));
        }

        csv
    }
}

/// Suggested download name, e.g. `bp-readings-2024-03-01.csv`.
pub fn history_file_name(date: NaiveDate) -> String {
    format!("bp-readings-{}.csv", date.format("%Y-%m-%d"))
}

/// History exporter.
pub struct HistoryExporter<'a> {
    db: &'a Database,
}

impl<'a> HistoryExporter<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Export every stored reading.
    pub fn export_all(&self) -> DbResult<HistoryExport> {
        let readings = self.db.list_all_readings()?;
        Ok(HistoryExport::from_readings(&readings))
    }

    /// Export readings in `range`, newest first like the full export.
    pub fn export_range(&self, range: &TimeRange, now: NaiveDateTime) -> DbResult<HistoryExport> {
        let mut readings = self
            .db
            .list_readings_in_range(range.since(now), range.until())?;
        readings.reverse();
        Ok(HistoryExport::from_readings(&readings))
    }
}
