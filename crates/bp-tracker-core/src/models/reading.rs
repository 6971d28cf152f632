//! Blood-pressure reading models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::classifier::{classify, BpCategory};

/// Storage format for `recorded_at` (sortable, local time, no offset).
pub const STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Display format used by list views and exports.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";
/// Short chart axis label.
pub const CHART_LABEL_FORMAT: &str = "%b %d, %H:%M";

/// How a reading was captured.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReadingType {
    /// Typed into the manual form
    #[default]
    Manual,
    /// Spoken and transcribed
    Voice,
    /// Free text parsed by the phrase parser
    Text,
}

impl ReadingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingType::Manual => "MANUAL",
            ReadingType::Voice => "VOICE",
            ReadingType::Text => "TEXT",
        }
    }

    /// Lenient parse: anything unrecognised is a manual reading.
    pub fn parse_or_manual(s: &str) -> Self {
        s.parse().unwrap_or(ReadingType::Manual)
    }
}

impl fmt::Display for ReadingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "MANUAL" => Ok(ReadingType::Manual),
            "VOICE" => Ok(ReadingType::Voice),
            "TEXT" => Ok(ReadingType::Text),
            other => Err(format!("unknown reading type: {}", other)),
        }
    }
}

/// A persisted blood-pressure observation. Immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reading {
    /// Local UUID
    pub id: String,
    /// Systolic pressure (mmHg)
    pub systolic: u32,
    /// Diastolic pressure (mmHg)
    pub diastolic: u32,
    /// Pulse (bpm), if taken
    pub pulse: Option<u32>,
    /// When the reading was taken, in the user's local time
    pub recorded_at: NaiveDateTime,
    /// Free-form notes
    pub notes: String,
    /// Capture method
    pub reading_type: ReadingType,
    /// Row creation timestamp (RFC 3339)
    pub created_at: String,
}

impl Reading {
    /// Create a new reading with a fresh ID.
    pub fn new(systolic: u32, diastolic: u32, recorded_at: NaiveDateTime) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            systolic,
            diastolic,
            pulse: None,
            recorded_at,
            notes: String::new(),
            reading_type: ReadingType::Manual,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn with_pulse(mut self, pulse: Option<u32>) -> Self {
        self.pulse = pulse;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_type(mut self, reading_type: ReadingType) -> Self {
        self.reading_type = reading_type;
        self
    }

    /// Derived clinical category.
    pub fn category(&self) -> BpCategory {
        classify(self.systolic, self.diastolic)
    }

    /// `recorded_at` as shown in lists, e.g. `2024-03-01 08:15`.
    pub fn display_time(&self) -> String {
        self.recorded_at.format(DISPLAY_FORMAT).to_string()
    }
}

/// A reading as submitted by the entry form, before validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NewReading {
    pub systolic: u32,
    pub diastolic: u32,
    pub pulse: Option<u32>,
    pub notes: Option<String>,
    /// `YYYY-MM-DDTHH:MM[:SS]`, local; `None` means now
    pub recorded_at: Option<String>,
    /// `MANUAL`, `VOICE` or `TEXT`; anything else is treated as manual
    pub reading_type: Option<String>,
}

/// Parse a form timestamp, with or without seconds. No timezone conversion.
pub fn parse_local_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// A single point on the dashboard chart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphPoint {
    /// `YYYY-MM-DD HH:MM`
    pub timestamp: String,
    /// `Mon DD, HH:MM`
    pub time_label: String,
    pub systolic: u32,
    pub diastolic: u32,
    /// 0 when the reading has no pulse
    pub pulse: u32,
    pub category: BpCategory,
}

impl From<&Reading> for GraphPoint {
    fn from(reading: &Reading) -> Self {
        Self {
            timestamp: reading.recorded_at.format(DISPLAY_FORMAT).to_string(),
            time_label: reading.recorded_at.format(CHART_LABEL_FORMAT).to_string(),
            systolic: reading.systolic,
            diastolic: reading.diastolic,
            pulse: reading.pulse.unwrap_or(0),
            category: reading.category(),
        }
    }
}
