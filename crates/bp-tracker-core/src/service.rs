//! Reading service: validation and save flows on top of the store.
//!
//! ```text
//! NewReading ──validate──┐
//!                        ├──► Database ──► readings / graph / summary
//! utterance ──parse──────┘
//! ```

use chrono::{Local, NaiveDateTime, SubsecRound};
use log::{info, warn};
use thiserror::Error;

use crate::config::{Bounds, TrackerConfig};
use crate::db::{Database, DbError};
use crate::models::{
    parse_local_timestamp, GraphPoint, NewReading, ParsePreview, Reading, ReadingType, Summary,
};
use crate::parser::PhraseParser;
use crate::range::TimeRange;
use crate::summary::SummaryAggregator;

/// Service errors.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Invalid reading: {0}")]
    Validation(String),

    #[error("{0}")]
    Parse(String),

    #[error("Reading not found: {0}")]
    NotFound(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Reading operations against a borrowed database.
pub struct ReadingService<'a> {
    db: &'a Database,
    parser: PhraseParser,
    aggregator: SummaryAggregator,
    clock: Option<NaiveDateTime>,
}

impl<'a> ReadingService<'a> {
    /// Service with default limits and summary settings.
    pub fn new(db: &'a Database) -> Self {
        Self::with_config(db, &TrackerConfig::default())
    }

    pub fn with_config(db: &'a Database, config: &TrackerConfig) -> Self {
        Self {
            db,
            parser: PhraseParser::new(config.parser),
            aggregator: SummaryAggregator::new(config.summary),
            clock: None,
        }
    }

    /// Pin "now" to a fixed instant instead of the local wall clock.
    pub fn at(mut self, now: NaiveDateTime) -> Self {
        self.clock = Some(now);
        self
    }

    /// Stored timestamps carry whole seconds only.
    fn now(&self) -> NaiveDateTime {
        self.clock
            .unwrap_or_else(|| Local::now().naive_local())
            .trunc_subsecs(0)
    }

    /// Validate and store a form submission.
    pub fn save_reading(&self, new: NewReading) -> ServiceResult<Reading> {
        let limits = self.parser.limits();
        check_bounds("Systolic", new.systolic, limits.systolic)?;
        check_bounds("Diastolic", new.diastolic, limits.diastolic)?;
        if let Some(pulse) = new.pulse {
            check_bounds("Pulse", pulse, limits.pulse)?;
        }

        let recorded_at = match new.recorded_at.as_deref().map(str::trim) {
            None | Some("") => self.now(),
            Some(raw) => parse_local_timestamp(raw).ok_or_else(|| {
                warn!("Rejected reading with malformed timestamp");
                ServiceError::Validation(format!("Invalid date/time: {}", raw))
            })?,
        };

        let reading_type = new
            .reading_type
            .as_deref()
            .map(ReadingType::parse_or_manual)
            .unwrap_or_default();

        let reading = Reading::new(new.systolic, new.diastolic, recorded_at)
            .with_pulse(new.pulse)
            .with_notes(new.notes.unwrap_or_default())
            .with_type(reading_type);

        self.db.insert_reading(&reading)?;
        info!(
            "Saved {} reading {} ({}/{})",
            reading.reading_type, reading.id, reading.systolic, reading.diastolic
        );
        Ok(reading)
    }

    /// Parse an utterance without saving anything.
    pub fn preview(&self, text: &str) -> ParsePreview {
        self.parser.parse(text)
    }

    /// Parse an utterance and store the result.
    ///
    /// The utterance is kept in the notes, prefixed by how it was captured.
    pub fn save_from_utterance(
        &self,
        text: &str,
        reading_type: ReadingType,
    ) -> ServiceResult<Reading> {
        let preview = self.parser.parse(text);
        let (systolic, diastolic, pulse) = match preview.values() {
            Some(values) => values,
            None => {
                warn!("Utterance could not be saved: {}", preview.message);
                return Err(ServiceError::Parse(preview.message));
            }
        };

        let prefix = match reading_type {
            ReadingType::Voice => "Voice",
            ReadingType::Text | ReadingType::Manual => "Text",
        };

        let reading = Reading::new(systolic, diastolic, self.now())
            .with_pulse(pulse)
            .with_notes(format!("{}: {}", prefix, text.trim()))
            .with_type(reading_type);

        self.db.insert_reading(&reading)?;
        info!("Saved {} reading {} from utterance", reading_type, reading.id);
        Ok(reading)
    }

    /// Readings in `range`, oldest first.
    pub fn readings(&self, range: &TimeRange) -> ServiceResult<Vec<Reading>> {
        let since = range.since(self.now());
        Ok(self.db.list_readings_in_range(since, range.until())?)
    }

    /// Every reading, newest first.
    pub fn all_readings(&self) -> ServiceResult<Vec<Reading>> {
        Ok(self.db.list_all_readings()?)
    }

    /// Chart points for `range`, oldest first.
    pub fn graph_data(&self, range: &TimeRange) -> ServiceResult<Vec<GraphPoint>> {
        let readings = self.readings(range)?;
        Ok(readings.iter().map(GraphPoint::from).collect())
    }

    pub fn summary(&self, range: &TimeRange) -> ServiceResult<Summary> {
        let readings = self.readings(range)?;
        Ok(self.aggregator.summarize(&range.label(), &readings))
    }

    /// Delete a reading; missing IDs are an error.
    pub fn delete_reading(&self, id: &str) -> ServiceResult<()> {
        if !self.db.delete_reading(id)? {
            return Err(ServiceError::NotFound(id.to_string()));
        }
        info!("Deleted reading {}", id);
        Ok(())
    }
}

fn check_bounds(field: &str, value: u32, bounds: Bounds) -> ServiceResult<()> {
    if bounds.contains(value) {
        return Ok(());
    }
    warn!("Rejected {} value {}", field.to_lowercase(), value);
    Err(ServiceError::Validation(format!(
        "{} must be between {} and {} (got {})",
        field, bounds.min, bounds.max, value
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::BpCategory;
    use chrono::{Duration, NaiveDate};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn form(systolic: u32, diastolic: u32, recorded_at: &str) -> NewReading {
        NewReading {
            systolic,
            diastolic,
            recorded_at: Some(recorded_at.to_string()),
            ..NewReading::default()
        }
    }

    #[test]
    fn test_save_reading_defaults() {
        let db = Database::open_in_memory().unwrap();
        let service = ReadingService::new(&db).at(now());

        let reading = service
            .save_reading(NewReading {
                systolic: 122,
                diastolic: 79,
                pulse: Some(68),
                reading_type: Some("carrier pigeon".into()),
                ..NewReading::default()
            })
            .unwrap();

        assert_eq!(reading.recorded_at, now());
        assert_eq!(reading.reading_type, ReadingType::Manual);
        assert_eq!(reading.notes, "");
        assert_eq!(db.get_reading(&reading.id).unwrap(), Some(reading));
    }

    #[test]
    fn test_save_reading_keeps_local_time() {
        let db = Database::open_in_memory().unwrap();
        let service = ReadingService::new(&db).at(now());

        let reading = service.save_reading(form(120, 80, "2024-06-01T07:45")).unwrap();
        assert_eq!(reading.display_time(), "2024-06-01 07:45");
    }

    #[test]
    fn test_save_reading_validation() {
        let db = Database::open_in_memory().unwrap();
        let service = ReadingService::new(&db).at(now());

        let err = service.save_reading(form(20, 80, "2024-06-01T07:45")).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m.starts_with("Systolic")));

        let err = service.save_reading(form(120, 200, "2024-06-01T07:45")).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m.starts_with("Diastolic")));

        let mut bad_pulse = form(120, 80, "2024-06-01T07:45");
        bad_pulse.pulse = Some(10);
        assert!(matches!(
            service.save_reading(bad_pulse),
            Err(ServiceError::Validation(_))
        ));

        assert!(matches!(
            service.save_reading(form(120, 80, "June 1st")),
            Err(ServiceError::Validation(_))
        ));

        assert_eq!(db.count_readings().unwrap(), 0);
    }

    #[test]
    fn test_save_from_utterance() {
        let db = Database::open_in_memory().unwrap();
        let service = ReadingService::new(&db).at(now());

        let reading = service
            .save_from_utterance("120 over 80 pulse 72", ReadingType::Voice)
            .unwrap();
        assert_eq!((reading.systolic, reading.diastolic), (120, 80));
        assert_eq!(reading.pulse, Some(72));
        assert_eq!(reading.notes, "Voice: 120 over 80 pulse 72");
        assert_eq!(reading.reading_type, ReadingType::Voice);

        let reading = service
            .save_from_utterance("135/90 heart rate 68", ReadingType::Text)
            .unwrap();
        assert_eq!(reading.notes, "Text: 135/90 heart rate 68");
    }

    #[test]
    fn test_save_from_utterance_parse_failure() {
        let db = Database::open_in_memory().unwrap();
        let service = ReadingService::new(&db).at(now());

        let err = service
            .save_from_utterance("banana", ReadingType::Voice)
            .unwrap_err();
        assert!(matches!(err, ServiceError::Parse(_)));
        assert_eq!(db.count_readings().unwrap(), 0);
    }

    #[test]
    fn test_range_queries_and_summary() {
        let db = Database::open_in_memory().unwrap();
        let service = ReadingService::new(&db).at(now());

        for (days_ago, sys, dia) in [(20, 150, 95), (3, 120, 80), (1, 140, 95)] {
            let at = now() - Duration::days(days_ago);
            service
                .save_reading(form(sys, dia, &at.format("%Y-%m-%dT%H:%M").to_string()))
                .unwrap();
        }

        let week = service.readings(&TimeRange::Weeks(1)).unwrap();
        assert_eq!(week.len(), 2);
        assert!(week[0].recorded_at < week[1].recorded_at);

        assert_eq!(service.readings(&TimeRange::All).unwrap().len(), 3);

        let summary = service.summary(&TimeRange::Weeks(1)).unwrap();
        assert_eq!(summary.range, "1w");
        assert_eq!(summary.total_readings, 2);
        assert_eq!(summary.avg_systolic, Some(130.0));
        assert_eq!(summary.category, Some(BpCategory::HighStage2));

        let points = service.graph_data(&TimeRange::Weeks(1)).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].systolic, 140);

        let empty = service.summary(&TimeRange::Today).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_delete_reading() {
        let db = Database::open_in_memory().unwrap();
        let service = ReadingService::new(&db).at(now());
        let reading = service.save_reading(form(120, 80, "2024-06-14T08:00")).unwrap();

        service.delete_reading(&reading.id).unwrap();
        assert!(matches!(
            service.delete_reading(&reading.id),
            Err(ServiceError::NotFound(_))
        ));
        assert!(service.all_readings().unwrap().is_empty());
    }
}
