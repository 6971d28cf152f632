//! BP Tracker Core Library
//!
//! Local-first blood-pressure reading capture, classification and summaries.
//!
//! # Architecture
//!
//! ```text
//!  typed form ──────────────────────────┐
//!                                       │
//!  voice / text ──► Phrase Parser ──► Preview ──► user confirms
//!                                       │
//!                                       ▼
//!                              ┌─────────────────┐
//!                              │  readings (SQL) │
//!                              └────────┬────────┘
//!                                       │  range filter
//!               ┌───────────────────────┼───────────────────────┐
//!               ▼                       ▼                       ▼
//!            History               Graph points          Summary Aggregator
//!         (CSV / JSON)                                 (stats, category, trend)
//! ```
//!
//! # Modules
//!
//! - [`parser`]: utterance → systolic/diastolic/pulse preview
//! - [`classifier`]: (systolic, diastolic) → clinical category
//! - [`summary`]: statistics, trend and alerts over a window
//! - [`range`]: named and custom time windows
//! - [`db`]: SQLite storage for readings and the session
//! - [`service`]: validation and save flows
//! - [`export`]: history and summary export
//! - [`auth`]: authentication port and session store
//! - [`config`]: parser limits and summary settings

pub mod auth;
pub mod classifier;
pub mod config;
pub mod db;
pub mod export;
pub mod models;
pub mod parser;
pub mod range;
pub mod service;
pub mod summary;

// Re-export commonly used types
pub use classifier::{classify, BpCategory};
pub use config::{CategoryBasis, TrackerConfig};
pub use db::Database;
pub use models::{GraphPoint, NewReading, ParsePreview, Reading, ReadingType, Session, Summary, Trend};
pub use parser::{parse_utterance, PhraseParser};
pub use range::TimeRange;
pub use service::ReadingService;
pub use summary::{summarize, SummaryAggregator};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum BpTrackerError {
    #[error("Invalid input: {0}")]
    ValidationError(String),

    #[error("{0}")]
    ParseFailure(String),

    #[error("Authentication failed: {0}")]
    AuthFailure(String),

    #[error("Network error: {0}")]
    NetworkFailure(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl BpTrackerError {
    /// Whether retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BpTrackerError::NetworkFailure(_))
    }
}

impl From<db::DbError> for BpTrackerError {
    fn from(e: db::DbError) -> Self {
        BpTrackerError::DatabaseError(e.to_string())
    }
}

impl From<service::ServiceError> for BpTrackerError {
    fn from(e: service::ServiceError) -> Self {
        match e {
            service::ServiceError::Database(e) => e.into(),
            service::ServiceError::Validation(msg) => BpTrackerError::ValidationError(msg),
            service::ServiceError::Parse(msg) => BpTrackerError::ParseFailure(msg),
            service::ServiceError::NotFound(id) => BpTrackerError::NotFound(id),
        }
    }
}

impl From<auth::AuthError> for BpTrackerError {
    fn from(e: auth::AuthError) -> Self {
        match e {
            auth::AuthError::Invalid(msg) => BpTrackerError::ValidationError(msg),
            auth::AuthError::Rejected(msg) => BpTrackerError::AuthFailure(msg),
            auth::AuthError::Network(msg) => BpTrackerError::NetworkFailure(msg),
            auth::AuthError::NotSignedIn => BpTrackerError::AuthFailure("Not signed in".into()),
            auth::AuthError::Database(e) => e.into(),
        }
    }
}

impl From<serde_json::Error> for BpTrackerError {
    fn from(e: serde_json::Error) -> Self {
        BpTrackerError::SerializationError(e.to_string())
    }
}

impl From<anyhow::Error> for BpTrackerError {
    fn from(e: anyhow::Error) -> Self {
        BpTrackerError::ValidationError(format!("{:#}", e))
    }
}

impl<T> From<std::sync::PoisonError<T>> for BpTrackerError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        BpTrackerError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Install the `env_logger` backend. Safe to call more than once.
#[uniffi::export]
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<BpTrackerCore>, BpTrackerError> {
    let db = Database::open(&path)?;
    Ok(BpTrackerCore::wrap(db, TrackerConfig::default()))
}

/// Open or create a database with a JSON configuration.
#[uniffi::export]
pub fn open_database_with_config(
    path: String,
    config_json: String,
) -> Result<Arc<BpTrackerCore>, BpTrackerError> {
    let config = TrackerConfig::from_json(&config_json)?;
    let db = Database::open(&path)?;
    log::info!("Opened {} with custom config", path);
    Ok(BpTrackerCore::wrap(db, config))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<BpTrackerCore>, BpTrackerError> {
    let db = Database::open_in_memory()?;
    Ok(BpTrackerCore::wrap(db, TrackerConfig::default()))
}

/// Parse an utterance without touching storage.
#[uniffi::export]
pub fn preview_utterance(text: String) -> FfiParsePreview {
    parse_utterance(&text).into()
}

/// Category label for a pair of values.
#[uniffi::export]
pub fn classify_reading(systolic: u32, diastolic: u32) -> String {
    classify(systolic, diastolic).label().to_string()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct BpTrackerCore {
    db: Arc<Mutex<Database>>,
    config: TrackerConfig,
}

impl BpTrackerCore {
    fn wrap(db: Database, config: TrackerConfig) -> Arc<Self> {
        Arc::new(Self {
            db: Arc::new(Mutex::new(db)),
            config,
        })
    }
}

#[uniffi::export]
impl BpTrackerCore {
    // =========================================================================
    // Reading Operations
    // =========================================================================

    /// Validate and save a manual entry.
    pub fn save_reading(&self, reading: FfiNewReading) -> Result<FfiReading, BpTrackerError> {
        let db = self.db.lock()?;
        let service = ReadingService::with_config(&db, &self.config);
        let saved = service.save_reading(reading.into())?;
        Ok(saved.into())
    }

    /// Parse an utterance with this database's limits.
    pub fn preview(&self, text: String) -> FfiParsePreview {
        PhraseParser::new(self.config.parser).parse(&text).into()
    }

    /// Parse and save an utterance. `reading_type` is `VOICE` or `TEXT`.
    pub fn save_from_utterance(
        &self,
        text: String,
        reading_type: String,
    ) -> Result<FfiReading, BpTrackerError> {
        let db = self.db.lock()?;
        let service = ReadingService::with_config(&db, &self.config);
        let saved = service.save_from_utterance(&text, ReadingType::parse_or_manual(&reading_type))?;
        Ok(saved.into())
    }

    /// Get a reading by ID.
    pub fn get_reading(&self, id: String) -> Result<Option<FfiReading>, BpTrackerError> {
        let db = self.db.lock()?;
        let reading = db.get_reading(&id)?;
        Ok(reading.map(|r| r.into()))
    }

    /// Readings in a range (`today`, `1w`, `3m`, `all`, ...), oldest first.
    pub fn readings_in_range(&self, range: String) -> Result<Vec<FfiReading>, BpTrackerError> {
        let db = self.db.lock()?;
        let service = ReadingService::with_config(&db, &self.config);
        let readings = service.readings(&TimeRange::parse_lenient(&range))?;
        Ok(readings.into_iter().map(|r| r.into()).collect())
    }

    /// Every reading, newest first.
    pub fn all_readings(&self) -> Result<Vec<FfiReading>, BpTrackerError> {
        let db = self.db.lock()?;
        let readings = db.list_all_readings()?;
        Ok(readings.into_iter().map(|r| r.into()).collect())
    }

    /// Chart points for a range.
    pub fn graph_data(&self, range: String) -> Result<Vec<FfiGraphPoint>, BpTrackerError> {
        let db = self.db.lock()?;
        let service = ReadingService::with_config(&db, &self.config);
        let points = service.graph_data(&TimeRange::parse_lenient(&range))?;
        Ok(points.into_iter().map(|p| p.into()).collect())
    }

    /// Summary for a range.
    pub fn summary(&self, range: String) -> Result<FfiSummary, BpTrackerError> {
        let db = self.db.lock()?;
        let service = ReadingService::with_config(&db, &self.config);
        let summary = service.summary(&TimeRange::parse_lenient(&range))?;
        Ok(summary.into())
    }

    /// Delete a reading.
    pub fn delete_reading(&self, id: String) -> Result<(), BpTrackerError> {
        let db = self.db.lock()?;
        let service = ReadingService::with_config(&db, &self.config);
        service.delete_reading(&id)?;
        Ok(())
    }

    // =========================================================================
    // Export Operations
    // =========================================================================

    /// Export history as CSV.
    pub fn export_history_csv(&self) -> Result<String, BpTrackerError> {
        let db = self.db.lock()?;
        let exporter = export::HistoryExporter::new(&db);
        Ok(exporter.export_all()?.to_csv())
    }

    /// Export history as JSON.
    pub fn export_history_json(&self) -> Result<String, BpTrackerError> {
        let db = self.db.lock()?;
        let exporter = export::HistoryExporter::new(&db);
        Ok(exporter.export_all()?.to_json()?)
    }

    /// Suggested file name for a CSV export made today.
    pub fn history_file_name(&self) -> String {
        export::history_file_name(chrono::Local::now().date_naive())
    }

    /// Export the summary for a range as JSON.
    pub fn export_summary_json(&self, range: String) -> Result<String, BpTrackerError> {
        let db = self.db.lock()?;
        let service = ReadingService::with_config(&db, &self.config);
        let summary = service.summary(&TimeRange::parse_lenient(&range))?;
        Ok(export::SummaryReport::new(summary).to_json()?)
    }

    /// Export the summary for a range as CSV.
    pub fn export_summary_csv(&self, range: String) -> Result<String, BpTrackerError> {
        let db = self.db.lock()?;
        let service = ReadingService::with_config(&db, &self.config);
        let summary = service.summary(&TimeRange::parse_lenient(&range))?;
        Ok(export::SummaryReport::new(summary).to_csv())
    }

    // =========================================================================
    // Session Operations
    // =========================================================================

    /// Persist the session returned by the authentication service.
    pub fn store_session(&self, session: FfiSession) -> Result<(), BpTrackerError> {
        let db = self.db.lock()?;
        auth::SessionStore::new(&db).store(&session.into())?;
        Ok(())
    }

    /// The stored session, if signed in.
    pub fn current_session(&self) -> Result<Option<FfiSession>, BpTrackerError> {
        let db = self.db.lock()?;
        let session = auth::SessionStore::new(&db).current()?;
        Ok(session.map(|s| s.into()))
    }

    pub fn sign_out(&self) -> Result<(), BpTrackerError> {
        let db = self.db.lock()?;
        auth::SessionStore::new(&db).sign_out()?;
        Ok(())
    }

    /// `Bearer <token>` for authenticated requests.
    pub fn authorization_header(&self) -> Result<String, BpTrackerError> {
        let db = self.db.lock()?;
        Ok(auth::SessionStore::new(&db).authorization_header()?)
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe reading.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiReading {
    pub id: String,
    pub systolic: u32,
    pub diastolic: u32,
    pub pulse: Option<u32>,
    /// `YYYY-MM-DD HH:MM:SS`, local
    pub recorded_at: String,
    pub notes: String,
    pub reading_type: String,
    pub category: String,
}

impl From<Reading> for FfiReading {
    fn from(reading: Reading) -> Self {
        Self {
            category: reading.category().label().to_string(),
            recorded_at: reading.recorded_at.format(models::STORAGE_FORMAT).to_string(),
            reading_type: reading.reading_type.as_str().to_string(),
            id: reading.id,
            systolic: reading.systolic,
            diastolic: reading.diastolic,
            pulse: reading.pulse,
            notes: reading.notes,
        }
    }
}

/// FFI-safe entry form.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewReading {
    pub systolic: u32,
    pub diastolic: u32,
    pub pulse: Option<u32>,
    pub notes: Option<String>,
    pub recorded_at: Option<String>,
    pub reading_type: Option<String>,
}

impl From<FfiNewReading> for NewReading {
    fn from(form: FfiNewReading) -> Self {
        NewReading {
            systolic: form.systolic,
            diastolic: form.diastolic,
            pulse: form.pulse,
            notes: form.notes,
            recorded_at: form.recorded_at,
            reading_type: form.reading_type,
        }
    }
}

/// FFI-safe parse preview.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiParsePreview {
    pub success: bool,
    pub message: String,
    pub systolic: Option<u32>,
    pub diastolic: Option<u32>,
    pub pulse: Option<u32>,
    pub raw_text: String,
}

impl From<ParsePreview> for FfiParsePreview {
    fn from(preview: ParsePreview) -> Self {
        Self {
            success: preview.success,
            message: preview.message,
            systolic: preview.systolic,
            diastolic: preview.diastolic,
            pulse: preview.pulse,
            raw_text: preview.raw_text,
        }
    }
}

/// FFI-safe chart point.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiGraphPoint {
    pub timestamp: String,
    pub time_label: String,
    pub systolic: u32,
    pub diastolic: u32,
    pub pulse: u32,
    pub category: String,
}

impl From<GraphPoint> for FfiGraphPoint {
    fn from(point: GraphPoint) -> Self {
        Self {
            timestamp: point.timestamp,
            time_label: point.time_label,
            systolic: point.systolic,
            diastolic: point.diastolic,
            pulse: point.pulse,
            category: point.category.label().to_string(),
        }
    }
}

/// FFI-safe summary.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSummary {
    pub range: String,
    pub total_readings: u32,
    pub avg_systolic: Option<f64>,
    pub min_systolic: Option<u32>,
    pub max_systolic: Option<u32>,
    pub avg_diastolic: Option<f64>,
    pub min_diastolic: Option<u32>,
    pub max_diastolic: Option<u32>,
    pub avg_pulse: Option<f64>,
    pub min_pulse: Option<u32>,
    pub max_pulse: Option<u32>,
    pub category: Option<String>,
    pub trend: Option<String>,
    pub suggestion: Option<String>,
    pub alerts: Vec<String>,
}

impl From<Summary> for FfiSummary {
    fn from(summary: Summary) -> Self {
        Self {
            range: summary.range,
            total_readings: summary.total_readings as u32,
            avg_systolic: summary.avg_systolic,
            min_systolic: summary.min_systolic,
            max_systolic: summary.max_systolic,
            avg_diastolic: summary.avg_diastolic,
            min_diastolic: summary.min_diastolic,
            max_diastolic: summary.max_diastolic,
            avg_pulse: summary.avg_pulse,
            min_pulse: summary.min_pulse,
            max_pulse: summary.max_pulse,
            category: summary.category.map(|c| c.label().to_string()),
            trend: summary.trend.map(|t| t.label().to_string()),
            suggestion: summary.suggestion,
            alerts: summary.alerts,
        }
    }
}

/// FFI-safe session.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSession {
    pub token: String,
    pub user_id: i64,
    pub username: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
}

impl From<Session> for FfiSession {
    fn from(session: Session) -> Self {
        Self {
            token: session.token,
            user_id: session.user_id,
            username: session.username,
            full_name: session.full_name,
            email: session.email,
        }
    }
}

impl From<FfiSession> for Session {
    fn from(session: FfiSession) -> Self {
        let mut stored = Session::new(session.token, session.user_id, session.username);
        stored.full_name = session.full_name;
        stored.email = session.email;
        stored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(systolic: u32, diastolic: u32) -> FfiNewReading {
        FfiNewReading {
            systolic,
            diastolic,
            pulse: Some(70),
            notes: None,
            recorded_at: None,
            reading_type: None,
        }
    }

    #[test]
    fn test_save_and_list() {
        let core = open_database_in_memory().unwrap();
        let saved = core.save_reading(form(135, 85)).unwrap();
        assert_eq!(saved.category, "High BP Stage 1");
        assert_eq!(saved.reading_type, "MANUAL");

        let all = core.all_readings().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(core.readings_in_range("today".into()).unwrap().len(), 1);
    }

    #[test]
    fn test_error_mapping() {
        let core = open_database_in_memory().unwrap();

        let err = core.save_reading(form(10, 85)).unwrap_err();
        assert!(matches!(err, BpTrackerError::ValidationError(_)));
        assert!(!err.is_retryable());

        let err = core
            .save_from_utterance("banana".into(), "VOICE".into())
            .unwrap_err();
        assert!(matches!(err, BpTrackerError::ParseFailure(_)));

        let err = core.delete_reading("missing".into()).unwrap_err();
        assert!(matches!(err, BpTrackerError::NotFound(_)));

        let err = core.authorization_header().unwrap_err();
        assert!(matches!(err, BpTrackerError::AuthFailure(_)));

        assert!(BpTrackerError::NetworkFailure("timeout".into()).is_retryable());
    }

    #[test]
    fn test_oversized_range_keeps_core_usable() {
        let core = open_database_in_memory().unwrap();
        core.save_reading(form(120, 80)).unwrap();

        let summary = core.summary("100000000d".into()).unwrap();
        assert_eq!(summary.total_readings, 1);
        assert_eq!(core.graph_data("4294967295m".into()).unwrap().len(), 1);
        assert!(core.export_summary_csv("4294967295w".into()).is_ok());

        assert_eq!(core.all_readings().unwrap().len(), 1);
    }

    #[test]
    fn test_session_round_trip() {
        let core = open_database_in_memory().unwrap();
        core.store_session(FfiSession {
            token: "abc".into(),
            user_id: 9,
            username: "jdoe".into(),
            full_name: None,
            email: Some("jdoe@example.com".into()),
        })
        .unwrap();

        assert_eq!(core.authorization_header().unwrap(), "Bearer abc");
        assert_eq!(core.current_session().unwrap().unwrap().user_id, 9);

        core.sign_out().unwrap();
        assert!(core.current_session().unwrap().is_none());
    }

    #[test]
    fn test_summary_and_exports() {
        let core = open_database_in_memory().unwrap();
        core.save_from_utterance("120 over 80 pulse 72".into(), "VOICE".into())
            .unwrap();
        core.save_from_utterance("140 over 95".into(), "TEXT".into())
            .unwrap();

        let summary = core.summary("1w".into()).unwrap();
        assert_eq!(summary.total_readings, 2);
        assert_eq!(summary.avg_systolic, Some(130.0));
        assert_eq!(summary.category.as_deref(), Some("High BP Stage 2"));

        let csv = core.export_history_csv().unwrap();
        assert_eq!(csv.lines().count(), 3);
        assert!(csv.contains("Voice: 120 over 80 pulse 72"));

        let json = core.export_summary_json("1w".into()).unwrap();
        assert!(json.contains("\"range\": \"1w\""));

        assert!(core.history_file_name().starts_with("bp-readings-"));
    }

    #[test]
    fn test_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bp.db").to_string_lossy().into_owned();

        let err = open_database_with_config(
            path.clone(),
            r#"{"parser": {"pulse": {"min": 200, "max": 40}}}"#.into(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, BpTrackerError::ValidationError(_)));

        let core = open_database_with_config(
            path,
            r#"{"summary": {"category_basis": "latest"}}"#.into(),
        )
        .unwrap();
        assert!(core.preview("120/80".into()).success);
    }

    #[test]
    fn test_free_functions() {
        assert_eq!(classify_reading(185, 90), "Hypertensive Crisis");
        let preview = preview_utterance("135/90 heart rate 68".into());
        assert!(preview.success);
        assert_eq!(preview.pulse, Some(68));
        init_logging();
        init_logging();
    }
}
