//! SQLite schema definition.

/// Complete database schema for the tracker.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Readings (append-only from the user's point of view; rows are deleted, never edited)
-- ============================================================================

CREATE TABLE IF NOT EXISTS readings (
    id TEXT PRIMARY KEY,
    systolic INTEGER NOT NULL CHECK (systolic > 0),
    diastolic INTEGER NOT NULL CHECK (diastolic > 0),
    pulse INTEGER,                               -- NULL when not taken
    notes TEXT NOT NULL DEFAULT '',
    reading_type TEXT NOT NULL DEFAULT 'MANUAL' CHECK (reading_type IN ('MANUAL', 'VOICE', 'TEXT')),
    recorded_at TEXT NOT NULL,                   -- local time, YYYY-MM-DD HH:MM:SS
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_readings_recorded_at ON readings(recorded_at);

-- ============================================================================
-- Session (single row, replaced on sign-in)
-- ============================================================================

CREATE TABLE IF NOT EXISTS session (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    token TEXT NOT NULL,
    user_id INTEGER NOT NULL,
    username TEXT NOT NULL,
    full_name TEXT,
    email TEXT,
    signed_in_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
