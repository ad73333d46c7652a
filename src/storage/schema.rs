//! Database schema definitions for RideLab.

/// SQL schema for creating all database tables.
pub const SCHEMA: &str = r#"
-- Users table
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    ftp INTEGER NOT NULL DEFAULT 250,
    thr INTEGER NOT NULL DEFAULT 160,
    stopgap_secs INTEGER NOT NULL DEFAULT 30,
    fill_mode TEXT NOT NULL DEFAULT 'autofill',
    sample_window INTEGER NOT NULL DEFAULT 5,
    atl_days REAL NOT NULL DEFAULT 7.0,
    ctl_days REAL NOT NULL DEFAULT 42.0,
    rolloff REAL NOT NULL DEFAULT 0.995,
    vo2max REAL NOT NULL DEFAULT 0.0,
    weight_kg REAL NOT NULL,
    age INTEGER NOT NULL DEFAULT 0,
    gender TEXT NOT NULL DEFAULT 'unspecified',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Activities table; derived columns stay NULL until processed
CREATE TABLE IF NOT EXISTS activities (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id),
    started_at TEXT NOT NULL,
    duration_seconds INTEGER,
    has_power INTEGER NOT NULL DEFAULT 0,
    has_heart INTEGER NOT NULL DEFAULT 0,
    has_cadence INTEGER NOT NULL DEFAULT 0,
    ftp_at_processing INTEGER,
    thr_at_processing INTEGER,
    summary_json TEXT,
    laps_json TEXT,
    named_cp_json TEXT,
    zones_json TEXT,
    gaps_json TEXT,
    processed_at TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_activities_user_started ON activities(user_id, started_at);

-- Raw samples as recorded, one blob per activity
CREATE TABLE IF NOT EXISTS raw_samples (
    activity_id TEXT PRIMARY KEY REFERENCES activities(id),
    sample_count INTEGER NOT NULL,
    samples_blob BLOB NOT NULL
);

-- Normalized series and critical power curve blobs
CREATE TABLE IF NOT EXISTS activity_blobs (
    activity_id TEXT PRIMARY KEY REFERENCES activities(id),
    series_blob BLOB NOT NULL,
    curve_blob BLOB NOT NULL
);

-- User-entered activity details
CREATE TABLE IF NOT EXISTS activity_meta (
    activity_id TEXT PRIMARY KEY REFERENCES activities(id),
    tss_override INTEGER NOT NULL DEFAULT 0,
    motivation_level INTEGER NOT NULL DEFAULT 0,
    perceived_effort INTEGER NOT NULL DEFAULT 0,
    is_indoor INTEGER NOT NULL DEFAULT 0,
    is_outdoor INTEGER NOT NULL DEFAULT 0,
    is_race INTEGER NOT NULL DEFAULT 0,
    is_training INTEGER NOT NULL DEFAULT 0,
    omit_from_chart INTEGER NOT NULL DEFAULT 0,
    standard_ride_id INTEGER,
    notes TEXT NOT NULL DEFAULT ''
);
"#;

/// Schema version tracking table
pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);
"#;

/// Current schema version
pub const CURRENT_VERSION: i32 = 1;
