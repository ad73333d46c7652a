//! Database operations using rusqlite.

use crate::activity::normalizer::FillMode;
use crate::activity::types::{
    ActivityHistoryEntry, ActivityMeta, ActivitySummary, GapReport, LapSummary, NormalizedSeries, ProcessedActivity,
    RawSample,
};
use crate::metrics::analytics::pdc::{CriticalPowerPoint, NamedCpSet};
use crate::metrics::calculator::Gender;
use crate::metrics::zones::ZoneCounts;
use crate::storage::config::UserProfile;
use crate::storage::schema::{CURRENT_VERSION, SCHEMA, SCHEMA_VERSION_TABLE};
use crate::storage::store::ActivityStore;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

/// Database wrapper for SQLite operations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create a database at the given path.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::IoError(e.to_string()))?;
        }

        let conn = Connection::open(path).map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let db = Self { conn };
        db.initialize()?;

        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory().map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let db = Self { conn };
        db.initialize()?;

        Ok(db)
    }

    /// Initialize the database schema.
    fn initialize(&self) -> Result<(), DatabaseError> {
        // Create schema version table
        self.conn
            .execute_batch(SCHEMA_VERSION_TABLE)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        // Check current version
        let current_version = self.get_schema_version()?;

        if current_version < CURRENT_VERSION {
            self.migrate(current_version)?;
        }

        Ok(())
    }

    /// Get the current schema version.
    fn get_schema_version(&self) -> Result<i32, DatabaseError> {
        let result: SqliteResult<i32> =
            self.conn
                .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |row| row.get(0));

        match result {
            Ok(version) => Ok(version),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Run database migrations.
    fn migrate(&self, from_version: i32) -> Result<(), DatabaseError> {
        if from_version < 1 {
            // Initial schema
            self.conn
                .execute_batch(SCHEMA)
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

            // Record version
            self.conn
                .execute(
                    "INSERT INTO schema_version (version, applied_at) VALUES (?, datetime('now'))",
                    [CURRENT_VERSION],
                )
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

            tracing::info!("Database migrated to version {}", CURRENT_VERSION);
        }

        Ok(())
    }

    // ========== User Profiles ==========

    /// Get a user profile by ID.
    pub fn get_user(&self, id: &Uuid) -> Result<Option<UserProfile>, DatabaseError> {
        let sql = format!("{} WHERE id = ?1", SELECT_USER);
        let row = self
            .conn
            .query_row(&sql, params![id.to_string()], UserProfileRow::from_row)
            .optional()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        row.map(UserProfileRow::into_user_profile).transpose()
    }

    /// Get the first user created, if any.
    pub fn get_default_user(&self) -> Result<Option<UserProfile>, DatabaseError> {
        let sql = format!("{} ORDER BY created_at LIMIT 1", SELECT_USER);
        let row = self
            .conn
            .query_row(&sql, [], UserProfileRow::from_row)
            .optional()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        row.map(UserProfileRow::into_user_profile).transpose()
    }

    /// Get the default user, creating it from `template` if none exists.
    pub fn get_or_create_default_user(&mut self, template: &UserProfile) -> Result<UserProfile, DatabaseError> {
        if let Some(user) = self.get_default_user()? {
            return Ok(user);
        }

        self.save_user_profile(template)?;
        tracing::info!("Created default user {}", template.id);
        Ok(template.clone())
    }

    fn activity_exists(&self, activity_id: &Uuid) -> Result<bool, DatabaseError> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM activities WHERE id = ?1",
                params![activity_id.to_string()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(found.is_some())
    }

    /// Read one JSON column of a processed activity.
    fn activity_json<T: DeserializeOwned>(&self, activity_id: &Uuid, column: &str) -> Result<T, DatabaseError> {
        let sql = format!("SELECT {} FROM activities WHERE id = ?1", column);
        let json: Option<Option<String>> = self
            .conn
            .query_row(&sql, params![activity_id.to_string()], |row| row.get(0))
            .optional()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        match json {
            None => Err(DatabaseError::NotFound(format!("activity {}", activity_id))),
            Some(None) => Err(DatabaseError::NotFound(format!("processed data for activity {}", activity_id))),
            Some(Some(text)) => from_json(&text, column),
        }
    }

    fn activity_blobs(&self, activity_id: &Uuid) -> Result<(Vec<u8>, Vec<u8>), DatabaseError> {
        self.conn
            .query_row(
                "SELECT series_blob, curve_blob FROM activity_blobs WHERE activity_id = ?1",
                params![activity_id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?
            .ok_or_else(|| DatabaseError::NotFound(format!("processed data for activity {}", activity_id)))
    }
}

impl ActivityStore for Database {
    fn fetch_raw_samples(&self, activity_id: &Uuid) -> Result<Vec<RawSample>, DatabaseError> {
        let blob: Vec<u8> = self
            .conn
            .query_row(
                "SELECT samples_blob FROM raw_samples WHERE activity_id = ?1",
                params![activity_id.to_string()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?
            .ok_or_else(|| DatabaseError::NotFound(format!("raw samples for activity {}", activity_id)))?;

        from_blob(&blob)
    }

    fn fetch_user_profile(&self, user_id: &Uuid) -> Result<UserProfile, DatabaseError> {
        self.get_user(user_id)?
            .ok_or_else(|| DatabaseError::NotFound(format!("user {}", user_id)))
    }

    fn fetch_activity_summaries(
        &self,
        user_id: &Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ActivityHistoryEntry>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT a.id, a.summary_json, a.has_power, a.has_heart, a.named_cp_json,
                 m.tss_override, m.motivation_level, m.perceived_effort, m.is_indoor, m.is_outdoor,
                 m.is_race, m.is_training, m.omit_from_chart, m.standard_ride_id, m.notes
                 FROM activities a LEFT JOIN activity_meta m ON m.activity_id = a.id
                 WHERE a.user_id = ?1 AND a.summary_json IS NOT NULL
                 AND a.started_at >= ?2 AND a.started_at < ?3
                 ORDER BY a.started_at",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(
                params![user_id.to_string(), timestamp_key(from), timestamp_key(to)],
                |row| {
                    Ok(HistoryRow {
                        id: row.get(0)?,
                        summary_json: row.get(1)?,
                        has_power: row.get(2)?,
                        has_heart: row.get(3)?,
                        named_cp_json: row.get(4)?,
                        meta: MetaRow::from_row_at(row, 5)?,
                    })
                },
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut entries = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            entries.push(row.into_entry()?);
        }

        Ok(entries)
    }

    fn fetch_critical_power_curve(&self, activity_id: &Uuid) -> Result<Vec<CriticalPowerPoint>, DatabaseError> {
        let (_, curve_blob) = self.activity_blobs(activity_id)?;
        from_blob(&curve_blob)
    }

    fn fetch_named_cp_set(&self, activity_id: &Uuid) -> Result<NamedCpSet, DatabaseError> {
        self.activity_json(activity_id, "named_cp_json")
    }

    fn fetch_activity_meta(&self, activity_id: &Uuid) -> Result<ActivityMeta, DatabaseError> {
        let row = self
            .conn
            .query_row(
                "SELECT tss_override, motivation_level, perceived_effort, is_indoor, is_outdoor,
                 is_race, is_training, omit_from_chart, standard_ride_id, notes
                 FROM activity_meta WHERE activity_id = ?1",
                params![activity_id.to_string()],
                |row| MetaRow::from_row_at(row, 0),
            )
            .optional()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(row.map(MetaRow::into_meta).unwrap_or_default())
    }

    fn fetch_processed(&self, activity_id: &Uuid) -> Result<ProcessedActivity, DatabaseError> {
        let row = self
            .conn
            .query_row(
                "SELECT summary_json, laps_json, named_cp_json, zones_json, gaps_json,
                 has_power, has_heart, has_cadence, ftp_at_processing, thr_at_processing
                 FROM activities WHERE id = ?1 AND summary_json IS NOT NULL",
                params![activity_id.to_string()],
                |row| {
                    Ok(ProcessedRow {
                        summary_json: row.get(0)?,
                        laps_json: row.get(1)?,
                        named_cp_json: row.get(2)?,
                        zones_json: row.get(3)?,
                        gaps_json: row.get(4)?,
                        has_power: row.get(5)?,
                        has_heart: row.get(6)?,
                        has_cadence: row.get(7)?,
                        ftp: row.get(8)?,
                        thr: row.get(9)?,
                    })
                },
            )
            .optional()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?
            .ok_or_else(|| DatabaseError::NotFound(format!("processed activity {}", activity_id)))?;

        let (series_blob, curve_blob) = self.activity_blobs(activity_id)?;

        Ok(ProcessedActivity {
            series: from_blob::<NormalizedSeries>(&series_blob)?,
            laps: from_json::<Vec<LapSummary>>(&row.laps_json, "laps_json")?,
            summary: from_json::<ActivitySummary>(&row.summary_json, "summary_json")?,
            curve: from_blob::<Vec<CriticalPowerPoint>>(&curve_blob)?,
            named_cp: from_json::<NamedCpSet>(&row.named_cp_json, "named_cp_json")?,
            zones: from_json::<ZoneCounts>(&row.zones_json, "zones_json")?,
            gaps: from_json::<GapReport>(&row.gaps_json, "gaps_json")?,
            has_power: row.has_power,
            has_heart: row.has_heart,
            has_cadence: row.has_cadence,
            ftp: row.ftp,
            thr: row.thr,
        })
    }

    fn fetch_activity_ids(&self, user_id: &Uuid) -> Result<Vec<Uuid>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM activities WHERE user_id = ?1 ORDER BY started_at")
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![user_id.to_string()], |row| row.get::<_, String>(0))
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut ids = Vec::new();
        for row in rows {
            let id = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            ids.push(parse_uuid(&id)?);
        }

        Ok(ids)
    }

    fn save_user_profile(&mut self, profile: &UserProfile) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO users (id, name, ftp, thr, stopgap_secs, fill_mode, sample_window,
                 atl_days, ctl_days, rolloff, vo2max, weight_kg, age, gender, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                params![
                    profile.id.to_string(),
                    profile.name,
                    profile.ftp,
                    profile.thr,
                    profile.stopgap_secs,
                    profile.fill_mode.to_string(),
                    profile.sample_window,
                    profile.atl_days,
                    profile.ctl_days,
                    profile.rolloff,
                    profile.vo2max,
                    profile.weight_kg,
                    profile.age,
                    profile.gender.to_string(),
                    profile.created_at.to_rfc3339(),
                    profile.updated_at.to_rfc3339(),
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    fn save_raw_samples(&mut self, user_id: &Uuid, activity_id: &Uuid, samples: &[RawSample]) -> Result<(), DatabaseError> {
        let first = samples
            .first()
            .ok_or_else(|| DatabaseError::ConstraintViolation("activity has no samples".to_string()))?;
        let blob = to_blob(&samples)?;

        let tx = self
            .conn
            .transaction()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        tx.execute(
            "INSERT INTO activities (id, user_id, started_at, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                activity_id.to_string(),
                user_id.to_string(),
                timestamp_key(first.lap_start),
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        tx.execute(
            "INSERT INTO raw_samples (activity_id, sample_count, samples_blob) VALUES (?1, ?2, ?3)",
            params![activity_id.to_string(), samples.len(), blob],
        )
        .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        tx.commit()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        tracing::debug!("Stored {} raw samples for activity {}", samples.len(), activity_id);
        Ok(())
    }

    fn save_processed(&mut self, activity_id: &Uuid, activity: &ProcessedActivity) -> Result<(), DatabaseError> {
        if !self.activity_exists(activity_id)? {
            return Err(DatabaseError::NotFound(format!("activity {}", activity_id)));
        }

        let series_blob = to_blob(&activity.series)?;
        let curve_blob = to_blob(&activity.curve)?;

        let tx = self
            .conn
            .transaction()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        tx.execute(
            "UPDATE activities SET duration_seconds = ?2, has_power = ?3, has_heart = ?4, has_cadence = ?5,
             ftp_at_processing = ?6, thr_at_processing = ?7, summary_json = ?8, laps_json = ?9,
             named_cp_json = ?10, zones_json = ?11, gaps_json = ?12, processed_at = ?13
             WHERE id = ?1",
            params![
                activity_id.to_string(),
                activity.summary.duration_secs,
                activity.has_power,
                activity.has_heart,
                activity.has_cadence,
                activity.ftp,
                activity.thr,
                to_json(&activity.summary)?,
                to_json(&activity.laps)?,
                to_json(&activity.named_cp)?,
                to_json(&activity.zones)?,
                to_json(&activity.gaps)?,
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        tx.execute(
            "INSERT OR REPLACE INTO activity_blobs (activity_id, series_blob, curve_blob) VALUES (?1, ?2, ?3)",
            params![activity_id.to_string(), series_blob, curve_blob],
        )
        .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        tx.commit()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    fn save_activity_meta(&mut self, activity_id: &Uuid, meta: &ActivityMeta) -> Result<(), DatabaseError> {
        if !self.activity_exists(activity_id)? {
            return Err(DatabaseError::NotFound(format!("activity {}", activity_id)));
        }

        self.conn
            .execute(
                "INSERT OR REPLACE INTO activity_meta (activity_id, tss_override, motivation_level,
                 perceived_effort, is_indoor, is_outdoor, is_race, is_training, omit_from_chart,
                 standard_ride_id, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    activity_id.to_string(),
                    meta.tss_override,
                    meta.motivation_level,
                    meta.perceived_effort,
                    meta.is_indoor,
                    meta.is_outdoor,
                    meta.is_race,
                    meta.is_training,
                    meta.omit_from_chart,
                    meta.standard_ride_id,
                    meta.notes,
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    fn delete_activity(&mut self, activity_id: &Uuid) -> Result<(), DatabaseError> {
        let id = activity_id.to_string();
        let tx = self
            .conn
            .transaction()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        for table in ["raw_samples", "activity_blobs", "activity_meta"] {
            tx.execute(&format!("DELETE FROM {} WHERE activity_id = ?1", table), params![id])
                .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        }
        let deleted = tx
            .execute("DELETE FROM activities WHERE id = ?1", params![id])
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if deleted == 0 {
            return Err(DatabaseError::NotFound(format!("activity {}", activity_id)));
        }

        tx.commit()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        Ok(())
    }
}

/// Sortable text form used for the `started_at` column.
fn timestamp_key(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_uuid(text: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(text).map_err(|e| DatabaseError::DeserializationError(format!("Invalid UUID: {}", e)))
}

fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::DeserializationError(format!("Invalid timestamp: {}", e)))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, DatabaseError> {
    serde_json::to_string(value).map_err(|e| DatabaseError::SerializationError(e.to_string()))
}

fn from_json<T: DeserializeOwned>(text: &str, column: &str) -> Result<T, DatabaseError> {
    serde_json::from_str(text).map_err(|e| DatabaseError::DeserializationError(format!("Invalid {}: {}", column, e)))
}

fn to_blob<T: Serialize>(value: &T) -> Result<Vec<u8>, DatabaseError> {
    bincode::serialize(value).map_err(|e| DatabaseError::SerializationError(e.to_string()))
}

fn from_blob<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DatabaseError> {
    bincode::deserialize(bytes).map_err(|e| DatabaseError::DeserializationError(e.to_string()))
}

const SELECT_USER: &str = "SELECT id, name, ftp, thr, stopgap_secs, fill_mode, sample_window, atl_days,
     ctl_days, rolloff, vo2max, weight_kg, age, gender, created_at, updated_at FROM users";

/// Intermediate struct for reading user rows from database.
struct UserProfileRow {
    id: String,
    name: String,
    ftp: u16,
    thr: u8,
    stopgap_secs: u32,
    fill_mode: String,
    sample_window: usize,
    atl_days: f64,
    ctl_days: f64,
    rolloff: f64,
    vo2max: f32,
    weight_kg: f32,
    age: u32,
    gender: String,
    created_at: String,
    updated_at: String,
}

impl UserProfileRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            ftp: row.get(2)?,
            thr: row.get(3)?,
            stopgap_secs: row.get(4)?,
            fill_mode: row.get(5)?,
            sample_window: row.get(6)?,
            atl_days: row.get(7)?,
            ctl_days: row.get(8)?,
            rolloff: row.get(9)?,
            vo2max: row.get(10)?,
            weight_kg: row.get(11)?,
            age: row.get(12)?,
            gender: row.get(13)?,
            created_at: row.get(14)?,
            updated_at: row.get(15)?,
        })
    }

    fn into_user_profile(self) -> Result<UserProfile, DatabaseError> {
        let fill_mode: FillMode = self
            .fill_mode
            .parse()
            .map_err(DatabaseError::DeserializationError)?;
        let gender: Gender = self.gender.parse().map_err(DatabaseError::DeserializationError)?;

        Ok(UserProfile {
            id: parse_uuid(&self.id)?,
            name: self.name,
            ftp: self.ftp,
            thr: self.thr,
            stopgap_secs: self.stopgap_secs,
            fill_mode,
            sample_window: self.sample_window,
            atl_days: self.atl_days,
            ctl_days: self.ctl_days,
            rolloff: self.rolloff,
            vo2max: self.vo2max,
            weight_kg: self.weight_kg,
            age: self.age,
            gender,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

/// Activity meta columns; all NULL when read through a join with no meta row.
struct MetaRow {
    tss_override: Option<u32>,
    motivation_level: Option<u8>,
    perceived_effort: Option<u8>,
    is_indoor: Option<bool>,
    is_outdoor: Option<bool>,
    is_race: Option<bool>,
    is_training: Option<bool>,
    omit_from_chart: Option<bool>,
    standard_ride_id: Option<u32>,
    notes: Option<String>,
}

impl MetaRow {
    fn from_row_at(row: &rusqlite::Row, first: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            tss_override: row.get(first)?,
            motivation_level: row.get(first + 1)?,
            perceived_effort: row.get(first + 2)?,
            is_indoor: row.get(first + 3)?,
            is_outdoor: row.get(first + 4)?,
            is_race: row.get(first + 5)?,
            is_training: row.get(first + 6)?,
            omit_from_chart: row.get(first + 7)?,
            standard_ride_id: row.get(first + 8)?,
            notes: row.get(first + 9)?,
        })
    }

    fn into_meta(self) -> ActivityMeta {
        ActivityMeta {
            tss_override: self.tss_override.unwrap_or_default(),
            motivation_level: self.motivation_level.unwrap_or_default(),
            perceived_effort: self.perceived_effort.unwrap_or_default(),
            is_indoor: self.is_indoor.unwrap_or_default(),
            is_outdoor: self.is_outdoor.unwrap_or_default(),
            is_race: self.is_race.unwrap_or_default(),
            is_training: self.is_training.unwrap_or_default(),
            omit_from_chart: self.omit_from_chart.unwrap_or_default(),
            standard_ride_id: self.standard_ride_id,
            notes: self.notes.unwrap_or_default(),
        }
    }
}

/// Intermediate struct for reading history rows.
struct HistoryRow {
    id: String,
    summary_json: String,
    has_power: bool,
    has_heart: bool,
    named_cp_json: Option<String>,
    meta: MetaRow,
}

impl HistoryRow {
    fn into_entry(self) -> Result<ActivityHistoryEntry, DatabaseError> {
        let named_cp = match self.named_cp_json {
            Some(json) => from_json(&json, "named_cp_json")?,
            None => NamedCpSet::default(),
        };

        Ok(ActivityHistoryEntry {
            activity_id: parse_uuid(&self.id)?,
            summary: from_json(&self.summary_json, "summary_json")?,
            has_power: self.has_power,
            has_heart: self.has_heart,
            meta: self.meta.into_meta(),
            named_cp,
        })
    }
}

/// Intermediate struct for reading processed activity rows.
struct ProcessedRow {
    summary_json: String,
    laps_json: String,
    named_cp_json: String,
    zones_json: String,
    gaps_json: String,
    has_power: bool,
    has_heart: bool,
    has_cadence: bool,
    ftp: u16,
    thr: u8,
}

/// Database errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}
