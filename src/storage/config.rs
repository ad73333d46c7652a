//! User profile and application configuration.

use crate::activity::normalizer::{FillMode, GapPolicy};
use crate::metrics::analytics::pdc::NamedDuration;
use crate::metrics::analytics::performance::DEFAULT_ROLLOFF;
use crate::metrics::calculator::{BodyMetrics, Gender};
use crate::metrics::zones::DEFAULT_ZONE_WINDOW;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Rider thresholds and processing preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Functional Threshold Power in watts
    pub ftp: u16,
    /// Threshold heart rate in bpm
    pub thr: u8,
    /// Gaps of this many seconds or more are pauses
    pub stopgap_secs: u32,
    /// Handling of missing seconds in shorter gaps
    pub fill_mode: FillMode,
    /// Rolling window for power zones, in seconds
    pub sample_window: usize,
    /// ATL time constant in days
    pub atl_days: f64,
    /// CTL time constant in days
    pub ctl_days: f64,
    /// Per-activity decay of the notable CP record
    pub rolloff: f64,
    /// VO2max in ml/kg/min, 0 when unknown
    pub vo2max: f32,
    /// Weight in kilograms
    pub weight_kg: f32,
    pub age: u32,
    pub gender: Gender,
    /// Profile creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Default for UserProfile {
    fn default() -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            name: "Cyclist".to_string(),
            ftp: 250,
            thr: 160,
            stopgap_secs: 30,
            fill_mode: FillMode::Autofill,
            sample_window: DEFAULT_ZONE_WINDOW,
            atl_days: 7.0,
            ctl_days: 42.0,
            rolloff: DEFAULT_ROLLOFF,
            vo2max: 0.0,
            weight_kg: 75.0,
            age: 0,
            gender: Gender::Unspecified,
            created_at: now,
            updated_at: now,
        }
    }
}

impl UserProfile {
    /// Create a new user profile with the given name.
    pub fn new(name: String) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    /// Check every value the analytics core relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |msg: &str| Err(ConfigError::ValidationError(msg.to_string()));

        if self.ftp == 0 {
            return fail("FTP must be greater than zero");
        }
        if self.thr == 0 {
            return fail("threshold heart rate must be greater than zero");
        }
        if self.stopgap_secs == 0 {
            return fail("stop gap must be at least one second");
        }
        if self.sample_window == 0 {
            return fail("sample window must be at least one second");
        }
        if !(self.atl_days > 0.0 && self.ctl_days > 0.0) {
            return fail("ATL and CTL constants must be positive");
        }
        if !(self.rolloff > 0.0 && self.rolloff <= 1.0) {
            return fail("roll-off must be in (0, 1]");
        }
        Ok(())
    }

    /// Update a single setting by name from text, as given on the command line.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |e: &dyn std::fmt::Display| ConfigError::ValidationError(format!("{}: {}", key, e));

        let mut updated = self.clone();
        match key {
            "name" => updated.name = value.to_string(),
            "ftp" => updated.ftp = value.parse().map_err(|e| invalid(&e))?,
            "thr" => updated.thr = value.parse().map_err(|e| invalid(&e))?,
            "stopgap" | "stopgap_secs" => updated.stopgap_secs = value.parse().map_err(|e| invalid(&e))?,
            "fill_mode" | "autofill" => updated.fill_mode = value.parse().map_err(|e| invalid(&e))?,
            "sample_window" => updated.sample_window = value.parse().map_err(|e| invalid(&e))?,
            "atl_days" => updated.atl_days = value.parse().map_err(|e| invalid(&e))?,
            "ctl_days" => updated.ctl_days = value.parse().map_err(|e| invalid(&e))?,
            "rolloff" => updated.rolloff = value.parse().map_err(|e| invalid(&e))?,
            "vo2max" => updated.vo2max = value.parse().map_err(|e| invalid(&e))?,
            "weight_kg" | "weight" => updated.weight_kg = value.parse().map_err(|e| invalid(&e))?,
            "age" => updated.age = value.parse().map_err(|e| invalid(&e))?,
            "gender" => updated.gender = value.parse().map_err(|e| invalid(&e))?,
            other => {
                return Err(ConfigError::ValidationError(format!("unknown setting '{}'", other)));
            }
        }

        updated.validate()?;
        updated.updated_at = Utc::now();
        *self = updated;
        Ok(())
    }

    pub fn gap_policy(&self) -> GapPolicy {
        GapPolicy {
            stopgap_secs: self.stopgap_secs,
            fill_mode: self.fill_mode,
        }
    }

    pub fn body(&self) -> BodyMetrics {
        BodyMetrics {
            vo2max: self.vo2max,
            weight_kg: self.weight_kg,
            age: self.age,
            gender: self.gender,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application version
    pub version: String,
    /// Data directory path
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Storage settings
    pub storage: StorageSettings,
    /// History view settings
    pub analysis: AnalysisSettings,
    /// Profile used when the database has none yet
    pub profile: UserProfile,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            data_dir: PathBuf::new(),
            storage: StorageSettings::default(),
            analysis: AnalysisSettings::default(),
            profile: UserProfile::default(),
        }
    }
}

impl AppConfig {
    /// Database location, defaulting to `ridelab.db` in the data directory.
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("ridelab.db"))
    }
}

/// Storage-related settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Override for the SQLite database file
    pub database_path: Option<PathBuf>,
}

/// History view settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Default history window in days
    pub history_days: u32,
    /// Named duration tracked by fitness and performance charts
    pub notable_duration: NamedDuration,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            history_days: 42,
            notable_duration: NamedDuration::TwentyMinutes,
        }
    }
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("org", "ridelab", "RideLab")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Load application configuration from the default location.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let mut config = load_config_from(&get_config_path())?;
    config.data_dir = get_data_dir();
    Ok(config)
}

/// Load configuration from a file; a missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let data_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(AppConfig {
            data_dir,
            ..Default::default()
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    let mut config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    config.profile.validate()?;
    config.data_dir = data_dir;

    Ok(config)
}

/// Save application configuration to the default location.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_config_to(config, &get_config_path())
}

/// Save application configuration to a file.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content = toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid setting: {0}")]
    ValidationError(String),
}
