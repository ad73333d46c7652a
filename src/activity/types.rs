//! Activity data types: raw telemetry, the normalized series and summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::metrics::analytics::pdc::{CriticalPowerPoint, NamedCpSet};
use crate::metrics::zones::ZoneCounts;

/// A single sample as recorded by the head unit.
///
/// Raw samples arrive at roughly one per second but may contain gaps
/// (pauses, dropouts) and duplicate timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// Wall-clock time of the sample
    pub timestamp: DateTime<Utc>,
    /// Start time of the lap this sample belongs to
    pub lap_start: DateTime<Utc>,
    /// Lap number as reported by the device
    #[serde(default)]
    pub lap_number: u32,
    /// Heart rate in BPM (0 = no reading)
    #[serde(default)]
    pub heart_rate_bpm: u8,
    /// Power in watts (0 = no reading or not pedalling)
    #[serde(default)]
    pub power_watts: u16,
    /// Cadence in RPM (0 = freewheeling)
    #[serde(default)]
    pub cadence_rpm: u8,
}

/// How a normalized tick came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TickSource {
    /// Taken directly from a raw sample
    #[default]
    Recorded,
    /// Repeated from the raw sample that closed a gap
    Filled,
    /// Zero-valued filler for a gap
    Zeroed,
}

/// One second of the normalized series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSample {
    /// Seconds since the first emitted tick
    pub elapsed_seconds: u32,
    pub power_watts: u16,
    pub heart_rate_bpm: u8,
    pub cadence_rpm: u8,
    pub source: TickSource,
}

impl NormalizedSample {
    /// Whether the rider was not pedalling during this tick.
    pub fn is_freewheel(&self) -> bool {
        self.cadence_rpm == 0
    }
}

/// Exactly one sample per second, with no gaps and no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSeries {
    samples: Vec<NormalizedSample>,
}

impl NormalizedSeries {
    /// Create an empty series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tick, stamping it with the next elapsed offset.
    pub(crate) fn push(&mut self, power_watts: u16, heart_rate_bpm: u8, cadence_rpm: u8, source: TickSource) -> NormalizedSample {
        let sample = NormalizedSample {
            elapsed_seconds: self.samples.len() as u32,
            power_watts,
            heart_rate_bpm,
            cadence_rpm,
            source,
        };
        self.samples.push(sample);
        sample
    }

    pub fn samples(&self) -> &[NormalizedSample] {
        &self.samples
    }

    /// Number of ticks, the unit of every downstream duration.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn power(&self) -> Vec<u16> {
        self.samples.iter().map(|s| s.power_watts).collect()
    }

    pub fn heart_rate(&self) -> Vec<u8> {
        self.samples.iter().map(|s| s.heart_rate_bpm).collect()
    }

    pub fn cadence(&self) -> Vec<u8> {
        self.samples.iter().map(|s| s.cadence_rpm).collect()
    }
}

/// Averages for one lap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LapSummary {
    pub lap_number: u32,
    pub avg_power: u16,
    pub avg_heart_rate: u8,
    /// Average cadence excluding freewheel ticks
    pub avg_cadence: u8,
    pub duration_secs: u32,
}

/// Headline metrics for a whole activity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub start_time: DateTime<Utc>,
    pub duration_secs: u32,
    pub avg_power: u16,
    pub avg_heart_rate: u8,
    pub avg_cadence: u8,
    pub normalized_power: u16,
    /// Intensity factor x100
    pub intensity_factor: f64,
    /// Heart-rate intensity x100 (secondary indicator)
    pub if_from_heart: u32,
    pub tss: u32,
    pub estimated_tss: u32,
    pub work_kj: u32,
    pub energy_kj: u32,
    pub energy_kcal: u32,
}

impl ActivitySummary {
    /// Duration in hours.
    pub fn duration_hours(&self) -> f64 {
        self.duration_secs as f64 / 3600.0
    }
}

/// User-entered details attached to an activity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityMeta {
    /// TSS typed in by the user; 0 means none
    pub tss_override: u32,
    pub motivation_level: u8,
    pub perceived_effort: u8,
    pub is_indoor: bool,
    pub is_outdoor: bool,
    pub is_race: bool,
    pub is_training: bool,
    pub omit_from_chart: bool,
    pub standard_ride_id: Option<u32>,
    pub notes: String,
}

impl ActivityMeta {
    /// Update a single field by name from text, as given on the command line.
    ///
    /// `standard_ride_id` accepts `none` to clear it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        let invalid = |e: &dyn std::fmt::Display| format!("{}: {}", key, e);

        match key {
            "tss_override" | "tss" => self.tss_override = value.parse().map_err(|e| invalid(&e))?,
            "motivation_level" | "motivation" => self.motivation_level = value.parse().map_err(|e| invalid(&e))?,
            "perceived_effort" | "effort" => self.perceived_effort = value.parse().map_err(|e| invalid(&e))?,
            "is_indoor" | "indoor" => self.is_indoor = value.parse().map_err(|e| invalid(&e))?,
            "is_outdoor" | "outdoor" => self.is_outdoor = value.parse().map_err(|e| invalid(&e))?,
            "is_race" | "race" => self.is_race = value.parse().map_err(|e| invalid(&e))?,
            "is_training" | "training" => self.is_training = value.parse().map_err(|e| invalid(&e))?,
            "omit_from_chart" | "omit" => self.omit_from_chart = value.parse().map_err(|e| invalid(&e))?,
            "standard_ride_id" | "standard_ride" => {
                self.standard_ride_id = match value.trim() {
                    "" | "none" => None,
                    id => Some(id.parse().map_err(|e| invalid(&e))?),
                }
            }
            "notes" => self.notes = value.to_string(),
            other => return Err(format!("unknown activity field '{}'", other)),
        }
        Ok(())
    }
}

/// Counts of gap handling decisions made while normalizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GapReport {
    /// Gaps treated as pauses (nothing emitted)
    pub pauses: u32,
    /// Ticks synthesized by autofill or setzero
    pub filled_ticks: u32,
    /// Seconds discarded by the remove policy
    pub dropped_ticks: u32,
    /// Raw samples sharing a second with their predecessor
    pub duplicates: u32,
}

/// Everything derived from one activity's raw samples.
///
/// Stored as-is by the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedActivity {
    pub series: NormalizedSeries,
    pub laps: Vec<LapSummary>,
    pub summary: ActivitySummary,
    pub curve: Vec<CriticalPowerPoint>,
    pub named_cp: NamedCpSet,
    pub zones: ZoneCounts,
    pub gaps: GapReport,
    pub has_power: bool,
    pub has_heart: bool,
    pub has_cadence: bool,
    /// FTP in effect when the activity was processed
    pub ftp: u16,
    /// THR in effect when the activity was processed
    pub thr: u8,
}

/// A processed activity as seen by history views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityHistoryEntry {
    pub activity_id: Uuid,
    pub summary: ActivitySummary,
    pub has_power: bool,
    pub has_heart: bool,
    #[serde(default)]
    pub meta: ActivityMeta,
    #[serde(default)]
    pub named_cp: NamedCpSet,
}

impl ActivityHistoryEntry {
    pub fn start_time(&self) -> DateTime<Utc> {
        self.summary.start_time
    }

    /// TSS used by every history view.
    ///
    /// A user override wins, then power TSS, then heart-rate estimated TSS.
    pub fn effective_tss(&self) -> u32 {
        if self.meta.tss_override > 0 {
            self.meta.tss_override
        } else if self.has_power {
            self.summary.tss
        } else if self.has_heart {
            self.summary.estimated_tss
        } else {
            0
        }
    }
}

/// Human readable title, e.g. `Monday Jan 2, 2006 at 3:04pm`.
pub fn activity_title(start: DateTime<Utc>) -> String {
    start.format("%A %b %-d, %Y at %-I:%M%P").to_string()
}
