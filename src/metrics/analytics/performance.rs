//! Notable critical power tracking and the heart-rate vs power chart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::types::ActivityHistoryEntry;
use crate::metrics::analytics::pdc::NamedDuration;

/// Default per-activity decay of the notable CP record.
pub const DEFAULT_ROLLOFF: f64 = 0.995;

/// Running record for one named duration.
///
/// A value above the record replaces it; anything else decays the record
/// by the roll-off, so older bests fade between new ones.
#[derive(Debug, Clone, Copy)]
pub struct NotableCpTracker {
    record: f64,
    rolloff: f64,
}

impl NotableCpTracker {
    pub fn new(rolloff: f64) -> Self {
        Self {
            record: 0.0,
            rolloff,
        }
    }

    /// Feed the next activity's value; returns true on a new record.
    pub fn observe(&mut self, value: f64) -> bool {
        if value > self.record {
            self.record = value;
            true
        } else {
            self.record *= self.rolloff;
            false
        }
    }

    /// Current (possibly decayed) record.
    pub fn record(&self) -> f64 {
        self.record
    }
}

impl Default for NotableCpTracker {
    fn default() -> Self {
        Self::new(DEFAULT_ROLLOFF)
    }
}

/// Which activities appear on the performance chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceFilter {
    /// Tracked duration
    pub duration: NamedDuration,
    /// Minimum activity length in minutes
    pub from_minutes: u32,
    /// Maximum activity length in minutes, 0 for no limit
    pub to_minutes: u32,
    pub indoor_only: bool,
    pub outdoor_only: bool,
    pub race_only: bool,
    pub training_only: bool,
    pub require_heart: bool,
    /// Restrict to these standard rides when non-empty
    pub standard_rides: Vec<u32>,
}

impl PerformanceFilter {
    /// Whether an activity passes every filter.
    pub fn accepts(&self, entry: &ActivityHistoryEntry) -> bool {
        let meta = &entry.meta;

        if !entry.has_power || meta.omit_from_chart {
            return false;
        }
        if self.require_heart && !entry.has_heart {
            return false;
        }
        if !self.standard_rides.is_empty()
            && !meta
                .standard_ride_id
                .is_some_and(|id| self.standard_rides.contains(&id))
        {
            return false;
        }

        let minutes = entry.summary.duration_secs / 60;
        let duration_ok = (self.from_minutes == 0 && self.to_minutes == 0)
            || (entry.summary.duration_secs >= self.from_minutes * 60
                && (self.to_minutes == 0 || entry.summary.duration_secs <= self.to_minutes * 60));
        if !duration_ok {
            tracing::trace!("Skipping {}-minute activity {}", minutes, entry.activity_id);
            return false;
        }

        if self.indoor_only && !self.outdoor_only && meta.is_outdoor {
            return false;
        }
        if self.outdoor_only && !self.indoor_only && meta.is_indoor {
            return false;
        }
        if self.race_only && !self.training_only && meta.is_training {
            return false;
        }
        if self.training_only && !self.race_only && meta.is_race {
            return false;
        }

        true
    }
}

/// One activity on the performance chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformancePoint {
    pub start_time: DateTime<Utc>,
    pub avg_heart_rate: u8,
    pub avg_power: u16,
    pub avg_cadence: u8,
    /// Running record after this activity
    pub notable_cp: f64,
    /// Heart rate during the tracked effort when it set a record
    pub cp_heart_rate: u8,
    /// Cadence during the tracked effort when it set a record
    pub cp_cadence: u8,
    pub is_new_record: bool,
}

/// Heart rate vs power over filtered activities, in date order.
///
/// Filtered-out activities do not touch the running record.
pub fn performance_chart(
    entries: &[ActivityHistoryEntry],
    filter: &PerformanceFilter,
    rolloff: f64,
) -> Vec<PerformancePoint> {
    let mut sorted: Vec<&ActivityHistoryEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| e.start_time());

    let mut tracker = NotableCpTracker::new(rolloff);
    sorted
        .into_iter()
        .filter(|entry| filter.accepts(entry))
        .map(|entry| {
            let effort = entry.named_cp.get(filter.duration);
            let is_new_record = tracker.observe(effort.power_watts as f64);
            let (cp_heart_rate, cp_cadence) = if is_new_record {
                (effort.heart_rate_bpm, effort.cadence_rpm)
            } else {
                (0, 0)
            };

            PerformancePoint {
                start_time: entry.start_time(),
                avg_heart_rate: entry.summary.avg_heart_rate,
                avg_power: entry.summary.avg_power,
                avg_cadence: entry.summary.avg_cadence,
                notable_cp: tracker.record(),
                cp_heart_rate,
                cp_cadence,
                is_new_record,
            }
        })
        .collect()
}
