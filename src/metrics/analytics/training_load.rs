//! Training load trend (ATL/CTL/TSB).
//!
//! Implements the Performance Management Chart model as a daily recurrence:
//! - ATL (Acute Training Load): `ATL + (TSS - ATL) / atl_days`, default 7
//! - CTL (Chronic Training Load): `CTL + (TSS - CTL) / ctl_days`, default 42
//! - TSB (Training Stress Balance): CTL - ATL
//!
//! The trend starts on the day of the earliest activity with all loads at
//! zero and runs 30 days past today so the chart shows the decay.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::activity::types::ActivityHistoryEntry;
use crate::metrics::analytics::pdc::NamedDuration;
use crate::metrics::analytics::performance::NotableCpTracker;

/// Days projected past today.
pub const PROJECTION_DAYS: u64 = 30;

/// Daily training load values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyLoad {
    /// Total TSS for the day.
    pub tss: f64,
    /// Acute Training Load.
    pub atl: f64,
    /// Chronic Training Load.
    pub ctl: f64,
    /// Training Stress Balance (CTL - ATL).
    pub tsb: f64,
}

/// One calendar day of the fitness trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessPoint {
    pub date: NaiveDate,
    pub tss: u32,
    pub ctl: f64,
    pub atl: f64,
    pub tsb: f64,
    /// Set when an activity on this day beat the running notable CP record
    pub notable_cp: Option<f64>,
    pub motivation_level: u8,
    pub perceived_effort: u8,
}

/// Chronological fitness points, one per day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FitnessTrend {
    points: Vec<FitnessPoint>,
}

impl FitnessTrend {
    pub fn points(&self) -> &[FitnessPoint] {
        &self.points
    }

    pub fn into_points(self) -> Vec<FitnessPoint> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point for a given day, if inside the trend.
    pub fn at(&self, date: NaiveDate) -> Option<&FitnessPoint> {
        let first = self.points.first()?.date;
        let offset = (date - first).num_days();
        if offset < 0 {
            return None;
        }
        self.points.get(offset as usize)
    }

    /// Keep only the last `history_days + 30` points for display.
    pub fn trimmed(mut self, history_days: u32) -> Self {
        let keep = history_days as usize + PROJECTION_DAYS as usize;
        if self.points.len() > keep {
            self.points.drain(..self.points.len() - keep);
        }
        self
    }
}

/// Training load calculator.
#[derive(Debug, Clone, Copy)]
pub struct TrainingLoadCalculator {
    /// ATL time constant (default: 7 days).
    atl_days: f64,
    /// CTL time constant (default: 42 days).
    ctl_days: f64,
    /// Duration tracked for notable CP markers.
    notable_duration: NamedDuration,
    /// Per-activity decay of the notable CP record.
    rolloff: f64,
}

impl TrainingLoadCalculator {
    /// Create with default constants (7/42 day).
    pub fn new() -> Self {
        Self::with_constants(7.0, 42.0)
    }

    /// Create with custom time constants.
    pub fn with_constants(atl_days: f64, ctl_days: f64) -> Self {
        Self {
            atl_days,
            ctl_days,
            notable_duration: NamedDuration::default(),
            rolloff: 0.995,
        }
    }

    /// Track notable CP markers for `duration`, decaying by `rolloff`.
    pub fn with_notable_cp(mut self, duration: NamedDuration, rolloff: f64) -> Self {
        self.notable_duration = duration;
        self.rolloff = rolloff;
        self
    }

    /// Calculate training load for a day given the previous day's values.
    pub fn calculate_day(&self, prev: DailyLoad, today_tss: f64) -> DailyLoad {
        let atl = prev.atl + (today_tss - prev.atl) / self.atl_days;
        let ctl = prev.ctl + (today_tss - prev.ctl) / self.ctl_days;

        DailyLoad {
            tss: today_tss,
            atl,
            ctl,
            tsb: ctl - atl,
        }
    }

    /// Build the daily trend from the first activity through `today + 30`.
    ///
    /// Entries may arrive in any order. Several activities on one day add
    /// their TSS. The first day always reads zero load.
    pub fn fitness_trend(&self, entries: &[ActivityHistoryEntry], today: NaiveDate) -> FitnessTrend {
        let mut sorted: Vec<&ActivityHistoryEntry> = entries.iter().collect();
        sorted.sort_by_key(|e| e.start_time());

        let first = match sorted.first() {
            Some(entry) => entry.start_time().date_naive(),
            None => return FitnessTrend::default(),
        };
        let last = today + Days::new(PROJECTION_DAYS);
        if first > last {
            return FitnessTrend::default();
        }

        let day_count = (last - first).num_days() as usize + 1;
        let mut points: Vec<FitnessPoint> = first
            .iter_days()
            .take(day_count)
            .map(|date| FitnessPoint {
                date,
                tss: 0,
                ctl: 0.0,
                atl: 0.0,
                tsb: 0.0,
                notable_cp: None,
                motivation_level: 0,
                perceived_effort: 0,
            })
            .collect();

        let mut tracker = NotableCpTracker::new(self.rolloff);
        for entry in sorted {
            let offset = (entry.start_time().date_naive() - first).num_days() as usize;
            let cp = entry.named_cp.get(self.notable_duration).power_watts as f64;
            let new_record = tracker.observe(cp);

            let Some(point) = points.get_mut(offset) else {
                continue;
            };
            point.tss += entry.effective_tss();
            point.motivation_level = entry.meta.motivation_level;
            point.perceived_effort = entry.meta.perceived_effort;
            if new_record {
                point.notable_cp = Some(cp);
            }
        }

        let mut prev = DailyLoad::default();
        for (i, point) in points.iter_mut().enumerate() {
            if i > 0 {
                let load = self.calculate_day(prev, point.tss as f64);
                point.atl = load.atl;
                point.ctl = load.ctl;
                point.tsb = load.tsb;
                prev = load;
            }
        }

        tracing::debug!("Fitness trend: {} days from {}", points.len(), first);

        FitnessTrend { points }
    }
}

impl Default for TrainingLoadCalculator {
    fn default() -> Self {
        Self::new()
    }
}
