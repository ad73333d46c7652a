//! Critical power curve extraction.
//!
//! The curve holds the best mean power for a thinned set of window lengths,
//! together with the heart rate and cadence averaged over that same best
//! window. Evaluated windows are the fixed chart durations plus
//! `floor(i^2.25)` presets, dense at short durations and sparse at long ones.

use std::collections::BTreeSet;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::metrics::analytics::error::{AnalyticsError, AnalyticsResult};

/// Durations always evaluated when the series is long enough.
pub const FIXED_DURATIONS: [u32; 18] = [
    1, 2, 3, 4, 5, 10, 20, 30, 60, 300, 1200, 1800, 3600, 7200, 14400, 21600, 28800, 36000,
];

/// Exponent of the preset window sequence.
const PRESET_EXPONENT: f64 = 2.25;

/// Durations tracked individually for trends and charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NamedDuration {
    #[serde(rename = "5s")]
    FiveSeconds,
    #[serde(rename = "20s")]
    TwentySeconds,
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "20m")]
    TwentyMinutes,
    #[default]
    #[serde(rename = "60m")]
    SixtyMinutes,
}

impl NamedDuration {
    pub const ALL: [NamedDuration; 6] = [
        NamedDuration::FiveSeconds,
        NamedDuration::TwentySeconds,
        NamedDuration::OneMinute,
        NamedDuration::FiveMinutes,
        NamedDuration::TwentyMinutes,
        NamedDuration::SixtyMinutes,
    ];

    pub fn seconds(self) -> u32 {
        match self {
            NamedDuration::FiveSeconds => 5,
            NamedDuration::TwentySeconds => 20,
            NamedDuration::OneMinute => 60,
            NamedDuration::FiveMinutes => 300,
            NamedDuration::TwentyMinutes => 1200,
            NamedDuration::SixtyMinutes => 3600,
        }
    }

    pub fn from_seconds(seconds: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.seconds() == seconds)
    }
}

impl std::fmt::Display for NamedDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            NamedDuration::FiveSeconds => "5s",
            NamedDuration::TwentySeconds => "20s",
            NamedDuration::OneMinute => "1m",
            NamedDuration::FiveMinutes => "5m",
            NamedDuration::TwentyMinutes => "20m",
            NamedDuration::SixtyMinutes => "60m",
        };
        write!(f, "{}", label)
    }
}

impl std::str::FromStr for NamedDuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(named) = Self::ALL.into_iter().find(|d| d.to_string() == s) {
            return Ok(named);
        }
        s.parse::<u32>()
            .ok()
            .and_then(Self::from_seconds)
            .ok_or_else(|| format!("'{}' is not one of 5s, 20s, 1m, 5m, 20m, 60m", s))
    }
}

/// A duration split into clock components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClockDuration {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl ClockDuration {
    pub fn from_secs(total: u32) -> Self {
        Self {
            hours: total / 3600,
            minutes: (total % 3600) / 60,
            seconds: total % 60,
        }
    }
}

impl std::fmt::Display for ClockDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

/// Best effort for one window length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CriticalPowerPoint {
    pub duration_secs: u32,
    pub clock: ClockDuration,
    /// Maximum mean power over any window of this length
    pub power_watts: u16,
    /// Mean heart rate over the best power window
    pub heart_rate_bpm: u8,
    /// Mean cadence over the best power window
    pub cadence_rpm: u8,
}

/// Best efforts for the six tracked durations.
///
/// Durations longer than the activity stay at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NamedCpSet {
    pub five_seconds: CriticalPowerPoint,
    pub twenty_seconds: CriticalPowerPoint,
    pub one_minute: CriticalPowerPoint,
    pub five_minutes: CriticalPowerPoint,
    pub twenty_minutes: CriticalPowerPoint,
    pub sixty_minutes: CriticalPowerPoint,
}

impl NamedCpSet {
    pub fn get(&self, duration: NamedDuration) -> &CriticalPowerPoint {
        match duration {
            NamedDuration::FiveSeconds => &self.five_seconds,
            NamedDuration::TwentySeconds => &self.twenty_seconds,
            NamedDuration::OneMinute => &self.one_minute,
            NamedDuration::FiveMinutes => &self.five_minutes,
            NamedDuration::TwentyMinutes => &self.twenty_minutes,
            NamedDuration::SixtyMinutes => &self.sixty_minutes,
        }
    }

    fn slot(&mut self, duration: NamedDuration) -> &mut CriticalPowerPoint {
        match duration {
            NamedDuration::FiveSeconds => &mut self.five_seconds,
            NamedDuration::TwentySeconds => &mut self.twenty_seconds,
            NamedDuration::OneMinute => &mut self.one_minute,
            NamedDuration::FiveMinutes => &mut self.five_minutes,
            NamedDuration::TwentyMinutes => &mut self.twenty_minutes,
            NamedDuration::SixtyMinutes => &mut self.sixty_minutes,
        }
    }
}

/// Curve plus named efforts for one activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriticalPowerCurve {
    /// Points ordered from the longest window to the shortest
    pub points: Vec<CriticalPowerPoint>,
    pub named: NamedCpSet,
}

/// Window lengths to evaluate for a series, longest first.
pub fn window_lengths(series_len: usize) -> Vec<u32> {
    let len = series_len as u64;
    let mut windows: BTreeSet<u32> = FIXED_DURATIONS
        .iter()
        .copied()
        .filter(|&d| (d as u64) <= len)
        .collect();

    let mut i = 1u64;
    loop {
        // Nudge up so exact powers like 16^2.25 = 512 don't floor to 511.
        let preset = ((i as f64).powf(PRESET_EXPONENT) + 1e-9).floor() as u64;
        if preset > len {
            break;
        }
        windows.insert(preset as u32);
        i += 1;
    }

    windows.into_iter().rev().collect()
}

/// Prefix sums of the three channels.
struct PrefixSums {
    power: Vec<u64>,
    heart: Vec<u64>,
    cadence: Vec<u64>,
}

impl PrefixSums {
    fn new(power: &[u16], heart: &[u8], cadence: &[u8]) -> Self {
        fn prefix<T: Copy + Into<u64>>(values: &[T]) -> Vec<u64> {
            let mut sums = vec![0u64; values.len() + 1];
            for (i, &v) in values.iter().enumerate() {
                sums[i + 1] = sums[i] + v.into();
            }
            sums
        }
        Self {
            power: prefix(power),
            heart: prefix(heart),
            cadence: prefix(cadence),
        }
    }

    fn len(&self) -> usize {
        self.power.len() - 1
    }

    /// Best window of length `w`; the earliest offset wins ties.
    fn best_effort(&self, w: u32) -> CriticalPowerPoint {
        let window = w as usize;
        let mean = |sums: &[u64], start: usize| (sums[start + window] - sums[start]) / window as u64;

        let mut best_start = 0;
        let mut best_power = mean(&self.power, 0);
        for start in 1..=(self.len() - window) {
            let avg = mean(&self.power, start);
            if avg > best_power {
                best_power = avg;
                best_start = start;
            }
        }

        CriticalPowerPoint {
            duration_secs: w,
            clock: ClockDuration::from_secs(w),
            power_watts: best_power as u16,
            heart_rate_bpm: mean(&self.heart, best_start) as u8,
            cadence_rpm: mean(&self.cadence, best_start) as u8,
        }
    }
}

/// Extracts the critical power curve from a normalized series.
#[derive(Debug, Default)]
pub struct CriticalPowerAnalyzer;

impl CriticalPowerAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze parallel power, heart rate and cadence series.
    ///
    /// An empty series yields an empty curve.
    pub fn analyze(&self, power: &[u16], heart: &[u8], cadence: &[u8]) -> AnalyticsResult<CriticalPowerCurve> {
        if heart.len() != power.len() || cadence.len() != power.len() {
            return Err(AnalyticsError::SeriesMismatch {
                power: power.len(),
                heart: heart.len(),
                cadence: cadence.len(),
            });
        }
        if power.is_empty() {
            return Ok(CriticalPowerCurve::default());
        }

        let sums = PrefixSums::new(power, heart, cadence);
        let windows = window_lengths(power.len());

        #[cfg(feature = "parallel")]
        let points: Vec<CriticalPowerPoint> = windows.par_iter().map(|&w| sums.best_effort(w)).collect();

        #[cfg(not(feature = "parallel"))]
        let points: Vec<CriticalPowerPoint> = windows.iter().map(|&w| sums.best_effort(w)).collect();

        let mut named = NamedCpSet::default();
        for point in &points {
            if let Some(duration) = NamedDuration::from_seconds(point.duration_secs) {
                *named.slot(duration) = *point;
            }
        }

        tracing::debug!(
            "Critical power: {} windows over {} samples",
            points.len(),
            power.len()
        );

        Ok(CriticalPowerCurve { points, named })
    }
}
