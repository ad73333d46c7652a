//! Raw sample stream to a one-tick-per-second series.
//!
//! Each raw sample is compared with its predecessor. A gap at or above the
//! stop gap is a pause and emits nothing, not even the sample closing it.
//! Shorter gaps are handled by the fill mode.

use serde::{Deserialize, Serialize};

use crate::activity::types::{GapReport, NormalizedSample, NormalizedSeries, RawSample, TickSource};
use crate::metrics::analytics::error::{AnalyticsError, AnalyticsResult};

/// How missing seconds inside a short gap are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillMode {
    /// Repeat the sample that closes the gap
    #[default]
    Autofill,
    /// Emit zero power, heart rate and cadence for every second of the gap,
    /// the closing sample included
    SetZero,
    /// Drop the whole gap, including the sample closing it
    Remove,
}

impl std::fmt::Display for FillMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FillMode::Autofill => write!(f, "autofill"),
            FillMode::SetZero => write!(f, "setzero"),
            FillMode::Remove => write!(f, "remove"),
        }
    }
}

impl std::str::FromStr for FillMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "autofill" => Ok(FillMode::Autofill),
            "setzero" => Ok(FillMode::SetZero),
            "remove" => Ok(FillMode::Remove),
            other => Err(format!("unknown fill mode '{}'", other)),
        }
    }
}

/// Gap handling settings taken from the user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapPolicy {
    /// Gaps of this many seconds or more are pauses
    pub stopgap_secs: u32,
    pub fill_mode: FillMode,
}

impl Default for GapPolicy {
    fn default() -> Self {
        Self {
            stopgap_secs: 30,
            fill_mode: FillMode::Autofill,
        }
    }
}

/// What to do with one raw sample given the gap before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapDecision {
    /// Pause: nothing is emitted
    Pause,
    /// Same second as the previous sample
    Duplicate,
    /// Remove policy: the gap and its closing sample are discarded
    Drop(u32),
    /// Emit `fillers` synthetic ticks, then the sample itself (zeroed when
    /// `source` is `Zeroed`)
    Emit { fillers: u32, source: TickSource },
}

/// Decide how to treat a sample `gap_secs` after its predecessor.
///
/// `None` marks the first sample of the activity, which is always emitted.
/// A gap exactly equal to the stop gap counts as a pause.
pub fn decide_gap(gap_secs: Option<u64>, policy: &GapPolicy) -> GapDecision {
    let gap = match gap_secs {
        None => {
            return GapDecision::Emit {
                fillers: 0,
                source: TickSource::Recorded,
            }
        }
        Some(gap) => gap,
    };

    if gap == 0 {
        return GapDecision::Duplicate;
    }
    if gap >= policy.stopgap_secs as u64 {
        return GapDecision::Pause;
    }

    // Below the stop gap, so it fits in u32
    let missing = gap as u32 - 1;
    match policy.fill_mode {
        _ if missing == 0 => GapDecision::Emit {
            fillers: 0,
            source: TickSource::Recorded,
        },
        FillMode::Autofill => GapDecision::Emit {
            fillers: missing,
            source: TickSource::Filled,
        },
        FillMode::SetZero => GapDecision::Emit {
            fillers: missing,
            source: TickSource::Zeroed,
        },
        FillMode::Remove => GapDecision::Drop(gap as u32),
    }
}

/// Incremental normalizer fed one raw sample at a time.
#[derive(Debug, Clone)]
pub struct SampleNormalizer {
    policy: GapPolicy,
    previous: Option<chrono::DateTime<chrono::Utc>>,
    index: usize,
    series: NormalizedSeries,
    gaps: GapReport,
}

impl SampleNormalizer {
    pub fn new(policy: GapPolicy) -> Self {
        Self {
            policy,
            previous: None,
            index: 0,
            series: NormalizedSeries::new(),
            gaps: GapReport::default(),
        }
    }

    /// Feed the next raw sample and return the ticks it produced.
    ///
    /// Fails if the timestamp is earlier than the previous sample's.
    pub fn push(&mut self, raw: &RawSample) -> AnalyticsResult<&[NormalizedSample]> {
        let gap_secs = match self.previous {
            None => None,
            Some(previous) => {
                let gap = (raw.timestamp - previous).num_seconds();
                if gap < 0 {
                    return Err(AnalyticsError::OutOfOrder { index: self.index });
                }
                Some(gap as u64)
            }
        };
        self.previous = Some(raw.timestamp);
        self.index += 1;

        let start = self.series.len();
        match decide_gap(gap_secs, &self.policy) {
            GapDecision::Pause => self.gaps.pauses += 1,
            GapDecision::Duplicate => self.gaps.duplicates += 1,
            GapDecision::Drop(seconds) => self.gaps.dropped_ticks += seconds,
            GapDecision::Emit { fillers, source } => {
                for _ in 0..fillers {
                    match source {
                        TickSource::Zeroed => self.series.push(0, 0, 0, source),
                        _ => self.series.push(raw.power_watts, raw.heart_rate_bpm, raw.cadence_rpm, source),
                    };
                }
                self.gaps.filled_ticks += fillers;
                match source {
                    // Under setzero the closing second is part of the gap too
                    TickSource::Zeroed => self.series.push(0, 0, 0, source),
                    _ => self
                        .series
                        .push(raw.power_watts, raw.heart_rate_bpm, raw.cadence_rpm, TickSource::Recorded),
                };
            }
        }

        Ok(&self.series.samples()[start..])
    }

    pub fn series(&self) -> &NormalizedSeries {
        &self.series
    }

    /// Consume the normalizer, returning the series and gap counts.
    pub fn finish(self) -> (NormalizedSeries, GapReport) {
        (self.series, self.gaps)
    }
}

/// Normalize a whole raw stream in one call.
pub fn normalize(raw: &[RawSample], policy: GapPolicy) -> AnalyticsResult<(NormalizedSeries, GapReport)> {
    let mut normalizer = SampleNormalizer::new(policy);
    for sample in raw {
        normalizer.push(sample)?;
    }
    Ok(normalizer.finish())
}
