//! Merging per-activity critical power curves across three history windows.
//!
//! Activities are split by age into `[0, H)`, `[H, 2H)` and `[2H, 3H)` days.
//! Each window keeps the best point per duration, then the three sorted
//! series are laid side by side by row position for charting.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::analytics::pdc::{ClockDuration, CriticalPowerPoint};

/// One activity's stored curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityCurve {
    pub start_time: DateTime<Utc>,
    pub has_power: bool,
    pub points: Vec<CriticalPowerPoint>,
}

/// A best point inside one window, labelled with its source activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelledPoint {
    pub duration_secs: u32,
    pub power_watts: u16,
    /// e.g. `00:05:00 - Mon Jan 2, 2006 3:04pm`
    pub label: String,
}

/// One chart row; cells of shorter series are zero/empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedCurveRow {
    /// Duration of the primary series at this row
    pub duration_secs: u32,
    pub power_watts: [u16; 3],
    pub labels: [String; 3],
}

/// Legend text for the three table columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CurveLegend {
    pub series: [String; 3],
}

/// Chart-ready merge of the three windows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MergedCurveTable {
    pub rows: Vec<MergedCurveRow>,
    pub legend: CurveLegend,
}

/// Keeps the highest point per duration; the first one seen wins ties.
#[derive(Debug, Default)]
struct WindowMerge {
    best: HashMap<u32, LabelledPoint>,
}

impl WindowMerge {
    fn add_curve(&mut self, curve: &ActivityCurve) {
        let started = curve.start_time.format("%a %b %-d, %Y %-I:%M%P").to_string();
        for point in &curve.points {
            let candidate = LabelledPoint {
                duration_secs: point.duration_secs,
                power_watts: point.power_watts,
                label: format!("{} - {}", ClockDuration::from_secs(point.duration_secs), started),
            };
            match self.best.get(&point.duration_secs) {
                Some(existing) if existing.power_watts >= candidate.power_watts => {}
                _ => {
                    self.best.insert(point.duration_secs, candidate);
                }
            }
        }
    }

    /// Best points sorted by ascending duration.
    fn into_sorted(self) -> Vec<LabelledPoint> {
        let mut points: Vec<LabelledPoint> = self.best.into_values().collect();
        points.sort_by_key(|p| p.duration_secs);
        points
    }
}

fn cell(series: &[LabelledPoint], i: usize) -> (u16, String) {
    series
        .get(i)
        .map(|p| (p.power_watts, p.label.clone()))
        .unwrap_or_default()
}

/// Merge curves into the three-window chart table.
///
/// `history_days` is the window length H. Activities without power are
/// ignored, as are those 3H days old or more.
pub fn merge_power_curves(curves: &[ActivityCurve], history_days: u32, now: DateTime<Utc>) -> MergedCurveTable {
    let h = history_days as i64;
    let mut windows: [WindowMerge; 3] = Default::default();

    for curve in curves.iter().filter(|c| c.has_power) {
        let age = (now - curve.start_time).num_days().max(0);
        let window = age / h.max(1);
        if let Some(merge) = windows.get_mut(window as usize) {
            merge.add_curve(curve);
        }
    }

    let [w1, w2, w3] = windows.map(WindowMerge::into_sorted);
    let labels = [
        format!("Last {} Days", history_days),
        format!("{} to {} Days ago", history_days, history_days * 2),
        format!("{} to {} Days ago", history_days * 2, history_days * 3),
    ];
    let [s1, s2, s3] = labels;

    // The longest series leads; ties go to the more recent window.
    let (primary, second, third, legend) = if w1.len() >= w2.len() && w1.len() >= w3.len() {
        (w1, w2, w3, [s1, s2, s3])
    } else if w2.len() >= w3.len() {
        (w2, w1, w3, [s2, s1, s3])
    } else {
        (w3, w1, w2, [s3, s1, s2])
    };

    let rows = primary
        .iter()
        .enumerate()
        .map(|(i, lead)| {
            let (p2, l2) = cell(&second, i);
            let (p3, l3) = cell(&third, i);
            MergedCurveRow {
                duration_secs: lead.duration_secs,
                power_watts: [lead.power_watts, p2, p3],
                labels: [lead.label.clone(), l2, l3],
            }
        })
        .collect();

    MergedCurveTable {
        rows,
        legend: CurveLegend { series: legend },
    }
}
