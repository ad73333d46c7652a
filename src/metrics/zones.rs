//! Power and heart rate zone classification.
//!
//! Both classifiers share one ordered threshold table lookup. A value lands
//! in the first zone whose upper bound (a fraction of FTP or THR) it does not
//! exceed; anything above the last bound lands in the top zone.

use serde::{Deserialize, Serialize};

use crate::metrics::smoothing::full_window_averages;

/// Default rolling window for power zone classification.
pub const DEFAULT_ZONE_WINDOW: usize = 5;

/// Power zones 1-6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerZone {
    Z1,
    Z2,
    Z3,
    Z4,
    Z5,
    Z6,
}

impl PowerZone {
    pub const ALL: [PowerZone; 6] = [
        PowerZone::Z1,
        PowerZone::Z2,
        PowerZone::Z3,
        PowerZone::Z4,
        PowerZone::Z5,
        PowerZone::Z6,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            PowerZone::Z1 => "Z1",
            PowerZone::Z2 => "Z2",
            PowerZone::Z3 => "Z3",
            PowerZone::Z4 => "Z4",
            PowerZone::Z5 => "Z5",
            PowerZone::Z6 => "Z6",
        }
    }
}

/// Heart rate zones, with zone 5 split into a/b/c.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeartZone {
    Z1,
    Z2,
    Z3,
    Z4,
    Z5a,
    Z5b,
    Z5c,
}

impl HeartZone {
    pub const ALL: [HeartZone; 7] = [
        HeartZone::Z1,
        HeartZone::Z2,
        HeartZone::Z3,
        HeartZone::Z4,
        HeartZone::Z5a,
        HeartZone::Z5b,
        HeartZone::Z5c,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            HeartZone::Z1 => "Z1",
            HeartZone::Z2 => "Z2",
            HeartZone::Z3 => "Z3",
            HeartZone::Z4 => "Z4",
            HeartZone::Z5a => "Z5a",
            HeartZone::Z5b => "Z5b",
            HeartZone::Z5c => "Z5c",
        }
    }

    /// Intensity multiplier used by the heart-rate TSS estimate.
    pub fn tss_multiplier(self) -> u32 {
        match self {
            HeartZone::Z1 => 55,
            HeartZone::Z2 => 60,
            HeartZone::Z3 => 69,
            HeartZone::Z4 => 87,
            HeartZone::Z5a => 100,
            HeartZone::Z5b => 118,
            HeartZone::Z5c => 140,
        }
    }
}

/// Ordered (upper bound as a fraction of threshold, zone) pairs.
pub struct ZoneTable<Z: 'static> {
    bounds: &'static [(f64, Z)],
    top: Z,
}

impl<Z: Copy> ZoneTable<Z> {
    /// Classify `value` against `threshold`.
    pub fn classify(&self, value: f64, threshold: f64) -> Z {
        let idx = self
            .bounds
            .partition_point(|(upper, _)| value > upper * threshold);
        self.bounds.get(idx).map(|(_, zone)| *zone).unwrap_or(self.top)
    }

    /// Boundary values for a given threshold.
    pub fn boundaries(&self, threshold: f64) -> Vec<f64> {
        self.bounds.iter().map(|(upper, _)| upper * threshold).collect()
    }
}

/// Power zones relative to FTP.
pub const POWER_ZONE_TABLE: ZoneTable<PowerZone> = ZoneTable {
    bounds: &[
        (0.55, PowerZone::Z1),
        (0.74, PowerZone::Z2),
        (0.89, PowerZone::Z3),
        (1.04, PowerZone::Z4),
        (1.20, PowerZone::Z5),
    ],
    top: PowerZone::Z6,
};

/// Heart rate zones relative to THR.
pub const HEART_ZONE_TABLE: ZoneTable<HeartZone> = ZoneTable {
    bounds: &[
        (0.81, HeartZone::Z1),
        (0.89, HeartZone::Z2),
        (0.93, HeartZone::Z3),
        (0.99, HeartZone::Z4),
        (1.02, HeartZone::Z5a),
        (1.06, HeartZone::Z5b),
    ],
    top: HeartZone::Z5c,
};

/// Seconds spent in each zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ZoneCounts {
    pub power: [u32; 6],
    pub heart: [u32; 7],
    pub has_power: bool,
    pub has_heart: bool,
}

impl ZoneCounts {
    pub fn power_seconds(&self, zone: PowerZone) -> u32 {
        self.power[zone.index()]
    }

    pub fn heart_seconds(&self, zone: HeartZone) -> u32 {
        self.heart[zone.index()]
    }

    pub fn power_total(&self) -> u32 {
        self.power.iter().sum()
    }

    pub fn heart_total(&self) -> u32 {
        self.heart.iter().sum()
    }

    /// Add another activity's counts to this one.
    pub fn accumulate(&mut self, other: &ZoneCounts) {
        for (total, add) in self.power.iter_mut().zip(other.power) {
            *total += add;
        }
        for (total, add) in self.heart.iter_mut().zip(other.heart) {
            *total += add;
        }
        self.has_power |= other.has_power;
        self.has_heart |= other.has_heart;
    }
}

/// Classifies power and heart rate series into zone counts.
#[derive(Debug, Clone, Copy)]
pub struct ZoneCalculator {
    ftp: u16,
    thr: u8,
    window: usize,
}

impl ZoneCalculator {
    pub fn new(ftp: u16, thr: u8) -> Self {
        Self {
            ftp,
            thr,
            window: DEFAULT_ZONE_WINDOW,
        }
    }

    /// Use a different rolling window for power.
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window.max(1);
        self
    }

    pub fn power_zone(&self, watts: u16) -> PowerZone {
        POWER_ZONE_TABLE.classify(watts as f64, self.ftp as f64)
    }

    pub fn heart_zone(&self, bpm: u8) -> HeartZone {
        HEART_ZONE_TABLE.classify(bpm as f64, self.thr as f64)
    }

    /// Count seconds per zone.
    ///
    /// Power is smoothed over the rolling window first, so the first
    /// `window - 1` samples are not counted. Heart rate is classified raw.
    pub fn count(&self, power: &[u16], heart: &[u8], has_power: bool, has_heart: bool) -> ZoneCounts {
        let mut counts = ZoneCounts {
            has_power,
            has_heart,
            ..Default::default()
        };

        if has_power {
            for avg in full_window_averages(power, self.window) {
                counts.power[self.power_zone(avg).index()] += 1;
            }
        }

        if has_heart {
            for &bpm in heart {
                counts.heart[self.heart_zone(bpm).index()] += 1;
            }
        }

        counts
    }
}

/// Zone boundary values for display.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ZoneLabels {
    /// Upper bounds of power zones 1-5 in watts
    pub power_watts: Vec<u16>,
    /// Upper bounds of heart rate zones 1-5b in BPM
    pub heart_bpm: Vec<u16>,
}

impl ZoneLabels {
    pub fn from_thresholds(ftp: u16, thr: u8) -> Self {
        Self {
            power_watts: POWER_ZONE_TABLE
                .boundaries(ftp as f64)
                .into_iter()
                .map(|w| w.round() as u16)
                .collect(),
            heart_bpm: HEART_ZONE_TABLE
                .boundaries(thr as f64)
                .into_iter()
                .map(|b| b.round() as u16)
                .collect(),
        }
    }
}
