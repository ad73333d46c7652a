//! Whole-activity power metrics: NP, IF, TSS, estimated TSS and energy.

use serde::{Deserialize, Serialize};

use crate::metrics::smoothing::NormalizedPowerCalculator;
use crate::metrics::zones::HEART_ZONE_TABLE;

/// Mechanical to metabolic energy at 22.5% gross efficiency.
const KJ_PER_WORK_KJ: f64 = 4.444444444;
const KJ_PER_KCAL: f64 = 4.186;
const WORK_PER_KJ: f64 = 0.225;

/// Rider gender for the heart-rate energy regressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unspecified,
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
            Gender::Unspecified => write!(f, "unspecified"),
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "" | "unspecified" => Ok(Gender::Unspecified),
            other => Err(format!("unknown gender '{}'", other)),
        }
    }
}

/// Body data used when estimating energy from heart rate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BodyMetrics {
    /// VO2max in ml/kg/min, 0 when unknown
    pub vo2max: f32,
    pub weight_kg: f32,
    pub age: u32,
    pub gender: Gender,
}

/// Work and energy figures for an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Energy {
    pub work_kj: u32,
    pub energy_kj: u32,
    pub energy_kcal: u32,
}

/// Round `value` to `places` decimals, rounding a fraction of .5 or more up.
pub fn round_half_up(value: f64, places: i32) -> f64 {
    let pow = 10f64.powi(places);
    let digit = pow * value;
    let rounded = if digit - digit.trunc() >= 0.5 {
        digit.ceil()
    } else {
        digit.floor()
    };
    rounded / pow
}

/// Computes per-activity metrics against the rider's thresholds.
#[derive(Debug, Clone, Copy)]
pub struct MetricsCalculator {
    ftp: u16,
    thr: u8,
}

impl MetricsCalculator {
    pub fn new(ftp: u16, thr: u8) -> Self {
        Self { ftp, thr }
    }

    /// Normalized power of a 1Hz power series.
    pub fn normalized_power(&self, power: &[u16]) -> u16 {
        NormalizedPowerCalculator::calculate(power)
    }

    /// Intensity factor x100, rounded half-up at two decimals.
    pub fn intensity_factor(&self, normalized_power: u16) -> f64 {
        if self.ftp == 0 {
            return 0.0;
        }
        round_half_up(self.raw_intensity(normalized_power), 2) * 100.0
    }

    fn raw_intensity(&self, normalized_power: u16) -> f64 {
        normalized_power as f64 / self.ftp as f64
    }

    /// Training Stress Score.
    ///
    /// TSS = (seconds x NP x IF) / (FTP x 3600) x 100, using the unrounded IF.
    pub fn training_stress_score(&self, series_len: usize, normalized_power: u16) -> u32 {
        if self.ftp == 0 {
            return 0;
        }
        let intensity = self.raw_intensity(normalized_power);
        let tss = (series_len as f64 * normalized_power as f64 * intensity)
            / (self.ftp as f64 * 3600.0)
            * 100.0;
        tss as u32
    }

    /// Heart-rate intensity x100 against 106% of THR.
    pub fn if_from_heart(&self, avg_heart_rate: u8) -> u32 {
        if self.thr == 0 {
            return 0;
        }
        let max_hr = self.thr as f64 * 1.06;
        ((avg_heart_rate as f64 / max_hr) * 100.0) as u32
    }

    /// Heart-rate TSS estimate for rides without power.
    ///
    /// Each sample contributes its zone multiplier (0 for no reading); the
    /// integer mean multiplier is scaled by the duration in hours.
    pub fn estimated_tss(&self, heart: &[u8], duration_secs: u32) -> u32 {
        if heart.is_empty() {
            return 0;
        }
        let sum: u64 = heart
            .iter()
            .map(|&bpm| {
                if bpm == 0 {
                    0
                } else {
                    HEART_ZONE_TABLE
                        .classify(bpm as f64, self.thr as f64)
                        .tss_multiplier() as u64
                }
            })
            .sum();
        let mean = sum / heart.len() as u64;
        (mean as f64 * (duration_secs as f64 / 3600.0)) as u32
    }

    /// Work and energy expenditure.
    ///
    /// Power data wins. Without power, a heart-rate regression is used when
    /// the rider's gender is known; VO2max selects the richer formula.
    pub fn energy(&self, avg_power: u16, avg_heart_rate: u8, series_len: usize, body: &BodyMetrics) -> Energy {
        if avg_power > 0 {
            let work_kj = (avg_power as u64 * series_len as u64 / 1000) as u32;
            let energy_kj = (work_kj as f64 * KJ_PER_WORK_KJ) as u32;
            let energy_kcal = (energy_kj as f64 / KJ_PER_KCAL) as u32;
            return Energy {
                work_kj,
                energy_kj,
                energy_kcal,
            };
        }

        if avg_heart_rate == 0 {
            return Energy::default();
        }

        match heart_rate_kcal(avg_heart_rate, series_len, body) {
            Some(kcal) => {
                let energy_kcal = kcal.max(0.0) as u32;
                let energy_kj = (energy_kcal as f64 * KJ_PER_KCAL) as u32;
                let work_kj = (energy_kj as f64 * WORK_PER_KJ) as u32;
                Energy {
                    work_kj,
                    energy_kj,
                    energy_kcal,
                }
            }
            None => Energy::default(),
        }
    }
}

/// Published heart-rate calorie regressions (kcal over the activity).
fn heart_rate_kcal(avg_heart_rate: u8, series_len: usize, body: &BodyMetrics) -> Option<f64> {
    let hr = avg_heart_rate as f64;
    let vo2 = body.vo2max as f64;
    let weight = body.weight_kg as f64;
    let age = body.age as f64;

    let per_minute = match (body.gender, body.vo2max > 0.0) {
        (Gender::Male, true) => -95.7735 + 0.634 * hr + 0.404 * vo2 + 0.394 * weight + 0.271 * age,
        (Gender::Female, true) => -59.3954 + 0.45 * hr + 0.380 * vo2 + 0.103 * weight + 0.274 * age,
        (Gender::Male, false) => -55.0969 + 0.6309 * hr + 0.1988 * weight + 0.2017 * age,
        (Gender::Female, false) => -20.4022 + 0.4472 * hr + 0.1263 * weight + 0.074 * age,
        (Gender::Unspecified, _) => return None,
    };

    Some(per_minute / 4.184 * 60.0 * (series_len as f64 / 3600.0))
}
