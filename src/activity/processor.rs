//! Turns one activity's raw samples into its stored derived metrics.

use crate::activity::laps::LapAggregator;
use crate::activity::normalizer::SampleNormalizer;
use crate::activity::types::{ActivitySummary, NormalizedSeries, ProcessedActivity, RawSample};
use crate::metrics::analytics::error::{AnalyticsError, AnalyticsResult};
use crate::metrics::analytics::pdc::CriticalPowerAnalyzer;
use crate::metrics::calculator::MetricsCalculator;
use crate::metrics::zones::{ZoneCalculator, ZoneCounts};
use crate::storage::config::UserProfile;

/// Normalize, aggregate and analyze one activity.
///
/// The profile is assumed valid (see [`UserProfile::validate`]). Missing
/// channels yield zero metrics and cleared presence flags rather than
/// errors; only an empty or out-of-order stream fails.
pub fn process_activity(raw: &[RawSample], profile: &UserProfile) -> AnalyticsResult<ProcessedActivity> {
    let first = raw
        .first()
        .ok_or_else(|| AnalyticsError::InsufficientData("activity has no samples".to_string()))?;

    let mut normalizer = SampleNormalizer::new(profile.gap_policy());
    let mut aggregator = LapAggregator::new();
    for sample in raw {
        let ticks = normalizer.push(sample)?;
        aggregator.add_sample(sample, ticks);
    }
    let (series, gaps) = normalizer.finish();
    let (laps, totals) = aggregator.finish();

    tracing::debug!(
        "Normalized {} raw samples into {} ticks ({} pauses, {} filled, {} dropped)",
        raw.len(),
        series.len(),
        gaps.pauses,
        gaps.filled_ticks,
        gaps.dropped_ticks
    );

    let power = series.power();
    let heart = series.heart_rate();
    let cadence = series.cadence();
    let has_power = power.iter().any(|&w| w > 0);
    let has_heart = heart.iter().any(|&b| b > 0);
    let has_cadence = cadence.iter().any(|&c| c > 0);

    let calc = MetricsCalculator::new(profile.ftp, profile.thr);
    let duration_secs = series.len() as u32;
    let normalized_power = calc.normalized_power(&power);
    let avg_power = totals.avg_power();
    let avg_heart_rate = totals.avg_heart_rate();
    let energy = calc.energy(avg_power, avg_heart_rate, series.len(), &profile.body());

    let summary = ActivitySummary {
        start_time: first.lap_start,
        duration_secs,
        avg_power,
        avg_heart_rate,
        avg_cadence: totals.avg_cadence(),
        normalized_power,
        intensity_factor: calc.intensity_factor(normalized_power),
        if_from_heart: calc.if_from_heart(avg_heart_rate),
        tss: calc.training_stress_score(series.len(), normalized_power),
        estimated_tss: if has_heart {
            calc.estimated_tss(&heart, duration_secs)
        } else {
            0
        },
        work_kj: energy.work_kj,
        energy_kj: energy.energy_kj,
        energy_kcal: energy.energy_kcal,
    };

    let curve = CriticalPowerAnalyzer::new().analyze(&power, &heart, &cadence)?;
    let zones = compute_zones(&series, profile.ftp, profile.thr, profile.sample_window);

    tracing::info!(
        "Processed activity starting {}: {}s, {} laps, NP {}W, IF {}, TSS {}",
        summary.start_time,
        summary.duration_secs,
        laps.len(),
        summary.normalized_power,
        summary.intensity_factor,
        summary.tss
    );

    Ok(ProcessedActivity {
        series,
        laps,
        summary,
        curve: curve.points,
        named_cp: curve.named,
        zones,
        gaps,
        has_power,
        has_heart,
        has_cadence,
        ftp: profile.ftp,
        thr: profile.thr,
    })
}

/// Seconds per zone for a normalized series against the given thresholds.
///
/// Power zones use a rolling average over `window` seconds; a series
/// shorter than the window has no power zone time.
pub fn compute_zones(series: &NormalizedSeries, ftp: u16, thr: u8, window: usize) -> ZoneCounts {
    let power = series.power();
    let heart = series.heart_rate();
    let has_power = power.iter().any(|&w| w > 0);
    let has_heart = heart.iter().any(|&b| b > 0);

    ZoneCalculator::new(ftp, thr)
        .with_window(window)
        .count(&power, &heart, has_power, has_heart)
}
