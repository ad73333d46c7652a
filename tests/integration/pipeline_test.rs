//! End-to-end processing of a recorded ride.

use chrono::{DateTime, Duration, TimeZone, Utc};
use ridelab::activity::normalizer::FillMode;
use ridelab::activity::types::{RawSample, TickSource};
use ridelab::metrics::analytics::pdc::NamedDuration;
use ridelab::{process_activity, UserProfile};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 6, 6, 30, 0).unwrap()
}

fn steady_hour() -> Vec<RawSample> {
    (0..3600)
        .map(|i| RawSample {
            timestamp: start() + Duration::seconds(i),
            lap_start: start(),
            lap_number: 1,
            heart_rate_bpm: 150,
            power_watts: 200,
            cadence_rpm: 90,
        })
        .collect()
}

#[test]
fn test_steady_hour_end_to_end() {
    let profile = UserProfile::default();
    assert_eq!((profile.ftp, profile.thr), (250, 160));

    let activity = process_activity(&steady_hour(), &profile).unwrap();
    let summary = &activity.summary;

    assert_eq!(activity.series.len(), 3600);
    assert_eq!(summary.normalized_power, 200);
    assert_eq!(summary.intensity_factor, 80.0);
    assert_eq!(summary.tss, 64);
    assert_eq!(summary.avg_power, 200);
    assert_eq!(summary.avg_heart_rate, 150);
    assert_eq!(summary.work_kj, 720);
    assert_eq!(activity.named_cp.get(NamedDuration::SixtyMinutes).power_watts, 200);
    assert_eq!(activity.zones.power_total(), 3596);
    assert_eq!(activity.zones.heart_total(), 3600);
}

#[test]
fn test_laps_follow_lap_starts() {
    let mut raw = steady_hour();
    let second_lap = start() + Duration::seconds(1800);
    for sample in raw.iter_mut().skip(1800) {
        sample.lap_start = second_lap;
        sample.lap_number = 2;
        sample.power_watts = 250;
    }

    let activity = process_activity(&raw, &UserProfile::default()).unwrap();
    assert_eq!(activity.laps.len(), 2);
    assert_eq!(activity.laps[0].avg_power, 200);
    assert_eq!(activity.laps[1].avg_power, 250);
    // The first sample of lap 2 closes lap 1 and is counted in it
    assert_eq!(activity.laps[0].lap_number, 1);
    assert_eq!(activity.laps[0].duration_secs, 1801);
    assert_eq!(activity.laps[1].lap_number, 2);
    assert_eq!(activity.laps[1].duration_secs, 1799);
    assert_eq!(activity.summary.avg_power, 225);
}

#[test]
fn test_dropouts_are_filled_per_profile() {
    let mut raw = steady_hour();
    // Three-second dropout at 10 minutes
    raw.drain(600..603);

    let mut profile = UserProfile::default();
    let filled = process_activity(&raw, &profile).unwrap();
    assert_eq!(filled.series.len(), 3600);
    assert_eq!(filled.gaps.filled_ticks, 3);
    assert_eq!(filled.series.samples()[600].source, TickSource::Filled);

    profile.fill_mode = FillMode::Remove;
    let removed = process_activity(&raw, &profile).unwrap();
    assert_eq!(removed.series.len(), 3596);
    assert_eq!(removed.gaps.dropped_ticks, 4);
}
