//! Unit tests for the three-window power curve merge.

use chrono::{DateTime, Duration, TimeZone, Utc};
use ridelab::metrics::analytics::curve_merge::{merge_power_curves, ActivityCurve};
use ridelab::metrics::analytics::pdc::{ClockDuration, CriticalPowerPoint};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 1, 12, 0, 0).unwrap()
}

fn point(duration_secs: u32, power_watts: u16) -> CriticalPowerPoint {
    CriticalPowerPoint {
        duration_secs,
        clock: ClockDuration::from_secs(duration_secs),
        power_watts,
        heart_rate_bpm: 0,
        cadence_rpm: 0,
    }
}

fn curve(days_ago: i64, points: Vec<CriticalPowerPoint>) -> ActivityCurve {
    ActivityCurve {
        start_time: now() - Duration::days(days_ago),
        has_power: true,
        points,
    }
}

#[test]
fn test_same_duration_keeps_highest() {
    let curves = vec![
        curve(3, vec![point(300, 230), point(60, 400)]),
        curve(5, vec![point(300, 250), point(60, 380)]),
    ];
    let table = merge_power_curves(&curves, 42, now());

    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0].duration_secs, 60);
    assert_eq!(table.rows[0].power_watts[0], 400);
    assert_eq!(table.rows[1].duration_secs, 300);
    assert_eq!(table.rows[1].power_watts[0], 250);
}

#[test]
fn test_windows_align_by_position() {
    let curves = vec![
        curve(1, vec![point(5, 900), point(60, 420), point(300, 300)]),
        curve(50, vec![point(20, 600), point(1200, 260)]),
    ];
    let table = merge_power_curves(&curves, 42, now());

    assert_eq!(table.legend.series[0], "Last 42 Days");
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.rows[0].power_watts, [900, 600, 0]);
    assert_eq!(table.rows[1].power_watts, [420, 260, 0]);
    assert_eq!(table.rows[2].power_watts, [300, 0, 0]);
}

#[test]
fn test_old_and_powerless_activities_ignored() {
    let mut no_power = curve(1, vec![point(60, 500)]);
    no_power.has_power = false;
    let curves = vec![no_power, curve(200, vec![point(60, 450)])];

    let table = merge_power_curves(&curves, 42, now());
    assert!(table.rows.is_empty());
}
