//! Unit tests for the fitness trend.

use chrono::{NaiveDate, TimeZone, Utc};
use ridelab::activity::types::{ActivityHistoryEntry, ActivityMeta, ActivitySummary};
use ridelab::metrics::analytics::pdc::NamedCpSet;
use ridelab::metrics::analytics::TrainingLoadCalculator;
use uuid::Uuid;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn entry(date: NaiveDate, tss: u32) -> ActivityHistoryEntry {
    ActivityHistoryEntry {
        activity_id: Uuid::new_v4(),
        summary: ActivitySummary {
            start_time: Utc.from_utc_datetime(&date.and_hms_opt(17, 30, 0).unwrap()),
            duration_secs: 3600,
            tss,
            ..Default::default()
        },
        has_power: true,
        has_heart: true,
        meta: ActivityMeta::default(),
        named_cp: NamedCpSet::default(),
    }
}

#[test]
fn test_atl_decays_after_single_load() {
    // Zero-load first day, then one 100 TSS day, then rest
    let entries = vec![entry(day(2024, 4, 1), 0), entry(day(2024, 4, 2), 100)];
    let today = day(2024, 4, 8);
    let trend = TrainingLoadCalculator::new().fitness_trend(&entries, today);

    let loaded = trend.at(day(2024, 4, 2)).unwrap();
    assert!((loaded.atl - 100.0 / 7.0).abs() < 1e-9);

    let rest: Vec<f64> = (3..=8)
        .map(|d| trend.at(day(2024, 4, d)).unwrap().atl)
        .collect();
    let mut previous = loaded.atl;
    for atl in rest {
        assert!(atl < previous);
        assert!(atl > 0.0);
        previous = atl;
    }
}

#[test]
fn test_trend_spans_first_activity_to_projection() {
    let entries = vec![entry(day(2024, 4, 10), 80), entry(day(2024, 4, 1), 50)];
    let today = day(2024, 4, 20);
    let trend = TrainingLoadCalculator::new().fitness_trend(&entries, today);

    assert_eq!(trend.points().first().map(|p| p.date), Some(day(2024, 4, 1)));
    assert_eq!(trend.points().last().map(|p| p.date), Some(day(2024, 5, 20)));

    let first = &trend.points()[0];
    assert_eq!(first.tss, 50);
    assert_eq!((first.ctl, first.atl, first.tsb), (0.0, 0.0, 0.0));

    for point in trend.points() {
        assert!((point.tsb - (point.ctl - point.atl)).abs() < 1e-9);
    }
}

#[test]
fn test_override_takes_priority() {
    let mut overridden = entry(day(2024, 4, 2), 100);
    overridden.meta.tss_override = 30;
    let entries = vec![entry(day(2024, 4, 1), 0), overridden];

    let trend = TrainingLoadCalculator::new().fitness_trend(&entries, day(2024, 4, 2));
    assert_eq!(trend.at(day(2024, 4, 2)).unwrap().tss, 30);
}
