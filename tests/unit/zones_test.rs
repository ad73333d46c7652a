//! Unit tests for zone bucketing.

use ridelab::metrics::zones::{HeartZone, PowerZone, ZoneCalculator, ZoneLabels};

#[test]
fn test_zone_counts_sum_to_evaluated_samples() {
    let power: Vec<u16> = (0..1000).map(|i| (i % 400) as u16).collect();
    let heart: Vec<u8> = (0..1000).map(|i| 100 + (i % 90) as u8).collect();

    for window in [1usize, 5, 30] {
        let counts = ZoneCalculator::new(250, 160)
            .with_window(window)
            .count(&power, &heart, true, true);
        assert_eq!(counts.power_total(), (power.len() - (window - 1)) as u32);
        assert_eq!(counts.heart_total(), heart.len() as u32);
    }
}

#[test]
fn test_series_shorter_than_window() {
    let counts = ZoneCalculator::new(250, 160)
        .with_window(5)
        .count(&[200; 4], &[150; 4], true, true);
    assert_eq!(counts.power_total(), 0);
    assert_eq!(counts.heart_total(), 4);
}

#[test]
fn test_zone_thresholds() {
    let calc = ZoneCalculator::new(250, 160);
    assert_eq!(calc.power_zone(137), PowerZone::Z1);
    assert_eq!(calc.power_zone(138), PowerZone::Z2);
    assert_eq!(calc.power_zone(300), PowerZone::Z5);
    assert_eq!(calc.power_zone(301), PowerZone::Z6);

    assert_eq!(calc.heart_zone(120), HeartZone::Z1);
    assert_eq!(calc.heart_zone(160), HeartZone::Z5a);
    assert_eq!(calc.heart_zone(170), HeartZone::Z5c);
}

#[test]
fn test_zone_labels() {
    let labels = ZoneLabels::from_thresholds(200, 100);
    assert_eq!(labels.power_watts, vec![110, 148, 178, 208, 240]);
    assert_eq!(labels.heart_bpm, vec![81, 89, 93, 99, 102, 106]);
}
