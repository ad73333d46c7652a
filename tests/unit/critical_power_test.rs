//! Unit tests for the critical power curve.

use ridelab::metrics::analytics::pdc::{window_lengths, CriticalPowerAnalyzer, NamedDuration};
use ridelab::metrics::analytics::AnalyticsError;

#[test]
fn test_constant_power_curve() {
    let duration = 1500;
    let power = vec![275u16; duration];
    let heart = vec![160u8; duration];
    let cadence = vec![92u8; duration];

    let curve = CriticalPowerAnalyzer::new().analyze(&power, &heart, &cadence).unwrap();

    assert!(!curve.points.is_empty());
    assert!(curve.points.iter().all(|p| p.power_watts == 275));
    assert!(curve.points.iter().all(|p| p.duration_secs as usize <= duration));
    assert_eq!(curve.points.first().map(|p| p.duration_secs), window_lengths(duration).first().copied());

    assert_eq!(curve.named.get(NamedDuration::TwentyMinutes).power_watts, 275);
    assert_eq!(curve.named.get(NamedDuration::TwentyMinutes).heart_rate_bpm, 160);
    // Longer than the ride
    assert_eq!(curve.named.get(NamedDuration::SixtyMinutes).power_watts, 0);
}

#[test]
fn test_best_effort_found_anywhere() {
    let mut power = vec![150u16; 900];
    for w in &mut power[400..700] {
        *w = 320;
    }
    let heart = vec![140u8; 900];
    let cadence = vec![88u8; 900];

    let curve = CriticalPowerAnalyzer::new().analyze(&power, &heart, &cadence).unwrap();
    let five_min = curve.named.get(NamedDuration::FiveMinutes);
    assert_eq!(five_min.power_watts, 320);
    assert_eq!(curve.named.get(NamedDuration::FiveSeconds).power_watts, 320);
}

#[test]
fn test_mismatched_series_rejected() {
    let result = CriticalPowerAnalyzer::new().analyze(&[200; 10], &[140; 9], &[90; 10]);
    assert!(matches!(result, Err(AnalyticsError::SeriesMismatch { .. })));
}
