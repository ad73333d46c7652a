//! Unit tests for power metrics.

use ridelab::metrics::calculator::{round_half_up, MetricsCalculator};

#[test]
fn test_normalized_power_of_constant_series() {
    let calc = MetricsCalculator::new(250, 160);
    let power = vec![200u16; 3600];

    let np = calc.normalized_power(&power);
    assert_eq!(np, 200);
    assert_eq!(calc.intensity_factor(np), 80.0);
    assert_eq!(calc.training_stress_score(power.len(), np), 64);
}

#[test]
fn test_normalized_power_not_below_average() {
    let calc = MetricsCalculator::new(250, 160);

    let patterns: [&[u16]; 2] = [&[100, 300], &[0, 0, 500, 250, 120]];
    for pattern in patterns {
        let power: Vec<u16> = pattern.iter().copied().cycle().take(1800).collect();
        let average = power.iter().map(|&w| w as u64).sum::<u64>() / power.len() as u64;
        assert!(calc.normalized_power(&power) as u64 >= average);
    }

    // Blocks of 5 minutes hard, 5 minutes easy
    let blocks: Vec<u16> = (0..3600).map(|i| if (i / 300) % 2 == 0 { 320 } else { 120 }).collect();
    assert!(calc.normalized_power(&blocks) > 220);
}

#[test]
fn test_short_series_has_no_np() {
    let calc = MetricsCalculator::new(250, 160);
    assert_eq!(calc.normalized_power(&[300; 30]), 0);
    assert_eq!(calc.normalized_power(&[]), 0);
}

#[test]
fn test_round_half_up() {
    assert_eq!(round_half_up(0.845, 1), 0.8);
    assert_eq!(round_half_up(1.25, 1), 1.3);
    assert_eq!(round_half_up(2.0, 2), 2.0);
}
