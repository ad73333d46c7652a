//! Unit tests for sample normalization.

use chrono::{DateTime, Duration, TimeZone, Utc};
use ridelab::activity::normalizer::{normalize, FillMode, GapPolicy};
use ridelab::activity::types::{RawSample, TickSource};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 10, 9, 0, 0).unwrap()
}

fn sample(offset: i64, power: u16, heart: u8, cadence: u8) -> RawSample {
    RawSample {
        timestamp: start() + Duration::seconds(offset),
        lap_start: start(),
        lap_number: 1,
        heart_rate_bpm: heart,
        power_watts: power,
        cadence_rpm: cadence,
    }
}

/// Two 1 Hz runs of `run` samples each with `missing` seconds between them.
fn two_runs(run: i64, missing: i64) -> Vec<RawSample> {
    let mut raw: Vec<RawSample> = (0..run).map(|i| sample(i, 200, 150, 80)).collect();
    raw.extend((0..run).map(|i| sample(run + missing + i, 200, 150, 80)));
    raw
}

fn policy(fill_mode: FillMode) -> GapPolicy {
    GapPolicy {
        stopgap_secs: 30,
        fill_mode,
    }
}

#[test]
fn test_offsets_are_contiguous_in_every_mode() {
    let mut raw = two_runs(20, 4);
    // Duplicate timestamp and a pause
    raw.insert(5, sample(4, 180, 140, 85));
    raw.extend((0..10).map(|i| sample(200 + i, 210, 155, 90)));

    for mode in [FillMode::Autofill, FillMode::SetZero, FillMode::Remove] {
        let (series, _) = normalize(&raw, policy(mode)).unwrap();
        for (i, tick) in series.samples().iter().enumerate() {
            assert_eq!(tick.elapsed_seconds, i as u32, "mode {}", mode);
        }
    }
}

#[test]
fn test_remove_emits_nothing_for_the_gap() {
    // 5-second gap: timestamps jump by 6
    let raw = two_runs(10, 5);
    let (series, gaps) = normalize(&raw, policy(FillMode::Remove)).unwrap();

    assert_eq!(series.len(), 19);
    assert!(series.samples().iter().all(|t| t.source == TickSource::Recorded));
    assert_eq!(gaps.filled_ticks, 0);
    assert_eq!(gaps.dropped_ticks, 6);
}

#[test]
fn test_autofill_repeats_the_closing_sample() {
    // The run after the gap carries different values from the one before it
    let mut raw: Vec<RawSample> = (0..5).map(|i| sample(i, 200, 150, 80)).collect();
    raw.extend((0..5).map(|i| sample(8 + i, 260, 165, 95)));
    let (series, gaps) = normalize(&raw, policy(FillMode::Autofill)).unwrap();

    assert_eq!(series.len(), 13);
    assert_eq!(gaps.filled_ticks, 3);

    for tick in &series.samples()[5..8] {
        assert_eq!(tick.source, TickSource::Filled);
        assert_eq!((tick.power_watts, tick.heart_rate_bpm, tick.cadence_rpm), (260, 165, 95));
    }
    assert_eq!(series.samples()[4].power_watts, 200);
    assert_eq!(series.samples()[8].source, TickSource::Recorded);
    assert_eq!(series.samples()[8].power_watts, 260);
}

#[test]
fn test_setzero_fills_with_zeros() {
    let mut raw: Vec<RawSample> = (0..5).map(|i| sample(i, 200, 150, 80)).collect();
    raw.push(sample(8, 200, 150, 80));
    raw.push(sample(9, 200, 150, 80));
    let (series, gaps) = normalize(&raw, policy(FillMode::SetZero)).unwrap();

    // Every second of the gap is zeroed, including the one the closing sample lands on
    assert_eq!(series.len(), 10);
    assert_eq!(gaps.filled_ticks, 3);
    assert_eq!(series.power()[5..].to_vec(), vec![0, 0, 0, 0, 200]);
    for tick in &series.samples()[5..9] {
        assert_eq!(tick.source, TickSource::Zeroed);
        assert_eq!((tick.power_watts, tick.heart_rate_bpm, tick.cadence_rpm), (0, 0, 0));
        assert!(tick.is_freewheel());
    }
    assert_eq!(series.samples()[9].source, TickSource::Recorded);
}

#[test]
fn test_setzero_keeps_one_second_steps() {
    let raw = two_runs(5, 0);
    let (series, gaps) = normalize(&raw, policy(FillMode::SetZero)).unwrap();

    assert_eq!(gaps.filled_ticks, 0);
    assert!(series.power().iter().all(|&p| p == 200));
}

#[test]
fn test_long_gap_is_a_pause() {
    let raw = two_runs(5, 60);
    for mode in [FillMode::Autofill, FillMode::SetZero, FillMode::Remove] {
        let (series, gaps) = normalize(&raw, policy(mode)).unwrap();
        assert_eq!(gaps.pauses, 1);
        assert_eq!(series.len(), 9);
    }
}
