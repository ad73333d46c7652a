//! Per-lap and whole-activity accumulation over normalized ticks.

use chrono::{DateTime, Utc};

use crate::activity::types::{LapSummary, NormalizedSample, RawSample};

/// Running sums for a lap or a whole activity.
///
/// Freewheel ticks (cadence 0) count towards every average except cadence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Accumulator {
    sample_count: u32,
    power_sum: u64,
    heart_sum: u64,
    cadence_sum: u64,
    freewheel_count: u32,
}

impl Accumulator {
    /// Accumulator with one more tick folded in.
    #[must_use]
    pub fn with_tick(self, tick: &NormalizedSample) -> Self {
        Self {
            sample_count: self.sample_count + 1,
            power_sum: self.power_sum + tick.power_watts as u64,
            heart_sum: self.heart_sum + tick.heart_rate_bpm as u64,
            cadence_sum: self.cadence_sum + tick.cadence_rpm as u64,
            freewheel_count: self.freewheel_count + u32::from(tick.is_freewheel()),
        }
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn freewheel_count(&self) -> u32 {
        self.freewheel_count
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count == 0
    }

    pub fn avg_power(&self) -> u16 {
        mean(self.power_sum, self.sample_count) as u16
    }

    pub fn avg_heart_rate(&self) -> u8 {
        mean(self.heart_sum, self.sample_count) as u8
    }

    /// Average cadence over pedalling ticks only.
    pub fn avg_cadence(&self) -> u8 {
        mean(self.cadence_sum, self.sample_count - self.freewheel_count) as u8
    }

    pub fn to_lap(&self, lap_number: u32) -> LapSummary {
        LapSummary {
            lap_number,
            avg_power: self.avg_power(),
            avg_heart_rate: self.avg_heart_rate(),
            avg_cadence: self.avg_cadence(),
            duration_secs: self.sample_count,
        }
    }
}

fn mean(sum: u64, count: u32) -> u64 {
    if count == 0 {
        0
    } else {
        sum / count as u64
    }
}

/// Splits ticks into laps using the raw lap start times.
#[derive(Debug, Clone, Default)]
pub struct LapAggregator {
    current_lap_start: Option<DateTime<Utc>>,
    current_lap_number: u32,
    lap: Accumulator,
    activity: Accumulator,
    laps: Vec<LapSummary>,
}

impl LapAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the ticks produced by one raw sample, then check it for a lap change.
    ///
    /// The sample carrying a new lap start still belongs to the lap it closes.
    /// A lap closes only if it holds at least one tick; an empty lap is simply
    /// relabelled.
    pub fn add_sample(&mut self, raw: &RawSample, ticks: &[NormalizedSample]) {
        for tick in ticks {
            self.lap = self.lap.with_tick(tick);
            self.activity = self.activity.with_tick(tick);
        }

        match self.current_lap_start {
            Some(start) if start == raw.lap_start => return,
            Some(_) if !self.lap.is_empty() => {
                self.laps.push(self.lap.to_lap(self.current_lap_number));
                self.lap = Accumulator::default();
            }
            _ => {}
        }
        self.current_lap_start = Some(raw.lap_start);
        self.current_lap_number = raw.lap_number;
    }

    pub fn activity(&self) -> &Accumulator {
        &self.activity
    }

    /// Close the last lap and return all laps plus activity totals.
    pub fn finish(mut self) -> (Vec<LapSummary>, Accumulator) {
        if !self.lap.is_empty() {
            self.laps.push(self.lap.to_lap(self.current_lap_number));
        }
        (self.laps, self.activity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::types::TickSource;
    use chrono::{Duration, TimeZone};

    fn tick(power: u16, heart: u8, cadence: u8) -> NormalizedSample {
        NormalizedSample {
            elapsed_seconds: 0,
            power_watts: power,
            heart_rate_bpm: heart,
            cadence_rpm: cadence,
            source: TickSource::Recorded,
        }
    }

    fn raw(lap_offset_secs: i64, lap_number: u32) -> RawSample {
        let base = Utc.with_ymd_and_hms(2024, 4, 1, 6, 0, 0).unwrap();
        RawSample {
            timestamp: base,
            lap_start: base + Duration::seconds(lap_offset_secs),
            lap_number,
            heart_rate_bpm: 0,
            power_watts: 0,
            cadence_rpm: 0,
        }
    }

    #[test]
    fn test_freewheel_excluded_from_cadence_only() {
        let acc = [tick(200, 140, 90), tick(100, 130, 0), tick(300, 150, 90)]
            .iter()
            .fold(Accumulator::default(), |acc, t| acc.with_tick(t));

        assert_eq!(acc.sample_count(), 3);
        assert_eq!(acc.freewheel_count(), 1);
        assert_eq!(acc.avg_power(), 200);
        assert_eq!(acc.avg_heart_rate(), 140);
        assert_eq!(acc.avg_cadence(), 90);
    }

    #[test]
    fn test_all_freewheel_cadence_is_zero() {
        let acc = Accumulator::default().with_tick(&tick(0, 0, 0));
        assert_eq!(acc.avg_cadence(), 0);
        assert_eq!(Accumulator::default().avg_power(), 0);
    }

    #[test]
    fn test_laps_split_on_lap_start_change() {
        let mut laps = LapAggregator::new();

        laps.add_sample(&raw(0, 1), &[tick(200, 140, 90), tick(220, 142, 90)]);
        laps.add_sample(&raw(0, 1), &[tick(240, 144, 90)]);
        // First sample of lap 2 closes lap 1 and is counted in it
        laps.add_sample(&raw(300, 2), &[tick(260, 146, 90)]);
        laps.add_sample(&raw(300, 2), &[tick(100, 120, 0)]);

        let (summaries, activity) = laps.finish();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].lap_number, 1);
        assert_eq!(summaries[0].avg_power, 230);
        assert_eq!(summaries[0].duration_secs, 4);
        assert_eq!(summaries[1].lap_number, 2);
        assert_eq!(summaries[1].duration_secs, 1);
        assert_eq!(summaries[1].avg_cadence, 0);
        assert_eq!(activity.sample_count(), 5);
        assert_eq!(activity.avg_power(), 204);
    }

    #[test]
    fn test_empty_lap_is_not_emitted() {
        let mut laps = LapAggregator::new();
        laps.add_sample(&raw(0, 1), &[]);
        laps.add_sample(&raw(60, 2), &[]);
        laps.add_sample(&raw(60, 2), &[tick(150, 0, 80)]);

        let (summaries, _) = laps.finish();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].lap_number, 2);
    }

    #[test]
    fn test_no_ticks_no_laps() {
        let mut laps = LapAggregator::new();
        laps.add_sample(&raw(0, 1), &[]);
        let (summaries, activity) = laps.finish();
        assert!(summaries.is_empty());
        assert!(activity.is_empty());
    }
}
