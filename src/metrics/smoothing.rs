//! Rolling averages over the normalized power series.

use std::collections::VecDeque;

/// Rolling average over a fixed window of samples.
///
/// Averages use integer division, so a window of 199W and 200W reads 199W.
#[derive(Debug)]
pub struct RollingAverage {
    /// Buffer of recent values
    buffer: VecDeque<u16>,
    /// Window size in samples
    window_size: usize,
    /// Running sum for efficient calculation
    sum: u64,
}

impl RollingAverage {
    /// Create a new rolling average with the given window size.
    pub fn new(window_size: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(window_size),
            window_size,
            sum: 0,
        }
    }

    /// Create a 30-second rolling average (for Normalized Power calculation).
    pub fn thirty_second() -> Self {
        Self::new(30)
    }

    /// Add a new value and return the current average.
    pub fn add(&mut self, value: u16) -> Option<u16> {
        self.buffer.push_back(value);
        self.sum += value as u64;

        if self.buffer.len() > self.window_size {
            if let Some(old) = self.buffer.pop_front() {
                self.sum -= old as u64;
            }
        }

        self.average()
    }

    /// Add a value and return the average only once the window is full.
    pub fn add_full(&mut self, value: u16) -> Option<u16> {
        let avg = self.add(value);
        if self.is_full() {
            avg
        } else {
            None
        }
    }

    /// Get the current average without adding a value.
    pub fn average(&self) -> Option<u16> {
        if self.buffer.is_empty() {
            None
        } else {
            Some((self.sum / self.buffer.len() as u64) as u16)
        }
    }

    /// Check if the buffer is full (has enough samples for a valid average).
    pub fn is_full(&self) -> bool {
        self.buffer.len() >= self.window_size
    }
}

/// Averages of every full window, one per window end index.
///
/// A series of `n` samples yields `n - window + 1` averages, or none when
/// the series is shorter than the window.
pub fn full_window_averages(values: &[u16], window: usize) -> Vec<u16> {
    if window == 0 {
        return Vec::new();
    }
    let mut rolling = RollingAverage::new(window);
    values.iter().filter_map(|&v| rolling.add_full(v)).collect()
}

/// Normalized Power calculation.
///
/// NP = 4th root of average of (30-second rolling average power)^4
#[derive(Debug)]
pub struct NormalizedPowerCalculator {
    /// 30-second rolling average
    rolling_avg: RollingAverage,
    /// Sum of 4th powers
    sum_fourth_power: f64,
    /// Count of full windows
    count: u32,
}

impl NormalizedPowerCalculator {
    /// Create a new Normalized Power calculator.
    pub fn new() -> Self {
        Self {
            rolling_avg: RollingAverage::thirty_second(),
            sum_fourth_power: 0.0,
            count: 0,
        }
    }

    /// Normalized power of a whole series.
    ///
    /// Windows start at every index up to `len - 30`, ending before the
    /// final sample, so `len - 30` windows contribute. Series of 30 samples
    /// or fewer give 0.
    pub fn calculate(power: &[u16]) -> u16 {
        let mut calc = Self::new();
        let last = power.len().saturating_sub(1);
        for &p in &power[..last] {
            calc.add(p);
        }
        calc.normalized_power().unwrap_or(0)
    }

    /// Add a power sample.
    pub fn add(&mut self, power: u16) {
        if let Some(avg) = self.rolling_avg.add_full(power) {
            self.sum_fourth_power += (avg as f64).powi(4);
            self.count += 1;
        }
    }

    /// Get the current Normalized Power, truncated to whole watts.
    pub fn normalized_power(&self) -> Option<u16> {
        if self.count == 0 {
            return None;
        }

        let avg_fourth_power = self.sum_fourth_power / self.count as f64;
        // Two square roots stay exact for perfect fourth powers.
        let np = avg_fourth_power.sqrt().sqrt();

        Some(np as u16)
    }
}

impl Default for NormalizedPowerCalculator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_average_integer_division() {
        let mut avg = RollingAverage::new(3);

        assert_eq!(avg.add(200), Some(200));
        assert!(!avg.is_full());
        assert_eq!(avg.add(201), Some(200));
        assert_eq!(avg.add(240), Some(213));
        assert!(avg.is_full());

        // (201 + 240 + 260) / 3 = 233
        assert_eq!(avg.add(260), Some(233));
    }

    #[test]
    fn test_add_full_waits_for_window() {
        let mut avg = RollingAverage::new(2);
        assert_eq!(avg.add_full(100), None);
        assert_eq!(avg.add_full(200), Some(150));
    }

    #[test]
    fn test_full_window_averages_count() {
        let values = vec![100u16; 20];
        assert_eq!(full_window_averages(&values, 5).len(), 16);
        assert!(full_window_averages(&values[..4], 5).is_empty());
    }

    #[test]
    fn test_wide_window_does_not_overflow() {
        // 70_000 x 65_535 is past u32::MAX
        let values = vec![u16::MAX; 70_000];
        assert_eq!(full_window_averages(&values, 70_000), vec![u16::MAX]);
    }

    #[test]
    fn test_normalized_power_constant() {
        let power = vec![200u16; 3600];
        assert_eq!(NormalizedPowerCalculator::calculate(&power), 200);
    }

    #[test]
    fn test_normalized_power_short_series() {
        assert_eq!(NormalizedPowerCalculator::calculate(&[250u16; 30]), 0);
        assert_eq!(NormalizedPowerCalculator::calculate(&[]), 0);
    }

    #[test]
    fn test_normalized_power_exceeds_average_when_variable() {
        let power: Vec<u16> = (0..1200).map(|i| if (i / 60) % 2 == 0 { 100 } else { 300 }).collect();
        let avg = power.iter().map(|&p| p as u32).sum::<u32>() / power.len() as u32;

        let np = NormalizedPowerCalculator::calculate(&power);
        assert!(np as u32 > avg);
    }
}
