//! Metrics module for training calculations and zones.

pub mod analytics;
pub mod calculator;
pub mod smoothing;
pub mod zones;

pub use calculator::{round_half_up, MetricsCalculator};
pub use zones::{HeartZone, PowerZone, ZoneCalculator, ZoneCounts, ZoneLabels};

// Re-export key analytics types for convenience
pub use analytics::{
    AnalyticsError, AnalyticsResult, CriticalPowerAnalyzer, CriticalPowerPoint, FitnessPoint, FitnessTrend,
    MergedCurveTable, NamedCpSet, NamedDuration, PerformanceFilter, PerformancePoint, PeriodBinner,
    TrainingLoadCalculator,
};
