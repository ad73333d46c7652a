//! Cross-activity training analytics.
//!
//! - Critical power curve and named best efforts
//! - Fitness trend (ATL/CTL/TSB)
//! - Notable CP tracking and the performance chart
//! - Three-window power curve merge
//! - Weekly and monthly binning

pub mod binning;
pub mod curve_merge;
pub mod error;
pub mod pdc;
pub mod performance;
pub mod training_load;

// Re-exports for convenience
pub use binning::{Binned, Granularity, PeriodBinner, TssBin, ZoneBin, ZoneKind};
pub use curve_merge::{merge_power_curves, ActivityCurve, CurveLegend, MergedCurveRow, MergedCurveTable};
pub use error::{AnalyticsError, AnalyticsResult};
pub use pdc::{ClockDuration, CriticalPowerAnalyzer, CriticalPowerCurve, CriticalPowerPoint, NamedCpSet, NamedDuration};
pub use performance::{performance_chart, NotableCpTracker, PerformanceFilter, PerformancePoint};
pub use training_load::{DailyLoad, FitnessPoint, FitnessTrend, TrainingLoadCalculator};
