//! Single-activity processing: raw samples to normalized series, laps and
//! summary metrics.

pub mod laps;
pub mod normalizer;
pub mod processor;
pub mod types;

pub use normalizer::{FillMode, GapPolicy, SampleNormalizer};
pub use processor::{compute_zones, process_activity};
pub use types::{
    ActivityHistoryEntry, ActivityMeta, ActivitySummary, LapSummary, NormalizedSample, NormalizedSeries,
    ProcessedActivity, RawSample,
};
