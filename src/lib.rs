//! RideLab - Cycling Activity Analytics
//!
//! Turns recorded 1 Hz ride samples into a gap-free normalized series, lap and
//! activity summaries, critical power curves and zone times, and builds the
//! cross-activity views on top: fitness trend (CTL/ATL/TSB), merged power
//! curves, weekly/monthly bins and the heart rate vs power chart.

pub mod activity;
pub mod history;
pub mod metrics;
pub mod storage;

// Re-export commonly used types
pub use activity::processor::{compute_zones, process_activity};
pub use activity::types::{ProcessedActivity, RawSample};
pub use history::service::HistoryService;
pub use metrics::calculator::MetricsCalculator;
pub use storage::config::UserProfile;
pub use storage::database::Database;
pub use storage::store::ActivityStore;
