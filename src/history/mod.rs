//! Cross-activity views over a user's stored history.

pub mod dashboard;
pub mod service;

pub use dashboard::{CurrentFitness, Dashboard, WeekSummary};
pub use service::{start_of_day, HistoryError, HistoryResult, HistoryService};
