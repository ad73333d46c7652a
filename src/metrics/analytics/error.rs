//! Analytics error types.

use thiserror::Error;

/// Errors raised by the analytics core.
///
/// Degenerate data (no power, no heart rate, short series) is not an error;
/// it yields zero metrics and cleared presence flags. These variants cover
/// inputs whose shape is wrong.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Insufficient data to perform calculation.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Parallel sample sequences disagree in length.
    #[error("Series length mismatch: power={power}, heart={heart}, cadence={cadence}")]
    SeriesMismatch {
        power: usize,
        heart: usize,
        cadence: usize,
    },

    /// Raw sample timestamps went backwards.
    #[error("Raw sample {index} is earlier than its predecessor")]
    OutOfOrder { index: usize },
}

/// Result type for analytics operations.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;
