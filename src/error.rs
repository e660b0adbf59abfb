use thiserror::Error;

/// Errors surfaced to callers of the backtest engine
///
/// Only calling-contract violations end up here. Per-bar anomalies
/// (short history, flat windows, unknown strategy kinds) degrade to
/// `Hold` or zero-valued metrics instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BacktestError {
    #[error("Invalid input: initial balance must be positive and finite, got {0}")]
    InvalidBalance(f64),

    #[error("Invalid input: price series is empty")]
    EmptySeries,

    #[error("Invalid input: timestamp at index {index} is not after the previous one")]
    NonMonotonicTimestamp { index: usize },

    #[error("Invalid input: price at index {index} must be positive and finite, got {price}")]
    InvalidPrice { index: usize, price: f64 },

    #[error("Invalid input: end date {end} is before start date {start}")]
    InvalidDateRange { start: String, end: String },

    #[error("Invalid input: position fraction must be in (0, 1], got {0}")]
    InvalidPositionFraction(f64),

    #[error("Backtest task failed: {0}")]
    TaskFailed(String),
}

impl BacktestError {
    /// True for calling-contract violations, false for runtime failures
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidBalance(_)
                | Self::EmptySeries
                | Self::NonMonotonicTimestamp { .. }
                | Self::InvalidPrice { .. }
                | Self::InvalidDateRange { .. }
                | Self::InvalidPositionFraction(_)
        )
    }
}
