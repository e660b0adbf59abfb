// Core modules
pub mod backtest;
pub mod config;
pub mod data;
pub mod error;
pub mod indicators;
pub mod models;
pub mod strategy;

// Re-export commonly used types
pub use backtest::{BacktestRequest, BacktestResult, Backtester};
pub use error::BacktestError;
pub use models::*;
pub use strategy::{SignalGenerator, StrategyRule};

// Error handling
pub type Result<T> = std::result::Result<T, BacktestError>;
