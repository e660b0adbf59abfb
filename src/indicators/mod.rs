// Technical indicators module
// Pure functions over a trailing window of closing prices

pub mod moving_average;
pub mod rsi;
pub mod volatility;

pub use moving_average::calculate_sma;
pub use rsi::calculate_rsi;
pub use volatility::calculate_std_dev;
