use super::{PriceWindow, SignalGenerator};
use crate::indicators::calculate_sma;
use crate::models::{Signal, StrategyDescriptor};
use std::cmp::Ordering;

/// Moving average crossover strategy
///
/// Fires only on the bar where the short SMA crosses the long SMA, so a
/// sustained trend produces one entry rather than a buy on every bar.
/// A previous bar that was still inside the lookback counts as neutral.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendFollowingStrategy {
    pub short_period: usize,
    pub long_period: usize,
}

impl Default for TrendFollowingStrategy {
    fn default() -> Self {
        Self {
            short_period: 10,
            long_period: 20,
        }
    }
}

impl TrendFollowingStrategy {
    pub fn new(short_period: usize, long_period: usize) -> Self {
        Self {
            short_period,
            long_period,
        }
    }

    /// Reads `shortPeriod` / `longPeriod`
    pub fn from_descriptor(descriptor: &StrategyDescriptor) -> Self {
        let defaults = Self::default();
        Self::new(
            descriptor.param_usize("shortPeriod", defaults.short_period),
            descriptor.param_usize("longPeriod", defaults.long_period),
        )
    }

    /// Short SMA relative to long SMA
    fn relation(&self, prices: &[f64]) -> Option<Ordering> {
        let short_ma = calculate_sma(prices, self.short_period)?;
        let long_ma = calculate_sma(prices, self.long_period)?;
        short_ma.partial_cmp(&long_ma)
    }
}

impl SignalGenerator for TrendFollowingStrategy {
    fn generate_signal(&self, window: &PriceWindow<'_>) -> Signal {
        let Some(current) = self.relation(window.prices()) else {
            return Signal::Hold;
        };
        let previous = window
            .previous()
            .and_then(|prev| self.relation(prev.prices()));

        match current {
            Ordering::Greater if previous != Some(Ordering::Greater) => Signal::Buy,
            Ordering::Less if previous != Some(Ordering::Less) => Signal::Sell,
            _ => Signal::Hold,
        }
    }

    fn name(&self) -> &str {
        "Trend Following"
    }
}
