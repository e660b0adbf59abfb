use super::{PriceWindow, SignalGenerator};
use crate::indicators::{calculate_sma, calculate_std_dev};
use crate::models::{Signal, StrategyDescriptor};

/// Volatility band breakout strategy
///
/// Bands are `SMA ± band_width * StdDev` over the trailing `period` prices,
/// current bar included. A close above the upper band buys, a close below
/// the lower band sells.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakoutStrategy {
    pub period: usize,
    pub band_width: f64,
}

impl Default for BreakoutStrategy {
    fn default() -> Self {
        Self {
            period: 20,
            band_width: 2.0,
        }
    }
}

impl BreakoutStrategy {
    pub fn new(period: usize, band_width: f64) -> Self {
        Self { period, band_width }
    }

    /// Reads `period` / `k`
    pub fn from_descriptor(descriptor: &StrategyDescriptor) -> Self {
        let defaults = Self::default();
        Self::new(
            descriptor.param_usize("period", defaults.period),
            descriptor.param_f64("k", defaults.band_width),
        )
    }

    /// (lower, upper) band for the trailing window
    pub fn bands(&self, prices: &[f64]) -> Option<(f64, f64)> {
        let sma = calculate_sma(prices, self.period)?;
        let trailing = &prices[prices.len() - self.period..];
        let std_dev = calculate_std_dev(trailing)?;
        let half_width = self.band_width * std_dev;
        Some((sma - half_width, sma + half_width))
    }
}

impl SignalGenerator for BreakoutStrategy {
    fn generate_signal(&self, window: &PriceWindow<'_>) -> Signal {
        let (Some((lower, upper)), Some(price)) =
            (self.bands(window.prices()), window.current_price())
        else {
            return Signal::Hold;
        };

        if price > upper {
            Signal::Buy
        } else if price < lower {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }

    fn name(&self) -> &str {
        "Breakout"
    }
}
