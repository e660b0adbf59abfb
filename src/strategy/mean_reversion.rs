use super::{PriceWindow, SignalGenerator};
use crate::indicators::calculate_rsi;
use crate::models::{Signal, StrategyDescriptor};

/// RSI mean reversion strategy
///
/// Buys when RSI drops below the oversold threshold and sells when it
/// climbs above the overbought threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct MeanReversionStrategy {
    /// RSI period for calculation
    pub rsi_period: usize,

    /// RSI level below which the market is oversold (e.g. 30)
    pub oversold: f64,

    /// RSI level above which the market is overbought (e.g. 70)
    pub overbought: f64,
}

impl Default for MeanReversionStrategy {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

impl MeanReversionStrategy {
    pub fn new(rsi_period: usize, oversold: f64, overbought: f64) -> Self {
        Self {
            rsi_period,
            oversold,
            overbought,
        }
    }

    /// Reads `rsiPeriod` / `oversold` / `overbought`
    pub fn from_descriptor(descriptor: &StrategyDescriptor) -> Self {
        let defaults = Self::default();
        Self::new(
            descriptor.param_usize("rsiPeriod", defaults.rsi_period),
            descriptor.param_f64("oversold", defaults.oversold),
            descriptor.param_f64("overbought", defaults.overbought),
        )
    }
}

impl SignalGenerator for MeanReversionStrategy {
    fn generate_signal(&self, window: &PriceWindow<'_>) -> Signal {
        let Some(rsi) = calculate_rsi(window.prices(), self.rsi_period) else {
            return Signal::Hold;
        };

        tracing::trace!(
            "Mean reversion check: rsi={:.1} (oversold<{}, overbought>{})",
            rsi,
            self.oversold,
            self.overbought
        );

        if rsi < self.oversold {
            Signal::Buy
        } else if rsi > self.overbought {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }

    fn name(&self) -> &str {
        "Mean Reversion"
    }
}
