// Trading strategy module
pub mod breakout;
pub mod mean_reversion;
pub mod trend_following;

pub use breakout::BreakoutStrategy;
pub use mean_reversion::MeanReversionStrategy;
pub use trend_following::TrendFollowingStrategy;

use crate::models::{Signal, StrategyDescriptor, StrategyKind};

/// Bars with an index below this always hold, whatever the strategy
pub const LOOKBACK_BARS: usize = 20;

/// Price history ending at the bar being evaluated
#[derive(Debug, Clone, Copy)]
pub struct PriceWindow<'a> {
    prices: &'a [f64],
    lookback: usize,
}

impl<'a> PriceWindow<'a> {
    pub fn new(prices: &'a [f64], lookback: usize) -> Self {
        Self { prices, lookback }
    }

    /// All prices up to and including the current bar
    pub fn prices(&self) -> &'a [f64] {
        self.prices
    }

    pub fn current_price(&self) -> Option<f64> {
        self.prices.last().copied()
    }

    /// True once the current bar index has reached the lookback
    pub fn is_ready(&self) -> bool {
        self.prices.len() > self.lookback
    }

    /// Window ending one bar earlier, if that bar was itself past the lookback
    pub fn previous(&self) -> Option<PriceWindow<'a>> {
        let len = self.prices.len();
        if len < 2 {
            return None;
        }
        let prev = Self::new(&self.prices[..len - 1], self.lookback);
        prev.is_ready().then_some(prev)
    }
}

/// Maps the current price window to a trading decision
pub trait SignalGenerator {
    /// Generate a trading signal for the last bar of `window`
    fn generate_signal(&self, window: &PriceWindow<'_>) -> Signal;

    /// Get strategy name
    fn name(&self) -> &str;
}

/// Resolved strategy: one variant per supported strategy kind
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyRule {
    TrendFollowing(TrendFollowingStrategy),
    MeanReversion(MeanReversionStrategy),
    Breakout(BreakoutStrategy),
    /// Holds on every bar
    Unsupported,
}

impl StrategyRule {
    /// Build the rule for a descriptor, filling in default parameters
    pub fn from_descriptor(descriptor: &StrategyDescriptor) -> Self {
        match descriptor.kind {
            StrategyKind::TrendFollowing => {
                Self::TrendFollowing(TrendFollowingStrategy::from_descriptor(descriptor))
            }
            StrategyKind::MeanReversion => {
                Self::MeanReversion(MeanReversionStrategy::from_descriptor(descriptor))
            }
            StrategyKind::Breakout => Self::Breakout(BreakoutStrategy::from_descriptor(descriptor)),
            StrategyKind::Unsupported => Self::Unsupported,
        }
    }
}

impl SignalGenerator for StrategyRule {
    fn generate_signal(&self, window: &PriceWindow<'_>) -> Signal {
        if !window.is_ready() {
            return Signal::Hold;
        }

        match self {
            Self::TrendFollowing(strategy) => strategy.generate_signal(window),
            Self::MeanReversion(strategy) => strategy.generate_signal(window),
            Self::Breakout(strategy) => strategy.generate_signal(window),
            Self::Unsupported => Signal::Hold,
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::TrendFollowing(strategy) => strategy.name(),
            Self::MeanReversion(strategy) => strategy.name(),
            Self::Breakout(strategy) => strategy.name(),
            Self::Unsupported => "Unsupported",
        }
    }
}
