use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Single observation of a price series
///
/// Series are expected in ascending timestamp order with no duplicates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    /// Unix epoch milliseconds
    pub timestamp: i64,
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp: i64, price: f64) -> Self {
        Self { timestamp, price }
    }
}

/// Trading signal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// Simulated fill recorded in the trade ledger
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    /// 1-based sequence number within a single backtest run
    pub id: u64,
    pub side: TradeSide,
    pub quantity: f64,
    pub price: f64,
    pub total_value: f64,
    pub timestamp: i64,
    pub strategy_id: String,
}

/// Strategy families understood by the signal generator
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    TrendFollowing,
    MeanReversion,
    Breakout,
    /// Anything the engine does not know how to trade; always holds
    #[serde(other)]
    Unsupported,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TrendFollowing => "trend-following",
            Self::MeanReversion => "mean-reversion",
            Self::Breakout => "breakout",
            Self::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = std::convert::Infallible;

    /// Unknown names map to `Unsupported` rather than failing
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "trend-following" | "trend_following" => Self::TrendFollowing,
            "mean-reversion" | "mean_reversion" => Self::MeanReversion,
            "breakout" => Self::Breakout,
            _ => Self::Unsupported,
        })
    }
}

/// Strategy parameter value: numeric or boolean
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Flag(bool),
}

impl FromStr for ParamValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "true" => Ok(Self::Flag(true)),
            "false" => Ok(Self::Flag(false)),
            other => other
                .parse::<f64>()
                .map(Self::Number)
                .map_err(|_| format!("Invalid parameter value: {}", other)),
        }
    }
}

/// Largest period a descriptor parameter may request
pub const MAX_PERIOD: usize = 100_000;

/// Strategy as described by the external strategy catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategyDescriptor {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: StrategyKind,
    #[serde(default)]
    pub timeframe: String,
    #[serde(default)]
    pub parameters: HashMap<String, ParamValue>,
}

impl StrategyDescriptor {
    pub fn new(id: impl Into<String>, kind: StrategyKind) -> Self {
        Self {
            id: id.into(),
            kind,
            timeframe: String::new(),
            parameters: HashMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: ParamValue) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }

    /// Numeric parameter, falling back to `default` when missing or boolean
    pub fn param_f64(&self, key: &str, default: f64) -> f64 {
        match self.parameters.get(key) {
            Some(ParamValue::Number(n)) if n.is_finite() => *n,
            _ => default,
        }
    }

    /// Period-style parameter; non-positive, fractional or oversized
    /// values fall back
    pub fn param_usize(&self, key: &str, default: usize) -> usize {
        match self.parameters.get(key) {
            Some(ParamValue::Number(n))
                if n.is_finite()
                    && *n >= 1.0
                    && *n <= MAX_PERIOD as f64
                    && n.fract() == 0.0 =>
            {
                *n as usize
            }
            _ => default,
        }
    }
}
