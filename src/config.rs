use crate::error::BacktestError;
use serde::{Deserialize, Serialize};

/// Share of cash balance committed on each buy
pub const DEFAULT_POSITION_FRACTION: f64 = 0.10;

/// Parameters of the execution simulator
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Fraction of the cash balance spent per entry (0, 1]
    pub position_fraction: f64,
    /// Bars with an index below this always hold
    pub lookback_bars: usize,
}

impl EngineConfig {
    /// Reject fractions that could spend more than the available cash
    pub fn validate(&self) -> crate::Result<()> {
        if !(self.position_fraction > 0.0 && self.position_fraction <= 1.0) {
            return Err(BacktestError::InvalidPositionFraction(
                self.position_fraction,
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            position_fraction: DEFAULT_POSITION_FRACTION,
            lookback_bars: crate::strategy::LOOKBACK_BARS,
        }
    }
}

/// Application settings
///
/// Loaded from `.env`, an optional `paperbot.toml` and `PAPERBOT_*`
/// environment variables, later sources winning.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_initial_balance")]
    pub initial_balance: f64,
    #[serde(default = "default_position_fraction")]
    pub position_fraction: f64,
    #[serde(default = "default_lookback_bars")]
    pub lookback_bars: usize,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_initial_balance() -> f64 {
    10_000.0
}

fn default_position_fraction() -> f64 {
    DEFAULT_POSITION_FRACTION
}

fn default_lookback_bars() -> usize {
    crate::strategy::LOOKBACK_BARS
}

fn default_log_filter() -> String {
    "paperbot=info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            initial_balance: default_initial_balance(),
            position_fraction: default_position_fraction(),
            lookback_bars: default_lookback_bars(),
            log_filter: default_log_filter(),
        }
    }
}

impl Settings {
    /// Load settings from the environment and `paperbot.toml` if present
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::load_from("paperbot")
    }

    /// Load settings using `file_stem` as the optional config file name
    pub fn load_from(file_stem: &str) -> anyhow::Result<Self> {
        let settings: Self = config::Config::builder()
            .add_source(config::File::with_name(file_stem).required(false))
            .add_source(config::Environment::with_prefix("PAPERBOT"))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.initial_balance.is_finite() && self.initial_balance > 0.0,
            "initial_balance must be positive, got {}",
            self.initial_balance
        );
        self.engine_config().validate()?;
        Ok(())
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            position_fraction: self.position_fraction,
            lookback_bars: self.lookback_bars,
        }
    }
}
