use crate::models::PricePoint;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Market scenario types for synthetic data generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum MarketScenario {
    /// Steady uptrend with noise (+2% daily average)
    Uptrend,
    /// Steady downtrend with noise (-2% daily average)
    Downtrend,
    /// Sideways/choppy market (±1% around mean)
    Sideways,
    /// High volatility (±5% large swings)
    Volatile,
    /// Triangle wave between -/+10% of base with 10-bar legs
    Sawtooth,
    /// Constant price
    Flat,
    /// Slight growth, then a rapid 25% drop
    DrawdownTest,
}

impl MarketScenario {
    pub const ALL: [MarketScenario; 7] = [
        Self::Uptrend,
        Self::Downtrend,
        Self::Sideways,
        Self::Volatile,
        Self::Sawtooth,
        Self::Flat,
        Self::DrawdownTest,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Uptrend => "📈 Uptrend (+2% daily)",
            Self::Downtrend => "📉 Downtrend (-2% daily)",
            Self::Sideways => "↔️  Sideways (mean-reverting)",
            Self::Volatile => "⚡ Volatile (±5% swings)",
            Self::Sawtooth => "〰️  Sawtooth (10-bar legs)",
            Self::Flat => "➖ Flat",
            Self::DrawdownTest => "💥 Drawdown Test (25% drop)",
        }
    }
}

const SAWTOOTH_LEG: usize = 10;

/// Generates synthetic price series for demos and sweeps
///
/// Seeded so the same scenario and seed always produce the same prices.
pub struct SyntheticDataGenerator {
    rng: StdRng,
    base_price: f64,
}

impl SyntheticDataGenerator {
    /// Create a new generator with a seed for reproducibility
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            base_price: 150.0,
        }
    }

    pub fn with_base_price(mut self, base_price: f64) -> Self {
        self.base_price = base_price;
        self
    }

    /// Generate a series ending now for a specific market scenario
    ///
    /// # Arguments
    /// * `scenario` - The market scenario to simulate
    /// * `num_points` - Number of price points to generate
    /// * `interval_minutes` - Minutes between points
    pub fn generate(
        &mut self,
        scenario: MarketScenario,
        num_points: usize,
        interval_minutes: i64,
    ) -> Vec<PricePoint> {
        let start_time = Utc::now() - Duration::minutes(num_points as i64 * interval_minutes);
        self.generate_from(scenario, start_time, num_points, interval_minutes)
    }

    /// Generate a series starting at `start_time`
    pub fn generate_from(
        &mut self,
        scenario: MarketScenario,
        start_time: DateTime<Utc>,
        num_points: usize,
        interval_minutes: i64,
    ) -> Vec<PricePoint> {
        let mut points = Vec::with_capacity(num_points);
        let mut current_price = self.base_price;

        // ±2% per day spread over the sampling interval
        let drift_per_interval = 0.02 / (24.0 * 60.0 / interval_minutes as f64);

        for i in 0..num_points {
            let timestamp = start_time + Duration::minutes(i as i64 * interval_minutes);

            current_price = match scenario {
                MarketScenario::Uptrend => {
                    let noise = current_price * self.rng.gen_range(-0.001..0.001);
                    current_price + current_price * drift_per_interval + noise
                }
                MarketScenario::Downtrend => {
                    let noise = current_price * self.rng.gen_range(-0.001..0.001);
                    current_price - current_price * drift_per_interval + noise
                }
                MarketScenario::Sideways => {
                    // 10% pull to mean plus ±1% noise
                    let reversion = (self.base_price - current_price) * 0.1;
                    let noise = current_price * self.rng.gen_range(-0.01..0.01);
                    current_price + reversion + noise
                }
                MarketScenario::Volatile => {
                    let change = current_price * self.rng.gen_range(-0.05..0.05);
                    (current_price + change).max(self.base_price * 0.5)
                }
                MarketScenario::Sawtooth => self.sawtooth_price(i),
                MarketScenario::Flat => self.base_price,
                MarketScenario::DrawdownTest => {
                    if i < num_points / 2 {
                        current_price + current_price * self.rng.gen_range(-0.005..0.01)
                    } else {
                        let drop_rate = -0.25 / (num_points as f64 / 2.0);
                        let noise = current_price * self.rng.gen_range(-0.005..0.005);
                        current_price + current_price * drop_rate + noise
                    }
                }
            };

            points.push(PricePoint::new(timestamp.timestamp_millis(), current_price));
        }

        points
    }

    /// Deterministic triangle wave from 90% to 110% of base
    fn sawtooth_price(&self, i: usize) -> f64 {
        let low = self.base_price * 0.9;
        let step = self.base_price * 0.2 / SAWTOOTH_LEG as f64;
        let phase = i % (2 * SAWTOOTH_LEG);
        let offset = if phase <= SAWTOOTH_LEG {
            phase
        } else {
            2 * SAWTOOTH_LEG - phase
        };
        low + step * offset as f64
    }
}
