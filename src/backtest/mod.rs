pub mod metrics;
pub mod runner;
pub mod simulator;
pub mod synthetic;

pub use metrics::{BacktestResult, SORTINO_NO_DOWNSIDE};
pub use runner::{BacktestJob, BacktestRequest, Backtester};
pub use simulator::{ExecutionSimulator, SimulationOutcome};
pub use synthetic::{MarketScenario, SyntheticDataGenerator};
