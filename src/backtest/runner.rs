use crate::backtest::metrics::BacktestResult;
use crate::backtest::simulator::ExecutionSimulator;
use crate::config::EngineConfig;
use crate::data::{validate_initial_balance, validate_series};
use crate::error::BacktestError;
use crate::models::{PricePoint, StrategyDescriptor};
use crate::strategy::{SignalGenerator, StrategyRule};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Caller-supplied run parameters
///
/// The dates only label the result; the series is expected to be
/// pre-sliced to the requested range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BacktestRequest {
    pub initial_balance: f64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl BacktestRequest {
    pub fn new(initial_balance: f64, start_date: DateTime<Utc>, end_date: DateTime<Utc>) -> Self {
        Self {
            initial_balance,
            start_date,
            end_date,
        }
    }

    /// Request labelled with the first and last timestamps of `series`
    pub fn spanning(series: &[PricePoint], initial_balance: f64) -> Option<Self> {
        let start = DateTime::from_timestamp_millis(series.first()?.timestamp)?;
        let end = DateTime::from_timestamp_millis(series.last()?.timestamp)?;
        Some(Self::new(initial_balance, start, end))
    }

    fn validate(&self) -> Result<()> {
        validate_initial_balance(self.initial_balance)?;
        if self.end_date < self.start_date {
            return Err(BacktestError::InvalidDateRange {
                start: self.start_date.to_rfc3339(),
                end: self.end_date.to_rfc3339(),
            });
        }
        Ok(())
    }
}

/// One independent backtest for `Backtester::run_many`
#[derive(Debug, Clone)]
pub struct BacktestJob {
    pub descriptor: StrategyDescriptor,
    pub series: Arc<Vec<PricePoint>>,
    pub request: BacktestRequest,
}

/// Backtest orchestrator
///
/// Holds no state between runs; every call builds its own simulator.
#[derive(Debug, Clone, Default)]
pub struct Backtester {
    config: EngineConfig,
}

impl Backtester {
    /// Create a new backtester
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run a backtest of `descriptor` over `series`
    ///
    /// # Arguments
    /// * `descriptor` - Strategy to replay; unknown kinds hold throughout
    /// * `series` - Price history, ascending by timestamp
    /// * `request` - Initial balance and labelling date range
    ///
    /// # Errors
    /// Rejects an empty or unsorted series, non-positive prices, a
    /// non-positive initial balance, an inverted date range and a
    /// position fraction outside (0, 1].
    pub fn run(
        &self,
        descriptor: &StrategyDescriptor,
        series: &[PricePoint],
        request: &BacktestRequest,
    ) -> Result<BacktestResult> {
        self.config.validate()?;
        request.validate()?;
        validate_series(series)?;

        let rule = StrategyRule::from_descriptor(descriptor);
        if rule == StrategyRule::Unsupported {
            tracing::warn!(
                "Strategy {} has an unsupported type, every bar will hold",
                descriptor.id
            );
        }

        tracing::info!(
            "Starting backtest: strategy={} ({}), {} bars, initial balance ${:.2}",
            descriptor.id,
            rule.name(),
            series.len(),
            request.initial_balance
        );

        let outcome = ExecutionSimulator::new(
            descriptor.id.clone(),
            request.initial_balance,
            self.config,
        )
        .run(&rule, series);

        let result = BacktestResult::from_outcome(
            descriptor.id.clone(),
            request.start_date,
            request.end_date,
            request.initial_balance,
            outcome,
        );

        tracing::info!(
            "Backtest complete: {} round trips, P&L: ${:.2} ({:.2}%), max drawdown {:.2}%",
            result.total_trades,
            result.profit,
            result.profit_percentage,
            result.max_drawdown
        );

        Ok(result)
    }

    /// Run independent backtests in parallel on the blocking pool
    ///
    /// Results come back in job order.
    pub async fn run_many(&self, jobs: Vec<BacktestJob>) -> Vec<Result<BacktestResult>> {
        let handles: Vec<_> = jobs
            .into_iter()
            .map(|job| {
                let backtester = self.clone();
                tokio::task::spawn_blocking(move || {
                    backtester.run(&job.descriptor, &job.series, &job.request)
                })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(BacktestError::TaskFailed(e.to_string())),
            };
            results.push(result);
        }
        results
    }

    /// Run backtest and print report
    pub fn run_and_report(
        &self,
        descriptor: &StrategyDescriptor,
        series: &[PricePoint],
        request: &BacktestRequest,
        scenario_name: &str,
    ) -> Result<BacktestResult> {
        println!("\n🔬 Running backtest: {}", scenario_name);
        println!("   Strategy: {} ({})", descriptor.id, descriptor.kind);
        println!("   Bars: {}", series.len());
        println!("   Initial Balance: ${:.2}", request.initial_balance);

        let result = self.run(descriptor, series, request)?;
        result.print_report();

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ParamValue, StrategyKind};

    fn linear_series(len: usize) -> Vec<PricePoint> {
        (0..len)
            .map(|i| PricePoint::new(i as i64 * 60_000, 100.0 + i as f64))
            .collect()
    }

    fn request_for(series: &[PricePoint]) -> BacktestRequest {
        BacktestRequest::spanning(series, 10_000.0).unwrap()
    }

    #[test]
    fn test_backtest_uptrend() {
        tracing_subscriber::fmt()
            .with_env_filter("paperbot=debug")
            .try_init()
            .ok();

        let series = linear_series(30);
        let descriptor = StrategyDescriptor::new("tf", StrategyKind::TrendFollowing);
        let result = Backtester::default()
            .run(&descriptor, &series, &request_for(&series))
            .unwrap();

        assert_eq!(result.trades.len(), 1);
        assert!(result.profit > 0.0);
        assert_eq!(result.strategy_id, "tf");
    }

    #[test]
    fn test_backtest_rejects_bad_balance() {
        let series = linear_series(30);
        let descriptor = StrategyDescriptor::new("tf", StrategyKind::TrendFollowing);
        let mut request = request_for(&series);
        request.initial_balance = 0.0;

        let err = Backtester::default()
            .run(&descriptor, &series, &request)
            .unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(err, BacktestError::InvalidBalance(0.0));
    }

    #[test]
    fn test_backtest_rejects_empty_series() {
        let descriptor = StrategyDescriptor::new("tf", StrategyKind::TrendFollowing);
        let request = BacktestRequest::new(1_000.0, Utc::now(), Utc::now());

        let result = Backtester::default().run(&descriptor, &[], &request);
        assert_eq!(result.unwrap_err(), BacktestError::EmptySeries);
    }

    #[test]
    fn test_backtest_rejects_inverted_date_range() {
        let series = linear_series(5);
        let descriptor = StrategyDescriptor::new("tf", StrategyKind::TrendFollowing);
        let request = BacktestRequest::new(
            1_000.0,
            Utc::now(),
            Utc::now() - chrono::Duration::days(1),
        );

        let err = Backtester::default()
            .run(&descriptor, &series, &request)
            .unwrap_err();
        assert!(matches!(err, BacktestError::InvalidDateRange { .. }));
    }

    #[test]
    fn test_backtest_rejects_oversized_position_fraction() {
        let series: Vec<PricePoint> = (0..40)
            .map(|i| PricePoint::new(i as i64 * 60_000, 200.0 - i as f64))
            .collect();
        let descriptor = StrategyDescriptor::new("mr", StrategyKind::MeanReversion);
        let backtester = Backtester::new(EngineConfig {
            position_fraction: 3.0,
            lookback_bars: 20,
        });

        let err = backtester
            .run(&descriptor, &series, &request_for(&series))
            .unwrap_err();
        assert_eq!(err, BacktestError::InvalidPositionFraction(3.0));
    }

    #[test]
    fn test_huge_rsi_period_holds_instead_of_panicking() {
        let series = linear_series(30);
        let descriptor = StrategyDescriptor::new("mr", StrategyKind::MeanReversion)
            .with_param("rsiPeriod", ParamValue::Number(1e20));

        let result = Backtester::default()
            .run(&descriptor, &series, &request_for(&series))
            .unwrap();
        assert!(result.trades.is_empty());
        assert_eq!(result.final_balance, 10_000.0);
    }

    #[test]
    fn test_request_spanning_series() {
        let series = linear_series(3);
        let request = request_for(&series);
        assert_eq!(request.start_date.timestamp_millis(), 0);
        assert_eq!(request.end_date.timestamp_millis(), 120_000);
        assert!(BacktestRequest::spanning(&[], 1.0).is_none());
    }

    #[tokio::test]
    async fn test_run_many_preserves_job_order() {
        let series = Arc::new(linear_series(30));
        let request = request_for(&series);
        let kinds = [
            StrategyKind::TrendFollowing,
            StrategyKind::MeanReversion,
            StrategyKind::Breakout,
        ];

        let jobs: Vec<BacktestJob> = kinds
            .iter()
            .map(|kind| BacktestJob {
                descriptor: StrategyDescriptor::new(kind.as_str(), *kind),
                series: series.clone(),
                request: request.clone(),
            })
            .collect();

        let backtester = Backtester::default();
        let results = backtester.run_many(jobs).await;
        assert_eq!(results.len(), 3);

        for (kind, result) in kinds.iter().zip(&results) {
            let result = result.as_ref().unwrap();
            assert_eq!(result.strategy_id, kind.as_str());
            // Parallel runs match a sequential run exactly
            let sequential = backtester
                .run(&StrategyDescriptor::new(kind.as_str(), *kind), &series, &request)
                .unwrap();
            assert_eq!(result, &sequential);
        }
    }
}
