use crate::backtest::simulator::SimulationOutcome;
use crate::models::{Trade, TradeSide};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sortino ratio reported when returns are positive and none are negative
pub const SORTINO_NO_DOWNSIDE: f64 = 999.99;

/// Complete backtest performance result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResult {
    pub strategy_id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,

    // P&L Metrics
    pub initial_balance: f64,
    pub final_balance: f64,
    pub profit: f64,
    pub profit_percentage: f64,

    // Trade Statistics (completed round trips)
    pub win_rate: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,

    // Risk Metrics
    pub max_drawdown: f64, // Percent of running peak
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub profit_factor: f64,

    // Trade Ledger
    pub trades: Vec<Trade>,
}

impl BacktestResult {
    /// Assemble the result from a finished simulation
    pub fn from_outcome(
        strategy_id: impl Into<String>,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        initial_balance: f64,
        outcome: SimulationOutcome,
    ) -> Self {
        let profit = outcome.final_value - initial_balance;
        // Derived from profit so that final == initial + profit holds bit for bit
        let final_balance = initial_balance + profit;
        let profit_percentage = profit / initial_balance * 100.0;

        let total_trades = outcome.winning_trades + outcome.losing_trades;
        let win_rate = if total_trades > 0 {
            (outcome.winning_trades as f64 / total_trades as f64) * 100.0
        } else {
            0.0
        };

        let returns = trade_returns(&outcome.trades);

        Self {
            strategy_id: strategy_id.into(),
            start_date,
            end_date,
            initial_balance,
            final_balance,
            profit,
            profit_percentage,
            win_rate,
            total_trades,
            winning_trades: outcome.winning_trades,
            losing_trades: outcome.losing_trades,
            max_drawdown: outcome.max_drawdown * 100.0,
            sharpe_ratio: sharpe_ratio(&returns),
            sortino_ratio: sortino_ratio(&returns),
            profit_factor: profit_factor(&outcome.trades),
            trades: outcome.trades,
        }
    }

    /// Print a formatted report to stdout
    pub fn print_report(&self) {
        println!("\n╔═══════════════════════════════════════════════════════╗");
        println!("║              BACKTEST PERFORMANCE REPORT              ║");
        println!("╚═══════════════════════════════════════════════════════╝\n");

        println!("  Strategy:              {}", self.strategy_id);
        println!(
            "  Period:                {} → {}",
            self.start_date.format("%Y-%m-%d %H:%M"),
            self.end_date.format("%Y-%m-%d %H:%M")
        );

        println!("\n📊 P&L SUMMARY");
        println!("  Initial Balance:       ${:.2}", self.initial_balance);
        println!("  Final Balance:         ${:.2}", self.final_balance);
        println!(
            "  Profit:                ${:.2} ({:+.2}%)",
            self.profit, self.profit_percentage
        );

        println!("\n📈 TRADE STATISTICS");
        println!("  Ledger Entries:        {}", self.trades.len());
        println!("  Round Trips:           {}", self.total_trades);
        println!(
            "  Winning Trades:        {} ({:.1}%)",
            self.winning_trades, self.win_rate
        );
        println!("  Losing Trades:         {}", self.losing_trades);

        println!("\n⚠️  RISK METRICS");
        println!("  Max Drawdown:          {:.2}%", self.max_drawdown);
        println!("  Sharpe Ratio:          {:.2}", self.sharpe_ratio);
        if self.sortino_ratio >= SORTINO_NO_DOWNSIDE {
            println!("  Sortino Ratio:         n/a (no downside)");
        } else {
            println!("  Sortino Ratio:         {:.2}", self.sortino_ratio);
        }
        println!("  Profit Factor:         {:.2}", self.profit_factor);

        println!("\n═══════════════════════════════════════════════════════\n");
    }
}

/// Relative change in `total_value` between consecutive ledger entries
pub fn trade_returns(trades: &[Trade]) -> Vec<f64> {
    trades
        .windows(2)
        .filter(|pair| pair[0].total_value > 0.0)
        .map(|pair| (pair[1].total_value - pair[0].total_value) / pair[0].total_value)
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Mean return over population standard deviation; risk-free rate of 0
pub fn sharpe_ratio(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }

    let mean_return = mean(returns);
    let variance = returns
        .iter()
        .map(|r| {
            let diff = r - mean_return;
            diff * diff
        })
        .sum::<f64>()
        / returns.len() as f64;

    let std_dev = variance.sqrt();

    if std_dev > 0.0 {
        mean_return / std_dev
    } else {
        0.0
    }
}

/// Mean return over downside deviation (negative returns only)
///
/// With no negative returns a positive mean reports `SORTINO_NO_DOWNSIDE`.
pub fn sortino_ratio(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }

    let mean_return = mean(returns);
    let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();

    if downside.is_empty() {
        return if mean_return > 0.0 {
            SORTINO_NO_DOWNSIDE
        } else {
            0.0
        };
    }

    let downside_deviation =
        (downside.iter().map(|r| r * r).sum::<f64>() / downside.len() as f64).sqrt();

    if downside_deviation > 0.0 {
        (mean_return / downside_deviation).min(SORTINO_NO_DOWNSIDE)
    } else {
        0.0
    }
}

/// (gross profit, gross loss) over buy → sell pairs
pub fn gross_profit_and_loss(trades: &[Trade]) -> (f64, f64) {
    let mut gross_profit = 0.0;
    let mut gross_loss = 0.0;

    for pair in trades.chunks_exact(2) {
        let (entry, exit) = (&pair[0], &pair[1]);
        if entry.side != TradeSide::Buy || exit.side != TradeSide::Sell {
            continue;
        }

        let delta = exit.total_value - entry.total_value;
        if delta > 0.0 {
            gross_profit += delta;
        } else {
            gross_loss += delta.abs();
        }
    }

    (gross_profit, gross_loss)
}

/// Gross profit over gross loss; falls back to gross profit when nothing was lost
pub fn profit_factor(trades: &[Trade]) -> f64 {
    let (gross_profit, gross_loss) = gross_profit_and_loss(trades);
    if gross_loss > 0.0 {
        gross_profit / gross_loss
    } else {
        gross_profit
    }
}
