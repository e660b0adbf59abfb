use crate::config::EngineConfig;
use crate::models::{PricePoint, Signal, Trade, TradeSide};
use crate::strategy::{PriceWindow, SignalGenerator};

/// State left behind by a completed simulation
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutcome {
    pub trades: Vec<Trade>,
    /// Cash plus any open position marked at the last price
    pub final_value: f64,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Largest peak-to-trough decline as a fraction of the peak
    pub max_drawdown: f64,
}

/// Long-only execution simulator
///
/// Walks a price series bar by bar, holding at most one position. A buy
/// spends a fixed fraction of the cash balance, a sell liquidates the whole
/// position. The portfolio is marked to market after every bar to track
/// the running peak and drawdown.
#[derive(Debug, Clone)]
pub struct ExecutionSimulator {
    config: EngineConfig,
    strategy_id: String,
    balance: f64,
    position_quantity: f64,
    entry_value: f64,
    trades: Vec<Trade>,
    peak_portfolio_value: f64,
    max_drawdown: f64,
    winning_trades: usize,
    losing_trades: usize,
}

impl ExecutionSimulator {
    pub fn new(strategy_id: impl Into<String>, initial_balance: f64, config: EngineConfig) -> Self {
        Self {
            config,
            strategy_id: strategy_id.into(),
            balance: initial_balance,
            position_quantity: 0.0,
            entry_value: 0.0,
            trades: Vec::new(),
            peak_portfolio_value: initial_balance,
            max_drawdown: 0.0,
            winning_trades: 0,
            losing_trades: 0,
        }
    }

    /// Replay `series` against `strategy`
    ///
    /// Bar 0 only seeds history. Never fails: short or flat series simply
    /// produce no trades.
    pub fn run<S: SignalGenerator>(
        mut self,
        strategy: &S,
        series: &[PricePoint],
    ) -> SimulationOutcome {
        let prices: Vec<f64> = series.iter().map(|p| p.price).collect();

        for i in 1..series.len() {
            let window = PriceWindow::new(&prices[..=i], self.config.lookback_bars);
            let signal = strategy.generate_signal(&window);
            self.step(signal, &series[i]);
        }

        let last_price = series.last().map(|p| p.price);
        self.finish(last_price)
    }

    /// Apply one bar's signal and mark the portfolio at that bar's price
    pub fn step(&mut self, signal: Signal, point: &PricePoint) {
        match signal {
            Signal::Buy if self.is_flat() => self.open_position(point),
            Signal::Sell if !self.is_flat() => self.close_position(point),
            _ => {}
        }

        self.mark_to_market(point.price);
    }

    pub fn is_flat(&self) -> bool {
        self.position_quantity == 0.0
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn position_quantity(&self) -> f64 {
        self.position_quantity
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn portfolio_value(&self, price: f64) -> f64 {
        self.balance + self.position_quantity * price
    }

    fn open_position(&mut self, point: &PricePoint) {
        let quantity = self.balance * self.config.position_fraction / point.price;
        if !(quantity.is_finite() && quantity > 0.0) {
            return;
        }

        let cost = quantity * point.price;
        self.balance -= cost;
        self.position_quantity = quantity;
        self.entry_value = cost;

        tracing::debug!(
            "BUY {:.6} @ ${:.4} (cost ${:.2}, cash ${:.2})",
            quantity,
            point.price,
            cost,
            self.balance
        );
        self.record_trade(TradeSide::Buy, quantity, point, cost);
    }

    fn close_position(&mut self, point: &PricePoint) {
        let quantity = self.position_quantity;
        let proceeds = quantity * point.price;
        self.balance += proceeds;
        self.position_quantity = 0.0;

        if proceeds > self.entry_value {
            self.winning_trades += 1;
        } else {
            self.losing_trades += 1;
        }

        tracing::debug!(
            "SELL {:.6} @ ${:.4} (P&L ${:.2}, cash ${:.2})",
            quantity,
            point.price,
            proceeds - self.entry_value,
            self.balance
        );
        self.entry_value = 0.0;
        self.record_trade(TradeSide::Sell, quantity, point, proceeds);
    }

    fn record_trade(
        &mut self,
        side: TradeSide,
        quantity: f64,
        point: &PricePoint,
        total_value: f64,
    ) {
        self.trades.push(Trade {
            id: self.trades.len() as u64 + 1,
            side,
            quantity,
            price: point.price,
            total_value,
            timestamp: point.timestamp,
            strategy_id: self.strategy_id.clone(),
        });
    }

    fn mark_to_market(&mut self, price: f64) {
        let value = self.portfolio_value(price);
        if value > self.peak_portfolio_value {
            self.peak_portfolio_value = value;
        }

        if self.peak_portfolio_value > 0.0 {
            let drawdown = (self.peak_portfolio_value - value) / self.peak_portfolio_value;
            self.max_drawdown = self.max_drawdown.max(drawdown.clamp(0.0, 1.0));
        }
    }

    /// Open positions are valued at the last price, never force-closed
    fn finish(self, last_price: Option<f64>) -> SimulationOutcome {
        let final_value = match last_price {
            Some(price) => self.portfolio_value(price),
            None => self.balance,
        };

        SimulationOutcome {
            trades: self.trades,
            final_value,
            winning_trades: self.winning_trades,
            losing_trades: self.losing_trades,
            max_drawdown: self.max_drawdown,
        }
    }
}
