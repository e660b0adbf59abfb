use paperbot::backtest::metrics::gross_profit_and_loss;
use paperbot::*;

const INITIAL_BALANCE: f64 = 10_000.0;

fn series_from(prices: &[f64]) -> Vec<PricePoint> {
    prices
        .iter()
        .enumerate()
        .map(|(i, p)| PricePoint::new(1_700_000_000_000 + i as i64 * 3_600_000, *p))
        .collect()
}

fn run(kind: StrategyKind, prices: &[f64]) -> BacktestResult {
    run_descriptor(&StrategyDescriptor::new(kind.as_str(), kind), prices)
}

fn run_descriptor(descriptor: &StrategyDescriptor, prices: &[f64]) -> BacktestResult {
    let series = series_from(prices);
    let request = BacktestRequest::spanning(&series, INITIAL_BALANCE).unwrap();
    Backtester::default()
        .run(descriptor, &series, &request)
        .unwrap()
}

/// Triangle wave between 90 and 110 with 10-bar legs
fn triangle_wave(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let phase = i % 20;
            let offset = if phase <= 10 { phase } else { 20 - phase };
            90.0 + 2.0 * offset as f64
        })
        .collect()
}

fn assert_invariants(result: &BacktestResult) {
    assert_eq!(result.final_balance, result.initial_balance + result.profit);
    assert_eq!(
        result.total_trades,
        result.winning_trades + result.losing_trades
    );
    assert!((0.0..=100.0).contains(&result.max_drawdown));
    assert!((0.0..=100.0).contains(&result.win_rate));

    for (i, trade) in result.trades.iter().enumerate() {
        let expected = if i % 2 == 0 { TradeSide::Buy } else { TradeSide::Sell };
        assert_eq!(trade.side, expected, "trade {} out of order", i);
        assert!(trade.quantity > 0.0);
    }
    assert_eq!(result.total_trades, result.trades.len() / 2);

    for value in [
        result.profit,
        result.profit_percentage,
        result.sharpe_ratio,
        result.sortino_ratio,
        result.profit_factor,
    ] {
        assert!(value.is_finite());
    }
}

#[test]
fn test_short_series_never_trades() {
    tracing_subscriber::fmt()
        .with_env_filter("paperbot=debug")
        .try_init()
        .ok();

    let prices: Vec<f64> = (0..19)
        .map(|i| if i % 2 == 0 { 50.0 } else { 150.0 })
        .collect();

    for kind in [
        StrategyKind::TrendFollowing,
        StrategyKind::MeanReversion,
        StrategyKind::Breakout,
    ] {
        let result = run(kind, &prices);
        assert!(result.trades.is_empty());
        assert_eq!(result.profit, 0.0);
        assert_eq!(result.final_balance, INITIAL_BALANCE);
        assert_eq!(result.win_rate, 0.0);
        assert_eq!(result.max_drawdown, 0.0);
        assert_eq!(result.sharpe_ratio, 0.0);
        assert_eq!(result.sortino_ratio, 0.0);
        assert_eq!(result.profit_factor, 0.0);
    }
}

#[test]
fn test_monotonic_uptrend_trend_following() {
    let prices: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
    let series = series_from(&prices);
    let result = run(StrategyKind::TrendFollowing, &prices);

    assert_invariants(&result);
    assert_eq!(result.trades.len(), 1);

    // Bar 20 is the first bar where the crossover can be observed
    let buy = &result.trades[0];
    assert_eq!(buy.side, TradeSide::Buy);
    assert_eq!(buy.timestamp, series[20].timestamp);
    assert_eq!(buy.price, 120.0);
    assert!((buy.total_value - 1_000.0).abs() < 1e-9);

    assert_eq!(result.total_trades, 0);
    assert!(result.profit > 0.0);
    // 9000 cash + (1000 / 120) units @ 129
    let expected_final = 9_000.0 + 1_000.0 / 120.0 * 129.0;
    assert!((result.final_balance - expected_final).abs() < 1e-6);
}

#[test]
fn test_flat_series_never_trades() {
    let prices = vec![100.0; 30];

    for kind in [StrategyKind::MeanReversion, StrategyKind::Breakout] {
        let result = run(kind, &prices);
        assert_invariants(&result);
        assert!(result.trades.is_empty(), "{} traded a flat series", kind);
        assert_eq!(result.profit, 0.0);
    }
}

#[test]
fn test_oscillating_series_mean_reversion() {
    let prices = triangle_wave(40);
    let series = series_from(&prices);
    let result = run(StrategyKind::MeanReversion, &prices);

    assert_invariants(&result);
    assert!(result.trades.len() >= 2);

    // RSI(14) first reads ~28.6 at the trough on bar 20 and ~71.4 at the peak on bar 30
    let (buy, sell) = (&result.trades[0], &result.trades[1]);
    assert_eq!(buy.side, TradeSide::Buy);
    assert_eq!(buy.timestamp, series[20].timestamp);
    assert_eq!(buy.price, 90.0);
    assert_eq!(sell.side, TradeSide::Sell);
    assert_eq!(sell.timestamp, series[30].timestamp);
    assert_eq!(sell.price, 110.0);

    assert_eq!(result.total_trades, 1);
    assert_eq!(result.winning_trades, 1);
    assert_eq!(result.win_rate, 100.0);
    assert!(result.profit > 0.0);
}

#[test]
fn test_only_winning_trades_profit_factor() {
    let result = run(StrategyKind::MeanReversion, &triangle_wave(40));
    assert_eq!(result.losing_trades, 0);

    let (gross_profit, gross_loss) = gross_profit_and_loss(&result.trades);
    assert_eq!(gross_loss, 0.0);
    assert!(gross_profit > 0.0);
    assert_eq!(result.profit_factor, gross_profit);
    assert!(result.profit_factor.is_finite());
}

#[test]
fn test_open_position_at_series_end() {
    // Flat, then a steady decline that mean reversion buys into and never exits
    let mut prices = vec![100.0; 20];
    prices.extend((1..=10).map(|i| 100.0 - i as f64));
    let result = run(StrategyKind::MeanReversion, &prices);

    assert_invariants(&result);
    assert_eq!(result.trades.len(), 1);

    let buy = result.trades.last().unwrap();
    assert_eq!(buy.side, TradeSide::Buy);
    assert_eq!(buy.price, 99.0);

    // Cash left after the buy plus the position marked at the last price (90)
    let expected_final = (INITIAL_BALANCE - buy.total_value) + buy.quantity * 90.0;
    assert!((result.final_balance - expected_final).abs() < 1e-6);
    assert!(result.profit < 0.0);
    assert!(result.max_drawdown > 0.0);
    assert_eq!(result.total_trades, 0);
}

#[test]
fn test_unknown_strategy_holds() {
    let descriptor: StrategyDescriptor =
        serde_json::from_str(r#"{"id": "grid", "type": "grid-trading", "timeframe": "1h"}"#)
            .unwrap();
    let result = run_descriptor(&descriptor, &triangle_wave(60));

    assert!(result.trades.is_empty());
    assert_eq!(result.final_balance, INITIAL_BALANCE);
}

#[test]
fn test_invariants_hold_across_strategies_and_shapes() {
    let shapes: Vec<Vec<f64>> = vec![
        (0..200).map(|i| 100.0 + 15.0 * (i as f64 * 0.3).sin()).collect(),
        (0..200)
            .map(|i| 100.0 + 0.2 * i as f64 + 10.0 * (i as f64 * 0.15).sin())
            .collect(),
        (0..200)
            .map(|i| 200.0 - 0.5 * i as f64 + 5.0 * (i as f64 * 0.5).cos())
            .collect(),
        triangle_wave(120),
        (0..120)
            .map(|i| if (i / 25) % 2 == 0 { 100.0 } else { 130.0 })
            .collect(),
    ];

    let descriptors = vec![
        StrategyDescriptor::new("tf", StrategyKind::TrendFollowing),
        StrategyDescriptor::new("tf-fast", StrategyKind::TrendFollowing)
            .with_param("shortPeriod", ParamValue::Number(3.0))
            .with_param("longPeriod", ParamValue::Number(8.0)),
        StrategyDescriptor::new("mr", StrategyKind::MeanReversion),
        StrategyDescriptor::new("mr-wide", StrategyKind::MeanReversion)
            .with_param("oversold", ParamValue::Number(40.0))
            .with_param("overbought", ParamValue::Number(60.0)),
        StrategyDescriptor::new("bo", StrategyKind::Breakout),
        StrategyDescriptor::new("bo-tight", StrategyKind::Breakout)
            .with_param("k", ParamValue::Number(1.0)),
    ];

    let mut any_trades = false;
    for prices in &shapes {
        for descriptor in &descriptors {
            let result = run_descriptor(descriptor, prices);
            assert_invariants(&result);
            any_trades |= !result.trades.is_empty();
        }
    }
    assert!(any_trades);
}

#[test]
fn test_runs_are_deterministic() {
    let prices: Vec<f64> = (0..150)
        .map(|i| 100.0 + 12.0 * (i as f64 * 0.25).sin())
        .collect();
    let a = run(StrategyKind::MeanReversion, &prices);
    let b = run(StrategyKind::MeanReversion, &prices);
    assert_eq!(a, b);
}

#[test]
fn test_invalid_input_is_rejected() {
    let mut series = series_from(&[100.0, 101.0, 102.0]);
    series.swap(0, 2);
    let request = BacktestRequest::spanning(&series_from(&[1.0, 2.0]), INITIAL_BALANCE).unwrap();
    let descriptor = StrategyDescriptor::new("tf", StrategyKind::TrendFollowing);

    let err = Backtester::default()
        .run(&descriptor, &series, &request)
        .unwrap_err();
    assert!(err.is_invalid_input());
    assert!(err.to_string().contains("Invalid input"));
}
