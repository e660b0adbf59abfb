/// Neutral reading returned for a window with no price movement at all
const FLAT_RSI: f64 = 50.0;

/// Calculate Relative Strength Index (RSI)
///
/// RSI measures the magnitude of recent price changes to evaluate
/// overbought or oversold conditions. Only the last `period + 1` prices
/// (i.e. `period` deltas) are used.
///
/// Values:
/// - RSI > 70: Overbought
/// - RSI < 30: Oversold
///
/// A window without losses saturates at 100 instead of dividing by zero,
/// and a completely flat window reads 50.
pub fn calculate_rsi(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() <= period {
        return None;
    }

    let window = &prices[prices.len() - period - 1..];

    let mut total_gain = 0.0;
    let mut total_loss = 0.0;

    for pair in window.windows(2) {
        let change = pair[1] - pair[0];
        if change > 0.0 {
            total_gain += change;
        } else {
            total_loss += change.abs();
        }
    }

    let avg_gain = total_gain / period as f64;
    let avg_loss = total_loss / period as f64;

    if avg_loss == 0.0 {
        return Some(if avg_gain == 0.0 { FLAT_RSI } else { 100.0 });
    }

    let rs = avg_gain / avg_loss;
    let rsi = 100.0 - (100.0 / (1.0 + rs));

    Some(rsi)
}
