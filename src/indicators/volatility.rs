/// Population standard deviation of the whole window
///
/// Used for breakout band width; callers slice the window they want.
pub fn calculate_std_dev(prices: &[f64]) -> Option<f64> {
    if prices.is_empty() {
        return None;
    }

    let n = prices.len() as f64;
    let mean = prices.iter().sum::<f64>() / n;
    let variance = prices
        .iter()
        .map(|p| {
            let diff = p - mean;
            diff * diff
        })
        .sum::<f64>()
        / n;

    Some(variance.sqrt())
}
