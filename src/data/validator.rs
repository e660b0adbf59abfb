use crate::error::BacktestError;
use crate::models::PricePoint;
use crate::Result;

/// Validates price series handed to the engine
///
/// The engine never sorts or dedupes; a series that is not strictly
/// ascending by timestamp is rejected instead.
pub fn validate_series(series: &[PricePoint]) -> Result<()> {
    if series.is_empty() {
        return Err(BacktestError::EmptySeries);
    }

    for (index, point) in series.iter().enumerate() {
        validate_price(index, point)?;
    }

    for (offset, pair) in series.windows(2).enumerate() {
        if pair[1].timestamp <= pair[0].timestamp {
            return Err(BacktestError::NonMonotonicTimestamp { index: offset + 1 });
        }
    }

    Ok(())
}

/// Validate that a price is positive and finite
fn validate_price(index: usize, point: &PricePoint) -> Result<()> {
    if !point.price.is_finite() || point.price <= 0.0 {
        return Err(BacktestError::InvalidPrice {
            index,
            price: point.price,
        });
    }
    Ok(())
}

pub fn validate_initial_balance(initial_balance: f64) -> Result<()> {
    if !initial_balance.is_finite() || initial_balance <= 0.0 {
        return Err(BacktestError::InvalidBalance(initial_balance));
    }
    Ok(())
}
