// Price series input: loading and validation
pub mod validator;

pub use validator::{validate_initial_balance, validate_series};

use crate::models::PricePoint;
use anyhow::Context;
use std::path::Path;

/// Load a price series from a JSON array of `{"timestamp", "price"}` objects
pub fn load_price_series(path: impl AsRef<Path>) -> anyhow::Result<Vec<PricePoint>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read price series from {}", path.display()))?;
    let series: Vec<PricePoint> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse price series in {}", path.display()))?;

    tracing::info!("Loaded {} price points from {}", series.len(), path.display());
    Ok(series)
}

/// Write a price series as pretty JSON
pub fn save_price_series(path: impl AsRef<Path>, series: &[PricePoint]) -> anyhow::Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(series)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write price series to {}", path.display()))?;
    Ok(())
}
