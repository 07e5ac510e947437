use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use core_types::{Bar, Symbol};
use rust_decimal::Decimal;
use serde::Deserialize;

/// One CSV row of `timestamp,open,high,low,close,volume`, timestamps in
/// RFC 3339.
#[derive(Debug, Deserialize)]
struct BarRow {
    timestamp: DateTime<Utc>,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
    volume: Decimal,
}

/// Loads the bar series for one symbol from `<dir>/<SYMBOL>.csv`.
pub fn load_bars(dir: &Path, symbol: &Symbol) -> anyhow::Result<Vec<Bar>> {
    let path = dir.join(format!("{symbol}.csv"));
    let mut reader = csv::Reader::from_path(&path)
        .with_context(|| format!("opening bar data at {}", path.display()))?;

    let mut bars = Vec::new();
    for row in reader.deserialize::<BarRow>() {
        let row = row.with_context(|| format!("parsing a bar row in {}", path.display()))?;
        bars.push(Bar {
            symbol: symbol.clone(),
            timestamp: row.timestamp,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        });
    }
    core_types::validate_series(&bars)
        .with_context(|| format!("validating the series in {}", path.display()))?;
    Ok(bars)
}
