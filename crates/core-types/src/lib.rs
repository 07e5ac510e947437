pub mod error;
pub mod types;

// Re-export the most important types for easy access from other crates.
pub use error::{Error, Result};
pub use types::component;
pub use types::{
    Bar, Direction, ExitReason, Fill, OrderRequest, OrderSide, OrderType, Portfolio, Position,
    PositionStatus, Signal, Symbol, TradeRecord,
};

/// Checks that a bar series is well-formed: a single symbol throughout, with
/// strictly increasing timestamps. Gaps are allowed; indicator lookbacks are
/// expressed in bar counts, not calendar time.
pub fn validate_series(bars: &[Bar]) -> Result<()> {
    let Some(first) = bars.first() else {
        return Ok(());
    };
    for window in bars.windows(2) {
        if window[1].symbol != first.symbol {
            return Err(Error::InvalidBarSeries(format!(
                "mixed symbols in series: {} and {}",
                first.symbol, window[1].symbol
            )));
        }
        if window[1].timestamp <= window[0].timestamp {
            return Err(Error::InvalidBarSeries(format!(
                "timestamps not strictly increasing at {}",
                window[1].timestamp
            )));
        }
    }
    Ok(())
}
