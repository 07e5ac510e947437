//! Append-only persistence for trade records and equity samples.
//!
//! This is a collaborator boundary, not a feature: a sink failure must never
//! block trading, so callers log the error and continue.

pub mod error;

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use analytics::EquityPoint;
use core_types::TradeRecord;

pub use error::{Error, Result};

/// Append-only sink for closed trades and equity-curve samples.
pub trait TradeSink: Send {
    fn append_trade(&mut self, trade: &TradeRecord) -> Result<()>;
    fn append_equity(&mut self, point: &EquityPoint) -> Result<()>;
}

/// A sink that discards everything. Useful for tests and dry runs.
#[derive(Debug, Default)]
pub struct NullSink;

impl TradeSink for NullSink {
    fn append_trade(&mut self, _trade: &TradeRecord) -> Result<()> {
        Ok(())
    }

    fn append_equity(&mut self, _point: &EquityPoint) -> Result<()> {
        Ok(())
    }
}

/// Writes one JSON document per line, one file per record kind, under a
/// session directory.
pub struct JsonlSink {
    trades: File,
    equity: File,
    dir: PathBuf,
}

impl JsonlSink {
    /// Opens (creating if needed) `trades.jsonl` and `equity.jsonl` under
    /// `dir` in append mode.
    pub fn create(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let open = |name: &str| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join(name))
        };
        Ok(Self {
            trades: open("trades.jsonl")?,
            equity: open("equity.jsonl")?,
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn append_line<T: serde::Serialize>(file: &mut File, record: &T) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

impl TradeSink for JsonlSink {
    fn append_trade(&mut self, trade: &TradeRecord) -> Result<()> {
        Self::append_line(&mut self.trades, trade)
    }

    fn append_equity(&mut self, point: &EquityPoint) -> Result<()> {
        Self::append_line(&mut self.equity, point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use core_types::{ExitReason, Symbol};
    use rust_decimal_macros::dec;

    #[test]
    fn records_round_trip_through_the_jsonl_files() {
        let dir = std::env::temp_dir().join(format!("store-test-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        let t0 = Utc.with_ymd_and_hms(2024, 3, 4, 14, 30, 0).unwrap();
        let trade = TradeRecord {
            symbol: Symbol::from("AAPL"),
            entry_time: t0,
            exit_time: t0 + chrono::Duration::minutes(45),
            entry_price: dec!(100),
            exit_price: dec!(105),
            quantity: dec!(5),
            pnl: dec!(25),
            exit_reason: ExitReason::TakeProfit,
        };
        let point = EquityPoint {
            timestamp: t0,
            value: dec!(10_025),
        };

        {
            let mut sink = JsonlSink::create(&dir).unwrap();
            sink.append_trade(&trade).unwrap();
            sink.append_equity(&point).unwrap();
        }

        let trades_raw = std::fs::read_to_string(dir.join("trades.jsonl")).unwrap();
        let parsed: TradeRecord = serde_json::from_str(trades_raw.lines().next().unwrap()).unwrap();
        assert_eq!(parsed, trade);

        let equity_raw = std::fs::read_to_string(dir.join("equity.jsonl")).unwrap();
        let parsed: EquityPoint = serde_json::from_str(equity_raw.lines().next().unwrap()).unwrap();
        assert_eq!(parsed, point);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
