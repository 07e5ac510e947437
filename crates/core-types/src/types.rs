use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A trading symbol, e.g. "AAPL".
///
/// Ordered so that every per-symbol iteration in the system is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol(pub String);

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Symbol(s.to_string())
    }
}

/// A single OHLCV bar. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: Symbol,
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

/// What a signal recommends. This is a long-only system: a signal either
/// wants exposure or it does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Long,
    Flat,
}

/// The output of a signal generator for one symbol at one bar.
///
/// Signals are derived data: recomputed on every evaluation tick from the
/// causing bar window, never persisted on their own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub symbol: Symbol,
    pub timestamp: DateTime<Utc>,
    pub direction: Direction,
    /// Composite confidence in [0, 1].
    pub confidence: f64,
    /// Per-indicator contribution to the composite, keyed by component name.
    /// A BTreeMap keeps serialized signals deterministic.
    pub components: BTreeMap<String, f64>,
}

/// Canonical keys for `Signal::components`, shared by the scorer (which
/// writes them) and the risk manager (which reads the SMA gate back out).
pub mod component {
    pub const MOMENTUM: &str = "momentum";
    pub const VOLUME: &str = "volume";
    pub const RSI: &str = "rsi";
    pub const SMA: &str = "sma";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSide {
    Buy,
    Sell,
}

/// Order types understood by an execution venue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Market,
    Stop { stop_price: Decimal },
    Limit { limit_price: Decimal },
}

/// A fully specified order, ready for submission to a venue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    pub symbol: Symbol,
    pub side: OrderSide,
    pub quantity: Decimal,
    pub order_type: OrderType,
    /// Protective levels computed at signal time. Advisory: the risk manager
    /// recomputes the live levels from the actual fill price.
    pub stop_loss_price: Option<Decimal>,
    pub take_profit_price: Option<Decimal>,
}

/// A fill reported by an execution venue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fill {
    pub price: Decimal,
    pub quantity: Decimal,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionStatus {
    Open,
    Closed,
}

/// An open (or just closed) holding. Owned exclusively by the risk manager;
/// a closed position is never reopened, a later re-entry on the same symbol
/// creates a fresh instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    pub symbol: Symbol,
    pub entry_price: Decimal,
    pub quantity: Decimal,
    pub entry_time: DateTime<Utc>,
    pub stop_loss_price: Decimal,
    pub take_profit_price: Decimal,
    pub status: PositionStatus,
}

impl Position {
    /// Marked-to-market value at `price`.
    pub fn notional(&self, price: Decimal) -> Decimal {
        self.quantity * price
    }
}

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    SignalReversal,
    ForcedClose,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExitReason::StopLoss => "stop_loss",
            ExitReason::TakeProfit => "take_profit",
            ExitReason::SignalReversal => "signal_reversal",
            ExitReason::ForcedClose => "forced_close",
        };
        f.write_str(s)
    }
}

/// Append-only record of a completed round trip, emitted when a position
/// closes and consumed by reporting and persistence collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub symbol: Symbol,
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub quantity: Decimal,
    pub pnl: Decimal,
    pub exit_reason: ExitReason,
}

/// The state of the trading account for one session, live or backtest.
#[derive(Debug, Clone, Serialize)]
pub struct Portfolio {
    pub cash: Decimal,
    pub open_positions: BTreeMap<Symbol, Position>,
    pub realized_pnl: Decimal,
    /// Realized profit and loss since the last session-day boundary.
    pub daily_pnl: Decimal,
    pub starting_equity: Decimal,
}

impl Portfolio {
    pub fn new(starting_equity: Decimal) -> Self {
        Self {
            cash: starting_equity,
            open_positions: BTreeMap::new(),
            realized_pnl: Decimal::ZERO,
            daily_pnl: Decimal::ZERO,
            starting_equity,
        }
    }

    /// Cash plus open positions marked at the supplied prices. A position
    /// with no mark available falls back to its entry price.
    pub fn equity(&self, marks: &BTreeMap<Symbol, Decimal>) -> Decimal {
        self.cash + self.open_notional(marks)
    }

    /// Total notional of open positions at the supplied marks.
    pub fn open_notional(&self, marks: &BTreeMap<Symbol, Decimal>) -> Decimal {
        self.open_positions
            .iter()
            .map(|(symbol, pos)| {
                let mark = marks.get(symbol).copied().unwrap_or(pos.entry_price);
                pos.notional(mark)
            })
            .sum()
    }
}
