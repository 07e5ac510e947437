use std::collections::{BTreeMap, BTreeSet, VecDeque};

use chrono::NaiveDate;
use core_types::{
    component, Bar, Direction, ExitReason, Fill, OrderRequest, OrderSide, OrderType, Portfolio,
    Position, PositionStatus, Signal, Symbol, TradeRecord,
};
use num_traits::ToPrimitive;
use rust_decimal::Decimal;

use crate::types::RiskSettings;
use crate::{Error, Result};

/// Paired return samples below this count are treated as uncorrelated.
const MIN_CORRELATION_SAMPLES: usize = 10;

/// Gatekeeper between signals and the execution venue.
///
/// Owns the full position lifecycle: entry gating and sizing, protective
/// levels, exit evaluation, the daily-loss circuit breaker, and the
/// correlation cap. A position moves `pending entry -> open -> closed` and
/// never back; a later re-entry on the same symbol creates a new `Position`.
pub struct RiskManager {
    settings: RiskSettings,
    stop_loss_pct: Decimal,
    take_profit_pct: Decimal,
    max_position_size: Decimal,
    max_aggregate_exposure: Decimal,
    max_daily_loss: Decimal,
    /// Symbols with an entry order in flight; blocks a second entry on the
    /// same symbol between submission and fill.
    pending_entries: BTreeSet<Symbol>,
    /// Exit reason for each in-flight exit order, consumed on the sell fill.
    pending_exits: BTreeMap<Symbol, ExitReason>,
    /// Trailing closes per symbol feeding the correlation check.
    closes: BTreeMap<Symbol, VecDeque<f64>>,
    /// Most recent close per symbol, used to mark equity and exposure.
    last_close: BTreeMap<Symbol, Decimal>,
    session_day: Option<NaiveDate>,
    breaker_tripped: bool,
}

fn to_decimal(name: &'static str, value: f64) -> Result<Decimal> {
    Decimal::try_from(value)
        .map_err(|e| Error::InvalidParameters(format!("{name} is not representable: {e}")))
}

impl RiskManager {
    pub fn new(settings: RiskSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            stop_loss_pct: to_decimal("stop_loss_percent", settings.stop_loss_percent)?,
            take_profit_pct: to_decimal("take_profit_percent", settings.take_profit_percent)?,
            max_position_size: to_decimal("max_position_size", settings.max_position_size)?,
            max_aggregate_exposure: to_decimal(
                "max_aggregate_exposure",
                settings.max_aggregate_exposure,
            )?,
            max_daily_loss: to_decimal("max_daily_loss", settings.max_daily_loss)?,
            settings,
            pending_entries: BTreeSet::new(),
            pending_exits: BTreeMap::new(),
            closes: BTreeMap::new(),
            last_close: BTreeMap::new(),
            session_day: None,
            breaker_tripped: false,
        })
    }

    pub fn settings(&self) -> &RiskSettings {
        &self.settings
    }

    /// True once today's realized loss has hit the daily limit. Latched for
    /// the rest of the session day; exits keep running, entries do not.
    pub fn circuit_breaker_tripped(&self) -> bool {
        self.breaker_tripped
    }

    /// Feeds a bar into the manager's trailing state: rolls the session day
    /// (resetting `daily_pnl` and the circuit breaker on a new day) and
    /// records the close for marks and the correlation window.
    pub fn observe_bar(&mut self, bar: &Bar, portfolio: &mut Portfolio) {
        let day = bar.timestamp.date_naive();
        if self.session_day != Some(day) {
            if self.session_day.is_some() {
                tracing::debug!(%day, "Session day rolled; daily loss limit reset.");
            }
            self.session_day = Some(day);
            portfolio.daily_pnl = Decimal::ZERO;
            self.breaker_tripped = false;
        }

        let window = self
            .closes
            .entry(bar.symbol.clone())
            .or_insert_with(VecDeque::new);
        window.push_back(bar.close.to_f64().unwrap_or(0.0));
        while window.len() > self.settings.correlation_window + 1 {
            window.pop_front();
        }
        self.last_close.insert(bar.symbol.clone(), bar.close);
    }

    /// Evaluates an entry signal against every portfolio constraint.
    ///
    /// Returns `Ok(None)` for flat signals, `Err(Error::Vetoed)` when a
    /// constraint blocks the entry (expected control flow), and an entry
    /// order otherwise. The caller must report a successful submission via
    /// [`RiskManager::mark_pending_entry`]; a dropped order needs no call.
    pub fn evaluate_entry(
        &mut self,
        signal: &Signal,
        portfolio: &Portfolio,
        current_price: Decimal,
    ) -> Result<Option<OrderRequest>> {
        if signal.direction == Direction::Flat {
            return Ok(None);
        }
        self.update_breaker(portfolio);
        if self.breaker_tripped {
            return Err(Error::Vetoed {
                reason: "daily loss limit reached; entries blocked for the day".to_string(),
            });
        }
        if signal.confidence < self.settings.min_confidence {
            return Err(Error::Vetoed {
                reason: format!(
                    "confidence {:.2} below threshold {:.2}",
                    signal.confidence, self.settings.min_confidence
                ),
            });
        }
        if portfolio.open_positions.contains_key(&signal.symbol)
            || self.pending_entries.contains(&signal.symbol)
        {
            return Err(Error::Vetoed {
                reason: format!("{} already has an open or pending position", signal.symbol),
            });
        }
        if portfolio.open_positions.len() + self.pending_entries.len()
            >= self.settings.max_positions
        {
            return Err(Error::Vetoed {
                reason: format!("maximum positions ({}) reached", self.settings.max_positions),
            });
        }
        if let Some(other) = self.correlated_open_symbol(&signal.symbol, portfolio) {
            return Err(Error::Vetoed {
                reason: format!("{} too correlated with open position {}", signal.symbol, other),
            });
        }
        if current_price <= Decimal::ZERO {
            return Err(Error::Vetoed {
                reason: format!("non-positive price for {}", signal.symbol),
            });
        }

        let equity = portfolio.equity(&self.last_close);
        let quantity = (equity * self.max_position_size / current_price).floor();
        if quantity <= Decimal::ZERO {
            return Err(Error::Vetoed {
                reason: "position size rounds down to zero shares".to_string(),
            });
        }

        let open_notional = portfolio.open_notional(&self.last_close);
        if open_notional + quantity * current_price > self.max_aggregate_exposure * equity {
            return Err(Error::Vetoed {
                reason: "aggregate exposure cap reached".to_string(),
            });
        }

        // Advisory levels from the signal-time price; the live levels are
        // recomputed from the fill price in `on_fill`.
        Ok(Some(OrderRequest {
            symbol: signal.symbol.clone(),
            side: OrderSide::Buy,
            quantity,
            order_type: OrderType::Market,
            stop_loss_price: Some(current_price * (Decimal::ONE - self.stop_loss_pct)),
            take_profit_price: Some(current_price * (Decimal::ONE + self.take_profit_pct)),
        }))
    }

    /// Records that an entry order was accepted by the venue.
    pub fn mark_pending_entry(&mut self, symbol: &Symbol) {
        self.pending_entries.insert(symbol.clone());
    }

    /// Forgets an in-flight entry whose submission ultimately failed, so the
    /// symbol is eligible again. No position state has changed.
    pub fn cancel_pending_entry(&mut self, symbol: &Symbol) {
        self.pending_entries.remove(symbol);
    }

    /// Forgets an in-flight exit whose submission ultimately failed; the
    /// position stays open and the trigger will re-fire on a later bar.
    pub fn cancel_pending_exit(&mut self, symbol: &Symbol) {
        self.pending_exits.remove(symbol);
    }

    /// Applies a fill to the portfolio.
    ///
    /// A buy fill opens the position, with stop and target derived from the
    /// fill price rather than the signal-time price. A sell fill closes it,
    /// realizes pnl into the daily and lifetime totals, and emits the
    /// `TradeRecord`.
    pub fn on_fill(
        &mut self,
        order: &OrderRequest,
        fill: &Fill,
        portfolio: &mut Portfolio,
    ) -> Option<TradeRecord> {
        match order.side {
            OrderSide::Buy => {
                self.pending_entries.remove(&order.symbol);
                if portfolio.open_positions.contains_key(&order.symbol) {
                    tracing::error!(symbol = %order.symbol, "Entry fill for an already-open symbol ignored.");
                    return None;
                }
                portfolio.cash -= fill.price * fill.quantity;
                portfolio.open_positions.insert(
                    order.symbol.clone(),
                    Position {
                        symbol: order.symbol.clone(),
                        entry_price: fill.price,
                        quantity: fill.quantity,
                        entry_time: fill.timestamp,
                        stop_loss_price: fill.price * (Decimal::ONE - self.stop_loss_pct),
                        take_profit_price: fill.price * (Decimal::ONE + self.take_profit_pct),
                        status: PositionStatus::Open,
                    },
                );
                None
            }
            OrderSide::Sell => {
                let Some(mut position) = portfolio.open_positions.remove(&order.symbol) else {
                    tracing::error!(symbol = %order.symbol, "Exit fill without an open position ignored.");
                    return None;
                };
                let exit_reason = self
                    .pending_exits
                    .remove(&order.symbol)
                    .unwrap_or(ExitReason::ForcedClose);

                position.status = PositionStatus::Closed;
                let pnl = (fill.price - position.entry_price) * position.quantity;
                portfolio.cash += fill.price * position.quantity;
                portfolio.realized_pnl += pnl;
                portfolio.daily_pnl += pnl;
                self.update_breaker(portfolio);

                Some(TradeRecord {
                    symbol: position.symbol.clone(),
                    entry_time: position.entry_time,
                    exit_time: fill.timestamp,
                    entry_price: position.entry_price,
                    exit_price: fill.price,
                    quantity: position.quantity,
                    pnl,
                    exit_reason,
                })
            }
        }
    }

    /// Checks the open position on `bar`'s symbol against its protective
    /// levels and the signal-reversal rule. At most one exit order per
    /// position is in flight at a time.
    ///
    /// Priority when one bar breaches several levels: stop, then target,
    /// then reversal. The stop fills at the stop price, not the bar low.
    pub fn evaluate_exit(
        &mut self,
        bar: &Bar,
        signal: Option<&Signal>,
        portfolio: &Portfolio,
    ) -> Option<OrderRequest> {
        let position = portfolio.open_positions.get(&bar.symbol)?;
        if self.pending_exits.contains_key(&bar.symbol) {
            return None;
        }

        let (reason, order_type) = if bar.low <= position.stop_loss_price {
            (
                ExitReason::StopLoss,
                OrderType::Stop {
                    stop_price: position.stop_loss_price,
                },
            )
        } else if bar.high >= position.take_profit_price {
            (
                ExitReason::TakeProfit,
                OrderType::Limit {
                    limit_price: position.take_profit_price,
                },
            )
        } else if signal.is_some_and(|s| {
            s.direction == Direction::Flat
                && s.components.get(component::SMA).copied() == Some(0.0)
        }) {
            // The trend gate is gone; momentum thesis is broken.
            (ExitReason::SignalReversal, OrderType::Market)
        } else {
            return None;
        };

        self.pending_exits.insert(bar.symbol.clone(), reason);
        Some(OrderRequest {
            symbol: bar.symbol.clone(),
            side: OrderSide::Sell,
            quantity: position.quantity,
            order_type,
            stop_loss_price: None,
            take_profit_price: None,
        })
    }

    /// Emits market sells for every open position, e.g. at session end.
    /// Any in-flight exit is superseded: the eventual fill reports
    /// `forced_close`.
    pub fn force_close_all(&mut self, portfolio: &Portfolio, reason: &str) -> Vec<OrderRequest> {
        let mut orders = Vec::new();
        for (symbol, position) in &portfolio.open_positions {
            self.pending_exits
                .insert(symbol.clone(), ExitReason::ForcedClose);
            orders.push(OrderRequest {
                symbol: symbol.clone(),
                side: OrderSide::Sell,
                quantity: position.quantity,
                order_type: OrderType::Market,
                stop_loss_price: None,
                take_profit_price: None,
            });
        }
        if !orders.is_empty() {
            tracing::info!(count = orders.len(), reason, "Force-closing all open positions.");
        }
        orders
    }

    fn update_breaker(&mut self, portfolio: &Portfolio) {
        if self.breaker_tripped {
            return;
        }
        let limit = -(self.max_daily_loss * portfolio.starting_equity);
        if portfolio.daily_pnl <= limit {
            self.breaker_tripped = true;
            tracing::warn!(
                daily_pnl = %portfolio.daily_pnl,
                limit = %limit,
                "Daily loss limit breached; blocking new entries for the day."
            );
        }
    }

    fn correlated_open_symbol(&self, candidate: &Symbol, portfolio: &Portfolio) -> Option<Symbol> {
        let candidate_returns = self.returns_for(candidate)?;
        for open_symbol in portfolio.open_positions.keys() {
            if let Some(open_returns) = self.returns_for(open_symbol) {
                let correlation = pearson(&candidate_returns, &open_returns);
                if correlation.abs() > self.settings.correlation_threshold {
                    return Some(open_symbol.clone());
                }
            }
        }
        None
    }

    fn returns_for(&self, symbol: &Symbol) -> Option<Vec<f64>> {
        let closes = self.closes.get(symbol)?;
        let returns: Vec<f64> = closes
            .iter()
            .zip(closes.iter().skip(1))
            .filter(|(prev, _)| **prev != 0.0)
            .map(|(prev, curr)| (curr - prev) / prev)
            .collect();
        (!returns.is_empty()).then_some(returns)
    }
}

/// Pearson correlation over the trailing overlap of two return series.
/// Too few samples means no evidence, not high risk: returns 0.
fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < MIN_CORRELATION_SAMPLES {
        return 0.0;
    }
    let a = &a[a.len() - n..];
    let b = &b[b.len() - n..];
    let mean_a = a.iter().sum::<f64>() / n as f64;
    let mean_b = b.iter().sum::<f64>() / n as f64;
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for i in 0..n {
        let da = a[i] - mean_a;
        let db = b[i] - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }
    let denom = (var_a * var_b).sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    cov / denom
}
