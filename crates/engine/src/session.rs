use std::collections::BTreeMap;
use std::time::Duration;

use analytics::EquityPoint;
use chrono::{DateTime, Utc};
use core_types::{OrderRequest, OrderSide, Portfolio, Signal, Symbol, TradeRecord};
use execution::{submit_with_backoff, FillStatus, OrderHandle, RetryPolicy, Venue};
use futures::future::join_all;
use risk::RiskManager;
use rust_decimal::Decimal;
use store::TradeSink;
use strategies::SignalGenerator;
use tracing::{debug, info, warn};

use crate::feed::BarFeed;

/// Pacing and fan-out parameters for a trading session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub watchlist: Vec<Symbol>,
    /// Bars of history requested per symbol each tick.
    pub history_window: usize,
    /// Upper bound on a single symbol's bar fetch.
    pub fetch_timeout_ms: u64,
    pub retry: RetryPolicy,
}

/// What a finished session hands back for reporting.
#[derive(Debug)]
pub struct SessionReport {
    pub trades: Vec<TradeRecord>,
    pub equity_curve: Vec<EquityPoint>,
}

/// The per-tick trading loop for a live or paper session.
///
/// Each tick fans out bar fetches for the whole watchlist concurrently and
/// waits for every one to land (or time out) before evaluating anything, so
/// all entry decisions within a tick see one consistent portfolio snapshot.
/// Evaluation itself is sequential, in symbol order. Order submission goes
/// through bounded retry with backoff; a pending fill changes nothing until
/// it lands.
pub struct SessionEngine<F: BarFeed> {
    feed: F,
    venue: Box<dyn Venue>,
    generator: Box<dyn SignalGenerator>,
    risk_manager: RiskManager,
    portfolio: Portfolio,
    settings: SessionSettings,
    open_orders: Vec<(OrderHandle, OrderRequest)>,
    marks: BTreeMap<Symbol, Decimal>,
    last_seen: BTreeMap<Symbol, DateTime<Utc>>,
    trades: Vec<TradeRecord>,
    equity_curve: Vec<EquityPoint>,
}

impl<F: BarFeed> SessionEngine<F> {
    pub fn new(
        feed: F,
        venue: Box<dyn Venue>,
        generator: Box<dyn SignalGenerator>,
        risk_manager: RiskManager,
        initial_capital: Decimal,
        mut settings: SessionSettings,
    ) -> Self {
        settings.watchlist.sort();
        settings.watchlist.dedup();
        Self {
            feed,
            venue,
            generator,
            risk_manager,
            portfolio: Portfolio::new(initial_capital),
            settings,
            open_orders: Vec::new(),
            marks: BTreeMap::new(),
            last_seen: BTreeMap::new(),
            trades: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    /// Runs ticks until the feed is exhausted, then force-closes whatever is
    /// still open.
    pub async fn run(&mut self, sink: &mut dyn TradeSink) -> anyhow::Result<SessionReport> {
        info!(
            symbols = self.settings.watchlist.len(),
            venue = self.venue.name(),
            generator = self.generator.name(),
            "Starting trading session."
        );
        while let Some(ts) = self.feed.next_tick().await? {
            self.tick(ts, sink).await?;
        }
        self.wind_down(sink).await?;
        info!(trades = self.trades.len(), "Session finished.");
        Ok(SessionReport {
            trades: std::mem::take(&mut self.trades),
            equity_curve: std::mem::take(&mut self.equity_curve),
        })
    }

    async fn tick(&mut self, ts: DateTime<Utc>, sink: &mut dyn TradeSink) -> anyhow::Result<()> {
        // Fan out bar fetches for the whole watchlist; the barrier below is
        // what guarantees a consistent snapshot for this tick's decisions.
        let timeout = Duration::from_millis(self.settings.fetch_timeout_ms);
        let window = self.settings.history_window;
        let feed = &self.feed;
        let fetches = join_all(self.settings.watchlist.iter().map(|symbol| async move {
            let result = tokio::time::timeout(timeout, feed.latest_bars(symbol, window)).await;
            (symbol.clone(), result)
        }))
        .await;

        let mut updated = Vec::new();
        for (symbol, result) in fetches {
            match result {
                Ok(Ok(bars)) if !bars.is_empty() => updated.push((symbol, bars)),
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    warn!(%symbol, error = %e, "Bar fetch failed; skipping symbol this tick.")
                }
                Err(_) => {
                    warn!(%symbol, timeout_ms = self.settings.fetch_timeout_ms, "Bar fetch timed out; skipping symbol this tick.")
                }
            }
        }

        for (symbol, bars) in updated {
            let last = bars.last().expect("updated entries are non-empty").clone();
            if self.last_seen.get(&symbol) == Some(&last.timestamp) {
                continue; // nothing new for this symbol
            }
            self.last_seen.insert(symbol.clone(), last.timestamp);

            self.venue.on_market_data(&last);
            self.poll_open_orders(sink).await?;
            self.risk_manager.observe_bar(&last, &mut self.portfolio);
            self.marks.insert(symbol.clone(), last.close);

            let signal: Option<Signal> = if bars.len() < self.generator.min_history() {
                None
            } else {
                match self.generator.evaluate(&bars) {
                    Ok(signal) => Some(signal),
                    Err(e) if e.is_insufficient_data() => None,
                    Err(e) => {
                        warn!(%symbol, error = %e, "Signal evaluation failed; skipping symbol this tick.");
                        None
                    }
                }
            };

            if let Some(exit_order) =
                self.risk_manager
                    .evaluate_exit(&last, signal.as_ref(), &self.portfolio)
            {
                self.submit(exit_order, sink).await?;
            }

            // Once the daily-loss breaker trips, entry evaluation is
            // preempted for the rest of the session day. Exits keep running.
            if self.risk_manager.circuit_breaker_tripped() {
                continue;
            }
            if let Some(signal) = signal {
                match self
                    .risk_manager
                    .evaluate_entry(&signal, &self.portfolio, last.close)
                {
                    Ok(Some(order)) => self.submit(order, sink).await?,
                    Ok(None) => {}
                    Err(e) => debug!(%symbol, reason = %e, "Entry rejected."),
                }
            }
        }

        let point = EquityPoint {
            timestamp: ts,
            value: self.portfolio.equity(&self.marks),
        };
        if let Err(e) = sink.append_equity(&point) {
            warn!(error = %e, "Equity sink write failed; continuing.");
        }
        self.equity_curve.push(point);
        Ok(())
    }

    async fn wind_down(&mut self, sink: &mut dyn TradeSink) -> anyhow::Result<()> {
        // Cancel everything still resting: in-flight entries are pointless
        // now, and in-flight exits are superseded by the force-close sweep.
        // Orders that already filled fail the cancel and settle in the poll.
        let mut remaining = Vec::new();
        for (handle, order) in std::mem::take(&mut self.open_orders) {
            if self.venue.cancel(handle).await.is_ok() {
                match order.side {
                    OrderSide::Buy => self.risk_manager.cancel_pending_entry(&order.symbol),
                    OrderSide::Sell => self.risk_manager.cancel_pending_exit(&order.symbol),
                }
                continue;
            }
            remaining.push((handle, order));
        }
        self.open_orders = remaining;
        self.poll_open_orders(sink).await?;

        for order in self
            .risk_manager
            .force_close_all(&self.portfolio, "end_of_session")
        {
            self.submit(order, sink).await?;
        }
        self.venue.on_session_end();
        self.poll_open_orders(sink).await?;
        if !self.open_orders.is_empty() {
            warn!(
                count = self.open_orders.len(),
                "Orders still pending at session end."
            );
        }
        Ok(())
    }

    /// Submits with bounded retry. Exhausted retries drop the order and roll
    /// back the in-flight marker, leaving every position in its prior state.
    async fn submit(&mut self, order: OrderRequest, sink: &mut dyn TradeSink) -> anyhow::Result<()> {
        match submit_with_backoff(self.venue.as_mut(), &order, &self.settings.retry).await {
            Ok(handle) => {
                if order.side == OrderSide::Buy {
                    self.risk_manager.mark_pending_entry(&order.symbol);
                }
                self.open_orders.push((handle, order));
                self.poll_open_orders(sink).await?;
            }
            Err(e) => {
                warn!(symbol = %order.symbol, error = %e, "Order dropped; position state unchanged.");
                match order.side {
                    OrderSide::Buy => self.risk_manager.cancel_pending_entry(&order.symbol),
                    OrderSide::Sell => self.risk_manager.cancel_pending_exit(&order.symbol),
                }
            }
        }
        Ok(())
    }

    async fn poll_open_orders(&mut self, sink: &mut dyn TradeSink) -> anyhow::Result<()> {
        let mut still_open = Vec::new();
        for (handle, order) in std::mem::take(&mut self.open_orders) {
            match self.venue.get_fill(handle).await {
                Ok(FillStatus::Filled(fill)) => {
                    if let Some(record) =
                        self.risk_manager.on_fill(&order, &fill, &mut self.portfolio)
                    {
                        if let Err(e) = sink.append_trade(&record) {
                            warn!(error = %e, "Trade sink write failed; continuing.");
                        }
                        self.trades.push(record);
                    }
                }
                Ok(FillStatus::Pending) => still_open.push((handle, order)),
                Err(e) => {
                    warn!(symbol = %order.symbol, error = %e, "Dropping untrackable order.");
                    match order.side {
                        OrderSide::Buy => self.risk_manager.cancel_pending_entry(&order.symbol),
                        OrderSide::Sell => self.risk_manager.cancel_pending_exit(&order.symbol),
                    }
                }
            }
        }
        self.open_orders = still_open;
        Ok(())
    }
}
