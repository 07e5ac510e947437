pub mod report;

use std::collections::{BTreeMap, BTreeSet};

use analytics::{AnalyticsEngine, EquityPoint};
use chrono::{DateTime, Utc};
use core_types::{Bar, OrderRequest, OrderSide, Portfolio, Signal, Symbol, TradeRecord};
use execution::{FillStatus, OrderHandle, SimulatedVenue, Venue};
use risk::RiskManager;
use rust_decimal::Decimal;
use store::TradeSink;
use strategies::SignalGenerator;
use tracing::{debug, info, warn};

pub use report::{print_report, BacktestReport, SymbolError};

/// Bars of history handed to the signal generator each tick.
pub const DEFAULT_HISTORY_WINDOW: usize = 100;

/// The main engine for running historical backtests.
///
/// Replays one or more bar series through the signal generator and the risk
/// manager, simulating fills on the venue's fill model. The replay is fully
/// deterministic: identical series and configuration produce an identical
/// report, down to the serialized bytes. Symbols and timestamps are walked
/// in sorted order and nothing here consults a clock or an RNG.
pub struct Backtester {
    generator: Box<dyn SignalGenerator>,
    risk_manager: RiskManager,
    venue: SimulatedVenue,
    portfolio: Portfolio,
    history_window: usize,
}

impl Backtester {
    pub fn new(
        generator: Box<dyn SignalGenerator>,
        risk_manager: RiskManager,
        venue: SimulatedVenue,
        initial_capital: Decimal,
        history_window: usize,
    ) -> Self {
        Self {
            generator,
            risk_manager,
            venue,
            portfolio: Portfolio::new(initial_capital),
            history_window: history_window.max(1),
        }
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    /// Replays the given per-symbol series to exhaustion and reports.
    ///
    /// Per tick and symbol, in order: feed the venue the bar (orders resting
    /// from earlier bars fill at this open), settle fills, update trailing
    /// state, evaluate the signal, exits, then entries, and finally mark the
    /// equity curve at the close. A malformed series or an unrecoverable
    /// evaluation error halts that symbol only and lands in the report's
    /// error summary. At the end of the series every open position is
    /// force-closed at its final close.
    pub async fn run(
        &mut self,
        series: BTreeMap<Symbol, Vec<Bar>>,
        sink: &mut dyn TradeSink,
    ) -> anyhow::Result<BacktestReport> {
        let initial_capital = self.portfolio.starting_equity;
        let mut errors: Vec<SymbolError> = Vec::new();
        let mut halted: BTreeSet<Symbol> = BTreeSet::new();

        let mut by_time: BTreeMap<Symbol, BTreeMap<DateTime<Utc>, Bar>> = BTreeMap::new();
        for (symbol, bars) in series {
            if let Err(e) = core_types::validate_series(&bars) {
                warn!(symbol = %symbol, error = %e, "Skipping symbol with malformed series.");
                errors.push(SymbolError {
                    symbol,
                    message: e.to_string(),
                });
                continue;
            }
            if bars.first().is_some_and(|b| b.symbol != symbol) {
                errors.push(SymbolError {
                    message: format!("series keyed {symbol} contains bars for {}", bars[0].symbol),
                    symbol,
                });
                continue;
            }
            by_time.insert(symbol, bars.into_iter().map(|b| (b.timestamp, b)).collect());
        }

        let axis: BTreeSet<DateTime<Utc>> = by_time
            .values()
            .flat_map(|bars| bars.keys().copied())
            .collect();
        let symbols: Vec<Symbol> = by_time.keys().cloned().collect();

        let mut history: BTreeMap<Symbol, Vec<Bar>> = BTreeMap::new();
        let mut marks: BTreeMap<Symbol, Decimal> = BTreeMap::new();
        let mut open_orders: Vec<(OrderHandle, OrderRequest)> = Vec::new();
        let mut trades: Vec<TradeRecord> = Vec::new();
        let mut equity_curve: Vec<EquityPoint> = Vec::new();

        info!(
            symbols = symbols.len(),
            ticks = axis.len(),
            "Starting backtest replay."
        );

        for ts in axis {
            for symbol in &symbols {
                if halted.contains(symbol) {
                    continue;
                }
                let Some(bar) = by_time[symbol].get(&ts).cloned() else {
                    continue;
                };

                // 1. Orders resting from earlier bars trade at this open.
                self.venue.on_bar(&bar);
                self.poll_open_orders(&mut open_orders, &mut trades, sink)
                    .await?;

                // 2. Trailing state: session day, marks, correlation window.
                self.risk_manager.observe_bar(&bar, &mut self.portfolio);
                marks.insert(symbol.clone(), bar.close);
                let window = history.entry(symbol.clone()).or_default();
                window.push(bar.clone());
                let start = window.len().saturating_sub(self.history_window);
                let window = &window[start..];

                // 3. Signal for this bar. Not enough history is not an
                // error, the symbol simply sits out this tick.
                let signal: Option<Signal> = if window.len() < self.generator.min_history() {
                    None
                } else {
                    match self.generator.evaluate(window) {
                        Ok(signal) => Some(signal),
                        Err(e) if e.is_insufficient_data() => None,
                        Err(e) => {
                            warn!(symbol = %symbol, error = %e, "Halting symbol on unrecoverable error.");
                            errors.push(SymbolError {
                                symbol: symbol.clone(),
                                message: e.to_string(),
                            });
                            halted.insert(symbol.clone());
                            continue;
                        }
                    }
                };

                // 4. Exits before entries, so a freed slot is visible to
                // entry evaluation within the same tick.
                if let Some(exit_order) =
                    self.risk_manager
                        .evaluate_exit(&bar, signal.as_ref(), &self.portfolio)
                {
                    self.submit(exit_order, &mut open_orders, &mut trades, sink)
                        .await?;
                }

                // 5. Entries.
                if let Some(signal) = signal {
                    match self
                        .risk_manager
                        .evaluate_entry(&signal, &self.portfolio, bar.close)
                    {
                        Ok(Some(entry_order)) => {
                            self.submit(entry_order, &mut open_orders, &mut trades, sink)
                                .await?;
                        }
                        Ok(None) => {}
                        Err(e) => debug!(symbol = %symbol, reason = %e, "Entry rejected."),
                    }
                }
            }

            let point = EquityPoint {
                timestamp: ts,
                value: self.portfolio.equity(&marks),
            };
            if let Err(e) = sink.append_equity(&point) {
                warn!(error = %e, "Equity sink write failed; continuing.");
            }
            equity_curve.push(point);
        }

        // Entry orders that never met their fill bar are dead; cancelling
        // them keeps the force-close sweep from buying into a closed market.
        let mut remaining = Vec::new();
        for (handle, order) in open_orders.drain(..) {
            if order.side == OrderSide::Buy && self.venue.cancel(handle).await.is_ok() {
                self.risk_manager.cancel_pending_entry(&order.symbol);
                continue;
            }
            remaining.push((handle, order));
        }
        let mut open_orders = remaining;

        // Settle in-flight exits at the final close, then realize whatever
        // is still open.
        self.venue.fill_remaining_at_close();
        self.poll_open_orders(&mut open_orders, &mut trades, sink)
            .await?;
        for order in self.risk_manager.force_close_all(&self.portfolio, "end_of_backtest") {
            let handle = self.venue.submit_order(&order).await?;
            open_orders.push((handle, order));
        }
        self.venue.fill_remaining_at_close();
        self.poll_open_orders(&mut open_orders, &mut trades, sink)
            .await?;

        info!(
            trades = trades.len(),
            final_cash = %self.portfolio.cash,
            "Backtest finished."
        );

        let summary = AnalyticsEngine::new().calculate(initial_capital, &trades, &equity_curve);
        Ok(BacktestReport {
            equity_curve,
            trades,
            summary,
            errors,
        })
    }

    /// Submits an order and settles any immediate fill. A submission failure
    /// drops the order and rolls back the in-flight marker so no phantom
    /// position can appear.
    async fn submit(
        &mut self,
        order: OrderRequest,
        open_orders: &mut Vec<(OrderHandle, OrderRequest)>,
        trades: &mut Vec<TradeRecord>,
        sink: &mut dyn TradeSink,
    ) -> anyhow::Result<()> {
        match self.venue.submit_order(&order).await {
            Ok(handle) => {
                if order.side == OrderSide::Buy {
                    self.risk_manager.mark_pending_entry(&order.symbol);
                }
                open_orders.push((handle, order));
            }
            Err(e) => {
                warn!(symbol = %order.symbol, error = %e, "Order dropped after venue failure.");
                match order.side {
                    OrderSide::Buy => self.risk_manager.cancel_pending_entry(&order.symbol),
                    OrderSide::Sell => self.risk_manager.cancel_pending_exit(&order.symbol),
                }
                return Ok(());
            }
        }
        self.poll_open_orders(open_orders, trades, sink).await
    }

    async fn poll_open_orders(
        &mut self,
        open_orders: &mut Vec<(OrderHandle, OrderRequest)>,
        trades: &mut Vec<TradeRecord>,
        sink: &mut dyn TradeSink,
    ) -> anyhow::Result<()> {
        let mut still_open = Vec::new();
        for (handle, order) in open_orders.drain(..) {
            match self.venue.get_fill(handle).await? {
                FillStatus::Filled(fill) => {
                    if let Some(record) =
                        self.risk_manager.on_fill(&order, &fill, &mut self.portfolio)
                    {
                        if let Err(e) = sink.append_trade(&record) {
                            warn!(error = %e, "Trade sink write failed; continuing.");
                        }
                        trades.push(record);
                    }
                }
                FillStatus::Pending => still_open.push((handle, order)),
            }
        }
        *open_orders = still_open;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use core_types::{component, Direction, ExitReason, PositionStatus};
    use execution::SimulationSettings;
    use risk::RiskSettings;
    use rust_decimal_macros::dec;
    use store::NullSink;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 14, 30, 0).unwrap()
    }

    /// Emits a long signal (confidence 0.9) exactly at the scripted
    /// timestamps, flat otherwise. Keeps backtester tests independent of
    /// scorer tuning.
    struct ScriptedGenerator {
        long_at: BTreeSet<DateTime<Utc>>,
    }

    impl SignalGenerator for ScriptedGenerator {
        fn name(&self) -> &'static str {
            "ScriptedGenerator"
        }

        fn min_history(&self) -> usize {
            1
        }

        fn evaluate(&self, bars: &[Bar]) -> strategies::Result<Signal> {
            let last = bars.last().expect("window is never empty");
            let long = self.long_at.contains(&last.timestamp);
            let mut components = BTreeMap::new();
            components.insert(component::SMA.to_string(), 1.0);
            Ok(Signal {
                symbol: last.symbol.clone(),
                timestamp: last.timestamp,
                direction: if long { Direction::Long } else { Direction::Flat },
                confidence: if long { 0.9 } else { 0.0 },
                components,
            })
        }
    }

    fn bar(symbol: &str, minute: i64, open: f64, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            symbol: Symbol::from(symbol),
            timestamp: t0() + Duration::minutes(minute),
            open: Decimal::try_from(open).unwrap(),
            high: Decimal::try_from(high).unwrap(),
            low: Decimal::try_from(low).unwrap(),
            close: Decimal::try_from(close).unwrap(),
            volume: dec!(1000),
        }
    }

    fn backtester(long_at: Vec<DateTime<Utc>>, settings: RiskSettings) -> Backtester {
        Backtester::new(
            Box::new(ScriptedGenerator {
                long_at: long_at.into_iter().collect(),
            }),
            RiskManager::new(settings).unwrap(),
            SimulatedVenue::new(SimulationSettings::default()).unwrap(),
            dec!(10_000),
            DEFAULT_HISTORY_WINDOW,
        )
    }

    fn single_series(bars: Vec<Bar>) -> BTreeMap<Symbol, Vec<Bar>> {
        let mut series = BTreeMap::new();
        series.insert(bars[0].symbol.clone(), bars);
        series
    }

    #[tokio::test]
    async fn entry_fills_at_the_next_bars_open() {
        let bars = vec![
            bar("X", 0, 100.0, 100.5, 99.5, 100.0),
            bar("X", 1, 100.0, 100.5, 99.5, 100.0), // signal here
            bar("X", 2, 101.0, 102.0, 100.5, 101.5), // fill at this open
            bar("X", 3, 101.5, 102.0, 101.0, 101.5),
        ];
        let mut bt = backtester(vec![t0() + Duration::minutes(1)], RiskSettings::default());
        let report = bt.run(single_series(bars), &mut NullSink).await.unwrap();

        assert_eq!(report.trades.len(), 1);
        let trade = &report.trades[0];
        assert_eq!(trade.entry_price, dec!(101.0));
        assert_eq!(trade.entry_time, t0() + Duration::minutes(2));
        assert_eq!(trade.exit_reason, ExitReason::ForcedClose);
    }

    #[tokio::test]
    async fn stop_breach_exits_at_the_stop_price_not_the_bar_low() {
        // Entry at 100.00, stop_loss_percent 0.03; a later low of 96.50 must
        // exit at exactly 97.00.
        let bars = vec![
            bar("X", 0, 100.0, 100.5, 99.5, 100.0),
            bar("X", 1, 100.0, 100.5, 99.5, 100.0), // signal
            bar("X", 2, 100.0, 100.5, 99.0, 100.0), // entry fill at 100.00
            bar("X", 3, 99.0, 100.0, 96.5, 96.8),   // breach
        ];
        let mut bt = backtester(vec![t0() + Duration::minutes(1)], RiskSettings::default());
        let report = bt.run(single_series(bars), &mut NullSink).await.unwrap();

        assert_eq!(report.trades.len(), 1);
        let trade = &report.trades[0];
        assert_eq!(trade.entry_price, dec!(100.0));
        assert_eq!(trade.exit_price, dec!(97.00));
        assert_eq!(trade.exit_reason, ExitReason::StopLoss);
        assert_eq!(trade.pnl, dec!(-15.00));
    }

    #[tokio::test]
    async fn take_profit_exits_at_exactly_the_target() {
        // Entry at 100.00 with take_profit_percent 0.05: the first bar whose
        // high reaches 105.00 exits at 105.00, not at its high.
        let bars = vec![
            bar("X", 0, 100.0, 100.5, 99.5, 100.0),
            bar("X", 1, 100.0, 100.5, 99.5, 100.0), // signal
            bar("X", 2, 100.0, 101.0, 99.5, 100.8), // entry fill at 100.00
            bar("X", 3, 101.0, 103.0, 100.5, 102.5),
            bar("X", 4, 103.0, 105.2, 102.5, 104.9), // high crosses 105
            bar("X", 5, 105.0, 106.0, 104.5, 105.5),
        ];
        let mut bt = backtester(vec![t0() + Duration::minutes(1)], RiskSettings::default());
        let report = bt.run(single_series(bars), &mut NullSink).await.unwrap();

        assert_eq!(report.trades.len(), 1);
        let trade = &report.trades[0];
        assert_eq!(trade.exit_price, dec!(105.00));
        assert_eq!(trade.exit_reason, ExitReason::TakeProfit);
        assert_eq!(trade.exit_time, t0() + Duration::minutes(4));
        assert_eq!(trade.pnl, dec!(25.00));
        assert!(bt.portfolio().open_positions.is_empty());
    }

    #[tokio::test]
    async fn open_position_count_never_exceeds_max_positions() {
        let mut settings = RiskSettings::default();
        settings.max_positions = 2;
        settings.max_aggregate_exposure = 0.9;

        let mut series = BTreeMap::new();
        for symbol in ["A", "B", "C", "D"] {
            series.insert(
                Symbol::from(symbol),
                vec![
                    bar(symbol, 0, 100.0, 100.5, 99.5, 100.0),
                    bar(symbol, 1, 100.0, 100.5, 99.5, 100.0), // all signal long
                    bar(symbol, 2, 100.0, 100.5, 99.5, 100.0),
                    bar(symbol, 3, 100.0, 100.5, 99.5, 100.0),
                ],
            );
        }
        let mut bt = backtester(vec![t0() + Duration::minutes(1)], settings);
        let report = bt.run(series, &mut NullSink).await.unwrap();

        // Only the first two symbols in order get a slot; the rest are vetoed.
        assert_eq!(report.trades.len(), 2);
        let mut symbols: Vec<String> =
            report.trades.iter().map(|t| t.symbol.0.clone()).collect();
        symbols.sort();
        assert_eq!(symbols, vec!["A".to_string(), "B".to_string()]);
    }

    #[tokio::test]
    async fn daily_loss_breaker_blocks_entries_for_the_rest_of_the_day() {
        let mut settings = RiskSettings::default();
        // 10 dollars of daily loss budget on 10k starting equity.
        settings.max_daily_loss = 0.001;

        let day2 = 24 * 60;
        let mut series = BTreeMap::new();
        series.insert(
            Symbol::from("A"),
            vec![
                bar("A", 0, 100.0, 100.5, 99.5, 100.0),
                bar("A", 1, 100.0, 100.5, 99.5, 100.0), // signal
                bar("A", 2, 100.0, 100.5, 99.0, 100.0), // entry at 100
                bar("A", 3, 98.0, 98.5, 96.0, 96.5),    // stop at 97: -15 realized
            ],
        );
        series.insert(
            Symbol::from("B"),
            vec![
                bar("B", 4, 100.0, 100.5, 99.5, 100.0),
                bar("B", 5, 100.0, 100.5, 99.5, 100.0), // signal, same day: blocked
                bar("B", 6, 100.0, 100.5, 99.5, 100.0),
                bar("B", day2, 100.0, 100.5, 99.5, 100.0),
                bar("B", day2 + 1, 100.0, 100.5, 99.5, 100.0), // signal, next day
                bar("B", day2 + 2, 100.0, 100.5, 99.5, 100.0),
            ],
        );
        let mut bt = backtester(
            vec![
                t0() + Duration::minutes(1),
                t0() + Duration::minutes(5),
                t0() + Duration::minutes(day2 + 1),
            ],
            settings,
        );
        let report = bt.run(series, &mut NullSink).await.unwrap();

        let b_trades: Vec<&TradeRecord> = report
            .trades
            .iter()
            .filter(|t| t.symbol == Symbol::from("B"))
            .collect();
        assert_eq!(b_trades.len(), 1);
        // The only B entry happened on day two, after the breaker reset.
        assert!(b_trades[0].entry_time >= t0() + Duration::minutes(day2));
    }

    #[tokio::test]
    async fn closed_positions_stay_closed() {
        // Two separate long signals on the same symbol: the second entry is
        // a new position instance, not a reopening of the first.
        let bars = vec![
            bar("X", 0, 100.0, 100.5, 99.5, 100.0),
            bar("X", 1, 100.0, 100.5, 99.5, 100.0), // signal 1
            bar("X", 2, 100.0, 106.0, 99.5, 105.5), // entry 100, tp exit 105 same bar
            bar("X", 3, 105.0, 105.5, 104.5, 105.0),
            bar("X", 4, 105.0, 105.5, 104.5, 105.0), // signal 2
            bar("X", 5, 105.0, 105.5, 104.5, 105.0), // entry 105
            bar("X", 6, 105.0, 105.5, 104.5, 105.0),
        ];
        let mut bt = backtester(
            vec![t0() + Duration::minutes(1), t0() + Duration::minutes(4)],
            RiskSettings::default(),
        );
        let report = bt.run(single_series(bars), &mut NullSink).await.unwrap();

        assert_eq!(report.trades.len(), 2);
        assert_eq!(report.trades[0].exit_reason, ExitReason::TakeProfit);
        assert_eq!(report.trades[0].entry_price, dec!(100.0));
        assert_eq!(report.trades[1].entry_price, dec!(105.0));
        assert_ne!(report.trades[0].entry_time, report.trades[1].entry_time);
        assert!(bt
            .portfolio()
            .open_positions
            .values()
            .all(|p| p.status == PositionStatus::Open));
    }

    #[tokio::test]
    async fn identical_inputs_produce_byte_identical_reports() {
        let make_series = || {
            let mut series = BTreeMap::new();
            for (symbol, offset) in [("A", 0.0), ("B", 7.5)] {
                let mut bars = Vec::new();
                let mut close: f64 = 100.0 + offset;
                for i in 0..40 {
                    // A fixed, bumpy but deterministic path.
                    let swing = if i % 3 == 0 { 1.2 } else { -0.4 };
                    let open = close;
                    close = (close + swing).max(1.0);
                    bars.push(bar(
                        symbol,
                        i,
                        open,
                        open.max(close) + 0.3,
                        open.min(close) - 0.3,
                        close,
                    ));
                }
                series.insert(Symbol::from(symbol), bars);
            }
            series
        };
        let signals = vec![t0() + Duration::minutes(6), t0() + Duration::minutes(21)];

        let mut first = backtester(signals.clone(), RiskSettings::default());
        let first = first.run(make_series(), &mut NullSink).await.unwrap();
        let mut second = backtester(signals, RiskSettings::default());
        let second = second.run(make_series(), &mut NullSink).await.unwrap();

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert!(!first.trades.is_empty());
    }

    #[tokio::test]
    async fn malformed_series_halts_only_that_symbol() {
        let good = vec![
            bar("A", 0, 100.0, 100.5, 99.5, 100.0),
            bar("A", 1, 100.0, 100.5, 99.5, 100.0),
            bar("A", 2, 100.0, 100.5, 99.5, 100.0),
        ];
        let mut bad = vec![
            bar("B", 0, 100.0, 100.5, 99.5, 100.0),
            bar("B", 0, 100.0, 100.5, 99.5, 100.0), // duplicate timestamp
        ];
        bad[1].close = dec!(101);

        let mut series = BTreeMap::new();
        series.insert(Symbol::from("A"), good);
        series.insert(Symbol::from("B"), bad);

        let mut bt = backtester(vec![t0() + Duration::minutes(1)], RiskSettings::default());
        let report = bt.run(series, &mut NullSink).await.unwrap();

        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].symbol, Symbol::from("B"));
        // A still traded.
        assert_eq!(report.trades.len(), 1);
        assert_eq!(report.trades[0].symbol, Symbol::from("A"));
    }

    #[tokio::test]
    async fn momentum_scorer_uptrend_enters_and_takes_profit() {
        use strategies::{MomentumScorer, ScorerSettings};

        // A clean 1.5%-per-bar uptrend on steady volume. With short windows
        // the scorer turns long as soon as the lookback is satisfied
        // (momentum 0.30 + volume 0.167 + sma 0.20 ~= 0.67 >= 0.6); the
        // entry fills at the following bar's open and the 5% target exits
        // at exactly entry * 1.05.
        let scorer = MomentumScorer::new(ScorerSettings {
            momentum_window: 3,
            volume_lookback: 3,
            rsi_period: 3,
            sma_period: 5,
            ..ScorerSettings::default()
        })
        .unwrap();

        let mut bars = Vec::new();
        let mut close = 100.0_f64;
        for i in 0..10 {
            let open = close;
            close *= 1.015;
            bars.push(bar("X", i, open, close, open, close));
        }
        let first_signal_bar = 4; // momentum needs 4 bars, the SMA needs 5

        let mut bt = Backtester::new(
            Box::new(scorer),
            RiskManager::new(RiskSettings::default()).unwrap(),
            SimulatedVenue::new(SimulationSettings::default()).unwrap(),
            dec!(10_000),
            DEFAULT_HISTORY_WINDOW,
        );
        let report = bt.run(single_series(bars.clone()), &mut NullSink).await.unwrap();

        assert!(!report.trades.is_empty());
        let trade = &report.trades[0];
        assert_eq!(trade.entry_time, bars[first_signal_bar + 1].timestamp);
        assert_eq!(trade.entry_price, bars[first_signal_bar + 1].open);
        assert_eq!(trade.exit_reason, ExitReason::TakeProfit);
        assert_eq!(trade.exit_price, trade.entry_price * dec!(1.05));
        assert!(trade.pnl > dec!(0));
    }

    #[tokio::test]
    async fn equity_curve_has_one_point_per_tick() {
        let bars = vec![
            bar("X", 0, 100.0, 100.5, 99.5, 100.0),
            bar("X", 1, 100.0, 100.5, 99.5, 100.0),
            bar("X", 2, 100.0, 100.5, 99.5, 100.0),
        ];
        let mut bt = backtester(vec![], RiskSettings::default());
        let report = bt.run(single_series(bars), &mut NullSink).await.unwrap();

        assert_eq!(report.equity_curve.len(), 3);
        assert!(report
            .equity_curve
            .iter()
            .all(|p| p.value == dec!(10_000)));
    }
}
