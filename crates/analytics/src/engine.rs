use core_types::TradeRecord;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

use crate::types::{EquityPoint, PerformanceReport};

/// The engine responsible for calculating performance metrics from trade data.
#[derive(Default)]
pub struct AnalyticsEngine;

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculates a full performance report from a set of trades and an
    /// equity curve.
    pub fn calculate(
        &self,
        initial_capital: Decimal,
        trades: &[TradeRecord],
        equity_curve: &[EquityPoint],
    ) -> PerformanceReport {
        let mut report = PerformanceReport::new();
        if trades.is_empty() {
            return report;
        }

        // 1. Total trades and net P&L
        report.total_trades = trades.len() as u32;
        report.net_pnl_absolute = trades.iter().map(|t| t.pnl).sum();
        if initial_capital > dec!(0) {
            report.net_pnl_percentage =
                (report.net_pnl_absolute / initial_capital).to_f64().unwrap_or(0.0) * 100.0;
        }

        // 2. Win rate and profit factor
        let winning: Vec<&TradeRecord> = trades.iter().filter(|t| t.pnl > dec!(0)).collect();
        let losing: Vec<&TradeRecord> = trades.iter().filter(|t| t.pnl < dec!(0)).collect();
        report.win_rate = (winning.len() as f64 / report.total_trades as f64) * 100.0;

        let gross_profit: Decimal = winning.iter().map(|t| t.pnl).sum();
        let gross_loss: Decimal = losing.iter().map(|t| t.pnl).sum::<Decimal>().abs();
        report.profit_factor = if gross_loss > dec!(0) {
            (gross_profit / gross_loss).to_f64().unwrap_or(0.0)
        } else {
            f64::INFINITY // Pure profit
        };

        // 3. Max drawdown
        let mut peak_equity = initial_capital;
        let mut max_drawdown = dec!(0);
        for point in equity_curve {
            peak_equity = peak_equity.max(point.value);
            let drawdown = peak_equity - point.value;
            max_drawdown = max_drawdown.max(drawdown);
        }
        report.max_drawdown_absolute = max_drawdown;
        if peak_equity > dec!(0) {
            report.max_drawdown_percentage =
                (max_drawdown / peak_equity).to_f64().unwrap_or(0.0) * 100.0;
        }

        // 4. Sharpe ratio (periodic; multiply by sqrt(periods/year) to annualize)
        if equity_curve.len() > 1 {
            let returns: Vec<f64> = equity_curve
                .windows(2)
                .filter(|w| w[0].value > dec!(0))
                .map(|w| (w[1].value / w[0].value - dec!(1)).to_f64().unwrap_or(0.0))
                .collect();
            if !returns.is_empty() {
                let mean_return = returns.iter().sum::<f64>() / returns.len() as f64;
                let variance = returns
                    .iter()
                    .map(|r| (*r - mean_return).powi(2))
                    .sum::<f64>()
                    / returns.len() as f64;
                let std_dev = variance.sqrt();
                report.sharpe_ratio = if std_dev > 0.0 { mean_return / std_dev } else { 0.0 };
            }
        }

        // 5. Average trade duration and expectancy
        let total_duration_secs: i64 = trades
            .iter()
            .map(|t| (t.exit_time - t.entry_time).num_seconds())
            .sum();
        report.avg_trade_duration_secs = total_duration_secs as f64 / trades.len() as f64;
        report.expectancy = report.net_pnl_absolute / Decimal::from(trades.len());

        report
    }
}
