use analytics::{EquityPoint, PerformanceReport};
use core_types::{Symbol, TradeRecord};
use serde::{Deserialize, Serialize};

/// A symbol whose replay was halted by an unrecoverable error. The rest of
/// the run continues without it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolError {
    pub symbol: Symbol,
    pub message: String,
}

/// The full outcome of a backtest run. Lossless with respect to the trade
/// and equity data collected during replay, and serializable as a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<TradeRecord>,
    pub summary: PerformanceReport,
    pub errors: Vec<SymbolError>,
}

/// Helper function to print the performance report in a readable format.
pub fn print_report(report: &BacktestReport) {
    let s = &report.summary;
    println!("\n--- Backtest Performance Report ---");
    println!("-----------------------------------");
    println!(
        "Net P&L:             ${:.2} ({:.2}%)",
        s.net_pnl_absolute, s.net_pnl_percentage
    );
    println!(
        "Max Drawdown:        ${:.2} ({:.2}%)",
        s.max_drawdown_absolute, s.max_drawdown_percentage
    );
    println!("Sharpe Ratio:        {:.3}", s.sharpe_ratio);
    println!("Profit Factor:       {:.2}", s.profit_factor);
    println!("Win Rate:            {:.2}%", s.win_rate);
    println!("Total Trades:        {}", s.total_trades);
    println!("Avg. Trade Duration: {:.1}s", s.avg_trade_duration_secs);
    println!("Expectancy:          ${:.2}", s.expectancy);
    println!("-----------------------------------");
    if !report.errors.is_empty() {
        println!("Symbols halted by errors:");
        for error in &report.errors {
            println!("  - {}: {}", error.symbol, error.message);
        }
        println!("-----------------------------------");
    }
}
