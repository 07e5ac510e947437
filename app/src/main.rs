use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use app_config::Settings;
use backtester::{print_report, Backtester};
use clap::{Parser, Subcommand};
use core_types::{Bar, Symbol};
use engine::{ReplayFeed, SessionEngine, SessionSettings};
use execution::{SimulatedVenue, SimulationSettings};
use risk::RiskManager;
use rust_decimal::Decimal;
use store::JsonlSink;
use strategies::MomentumScorer;

mod data;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "A momentum equity trading engine.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replays historical bars through the strategy and prints a report.
    Backtest {
        /// Directory holding one `<SYMBOL>.csv` per watchlist symbol.
        #[arg(short, long)]
        data_dir: PathBuf,

        /// Directory for the report, trade log and equity curve.
        #[arg(short, long, default_value = "backtest-results")]
        output: PathBuf,
    },

    /// Runs a paper session over replayed bars, through the live code path.
    Paper {
        /// Directory holding one `<SYMBOL>.csv` per watchlist symbol.
        #[arg(short, long)]
        data_dir: PathBuf,

        /// Directory for the trade log and equity curve.
        #[arg(short, long, default_value = "paper-results")]
        output: PathBuf,
    },

    /// Loads and validates the configuration, then exits.
    CheckConfig,
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let settings = app_config::load_settings().context("loading configuration")?;

    let level = tracing::Level::from_str(&settings.app.log_level)
        .with_context(|| format!("bad log level {:?}", settings.app.log_level))?;
    tracing_subscriber::fmt().with_max_level(level).init();

    let cli = Cli::parse();
    tracing::info!(environment = %settings.app.environment, "Starting trader.");

    match cli.command {
        Commands::Backtest { data_dir, output } => {
            handle_backtest(&settings, data_dir, output).await?;
        }
        Commands::Paper { data_dir, output } => {
            handle_paper(&settings, data_dir, output).await?;
        }
        Commands::CheckConfig => {
            println!(
                "Configuration OK: {} watchlist symbols, max {} positions.",
                settings.watchlist.symbols.len(),
                settings.risk.max_positions
            );
        }
    }

    Ok(())
}

fn initial_capital(settings: &Settings) -> Result<Decimal> {
    Decimal::try_from(settings.portfolio.initial_capital).context("initial_capital")
}

/// Loads every watchlist symbol's series, skipping (with a warning) symbols
/// whose data file is missing or malformed.
fn load_series(settings: &Settings, data_dir: &PathBuf) -> BTreeMap<Symbol, Vec<Bar>> {
    let mut series = BTreeMap::new();
    for symbol in settings.watchlist.symbols() {
        match data::load_bars(data_dir, &symbol) {
            Ok(bars) if bars.is_empty() => {
                tracing::warn!(%symbol, "No bars in data file; skipping symbol.");
            }
            Ok(bars) => {
                tracing::info!(%symbol, bars = bars.len(), "Loaded bar series.");
                series.insert(symbol, bars);
            }
            Err(e) => {
                tracing::warn!(%symbol, error = %e, "Failed to load bars; skipping symbol.");
            }
        }
    }
    series
}

async fn handle_backtest(settings: &Settings, data_dir: PathBuf, output: PathBuf) -> Result<()> {
    let series = load_series(settings, &data_dir);
    anyhow::ensure!(!series.is_empty(), "no usable bar data under {}", data_dir.display());

    let generator = MomentumScorer::new(settings.scoring.clone())?;
    let risk_manager = RiskManager::new(settings.risk.clone())?;
    let venue = SimulatedVenue::new(SimulationSettings {
        slippage_percent: settings.venue.slippage_percent,
        fill_model: settings.backtest.fill_model(),
    })?;

    let mut sink = JsonlSink::create(&output).context("opening the result sink")?;
    let mut backtester = Backtester::new(
        Box::new(generator),
        risk_manager,
        venue,
        initial_capital(settings)?,
        settings.backtest.history_window,
    );
    let report = backtester.run(series, &mut sink).await?;

    let report_path = output.join("report.json");
    std::fs::write(&report_path, serde_json::to_string_pretty(&report)?)
        .with_context(|| format!("writing {}", report_path.display()))?;
    tracing::info!(path = %report_path.display(), "Report written.");

    print_report(&report);
    Ok(())
}

async fn handle_paper(settings: &Settings, data_dir: PathBuf, output: PathBuf) -> Result<()> {
    let series = load_series(settings, &data_dir);
    anyhow::ensure!(!series.is_empty(), "no usable bar data under {}", data_dir.display());

    let generator = MomentumScorer::new(settings.scoring.clone())?;
    let risk_manager = RiskManager::new(settings.risk.clone())?;
    let venue = SimulatedVenue::new(SimulationSettings {
        slippage_percent: settings.venue.slippage_percent,
        fill_model: settings.backtest.fill_model(),
    })?;

    let mut sink = JsonlSink::create(&output).context("opening the result sink")?;
    let mut session = SessionEngine::new(
        ReplayFeed::new(series),
        Box::new(venue),
        Box::new(generator),
        risk_manager,
        initial_capital(settings)?,
        SessionSettings {
            watchlist: settings.watchlist.symbols(),
            history_window: settings.backtest.history_window,
            fetch_timeout_ms: settings.venue.fetch_timeout_ms,
            retry: settings.venue.retry_policy(),
        },
    );
    let report = session.run(&mut sink).await?;

    let summary = analytics::AnalyticsEngine::new().calculate(
        initial_capital(settings)?,
        &report.trades,
        &report.equity_curve,
    );
    println!(
        "Paper session: {} trades, net P&L ${:.2} ({:.2}%), win rate {:.1}%.",
        summary.total_trades, summary.net_pnl_absolute, summary.net_pnl_percentage, summary.win_rate
    );
    println!("Trade log and equity curve written to {}.", sink.dir().display());
    Ok(())
}
