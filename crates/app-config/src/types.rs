use core_types::Symbol;
use execution::{FillModel, RetryPolicy};
use risk::RiskSettings;
use serde::Deserialize;
use strategies::ScorerSettings;

use crate::error::{Error, Result};

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// The application's general settings.
    pub app: AppSettings,
    pub portfolio: PortfolioSettings,
    #[serde(default)]
    pub scoring: ScorerSettings,
    #[serde(default)]
    pub risk: RiskSettings,
    #[serde(default)]
    pub backtest: BacktestSettings,
    #[serde(default)]
    pub venue: VenueSettings,
    pub watchlist: WatchlistSettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    /// The environment the application is running in (e.g. "development").
    pub environment: String,
    /// The log level for the application.
    pub log_level: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct PortfolioSettings {
    pub initial_capital: f64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct BacktestSettings {
    /// Bars of history handed to the signal generator each tick.
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    /// Fill market entries at the signal bar's close instead of the next
    /// bar's open. Off by default: filling on the signal bar is look-ahead.
    #[serde(default)]
    pub fill_at_close: bool,
}

impl Default for BacktestSettings {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            fill_at_close: false,
        }
    }
}

impl BacktestSettings {
    pub fn fill_model(&self) -> FillModel {
        if self.fill_at_close {
            FillModel::SignalClose
        } else {
            FillModel::NextBarOpen
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct VenueSettings {
    /// Simulated slippage applied to market fills.
    #[serde(default)]
    pub slippage_percent: f64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    /// Upper bound on a single symbol's bar fetch in a live/paper tick.
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

impl Default for VenueSettings {
    fn default() -> Self {
        Self {
            slippage_percent: 0.0,
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
        }
    }
}

impl VenueSettings {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_retries,
            base_delay_ms: self.backoff_base_ms,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct WatchlistSettings {
    pub symbols: Vec<String>,
}

impl WatchlistSettings {
    pub fn symbols(&self) -> Vec<Symbol> {
        self.symbols.iter().map(|s| Symbol::from(s.as_str())).collect()
    }
}

fn default_history_window() -> usize {
    100
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    250
}

fn default_fetch_timeout_ms() -> u64 {
    5_000
}

impl Settings {
    /// Runs every startup validation. Any failure here aborts startup;
    /// nothing in this struct is re-validated mid-run.
    pub fn validate(&self) -> Result<()> {
        self.scoring
            .validate()
            .map_err(|e| Error::Invalid(e.to_string()))?;
        self.risk
            .validate()
            .map_err(|e| Error::Invalid(e.to_string()))?;
        if !(self.portfolio.initial_capital > 0.0) {
            return Err(Error::Invalid(format!(
                "initial_capital must be positive, got {}",
                self.portfolio.initial_capital
            )));
        }
        if self.watchlist.symbols.is_empty() {
            return Err(Error::Invalid("watchlist must not be empty".to_string()));
        }
        if !(0.0..1.0).contains(&self.venue.slippage_percent) {
            return Err(Error::Invalid(format!(
                "slippage_percent must be in [0, 1), got {}",
                self.venue.slippage_percent
            )));
        }
        if self.venue.max_retries == 0 {
            return Err(Error::Invalid(
                "max_retries must be at least 1".to_string(),
            ));
        }
        if self.backtest.history_window == 0 {
            return Err(Error::Invalid(
                "history_window must be at least 1 bar".to_string(),
            ));
        }
        Ok(())
    }
}
