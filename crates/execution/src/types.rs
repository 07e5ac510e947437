use core_types::Fill;
use serde::{Deserialize, Serialize};

/// Venue-assigned identifier for a submitted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct OrderHandle(pub u64);

/// Result of polling a submitted order. `Pending` is non-terminal: callers
/// must leave all position state untouched and poll again later.
#[derive(Debug, Clone, PartialEq)]
pub enum FillStatus {
    Filled(Fill),
    Pending,
}

/// When the simulated venue fills a market entry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FillModel {
    /// Fill at the next bar's open. The default: the signal bar's own prices
    /// are never tradable, which keeps the replay free of look-ahead bias.
    #[default]
    NextBarOpen,
    /// Fill at the signal bar's close. Optimistic; opt-in only.
    SignalClose,
}

/// Settings for the simulated venue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSettings {
    /// Slippage applied against market fills (e.g. 0.0005 for 0.05%).
    /// Protective stop and limit exits fill at exactly their trigger price.
    pub slippage_percent: f64,
    pub fill_model: FillModel,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            slippage_percent: 0.0,
            fill_model: FillModel::NextBarOpen,
        }
    }
}
