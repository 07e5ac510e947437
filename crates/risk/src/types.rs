use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Portfolio-level risk limits and the per-position exit geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSettings {
    /// Fraction of equity allocated to a single position.
    pub max_position_size: f64,
    pub stop_loss_percent: f64,
    pub take_profit_percent: f64,
    /// Signals below this confidence never reach sizing.
    pub min_confidence: f64,
    /// Daily realized loss, as a fraction of starting equity, at which the
    /// circuit breaker blocks new entries for the rest of the session day.
    pub max_daily_loss: f64,
    pub max_positions: usize,
    /// Cap on total open notional as a fraction of equity.
    pub max_aggregate_exposure: f64,
    /// Pearson correlation of trailing returns above which a candidate is
    /// rejected against any open position.
    pub correlation_threshold: f64,
    /// Bars of trailing closes kept per symbol for the correlation check.
    pub correlation_window: usize,
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            max_position_size: 0.05,
            stop_loss_percent: 0.03,
            take_profit_percent: 0.05,
            min_confidence: 0.6,
            max_daily_loss: 0.05,
            max_positions: 5,
            max_aggregate_exposure: 0.5,
            correlation_threshold: 0.7,
            correlation_window: 30,
        }
    }
}

impl RiskSettings {
    /// Validates the settings. Fatal at startup; never raised mid-run.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("max_position_size", self.max_position_size),
            ("stop_loss_percent", self.stop_loss_percent),
            ("take_profit_percent", self.take_profit_percent),
            ("max_daily_loss", self.max_daily_loss),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(Error::InvalidParameters(format!(
                    "{name} must be in (0, 1), got {value}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(Error::InvalidParameters(format!(
                "min_confidence must be in [0, 1], got {}",
                self.min_confidence
            )));
        }
        if self.max_positions == 0 {
            return Err(Error::InvalidParameters(
                "max_positions must be at least 1".to_string(),
            ));
        }
        if !(self.max_aggregate_exposure > 0.0) {
            return Err(Error::InvalidParameters(
                "max_aggregate_exposure must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.correlation_threshold) {
            return Err(Error::InvalidParameters(format!(
                "correlation_threshold must be in [0, 1], got {}",
                self.correlation_threshold
            )));
        }
        if self.correlation_window < 2 {
            return Err(Error::InvalidParameters(
                "correlation_window must be at least 2 bars".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        assert!(RiskSettings::default().validate().is_ok());
    }

    #[test]
    fn out_of_range_fractions_are_rejected() {
        let mut settings = RiskSettings::default();
        settings.stop_loss_percent = 0.0;
        assert!(settings.validate().is_err());

        let mut settings = RiskSettings::default();
        settings.max_position_size = 1.5;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn zero_max_positions_is_rejected() {
        let mut settings = RiskSettings::default();
        settings.max_positions = 0;
        assert!(settings.validate().is_err());
    }
}
