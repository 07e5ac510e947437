use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Weights for the four signal components. Must sum to 1.0.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SignalWeights {
    pub momentum: f64,
    pub volume: f64,
    pub rsi: f64,
    pub sma: f64,
}

impl SignalWeights {
    pub fn sum(&self) -> f64 {
        self.momentum + self.volume + self.rsi + self.sma
    }
}

/// Tunable policy for the momentum scorer.
///
/// The normalization thresholds and band edges are configuration, not
/// architecture: nothing downstream assumes these defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerSettings {
    /// Bars in the short momentum window.
    pub momentum_window: usize,
    /// Bars in the trailing volume average.
    pub volume_lookback: usize,
    pub rsi_period: usize,
    pub sma_period: usize,
    /// Return at which the momentum component earns full credit.
    pub momentum_threshold: f64,
    /// Volume ratio at which the volume component earns full credit.
    pub volume_ratio_threshold: f64,
    /// RSI band that earns the RSI component its credit.
    pub rsi_band_low: f64,
    pub rsi_band_high: f64,
    /// Composite confidence below which no long signal is emitted.
    pub min_confidence: f64,
    pub weights: SignalWeights,
}

/// Tolerance on the weight sum check.
const WEIGHT_SUM_EPSILON: f64 = 1e-6;

impl Default for ScorerSettings {
    fn default() -> Self {
        Self {
            momentum_window: 5,
            volume_lookback: 20,
            rsi_period: 14,
            sma_period: 20,
            momentum_threshold: 0.01,
            volume_ratio_threshold: 1.5,
            rsi_band_low: 30.0,
            rsi_band_high: 40.0,
            min_confidence: 0.6,
            weights: SignalWeights {
                momentum: 0.30,
                volume: 0.25,
                rsi: 0.25,
                sma: 0.20,
            },
        }
    }
}

impl ScorerSettings {
    /// Validates the settings. Called once at startup; any failure here is
    /// fatal before the first evaluation.
    pub fn validate(&self) -> Result<()> {
        let sum = self.weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(Error::InvalidConfiguration(format!(
                "signal weights must sum to 1.0, got {sum}"
            )));
        }
        let weights = [
            self.weights.momentum,
            self.weights.volume,
            self.weights.rsi,
            self.weights.sma,
        ];
        if weights.iter().any(|w| *w < 0.0) {
            return Err(Error::InvalidConfiguration(
                "signal weights must be non-negative".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(Error::InvalidConfiguration(format!(
                "min_confidence must be in [0, 1], got {}",
                self.min_confidence
            )));
        }
        if self.momentum_threshold <= 0.0 {
            return Err(Error::InvalidConfiguration(
                "momentum_threshold must be positive".to_string(),
            ));
        }
        if self.volume_ratio_threshold <= 0.0 {
            return Err(Error::InvalidConfiguration(
                "volume_ratio_threshold must be positive".to_string(),
            ));
        }
        if !(0.0 <= self.rsi_band_low
            && self.rsi_band_low < self.rsi_band_high
            && self.rsi_band_high <= 100.0)
        {
            return Err(Error::InvalidConfiguration(format!(
                "rsi band [{}, {}] must satisfy 0 <= low < high <= 100",
                self.rsi_band_low, self.rsi_band_high
            )));
        }
        if self.momentum_window == 0
            || self.volume_lookback == 0
            || self.rsi_period == 0
            || self.sma_period == 0
        {
            return Err(Error::InvalidConfiguration(
                "indicator windows must be at least 1 bar".to_string(),
            ));
        }
        Ok(())
    }
}
