use std::collections::BTreeMap;

use core_types::{component, Bar, Direction, Signal};
use num_traits::ToPrimitive;

use crate::types::ScorerSettings;
use crate::{Result, SignalGenerator};

/// Weighted momentum scorer.
///
/// Combines short-horizon return, volume surge, RSI band membership and the
/// SMA trend gate into a composite confidence in [0, 1]. Each component is
/// normalized to [0, 1] before weighting:
///
/// * momentum: scaled fraction of `momentum_threshold`, full credit at the
///   threshold and above
/// * volume: scaled fraction of `volume_ratio_threshold`
/// * rsi: 1 inside the configured band, 0 outside
/// * sma: 1 when close is above the SMA, 0 otherwise
///
/// Direction is `Long` only when the confidence clears `min_confidence` AND
/// the close is above the SMA. The SMA gate is hard: no weighting can buy a
/// long signal below trend.
#[derive(Debug)]
pub struct MomentumScorer {
    settings: ScorerSettings,
}

impl MomentumScorer {
    /// Creates a scorer, validating the settings first.
    pub fn new(settings: ScorerSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &ScorerSettings {
        &self.settings
    }
}

impl SignalGenerator for MomentumScorer {
    fn name(&self) -> &'static str {
        "MomentumScorer"
    }

    fn min_history(&self) -> usize {
        // momentum needs window + 1 closes; sma needs its full period.
        (self.settings.momentum_window + 1).max(self.settings.sma_period)
    }

    fn evaluate(&self, bars: &[Bar]) -> Result<Signal> {
        let s = &self.settings;

        // Hard requirements first: either of these erroring skips the symbol
        // for this tick.
        let momentum = indicators::price_momentum(bars, s.momentum_window)?;
        let sma = indicators::sma(bars, s.sma_period)?;

        // Optional gates degrade to neutral on short history.
        let volume_ratio = indicators::volume_ratio(bars, s.volume_lookback);
        let rsi = indicators::rsi(bars, s.rsi_period);

        let last = &bars[bars.len() - 1];
        let close = last.close.to_f64().unwrap_or(0.0);

        let momentum_score = (momentum / s.momentum_threshold).clamp(0.0, 1.0);
        let volume_score = (volume_ratio / s.volume_ratio_threshold).clamp(0.0, 1.0);
        let rsi_score = if (s.rsi_band_low..=s.rsi_band_high).contains(&rsi) {
            1.0
        } else {
            0.0
        };
        let above_sma = close > sma;
        let sma_score = if above_sma { 1.0 } else { 0.0 };

        let confidence = (s.weights.momentum * momentum_score
            + s.weights.volume * volume_score
            + s.weights.rsi * rsi_score
            + s.weights.sma * sma_score)
            .clamp(0.0, 1.0);

        let direction = if confidence >= s.min_confidence && above_sma {
            Direction::Long
        } else {
            Direction::Flat
        };

        let mut components = BTreeMap::new();
        components.insert(component::MOMENTUM.to_string(), momentum_score);
        components.insert(component::VOLUME.to_string(), volume_score);
        components.insert(component::RSI.to_string(), rsi_score);
        components.insert(component::SMA.to_string(), sma_score);

        Ok(Signal {
            symbol: last.symbol.clone(),
            timestamp: last.timestamp,
            direction,
            confidence,
            components,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SignalWeights;
    use chrono::{Duration, TimeZone, Utc};
    use core_types::Symbol;
    use rust_decimal::Decimal;

    fn settings() -> ScorerSettings {
        ScorerSettings {
            momentum_window: 3,
            volume_lookback: 3,
            rsi_period: 3,
            sma_period: 5,
            ..ScorerSettings::default()
        }
    }

    fn make_bars(closes: &[f64], volumes: &[f64]) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 3, 4, 14, 30, 0).unwrap();
        closes
            .iter()
            .zip(volumes)
            .enumerate()
            .map(|(i, (&c, &v))| {
                let price = Decimal::try_from(c).unwrap();
                Bar {
                    symbol: Symbol::from("TEST"),
                    timestamp: start + Duration::minutes(i as i64),
                    open: price,
                    high: price,
                    low: price,
                    close: price,
                    volume: Decimal::try_from(v).unwrap(),
                }
            })
            .collect()
    }

    fn uptrend(len: usize) -> Vec<Bar> {
        let mut close = 100.0;
        let mut closes = Vec::with_capacity(len);
        for _ in 0..len {
            closes.push(close);
            close *= 1.015;
        }
        let volumes = vec![2000.0; len];
        make_bars(&closes, &volumes)
    }

    #[test]
    fn short_window_propagates_insufficient_data() {
        let scorer = MomentumScorer::new(settings()).unwrap();
        let bars = uptrend(3);
        let err = scorer.evaluate(&bars).unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn uptrend_with_volume_surge_goes_long() {
        let scorer = MomentumScorer::new(settings()).unwrap();
        let mut bars = uptrend(10);
        // Volume surge on the last bar: 2x the trailing average.
        let last = bars.last_mut().unwrap();
        last.volume = Decimal::from(4000);

        let signal = scorer.evaluate(&bars).unwrap();
        // momentum (0.30) + volume (0.25) + sma (0.20) = 0.75 even with the
        // RSI band missed (a clean uptrend pins RSI near 100).
        assert_eq!(signal.direction, Direction::Long);
        assert!(signal.confidence >= 0.6, "confidence {}", signal.confidence);
        assert_eq!(signal.components[component::SMA], 1.0);
        assert_eq!(signal.components[component::RSI], 0.0);
    }

    #[test]
    fn confidence_is_always_within_unit_interval() {
        let scorer = MomentumScorer::new(settings()).unwrap();
        let series: [&[f64]; 3] = [
            &[100.0, 90.0, 110.0, 85.0, 120.0, 80.0, 130.0],
            &[100.0, 100.0, 100.0, 100.0, 100.0, 100.0],
            &[50.0, 51.0, 49.0, 52.0, 48.0, 53.0, 47.0],
        ];
        for closes in series {
            let bars = make_bars(closes, &vec![1000.0; closes.len()]);
            let signal = scorer.evaluate(&bars).unwrap();
            assert!(
                (0.0..=1.0).contains(&signal.confidence),
                "confidence out of bounds: {}",
                signal.confidence
            );
        }
    }

    #[test]
    fn below_sma_is_flat_regardless_of_confidence() {
        // Give every weightable point to components that can fire below
        // trend, then verify the hard gate still wins.
        let mut s = settings();
        s.weights = SignalWeights {
            momentum: 0.5,
            volume: 0.5,
            rsi: 0.0,
            sma: 0.0,
        };
        s.min_confidence = 0.2;
        let scorer = MomentumScorer::new(s).unwrap();

        // Strong bounce on the last bars, but close still below the 5-bar SMA.
        let closes = [120.0, 118.0, 90.0, 91.0, 92.0, 95.0];
        let volumes = [1000.0, 1000.0, 1000.0, 1000.0, 1000.0, 5000.0];
        let bars = make_bars(&closes, &volumes);

        let signal = scorer.evaluate(&bars).unwrap();
        assert!(signal.confidence >= 0.2);
        assert_eq!(signal.direction, Direction::Flat);
        assert_eq!(signal.components[component::SMA], 0.0);
    }

    #[test]
    fn downtrend_is_flat() {
        let scorer = MomentumScorer::new(settings()).unwrap();
        let closes = [110.0, 108.0, 106.0, 104.0, 102.0, 100.0];
        let bars = make_bars(&closes, &vec![1000.0; closes.len()]);
        let signal = scorer.evaluate(&bars).unwrap();
        assert_eq!(signal.direction, Direction::Flat);
    }
}
