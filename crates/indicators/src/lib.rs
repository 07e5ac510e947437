//! Rolling technical features computed from an ordered bar window.
//!
//! Every function here is a pure function of its input slice: no internal
//! state, no side effects, all ratio math in `f64`. Prices arrive as
//! `Decimal` and are converted once at this boundary. Windows are counted in
//! bars, so a series with calendar gaps is fine as long as enough bars exist.

pub mod error;

use core_types::Bar;
use num_traits::ToPrimitive;

pub use error::{Error, Result};

/// RSI value reported when there is not enough history to compute one.
/// RSI is an optional gate, so short windows degrade to "no opinion"
/// instead of failing the whole evaluation.
pub const RSI_NEUTRAL: f64 = 50.0;

/// Volume ratio reported when the trailing average is zero or the window is
/// too short to form one.
pub const VOLUME_RATIO_NEUTRAL: f64 = 1.0;

fn close(bar: &Bar) -> f64 {
    bar.close.to_f64().unwrap_or(0.0)
}

fn volume(bar: &Bar) -> f64 {
    bar.volume.to_f64().unwrap_or(0.0)
}

/// Percentage change of close over the most recent `window` bars.
///
/// Needs `window + 1` bars (the change is measured against the close
/// `window` bars back); fails with [`Error::InsufficientData`] otherwise.
pub fn price_momentum(bars: &[Bar], window: usize) -> Result<f64> {
    let required = window + 1;
    if bars.len() < required {
        return Err(Error::InsufficientData {
            required,
            got: bars.len(),
        });
    }
    let last = close(&bars[bars.len() - 1]);
    let base = close(&bars[bars.len() - 1 - window]);
    if base == 0.0 {
        // Degenerate series; treat as no movement rather than dividing by zero.
        return Ok(0.0);
    }
    Ok((last - base) / base)
}

/// Current bar volume divided by the mean volume of the preceding
/// `lookback` bars.
///
/// Returns [`VOLUME_RATIO_NEUTRAL`] when the trailing mean is zero or when
/// fewer than `lookback + 1` bars are available; volume is a confirmation
/// gate, not a hard requirement.
pub fn volume_ratio(bars: &[Bar], lookback: usize) -> f64 {
    if lookback == 0 || bars.len() < lookback + 1 {
        return VOLUME_RATIO_NEUTRAL;
    }
    let current = volume(&bars[bars.len() - 1]);
    let trailing = &bars[bars.len() - 1 - lookback..bars.len() - 1];
    let mean = trailing.iter().map(volume).sum::<f64>() / lookback as f64;
    if mean == 0.0 {
        return VOLUME_RATIO_NEUTRAL;
    }
    current / mean
}

/// Relative Strength Index over `period` bars, using Wilder smoothing.
///
/// Seeds the average gain/loss from the first `period` changes of the
/// window, then smooths with alpha = 1/period through the rest. Clamped to
/// [0, 100]. Returns [`RSI_NEUTRAL`] when fewer than `period + 1` bars are
/// available.
pub fn rsi(bars: &[Bar], period: usize) -> f64 {
    if period == 0 || bars.len() < period + 1 {
        return RSI_NEUTRAL;
    }

    let closes: Vec<f64> = bars.iter().map(close).collect();
    let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for &ch in &changes[..period] {
        if ch > 0.0 {
            avg_gain += ch;
        } else {
            avg_loss -= ch;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;

    let alpha = 1.0 / period as f64;
    for &ch in &changes[period..] {
        let gain = if ch > 0.0 { ch } else { 0.0 };
        let loss = if ch < 0.0 { -ch } else { 0.0 };
        avg_gain = alpha * gain + (1.0 - alpha) * avg_gain;
        avg_loss = alpha * loss + (1.0 - alpha) * avg_loss;
    }

    let value = if avg_gain == 0.0 && avg_loss == 0.0 {
        RSI_NEUTRAL
    } else if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    };
    value.clamp(0.0, 100.0)
}

/// Arithmetic mean of close over the last `period` bars.
///
/// Fails with [`Error::InsufficientData`] when the window is shorter than
/// `period`.
pub fn sma(bars: &[Bar], period: usize) -> Result<f64> {
    if period == 0 || bars.len() < period {
        return Err(Error::InsufficientData {
            required: period.max(1),
            got: bars.len(),
        });
    }
    let tail = &bars[bars.len() - period..];
    Ok(tail.iter().map(close).sum::<f64>() / period as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use core_types::Symbol;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

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

    fn flat_volume(closes: &[f64]) -> Vec<Bar> {
        make_bars(closes, &vec![1000.0; closes.len()])
    }

    #[test]
    fn momentum_needs_window_plus_one_bars() {
        let bars = flat_volume(&[100.0, 101.0, 102.0, 103.0, 104.0]);
        assert_eq!(
            price_momentum(&bars, 5),
            Err(Error::InsufficientData {
                required: 6,
                got: 5
            })
        );
    }

    #[test]
    fn momentum_measures_change_over_window() {
        let bars = flat_volume(&[100.0, 100.0, 100.0, 100.0, 100.0, 105.0]);
        let m = price_momentum(&bars, 5).unwrap();
        assert!((m - 0.05).abs() < 1e-9);
    }

    #[test]
    fn volume_ratio_is_neutral_on_short_history() {
        let bars = make_bars(&[100.0, 100.0], &[500.0, 1000.0]);
        assert_eq!(volume_ratio(&bars, 5), VOLUME_RATIO_NEUTRAL);
    }

    #[test]
    fn volume_ratio_is_neutral_on_zero_average() {
        let bars = make_bars(&[100.0; 6], &[0.0, 0.0, 0.0, 0.0, 0.0, 2000.0]);
        assert_eq!(volume_ratio(&bars, 5), VOLUME_RATIO_NEUTRAL);
    }

    #[test]
    fn volume_ratio_compares_against_trailing_mean() {
        let bars = make_bars(&[100.0; 6], &[1000.0, 1000.0, 1000.0, 1000.0, 1000.0, 2000.0]);
        let ratio = volume_ratio(&bars, 5);
        assert!((ratio - 2.0).abs() < 1e-9);
    }

    #[test]
    fn rsi_is_neutral_on_short_history() {
        let bars = flat_volume(&[100.0, 101.0, 102.0]);
        assert_eq!(rsi(&bars, 14), RSI_NEUTRAL);
    }

    #[test]
    fn rsi_saturates_on_one_sided_series() {
        let gains = flat_volume(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        assert!((rsi(&gains, 3) - 100.0).abs() < 1e-9);

        let losses = flat_volume(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]);
        assert!(rsi(&losses, 3).abs() < 1e-9);
    }

    #[test]
    fn rsi_stays_in_bounds_on_choppy_series() {
        let bars = flat_volume(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0]);
        let value = rsi(&bars, 3);
        assert!((0.0..=100.0).contains(&value), "rsi out of bounds: {value}");
    }

    #[test]
    fn rsi_is_neutral_on_flat_series() {
        let bars = flat_volume(&[100.0; 10]);
        assert_eq!(rsi(&bars, 3), RSI_NEUTRAL);
    }

    #[test]
    fn sma_averages_last_period_closes() {
        let bars = flat_volume(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!((sma(&bars, 3).unwrap() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn sma_fails_on_short_window() {
        let bars = flat_volume(&[1.0, 2.0]);
        assert_eq!(
            sma(&bars, 20),
            Err(Error::InsufficientData {
                required: 20,
                got: 2
            })
        );
    }

    // Degenerate input: a zero close in the base position must not produce
    // infinities.
    #[test]
    fn momentum_on_zero_base_is_flat() {
        let bars = flat_volume(&[0.0, 0.0, 0.0, 0.0, 0.0, 10.0]);
        assert_eq!(price_momentum(&bars, 5), Ok(0.0));
    }
}
