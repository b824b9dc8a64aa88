//! Relative Strength Index (RSI).
//!
//! Simple (not Wilder) averaging of gains and losses:
//! avg_gain = SMA(max(delta, 0), period), avg_loss = SMA(max(-delta, 0), period)
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//!
//! The first delta has no previous close and counts as 0.
//! Lookback: period - 1.
//! Edge case: avg_loss == 0 → RSI = 100 (including a flat window).

use crate::components::indicator::Indicator;
use crate::domain::Bar;
use crate::error::{ensure_length, Result};
use crate::indicators::sma::sma_of_series;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Result<Self> {
        ensure_length("rsi", period)?;
        Ok(Self {
            period,
            name: format!("rsi_{period}"),
        })
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        rsi_of_series(&closes, self.period)
    }
}

/// RSI of a close series, validating `length`.
pub fn rsi(close: &[f64], length: usize) -> Result<Vec<f64>> {
    ensure_length("rsi", length)?;
    Ok(rsi_of_series(close, length))
}

fn rsi_of_series(close: &[f64], period: usize) -> Vec<f64> {
    let n = close.len();
    let mut gains = vec![0.0; n];
    let mut losses = vec![0.0; n];

    for i in 1..n {
        let delta = close[i] - close[i - 1];
        if delta.is_nan() {
            gains[i] = f64::NAN;
            losses[i] = f64::NAN;
        } else if delta > 0.0 {
            gains[i] = delta;
        } else {
            losses[i] = -delta;
        }
    }

    let avg_gain = sma_of_series(&gains, period);
    let avg_loss = sma_of_series(&losses, period);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(&g, &l)| rsi_from_averages(g, l))
        .collect()
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain.is_nan() || avg_loss.is_nan() {
        f64::NAN
    } else if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars};

    #[test]
    fn rsi_all_gains() {
        let bars = make_bars(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let result = Rsi::new(3).unwrap().compute(&bars);
        assert!(result[1].is_nan());
        assert_approx(result[2], 100.0, 1e-9);
        assert_approx(result[5], 100.0, 1e-9);
    }

    #[test]
    fn rsi_all_losses() {
        let bars = make_bars(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]);
        let result = Rsi::new(3).unwrap().compute(&bars);
        assert_approx(result[3], 0.0, 1e-9);
    }

    #[test]
    fn rsi_flat_window_saturates() {
        let result = rsi(&[50.0; 6], 3).unwrap();
        assert_approx(result[4], 100.0, 1e-9);
    }

    #[test]
    fn rsi_mixed_known_value() {
        // Closes: 44, 44.34, 44.09, 43.61, 44.33
        // Deltas: 0, +0.34, -0.25, -0.48, +0.72
        // Window at index 3 (period 3): gains = 0.34, losses = 0.73
        // RSI = 100 - 100 / (1 + 0.34/0.73)
        let result = rsi(&[44.0, 44.34, 44.09, 43.61, 44.33], 3).unwrap();
        let expected = 100.0 - 100.0 / (1.0 + 0.34 / 0.73);
        assert_approx(result[3], expected, 1e-9);
    }

    #[test]
    fn rsi_first_delta_counts_as_zero() {
        // Window at index 2 covers deltas [0, +1, -1]
        let result = rsi(&[10.0, 11.0, 10.0], 3).unwrap();
        assert_approx(result[2], 50.0, 1e-9);
    }

    #[test]
    fn rsi_bounds() {
        let result = rsi(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0], 3).unwrap();
        for (i, &v) in result.iter().enumerate() {
            if !v.is_nan() {
                assert!((0.0..=100.0).contains(&v), "RSI out of bounds at bar {i}: {v}");
            }
        }
    }

    #[test]
    fn rsi_lookback() {
        assert_eq!(Rsi::new(14).unwrap().lookback(), 13);
    }
}
