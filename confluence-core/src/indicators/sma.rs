//! Simple Moving Average (SMA).
//!
//! Arithmetic mean of the trailing `period` values.
//! Lookback: period - 1 (first valid value at index period-1).
//! A NaN anywhere in the window makes that value NaN.

use crate::components::indicator::Indicator;
use crate::domain::Bar;
use crate::error::{ensure_length, Result};

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Result<Self> {
        ensure_length("sma", period)?;
        Ok(Self {
            period,
            name: format!("sma_{period}"),
        })
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        sma_of_series(&closes, self.period)
    }
}

/// SMA of an arbitrary series, validating `length`.
pub fn sma(values: &[f64], length: usize) -> Result<Vec<f64>> {
    ensure_length("sma", length)?;
    Ok(sma_of_series(values, length))
}

/// Rolling mean. Each window is summed directly so a window never inherits
/// rounding error from the ones before it.
pub(crate) fn sma_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period {
        return result;
    }

    for i in (period - 1)..n {
        let window = &values[(i + 1 - period)..=i];
        result[i] = window.iter().sum::<f64>() / period as f64;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn sma_5_basic() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0]);
        let result = Sma::new(5).unwrap().compute(&bars);

        assert_eq!(result.len(), 7);
        for (i, v) in result.iter().enumerate().take(4) {
            assert!(v.is_nan(), "expected NaN at index {i}");
        }
        assert_approx(result[4], 12.0, DEFAULT_EPSILON);
        assert_approx(result[5], 13.0, DEFAULT_EPSILON);
        assert_approx(result[6], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_1_is_close() {
        let bars = make_bars(&[100.0, 200.0, 300.0]);
        let result = Sma::new(1).unwrap().compute(&bars);
        assert_eq!(result, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn sma_nan_propagation() {
        let result = sma(&[10.0, 11.0, f64::NAN, 13.0, 14.0, 15.0], 3).unwrap();
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
        assert!(result[4].is_nan());
        assert_approx(result[5], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_lookback() {
        assert_eq!(Sma::new(20).unwrap().lookback(), 19);
        assert_eq!(Sma::new(1).unwrap().lookback(), 0);
    }

    #[test]
    fn sma_too_few_values() {
        let result = sma(&[10.0, 11.0], 5).unwrap();
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn sma_zero_length_is_invalid() {
        assert!(sma(&[1.0], 0).is_err());
    }
}
