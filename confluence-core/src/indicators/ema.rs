//! Exponential Moving Average (EMA).
//!
//! Unadjusted recurrence with no warmup gap:
//! EMA[0] = x[0]
//! EMA[t] = x[t] * alpha + EMA[t-1] * (1 - alpha), alpha = 2 / (length + 1)
//! Lookback: 0.

use crate::components::indicator::Indicator;
use crate::domain::Bar;
use crate::error::{ensure_length, Result};

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Result<Self> {
        ensure_length("ema", period)?;
        Ok(Self {
            period,
            name: format!("ema_{period}"),
        })
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        ema_of_series(&closes, self.period)
    }
}

/// EMA of an arbitrary series, validating `length`.
pub fn ema(values: &[f64], length: usize) -> Result<Vec<f64>> {
    ensure_length("ema", length)?;
    Ok(ema_of_series(values, length))
}

/// EMA of an arbitrary series. Used by composed indicators (MACD).
///
/// Leading NaNs are skipped and the recurrence is seeded on the first defined
/// value. A NaN after the seed taints every later value.
pub(crate) fn ema_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    let start = match values.iter().position(|v| !v.is_nan()) {
        Some(idx) => idx,
        None => return result,
    };

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut prev = values[start];
    result[start] = prev;

    for i in (start + 1)..n {
        if values[i].is_nan() {
            return result;
        }
        let ema = values[i] * alpha + prev * (1.0 - alpha);
        result[i] = ema;
        prev = ema;
    }

    result
}
