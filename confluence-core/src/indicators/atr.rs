//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|)
//! The first bar has no previous close, so TR[0] = high - low.
//! ATR is the trailing SMA of TR (not Wilder smoothing).
//! Lookback: period - 1.

use crate::components::indicator::Indicator;
use crate::domain::Bar;
use crate::error::{ensure_length, Result};
use crate::indicators::sma::sma_of_series;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Result<Self> {
        ensure_length("atr", period)?;
        Ok(Self {
            period,
            name: format!("atr_{period}"),
        })
    }
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        atr_of_bars(bars, self.period)
    }
}

/// Compute the True Range series from bars.
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let range = bar.high - bar.low;
            if i == 0 {
                return range;
            }
            let pc = bars[i - 1].close;
            range.max((bar.high - pc).abs()).max((bar.low - pc).abs())
        })
        .collect()
}

/// ATR over bars, validating `length`.
pub fn atr(bars: &[Bar], length: usize) -> Result<Vec<f64>> {
    ensure_length("atr", length)?;
    Ok(atr_of_bars(bars, length))
}

pub(crate) fn atr_of_bars(bars: &[Bar], period: usize) -> Vec<f64> {
    sma_of_series(&true_range(bars), period)
}
