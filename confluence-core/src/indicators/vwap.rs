//! VWAP: cumulative volume-weighted average price.
//!
//! VWAP[t] = Σ(typical_price * volume)[0..=t] / Σvolume[0..=t]
//! typical_price = (high + low + close) / 3
//!
//! Cumulative from the start of the supplied series. There is no session
//! reset; callers that want per-session VWAP supply one series per session.
//! NaN while cumulative volume is still 0.

use crate::components::indicator::Indicator;
use crate::domain::Bar;
use crate::error::Result;

#[derive(Debug, Clone, Default)]
pub struct Vwap;

impl Vwap {
    pub fn new() -> Self {
        Self
    }
}

impl Indicator for Vwap {
    fn name(&self) -> &str {
        "vwap"
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mut pv = 0.0;
        let mut vol = 0.0;
        bars.iter()
            .map(|bar| {
                pv += bar.typical_price() * bar.volume;
                vol += bar.volume;
                if vol == 0.0 {
                    f64::NAN
                } else {
                    pv / vol
                }
            })
            .collect()
    }
}

/// VWAP over bars. Never fails; returns `Result` for symmetry with the
/// other slice-level indicator functions.
pub fn vwap(bars: &[Bar]) -> Result<Vec<f64>> {
    Ok(Vwap::new().compute(bars))
}
