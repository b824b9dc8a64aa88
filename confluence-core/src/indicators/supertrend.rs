//! SuperTrend: ATR-based trailing band with a discrete trend direction.
//!
//! Inherently sequential/stateful. With hl2 = (high + low) / 2:
//! upper = hl2 + mult * ATR, lower = hl2 - mult * ATR
//!
//! Seed: on the first bar with a defined ATR the band is the upper band and
//! the direction is DOWN.
//!
//! Each later bar picks its regime from the previous close and band:
//! - prev close <= prev band (down regime): flip UP when close > upper, band =
//!   lower; otherwise stay DOWN with band = min(upper, prev band).
//! - prev close > prev band (up regime): flip DOWN when close < lower, band =
//!   upper; otherwise stay UP with band = max(lower, prev band).
//!
//! Lookback: period - 1 (same as ATR).

use serde::{Deserialize, Serialize};

use crate::components::indicator::Indicator;
use crate::domain::Bar;
use crate::error::{ensure_length, ensure_positive, Result};
use crate::indicators::atr::atr_of_bars;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendDirection {
    Up,
    Down,
}

impl TrendDirection {
    /// +1 for UP, -1 for DOWN.
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Up => 1.0,
            Self::Down => -1.0,
        }
    }

    pub fn from_f64(value: f64) -> Option<Self> {
        if value > 0.0 {
            Some(Self::Up)
        } else if value < 0.0 {
            Some(Self::Down)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SupertrendOutput {
    pub band: Vec<f64>,
    pub direction: Vec<Option<TrendDirection>>,
}

/// Which SuperTrend output to expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupertrendLine {
    Band,
    /// +1 / -1, NaN during warmup.
    Direction,
}

#[derive(Debug, Clone)]
pub struct Supertrend {
    period: usize,
    multiplier: f64,
    output: SupertrendLine,
    name: String,
}

impl Supertrend {
    fn with_output(period: usize, multiplier: f64, output: SupertrendLine) -> Result<Self> {
        ensure_length("st_length", period)?;
        ensure_positive("st_mult", multiplier)?;
        let prefix = match output {
            SupertrendLine::Band => "supertrend",
            SupertrendLine::Direction => "supertrend_dir",
        };
        Ok(Self {
            period,
            multiplier,
            output,
            name: format!("{prefix}_{period}_{multiplier}"),
        })
    }

    pub fn band(period: usize, multiplier: f64) -> Result<Self> {
        Self::with_output(period, multiplier, SupertrendLine::Band)
    }

    pub fn direction(period: usize, multiplier: f64) -> Result<Self> {
        Self::with_output(period, multiplier, SupertrendLine::Direction)
    }
}

impl Indicator for Supertrend {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let out = supertrend_of_bars(bars, self.period, self.multiplier);
        match self.output {
            SupertrendLine::Band => out.band,
            SupertrendLine::Direction => out
                .direction
                .iter()
                .map(|d| d.map_or(f64::NAN, TrendDirection::as_f64))
                .collect(),
        }
    }
}

/// SuperTrend over bars, validating `length` and `multiplier`.
pub fn supertrend(bars: &[Bar], length: usize, multiplier: f64) -> Result<SupertrendOutput> {
    ensure_length("st_length", length)?;
    ensure_positive("st_mult", multiplier)?;
    Ok(supertrend_of_bars(bars, length, multiplier))
}

fn supertrend_of_bars(bars: &[Bar], period: usize, multiplier: f64) -> SupertrendOutput {
    let n = bars.len();
    let mut band = vec![f64::NAN; n];
    let mut direction = vec![None; n];

    let atr = atr_of_bars(bars, period);

    let start = match atr.iter().position(|v| !v.is_nan()) {
        Some(idx) => idx,
        None => return SupertrendOutput { band, direction },
    };

    band[start] = bars[start].hl2() + multiplier * atr[start];
    direction[start] = Some(TrendDirection::Down);

    for i in (start + 1)..n {
        if atr[i].is_nan() {
            break;
        }
        let hl2 = bars[i].hl2();
        let upper = hl2 + multiplier * atr[i];
        let lower = hl2 - multiplier * atr[i];
        let close = bars[i].close;
        let prev_band = band[i - 1];

        let (next_band, next_dir) = if bars[i - 1].close <= prev_band {
            if close > upper {
                (lower, TrendDirection::Up)
            } else {
                (upper.min(prev_band), TrendDirection::Down)
            }
        } else if close < lower {
            (upper, TrendDirection::Down)
        } else {
            (lower.max(prev_band), TrendDirection::Up)
        };

        band[i] = next_band;
        direction[i] = Some(next_dir);
    }

    SupertrendOutput { band, direction }
}
