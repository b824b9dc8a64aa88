//! Candle geometry and small-lookback structural patterns.
//!
//! Boolean patterns are false wherever their lookback is not yet available.
//! Numeric levels (pivots, swing extremes) are NaN there.

use serde::{Deserialize, Serialize};

use crate::domain::Bar;

/// Bars before the current one scanned for a breakout.
pub const BREAKOUT_LOOKBACK: usize = 5;
/// Bars, including the current one, scanned for swing extremes.
pub const SWING_LOOKBACK: usize = 5;

/// Body and wick sizes of a single candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub body: f64,
    pub range: f64,
    pub upper_wick: f64,
    pub lower_wick: f64,
}

impl Candle {
    pub fn of(bar: &Bar) -> Self {
        Self {
            body: (bar.close - bar.open).abs(),
            range: bar.high - bar.low,
            upper_wick: bar.high - bar.open.max(bar.close),
            lower_wick: bar.open.min(bar.close) - bar.low,
        }
    }

    /// Long lower wick, small upper wick.
    pub fn is_hammer(&self) -> bool {
        self.lower_wick > self.body * 2.0 && self.upper_wick < self.body * 0.5
    }

    /// Long upper wick, small lower wick.
    pub fn is_shooting_star(&self) -> bool {
        self.upper_wick > self.body * 2.0 && self.lower_wick < self.body * 0.5
    }
}

pub fn is_bullish_candle(bar: &Bar) -> bool {
    bar.close > bar.open
}

pub fn is_bearish_candle(bar: &Bar) -> bool {
    bar.close < bar.open
}

/// Bullish candle whose body engulfs the previous bearish body.
pub fn bullish_engulfing(prev: &Bar, bar: &Bar) -> bool {
    is_bullish_candle(bar)
        && is_bearish_candle(prev)
        && bar.close > prev.open
        && bar.open < prev.close
}

/// Bearish candle whose body engulfs the previous bullish body.
pub fn bearish_engulfing(prev: &Bar, bar: &Bar) -> bool {
    is_bearish_candle(bar)
        && is_bullish_candle(prev)
        && bar.close < prev.open
        && bar.open > prev.close
}

/// Engulfing flags for a whole series as (bullish, bearish).
pub fn engulfing(bars: &[Bar]) -> (Vec<bool>, Vec<bool>) {
    let mut bullish = vec![false; bars.len()];
    let mut bearish = vec![false; bars.len()];
    for i in 1..bars.len() {
        bullish[i] = bullish_engulfing(&bars[i - 1], &bars[i]);
        bearish[i] = bearish_engulfing(&bars[i - 1], &bars[i]);
    }
    (bullish, bearish)
}

/// Close beyond the prior `lookback` bars' high / low, excluding the current
/// bar. Returns (above, below).
pub fn breakouts(bars: &[Bar], lookback: usize) -> (Vec<bool>, Vec<bool>) {
    let n = bars.len();
    let mut above = vec![false; n];
    let mut below = vec![false; n];
    if lookback == 0 {
        return (above, below);
    }
    for i in lookback..n {
        let window = &bars[(i - lookback)..i];
        let high = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let low = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        above[i] = bars[i].close > high;
        below[i] = bars[i].close < low;
    }
    (above, below)
}

/// Lowest low and highest high of the last `lookback` bars including the
/// current one. Returns (lows, highs).
pub fn swing_extremes(bars: &[Bar], lookback: usize) -> (Vec<f64>, Vec<f64>) {
    let n = bars.len();
    let mut lows = vec![f64::NAN; n];
    let mut highs = vec![f64::NAN; n];
    if lookback == 0 || n < lookback {
        return (lows, highs);
    }
    for i in (lookback - 1)..n {
        let window = &bars[(i + 1 - lookback)..=i];
        lows[i] = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        highs[i] = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    }
    (lows, highs)
}

/// Previous-bar levels and classic floor-trader pivots.
///
/// Computed from the single prior bar, so on intraday data this is a one-bar
/// lag rather than a true session pivot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotLevels {
    pub pdh: f64,
    pub pdl: f64,
    pub pdc: f64,
    pub pivot: f64,
    pub r1: f64,
    pub r2: f64,
    pub s1: f64,
    pub s2: f64,
}

impl PivotLevels {
    pub fn from_prior(prev: &Bar) -> Self {
        let (pdh, pdl, pdc) = (prev.high, prev.low, prev.close);
        let pivot = (pdh + pdl + pdc) / 3.0;
        Self {
            pdh,
            pdl,
            pdc,
            pivot,
            r1: 2.0 * pivot - pdl,
            r2: pivot + (pdh - pdl),
            s1: 2.0 * pivot - pdh,
            s2: pivot - (pdh - pdl),
        }
    }

    /// All levels NaN; used for the first bar.
    pub fn undefined() -> Self {
        Self {
            pdh: f64::NAN,
            pdl: f64::NAN,
            pdc: f64::NAN,
            pivot: f64::NAN,
            r1: f64::NAN,
            r2: f64::NAN,
            s1: f64::NAN,
            s2: f64::NAN,
        }
    }

    pub fn is_defined(&self) -> bool {
        !self.pivot.is_nan()
    }
}

pub fn pivots(bars: &[Bar]) -> Vec<PivotLevels> {
    (0..bars.len())
        .map(|i| {
            if i == 0 {
                PivotLevels::undefined()
            } else {
                PivotLevels::from_prior(&bars[i - 1])
            }
        })
        .collect()
}

/// Fast series crossing the slow one. Returns (cross_up, cross_down).
///
/// Up: fast was below slow on the previous bar and is above it now.
pub fn crossovers(fast: &[f64], slow: &[f64]) -> (Vec<bool>, Vec<bool>) {
    let n = fast.len().min(slow.len());
    let mut up = vec![false; n];
    let mut down = vec![false; n];
    for i in 1..n {
        up[i] = fast[i - 1] < slow[i - 1] && fast[i] > slow[i];
        down[i] = fast[i - 1] > slow[i - 1] && fast[i] < slow[i];
    }
    (up, down)
}
