//! Market regime labels: EMA stack, multi-timeframe score, bias, volatility.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::indicators::TrendDirection;

/// Score contribution of a bullish/bearish EMA stack.
pub const STACK_WEIGHT: i32 = 25;
/// Score contribution of the SuperTrend direction.
pub const SUPERTREND_WEIGHT: i32 = 15;
/// |score| at which the bias leaves NEUTRAL.
pub const BIAS_THRESHOLD: i32 = 30;

/// Directional bias derived from the MTF score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Bias {
    Bullish,
    Bearish,
    Neutral,
}

impl Bias {
    pub fn from_score(score: i32) -> Self {
        if score >= BIAS_THRESHOLD {
            Self::Bullish
        } else if score <= -BIAS_THRESHOLD {
            Self::Bearish
        } else {
            Self::Neutral
        }
    }

    /// The trend direction this bias agrees with, if any.
    pub fn direction(self) -> Option<TrendDirection> {
        match self {
            Self::Bullish => Some(TrendDirection::Up),
            Self::Bearish => Some(TrendDirection::Down),
            Self::Neutral => None,
        }
    }
}

/// Volatility regime from ATR relative to its own 50-bar average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolState {
    UltraLow,
    Low,
    Normal,
    High,
    Extreme,
}

impl VolState {
    /// Buckets are applied in order, later checks overriding earlier ones:
    /// ULTRA_LOW (< 0.4), LOW ([0.4, 0.7)), HIGH (> 1.5), EXTREME (> 2.5).
    /// Anything else (including NaN) is NORMAL.
    pub fn from_ratio(ratio: f64) -> Self {
        let mut state = Self::Normal;
        if ratio < 0.4 {
            state = Self::UltraLow;
        }
        if (0.4..0.7).contains(&ratio) {
            state = Self::Low;
        }
        if ratio > 1.5 {
            state = Self::High;
        }
        if ratio > 2.5 {
            state = Self::Extreme;
        }
        state
    }

    /// ULTRA_LOW and EXTREME suppress signal evaluation.
    pub fn is_veto(self) -> bool {
        matches!(self, Self::UltraLow | Self::Extreme)
    }
}

impl fmt::Display for VolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UltraLow => "ULTRA_LOW",
            Self::Low => "LOW",
            Self::Normal => "NORMAL",
            Self::High => "HIGH",
            Self::Extreme => "EXTREME",
        })
    }
}

/// EMA9 > EMA21 > EMA50 and close > EMA200.
pub fn bullish_stack(close: f64, ema9: f64, ema21: f64, ema50: f64, ema200: f64) -> bool {
    ema9 > ema21 && ema21 > ema50 && close > ema200
}

/// EMA9 < EMA21 < EMA50 and close < EMA200.
pub fn bearish_stack(close: f64, ema9: f64, ema21: f64, ema50: f64, ema200: f64) -> bool {
    ema9 < ema21 && ema21 < ema50 && close < ema200
}

/// Signed confluence score: ±25 for the EMA stack, ±15 for SuperTrend.
pub fn mtf_score(
    bullish_stack: bool,
    bearish_stack: bool,
    direction: Option<TrendDirection>,
) -> i32 {
    let mut score = 0;
    if bullish_stack {
        score += STACK_WEIGHT;
    }
    if bearish_stack {
        score -= STACK_WEIGHT;
    }
    match direction {
        Some(TrendDirection::Up) => score += SUPERTREND_WEIGHT,
        Some(TrendDirection::Down) => score -= SUPERTREND_WEIGHT,
        None => {}
    }
    score
}
