//! The per-bar feature record consumed by strategies.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::features::patterns::{Candle, PivotLevels};
use crate::features::regime::{Bias, VolState};
use crate::indicators::TrendDirection;

/// Every derived value for one bar.
///
/// Only complete records (no NaN field, SuperTrend seeded) are ever built by
/// the pipeline, so strategies can read fields without warmup checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub bar_index: usize,
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,

    pub ema9: f64,
    pub ema21: f64,
    pub ema50: f64,
    pub ema200: f64,
    pub supertrend: f64,
    pub st_direction: TrendDirection,

    pub atr: f64,
    pub atr_sma: f64,
    pub vol_ratio: f64,
    pub vol_state: VolState,

    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_hist: f64,
    pub adx: f64,
    pub di_plus: f64,
    pub di_minus: f64,

    pub volume_sma: f64,
    pub relative_volume: f64,
    pub volume_spike: bool,
    pub vwap: f64,

    #[serde(flatten)]
    pub pivots: PivotLevels,
    #[serde(flatten)]
    pub candle: Candle,

    pub bullish_candle: bool,
    pub bearish_candle: bool,
    pub bullish_stack: bool,
    pub bearish_stack: bool,
    pub bullish_engulfing: bool,
    pub bearish_engulfing: bool,
    pub hammer: bool,
    pub shooting_star: bool,
    pub break_above: bool,
    pub break_below: bool,
    pub ema_cross_up: bool,
    pub ema_cross_down: bool,

    /// Lowest low of the last 5 bars, current included.
    pub swing_low: f64,
    /// Highest high of the last 5 bars, current included.
    pub swing_high: f64,

    pub mtf_score: i32,
    pub bias: Bias,
}

impl FeatureRecord {
    /// No numeric field is NaN.
    pub fn is_complete(&self) -> bool {
        let p = &self.pivots;
        let c = &self.candle;
        [
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
            self.ema9,
            self.ema21,
            self.ema50,
            self.ema200,
            self.supertrend,
            self.atr,
            self.atr_sma,
            self.vol_ratio,
            self.rsi,
            self.macd,
            self.macd_signal,
            self.macd_hist,
            self.adx,
            self.di_plus,
            self.di_minus,
            self.volume_sma,
            self.relative_volume,
            self.vwap,
            p.pdh,
            p.pdl,
            p.pdc,
            p.pivot,
            p.r1,
            p.r2,
            p.s1,
            p.s2,
            c.body,
            c.range,
            c.upper_wick,
            c.lower_wick,
            self.swing_low,
            self.swing_high,
        ]
        .iter()
        .all(|v| !v.is_nan())
    }

    pub fn st_bullish(&self) -> bool {
        self.st_direction == TrendDirection::Up
    }

    pub fn st_bearish(&self) -> bool {
        self.st_direction == TrendDirection::Down
    }

    /// EMA stack in the bias direction.
    pub fn stack_agrees(&self, bias: Bias) -> bool {
        match bias {
            Bias::Bullish => self.bullish_stack,
            Bias::Bearish => self.bearish_stack,
            Bias::Neutral => false,
        }
    }

    /// SuperTrend direction matches the bias.
    pub fn supertrend_agrees(&self, bias: Bias) -> bool {
        bias.direction() == Some(self.st_direction)
    }

    /// MACD line on the bias side of its signal line.
    pub fn macd_agrees(&self, bias: Bias) -> bool {
        match bias {
            Bias::Bullish => self.macd > self.macd_signal,
            Bias::Bearish => self.macd < self.macd_signal,
            Bias::Neutral => false,
        }
    }

    /// Engulfing or hammer (bullish) / shooting star (bearish).
    pub fn pattern_agrees(&self, bias: Bias) -> bool {
        match bias {
            Bias::Bullish => self.bullish_engulfing || self.hammer,
            Bias::Bearish => self.bearish_engulfing || self.shooting_star,
            Bias::Neutral => false,
        }
    }

    pub fn breakout_agrees(&self, bias: Bias) -> bool {
        match bias {
            Bias::Bullish => self.break_above,
            Bias::Bearish => self.break_below,
            Bias::Neutral => false,
        }
    }
}

/// A complete bullish record: stack, SuperTrend, MACD, RSI 55 and a volume
/// spike all agree. Scores 68 with the default weights.
#[cfg(test)]
pub(crate) fn bullish_fixture() -> FeatureRecord {
    use crate::domain::Bar;

    let timestamp = chrono::NaiveDate::from_ymd_opt(2024, 3, 15)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let bar = Bar {
        timestamp,
        open: 108.0,
        high: 111.0,
        low: 107.5,
        close: 110.0,
        volume: 2000.0,
    };
    let prev = Bar {
        timestamp: timestamp - chrono::Duration::days(1),
        open: 106.0,
        high: 109.0,
        low: 105.0,
        close: 108.0,
        volume: 1000.0,
    };
    FeatureRecord {
        bar_index: 100,
        timestamp,
        open: bar.open,
        high: bar.high,
        low: bar.low,
        close: bar.close,
        volume: bar.volume,
        ema9: 108.0,
        ema21: 106.0,
        ema50: 104.0,
        ema200: 100.0,
        supertrend: 104.0,
        st_direction: TrendDirection::Up,
        atr: 2.0,
        atr_sma: 2.0,
        vol_ratio: 1.0,
        vol_state: VolState::Normal,
        rsi: 55.0,
        macd: 1.0,
        macd_signal: 0.5,
        macd_hist: 0.5,
        adx: 25.0,
        di_plus: 30.0,
        di_minus: 15.0,
        volume_sma: 1000.0,
        relative_volume: 2.0,
        volume_spike: true,
        vwap: 105.0,
        pivots: PivotLevels::from_prior(&prev),
        candle: Candle::of(&bar),
        bullish_candle: true,
        bearish_candle: false,
        bullish_stack: true,
        bearish_stack: false,
        bullish_engulfing: false,
        bearish_engulfing: false,
        hammer: false,
        shooting_star: false,
        break_above: false,
        break_below: false,
        ema_cross_up: false,
        ema_cross_down: false,
        swing_low: 105.0,
        swing_high: 111.0,
        mtf_score: 40,
        bias: Bias::Bullish,
    }
}

/// Mirror image of `bullish_fixture` around 110 (RSI 45).
#[cfg(test)]
pub(crate) fn bearish_fixture() -> FeatureRecord {
    let mut r = bullish_fixture();
    let mirror = |x: f64| 220.0 - x;
    r.open = mirror(108.0);
    r.close = mirror(110.0);
    r.high = mirror(107.5);
    r.low = mirror(111.0);
    r.ema9 = mirror(108.0);
    r.ema21 = mirror(106.0);
    r.ema50 = mirror(104.0);
    r.ema200 = mirror(100.0);
    r.supertrend = mirror(104.0);
    r.st_direction = TrendDirection::Down;
    r.rsi = 45.0;
    r.macd = -1.0;
    r.macd_signal = -0.5;
    r.candle = Candle {
        upper_wick: r.candle.lower_wick,
        lower_wick: r.candle.upper_wick,
        ..r.candle
    };
    r.bullish_candle = false;
    r.bearish_candle = true;
    r.bullish_stack = false;
    r.bearish_stack = true;
    r.swing_low = mirror(111.0);
    r.swing_high = mirror(105.0);
    r.mtf_score = -40;
    r.bias = Bias::Bearish;
    r
}
