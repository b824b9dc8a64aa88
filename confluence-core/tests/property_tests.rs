//! Property tests for indicator and engine invariants.
//!
//! Uses proptest to verify:
//! 1. EMA and SMA of length 1 are the identity
//! 2. RSI stays in [0, 100] and saturates at 100 without losses
//! 3. ATR is never negative
//! 4. SuperTrend only tightens within a regime and flips on a strict cross
//! 5. Quality score stays in [0, 100] for any flag combination
//! 6. Reward:risk is always finite and never NaN

use chrono::NaiveDate;
use confluence_core::config::EngineConfig;
use confluence_core::domain::Bar;
use confluence_core::engine::{quality_score, trade_levels, PositionSide};
use confluence_core::features::{Bias, Candle, FeatureRecord, PivotLevels, VolState};
use confluence_core::indicators::{atr, ema, rsi, sma, supertrend, TrendDirection};
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_series() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0..1000.0_f64, 1..120)
}

/// Sane bars built from (close, up-wick, down-wick, open offset) tuples.
fn arb_bars() -> impl Strategy<Value = Vec<Bar>> {
    prop::collection::vec(
        (10.0..500.0_f64, 0.0..5.0_f64, 0.0..5.0_f64, -3.0..3.0_f64),
        2..120,
    )
    .prop_map(|rows| {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        rows.into_iter()
            .enumerate()
            .map(|(i, (close, up, down, offset))| {
                let open = (close + offset).max(1.0);
                Bar {
                    timestamp: base + chrono::Duration::days(i as i64),
                    open,
                    high: open.max(close) + up,
                    low: open.min(close) - down,
                    close,
                    volume: 1000.0,
                }
            })
            .collect()
    })
}

fn base_record() -> FeatureRecord {
    let ts = NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let bar = Bar {
        timestamp: ts,
        open: 100.0,
        high: 102.0,
        low: 99.0,
        close: 101.0,
        volume: 1000.0,
    };
    FeatureRecord {
        bar_index: 0,
        timestamp: ts,
        open: bar.open,
        high: bar.high,
        low: bar.low,
        close: bar.close,
        volume: bar.volume,
        ema9: 100.0,
        ema21: 100.0,
        ema50: 100.0,
        ema200: 100.0,
        supertrend: 100.0,
        st_direction: TrendDirection::Up,
        atr: 1.0,
        atr_sma: 1.0,
        vol_ratio: 1.0,
        vol_state: VolState::Normal,
        rsi: 50.0,
        macd: 0.0,
        macd_signal: 0.0,
        macd_hist: 0.0,
        adx: 20.0,
        di_plus: 20.0,
        di_minus: 20.0,
        volume_sma: 1000.0,
        relative_volume: 1.0,
        volume_spike: false,
        vwap: 100.0,
        pivots: PivotLevels::from_prior(&bar),
        candle: Candle::of(&bar),
        bullish_candle: true,
        bearish_candle: false,
        bullish_stack: false,
        bearish_stack: false,
        bullish_engulfing: false,
        bearish_engulfing: false,
        hammer: false,
        shooting_star: false,
        break_above: false,
        break_below: false,
        ema_cross_up: false,
        ema_cross_down: false,
        swing_low: 99.0,
        swing_high: 102.0,
        mtf_score: 0,
        bias: Bias::Neutral,
    }
}

// ── 1. Length-1 identity ─────────────────────────────────────────────

proptest! {
    #[test]
    fn ema_length_one_is_identity(series in arb_series()) {
        prop_assert_eq!(ema(&series, 1).unwrap(), series);
    }

    #[test]
    fn sma_length_one_is_identity(series in arb_series()) {
        prop_assert_eq!(sma(&series, 1).unwrap(), series);
    }
}

// ── 2. RSI bounds ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn rsi_is_bounded(series in arb_series(), period in 2usize..30) {
        for v in rsi(&series, period).unwrap() {
            prop_assert!(v.is_nan() || (0.0..=100.0).contains(&v), "rsi out of range: {}", v);
        }
    }

    #[test]
    fn rsi_without_losses_is_100(
        start in 1.0..100.0_f64,
        steps in prop::collection::vec(0.0..5.0_f64, 20..60),
    ) {
        let mut series = vec![start];
        for step in steps {
            let last = *series.last().unwrap();
            series.push(last + step);
        }
        let values = rsi(&series, 14).unwrap();
        for v in values.iter().skip(13) {
            prop_assert_eq!(*v, 100.0);
        }
    }
}

// ── 3. ATR non-negative ──────────────────────────────────────────────

proptest! {
    #[test]
    fn atr_is_non_negative(bars in arb_bars(), period in 1usize..20) {
        for v in atr(&bars, period).unwrap() {
            prop_assert!(v.is_nan() || v >= 0.0);
        }
    }
}

// ── 4. SuperTrend ratchet ────────────────────────────────────────────

proptest! {
    /// Within the regime set by the previous close, the band never loosens
    /// and a flip needs a strict cross of the candidate band.
    #[test]
    fn supertrend_ratchets_within_regime(bars in arb_bars(), mult in 0.5..4.0_f64) {
        let period = 5;
        let out = supertrend(&bars, period, mult).unwrap();
        let atr_values = atr(&bars, period).unwrap();

        for i in period..bars.len() {
            let (Some(dir), prev_band) = (out.direction[i], out.band[i - 1]) else {
                continue;
            };
            let upper = bars[i].hl2() + mult * atr_values[i];
            let lower = bars[i].hl2() - mult * atr_values[i];
            let close = bars[i].close;
            if bars[i - 1].close <= prev_band {
                match dir {
                    TrendDirection::Up => prop_assert!(close > upper),
                    TrendDirection::Down => prop_assert!(out.band[i] <= prev_band),
                }
            } else {
                match dir {
                    TrendDirection::Down => prop_assert!(close < lower),
                    TrendDirection::Up => prop_assert!(out.band[i] >= prev_band),
                }
            }
        }
    }
}

// ── 5. Quality score bounds ──────────────────────────────────────────

proptest! {
    #[test]
    fn quality_score_is_bounded(
        flags in prop::collection::vec(any::<bool>(), 9),
        mtf in -200i32..200,
        rsi_value in 0.0..100.0_f64,
        macd in -5.0..5.0_f64,
        vol in prop::sample::select(vec![
            VolState::UltraLow, VolState::Low, VolState::Normal, VolState::High, VolState::Extreme,
        ]),
    ) {
        let mut r = base_record();
        r.bullish_stack = flags[0];
        r.bearish_stack = flags[1];
        r.volume_spike = flags[2];
        r.hammer = flags[3];
        r.shooting_star = flags[4];
        r.bullish_engulfing = flags[5];
        r.break_above = flags[6];
        r.break_below = flags[7];
        r.st_direction = if flags[8] { TrendDirection::Up } else { TrendDirection::Down };
        r.mtf_score = mtf;
        r.bias = Bias::from_score(mtf);
        r.rsi = rsi_value;
        r.macd = macd;
        r.vol_state = vol;
        prop_assert!(quality_score(&r) <= 100);
    }
}

// ── 6. Reward:risk never NaN ─────────────────────────────────────────

proptest! {
    #[test]
    fn reward_risk_is_finite(
        close in 10.0..500.0_f64,
        atr_value in 0.0..10.0_f64,
        swing_offset in -10.0..10.0_f64,
        buffer in 0.0..1.0_f64,
        long in any::<bool>(),
    ) {
        let mut r = base_record();
        r.close = close;
        r.atr = atr_value;
        r.swing_low = close + swing_offset;
        r.swing_high = close + swing_offset;
        let config = EngineConfig { sl_buffer: buffer, ..Default::default() };
        let side = if long { PositionSide::Long } else { PositionSide::Short };
        let levels = trade_levels(&r, side, &config);
        prop_assert!(levels.reward_risk.is_finite());
        prop_assert!(levels.reward_risk >= 0.0);
    }
}

#[test]
fn reward_risk_zero_when_stop_equals_close() {
    let mut r = base_record();
    r.atr = 0.0;
    r.swing_low = r.close;
    r.swing_high = r.close;
    let config = EngineConfig::default();
    for side in [PositionSide::Long, PositionSide::Short] {
        let levels = trade_levels(&r, side, &config);
        assert_eq!(levels.stop_loss, r.close);
        assert_eq!(levels.reward_risk, 0.0);
    }
}
