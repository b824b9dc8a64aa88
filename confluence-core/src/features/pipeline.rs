//! Feature aggregator: bars in, one `FeatureRecord` per bar index out.
//!
//! Indicator series are computed in parallel (they only share read-only
//! bars), bar-structure columns are computed alongside them, and records are
//! assembled by index once both are done. Records inside the warm-up window,
//! or with any NaN field, are never handed out.

use chrono::NaiveDateTime;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::components::indicator::{compute_warmup, precompute_indicators, Indicator, IndicatorValues};
use crate::config::IndicatorConfig;
use crate::domain::bar::column;
use crate::domain::{validate_series, Bar, FeatureHash};
use crate::error::Result;
use crate::features::patterns::{
    breakouts, crossovers, engulfing, is_bearish_candle, is_bullish_candle, pivots,
    swing_extremes, Candle, PivotLevels, BREAKOUT_LOOKBACK, SWING_LOOKBACK,
};
use crate::features::record::FeatureRecord;
use crate::features::regime::{bearish_stack, bullish_stack, mtf_score, Bias, VolState};
use crate::indicators::sma::sma_of_series;
use crate::indicators::{Adx, Atr, Ema, Macd, Rsi, Supertrend, TrendDirection, Vwap};

/// DMI/ADX period.
pub const ADX_PERIOD: usize = 14;
/// SMA length of ATR used for the volatility ratio.
pub const ATR_RATIO_LENGTH: usize = 50;

/// Names of the indicator series the pipeline reads back.
#[derive(Debug, Clone)]
struct SeriesKeys {
    ema9: String,
    ema21: String,
    ema50: String,
    ema200: String,
    supertrend: String,
    st_direction: String,
    atr: String,
    rsi: String,
    macd: String,
    macd_signal: String,
    macd_hist: String,
    adx: String,
    di_plus: String,
    di_minus: String,
    vwap: String,
}

/// Builds feature sets for a fixed indicator configuration.
pub struct FeaturePipeline {
    config: IndicatorConfig,
    indicators: Vec<Box<dyn Indicator>>,
    keys: SeriesKeys,
    warmup: usize,
}

impl std::fmt::Debug for FeaturePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeaturePipeline")
            .field("config", &self.config)
            .field("indicators", &self.indicators.len())
            .field("warmup", &self.warmup)
            .finish()
    }
}

impl FeaturePipeline {
    pub fn new(config: IndicatorConfig) -> Result<Self> {
        config.validate()?;
        let c = &config;

        let indicators: Vec<Box<dyn Indicator>> = vec![
            Box::new(Ema::new(c.ema9)?),
            Box::new(Ema::new(c.ema21)?),
            Box::new(Ema::new(c.ema50)?),
            Box::new(Ema::new(c.ema200)?),
            Box::new(Supertrend::band(c.st_length, c.st_mult)?),
            Box::new(Supertrend::direction(c.st_length, c.st_mult)?),
            Box::new(Atr::new(c.atr_period)?),
            Box::new(Rsi::new(c.rsi_period)?),
            Box::new(Macd::line(c.macd_fast, c.macd_slow, c.macd_signal)?),
            Box::new(Macd::signal(c.macd_fast, c.macd_slow, c.macd_signal)?),
            Box::new(Macd::histogram(c.macd_fast, c.macd_slow, c.macd_signal)?),
            Box::new(Adx::new(ADX_PERIOD)?),
            Box::new(Adx::plus_di(ADX_PERIOD)?),
            Box::new(Adx::minus_di(ADX_PERIOD)?),
            Box::new(Vwap::new()),
        ];
        let name = |i: usize| indicators[i].name().to_string();
        let keys = SeriesKeys {
            ema9: name(0),
            ema21: name(1),
            ema50: name(2),
            ema200: name(3),
            supertrend: name(4),
            st_direction: name(5),
            atr: name(6),
            rsi: name(7),
            macd: name(8),
            macd_signal: name(9),
            macd_hist: name(10),
            adx: name(11),
            di_plus: name(12),
            di_minus: name(13),
            vwap: name(14),
        };

        let warmup = [
            compute_warmup(&indicators),
            c.atr_period - 1 + ATR_RATIO_LENGTH - 1,
            c.vol_sma - 1,
            SWING_LOOKBACK - 1,
            1, // pivots need a prior bar
        ]
        .into_iter()
        .max()
        .unwrap_or(0);

        Ok(Self {
            config,
            indicators,
            keys,
            warmup,
        })
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// Index of the first bar that can carry a complete record.
    pub fn warmup(&self) -> usize {
        self.warmup
    }

    /// Compute every feature for `bars`.
    ///
    /// Fails only on an invalid series; a series too short to leave warm-up
    /// yields a feature set with no complete records.
    pub fn compute<'a>(&self, bars: &'a [Bar]) -> Result<FeatureSet<'a>> {
        validate_series(bars)?;

        let (values, structure) = rayon::join(
            || precompute_indicators(bars, &self.indicators),
            || Structure::compute(bars, self.config.vol_sma),
        );
        let columns = Columns::derive(bars, &values, &self.keys, structure, &self.config);

        debug!(
            bars = bars.len(),
            warmup = self.warmup,
            indicators = values.len(),
            "feature pipeline assembled"
        );
        if bars.len() <= self.warmup {
            warn!(
                bars = bars.len(),
                warmup = self.warmup,
                "series does not leave warm-up; no complete feature records"
            );
        }

        Ok(FeatureSet {
            bars,
            warmup: self.warmup,
            keys: self.keys.clone(),
            values,
            columns,
        })
    }
}

/// Columns that depend only on raw bars.
#[derive(Debug)]
struct Structure {
    candles: Vec<Candle>,
    bullish_engulfing: Vec<bool>,
    bearish_engulfing: Vec<bool>,
    break_above: Vec<bool>,
    break_below: Vec<bool>,
    swing_low: Vec<f64>,
    swing_high: Vec<f64>,
    pivots: Vec<PivotLevels>,
    volume_sma: Vec<f64>,
}

impl Structure {
    fn compute(bars: &[Bar], vol_sma: usize) -> Self {
        let (bullish_engulfing, bearish_engulfing) = engulfing(bars);
        let (break_above, break_below) = breakouts(bars, BREAKOUT_LOOKBACK);
        let (swing_low, swing_high) = swing_extremes(bars, SWING_LOOKBACK);
        let volume = column(bars, |b| b.volume);
        Self {
            candles: bars.iter().map(Candle::of).collect(),
            bullish_engulfing,
            bearish_engulfing,
            break_above,
            break_below,
            swing_low,
            swing_high,
            pivots: pivots(bars),
            volume_sma: sma_of_series(&volume, vol_sma),
        }
    }
}

/// Every non-indicator column, including those derived from indicators.
#[derive(Debug)]
struct Columns {
    structure: Structure,
    atr_sma: Vec<f64>,
    vol_ratio: Vec<f64>,
    vol_state: Vec<VolState>,
    relative_volume: Vec<f64>,
    volume_spike: Vec<bool>,
    bullish_stack: Vec<bool>,
    bearish_stack: Vec<bool>,
    ema_cross_up: Vec<bool>,
    ema_cross_down: Vec<bool>,
    st_direction: Vec<Option<TrendDirection>>,
    mtf_score: Vec<i32>,
    bias: Vec<Bias>,
}

impl Columns {
    fn derive(
        bars: &[Bar],
        values: &IndicatorValues,
        keys: &SeriesKeys,
        structure: Structure,
        config: &IndicatorConfig,
    ) -> Self {
        let n = bars.len();
        let series = |name: &str| values.get_series(name).unwrap_or(&[]).to_vec();

        let atr = series(&keys.atr);
        let atr_sma = sma_of_series(&atr, ATR_RATIO_LENGTH);
        let vol_ratio: Vec<f64> = (0..n).map(|i| at(&atr, i) / at(&atr_sma, i)).collect();
        let vol_state = vol_ratio.iter().map(|&r| VolState::from_ratio(r)).collect();

        let relative_volume: Vec<f64> = (0..n)
            .map(|i| bars[i].volume / at(&structure.volume_sma, i))
            .collect();
        let volume_spike = (0..n)
            .map(|i| bars[i].volume > at(&structure.volume_sma, i) * config.vol_mult)
            .collect();

        let (ema9, ema21, ema50, ema200) = (
            series(&keys.ema9),
            series(&keys.ema21),
            series(&keys.ema50),
            series(&keys.ema200),
        );
        let stacks: Vec<(bool, bool)> = (0..n)
            .map(|i| {
                let e = (at(&ema9, i), at(&ema21, i), at(&ema50, i), at(&ema200, i));
                (
                    bullish_stack(bars[i].close, e.0, e.1, e.2, e.3),
                    bearish_stack(bars[i].close, e.0, e.1, e.2, e.3),
                )
            })
            .collect();
        let (ema_cross_up, ema_cross_down) = crossovers(&ema9, &ema21);

        let st_direction: Vec<Option<TrendDirection>> = series(&keys.st_direction)
            .into_iter()
            .map(TrendDirection::from_f64)
            .chain(std::iter::repeat(None))
            .take(n)
            .collect();
        let mtf_score: Vec<i32> = (0..n)
            .map(|i| mtf_score(stacks[i].0, stacks[i].1, st_direction[i]))
            .collect();
        let bias = mtf_score.iter().map(|&s| Bias::from_score(s)).collect();

        Self {
            structure,
            atr_sma,
            vol_ratio,
            vol_state,
            relative_volume,
            volume_spike,
            bullish_stack: stacks.iter().map(|s| s.0).collect(),
            bearish_stack: stacks.iter().map(|s| s.1).collect(),
            ema_cross_up,
            ema_cross_down,
            st_direction,
            mtf_score,
            bias,
        }
    }
}

/// Value at `i`, NaN when the series is shorter.
fn at(series: &[f64], i: usize) -> f64 {
    series.get(i).copied().unwrap_or(f64::NAN)
}

fn flag(series: &[bool], i: usize) -> bool {
    series.get(i).copied().unwrap_or(false)
}

/// All features of one series. Immutable once built.
#[derive(Debug)]
pub struct FeatureSet<'a> {
    bars: &'a [Bar],
    warmup: usize,
    keys: SeriesKeys,
    values: IndicatorValues,
    columns: Columns,
}

impl<'a> FeatureSet<'a> {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn warmup(&self) -> usize {
        self.warmup
    }

    pub fn bars(&self) -> &'a [Bar] {
        self.bars
    }

    /// Raw indicator series by name (e.g. "ema_9", "adx_14").
    pub fn values(&self) -> &IndicatorValues {
        &self.values
    }

    /// The record for bar `index`, or `None` while any field is undefined.
    pub fn record(&self, index: usize) -> Option<FeatureRecord> {
        if index < self.warmup || index >= self.bars.len() {
            return None;
        }
        let bar = &self.bars[index];
        let s = &self.columns.structure;
        let c = &self.columns;
        let k = &self.keys;
        let v = |name: &str| self.values.get(name, index).unwrap_or(f64::NAN);

        let st_direction = c.st_direction[index]?;
        let candle = s.candles[index];
        let record = FeatureRecord {
            bar_index: index,
            timestamp: bar.timestamp,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            ema9: v(&k.ema9),
            ema21: v(&k.ema21),
            ema50: v(&k.ema50),
            ema200: v(&k.ema200),
            supertrend: v(&k.supertrend),
            st_direction,
            atr: v(&k.atr),
            atr_sma: at(&c.atr_sma, index),
            vol_ratio: at(&c.vol_ratio, index),
            vol_state: c.vol_state[index],
            rsi: v(&k.rsi),
            macd: v(&k.macd),
            macd_signal: v(&k.macd_signal),
            macd_hist: v(&k.macd_hist),
            adx: v(&k.adx),
            di_plus: v(&k.di_plus),
            di_minus: v(&k.di_minus),
            volume_sma: at(&s.volume_sma, index),
            relative_volume: at(&c.relative_volume, index),
            volume_spike: flag(&c.volume_spike, index),
            vwap: v(&k.vwap),
            pivots: s.pivots[index],
            candle,
            bullish_candle: is_bullish_candle(bar),
            bearish_candle: is_bearish_candle(bar),
            bullish_stack: flag(&c.bullish_stack, index),
            bearish_stack: flag(&c.bearish_stack, index),
            bullish_engulfing: flag(&s.bullish_engulfing, index),
            bearish_engulfing: flag(&s.bearish_engulfing, index),
            hammer: candle.is_hammer(),
            shooting_star: candle.is_shooting_star(),
            break_above: flag(&s.break_above, index),
            break_below: flag(&s.break_below, index),
            ema_cross_up: flag(&c.ema_cross_up, index),
            ema_cross_down: flag(&c.ema_cross_down, index),
            swing_low: at(&s.swing_low, index),
            swing_high: at(&s.swing_high, index),
            mtf_score: c.mtf_score[index],
            bias: c.bias[index],
        };
        record.is_complete().then_some(record)
    }

    /// Every complete record, in bar order.
    pub fn complete_records(&self) -> Vec<FeatureRecord> {
        (self.warmup..self.bars.len())
            .into_par_iter()
            .filter_map(|i| self.record(i))
            .collect()
    }

    /// Timestamp of the first complete record.
    pub fn first_complete(&self) -> Option<NaiveDateTime> {
        (self.warmup..self.bars.len())
            .find_map(|i| self.record(i))
            .map(|r| r.timestamp)
    }

    /// BLAKE3 over the bit pattern of every series and flag.
    ///
    /// Two computations over the same bars with the same config are
    /// bit-identical, so their fingerprints match.
    pub fn fingerprint(&self) -> FeatureHash {
        let mut hasher = blake3::Hasher::new();
        for name in self.values.names() {
            hasher.update(name.as_bytes());
            hash_floats(&mut hasher, self.values.get_series(name).unwrap_or(&[]));
        }

        let s = &self.columns.structure;
        let c = &self.columns;
        for series in [
            &c.atr_sma,
            &c.vol_ratio,
            &c.relative_volume,
            &s.volume_sma,
            &s.swing_low,
            &s.swing_high,
        ] {
            hash_floats(&mut hasher, series);
        }
        for flags in [
            &c.volume_spike,
            &c.bullish_stack,
            &c.bearish_stack,
            &c.ema_cross_up,
            &c.ema_cross_down,
            &s.bullish_engulfing,
            &s.bearish_engulfing,
            &s.break_above,
            &s.break_below,
        ] {
            hasher.update(&flags.iter().map(|&b| b as u8).collect::<Vec<u8>>());
        }
        for p in &s.pivots {
            hash_floats(&mut hasher, &[p.pdh, p.pdl, p.pdc, p.pivot, p.r1, p.r2, p.s1, p.s2]);
        }
        for candle in &s.candles {
            hash_floats(
                &mut hasher,
                &[candle.body, candle.range, candle.upper_wick, candle.lower_wick],
            );
        }
        for score in &c.mtf_score {
            hasher.update(&score.to_le_bytes());
        }
        FeatureHash::from_hasher(&hasher)
    }
}

fn hash_floats(hasher: &mut blake3::Hasher, values: &[f64]) {
    for v in values {
        hasher.update(&v.to_bits().to_le_bytes());
    }
}
