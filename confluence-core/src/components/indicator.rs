//! Indicator trait and precomputed indicator values container.
//!
//! Indicators are pure functions: bar history in, numeric series out.
//! They are precomputed once per series before the signal pass. Nothing is
//! recomputed per bar.

use crate::domain::Bar;
use crate::error::{CoreError, Result};
use rayon::prelude::*;
use std::collections::HashMap;

/// Trait for indicators.
///
/// Indicators take a full bar series and produce a numeric output series of
/// the same length. The first `lookback()` values are `f64::NAN` (warmup).
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on price data from bar t+1 or later.
/// Every indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "ema_9", "atr_14").
    fn name(&self) -> &str;

    /// Index of the first bar that can carry a defined value.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    ///
    /// Returns a `Vec<f64>` of the same length as `bars`.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;

    /// Like `compute`, but fails when the series never leaves warmup.
    fn try_compute(&self, bars: &[Bar]) -> Result<Vec<f64>> {
        if bars.len() <= self.lookback() {
            return Err(CoreError::InsufficientData {
                indicator: self.name().to_string(),
                required: self.lookback(),
                actual: bars.len(),
            });
        }
        Ok(self.compute(bars))
    }
}

/// Container for precomputed indicator values.
///
/// Built once before the signal pass, then queried by bar index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorValues {
    series: HashMap<String, Vec<f64>>,
}

impl IndicatorValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a named indicator series.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.series.insert(name.into(), values);
    }

    /// Get the indicator value at a specific bar index.
    pub fn get(&self, name: &str, bar_index: usize) -> Option<f64> {
        self.series
            .get(name)
            .and_then(|v| v.get(bar_index).copied())
    }

    /// Get the full series for a named indicator.
    pub fn get_series(&self, name: &str) -> Option<&[f64]> {
        self.series.get(name).map(|v| v.as_slice())
    }

    /// Series names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.series.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of indicator series stored.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Compute every indicator over the same read-only bars.
///
/// Indicators share no state, so they run in parallel; the returned container
/// is only assembled once all of them have finished.
pub fn precompute_indicators(bars: &[Bar], indicators: &[Box<dyn Indicator>]) -> IndicatorValues {
    let computed: Vec<(String, Vec<f64>)> = indicators
        .par_iter()
        .map(|indicator| {
            let series = indicator.compute(bars);
            debug_assert_eq!(
                series.len(),
                bars.len(),
                "indicator '{}' produced {} values for {} bars",
                indicator.name(),
                series.len(),
                bars.len()
            );
            (indicator.name().to_string(), series)
        })
        .collect();

    let mut values = IndicatorValues::new();
    for (name, series) in computed {
        values.insert(name, series);
    }
    values
}

/// Maximum lookback across a set of indicators.
pub fn compute_warmup(indicators: &[Box<dyn Indicator>]) -> usize {
    indicators.iter().map(|i| i.lookback()).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{make_bars, Ema, Sma};

    #[test]
    fn indicator_values_insert_and_get() {
        let mut iv = IndicatorValues::new();
        iv.insert(
            "sma_20",
            vec![f64::NAN; 19]
                .into_iter()
                .chain(vec![100.0, 101.0])
                .collect(),
        );
        assert!(iv.get("sma_20", 0).unwrap().is_nan());
        assert_eq!(iv.get("sma_20", 19), Some(100.0));
        assert_eq!(iv.get("sma_20", 20), Some(101.0));
        assert_eq!(iv.get("sma_20", 21), None);
    }

    #[test]
    fn indicator_values_missing_name() {
        let iv = IndicatorValues::new();
        assert_eq!(iv.get("nonexistent", 0), None);
        assert!(iv.get_series("nonexistent").is_none());
    }

    #[test]
    fn indicator_values_len_and_names() {
        let mut iv = IndicatorValues::new();
        assert!(iv.is_empty());
        iv.insert("sma", vec![1.0, 2.0]);
        iv.insert("ema", vec![1.0, 2.0]);
        assert_eq!(iv.len(), 2);
        assert_eq!(iv.names(), vec!["ema", "sma"]);
    }

    #[test]
    fn precompute_multiple_indicators() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let indicators: Vec<Box<dyn Indicator>> = vec![
            Box::new(Sma::new(3).unwrap()),
            Box::new(Ema::new(3).unwrap()),
        ];
        let iv = precompute_indicators(&bars, &indicators);

        assert_eq!(iv.len(), 2);
        assert!(iv.get("sma_3", 1).unwrap().is_nan());
        assert!((iv.get("sma_3", 2).unwrap() - 11.0).abs() < 1e-10);
        assert_eq!(iv.get("ema_3", 0), Some(10.0));
    }

    #[test]
    fn compute_warmup_max_lookback() {
        let indicators: Vec<Box<dyn Indicator>> = vec![
            Box::new(Sma::new(5).unwrap()),
            Box::new(Sma::new(20).unwrap()),
            Box::new(Ema::new(50).unwrap()),
        ];
        assert_eq!(compute_warmup(&indicators), 19);
        assert_eq!(compute_warmup(&[]), 0);
    }

    #[test]
    fn try_compute_reports_insufficient_data() {
        let bars = make_bars(&[10.0, 11.0]);
        let err = Sma::new(5).unwrap().try_compute(&bars).unwrap_err();
        assert_eq!(
            err,
            CoreError::InsufficientData {
                indicator: "sma_5".into(),
                required: 4,
                actual: 2,
            }
        );

        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        assert!(Sma::new(5).unwrap().try_compute(&bars).is_ok());
    }
}
