//! Bar, the fundamental market data unit.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// One OHLCV observation for a fixed period.
///
/// Bars are supplied by the data collaborator and never mutated by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Returns true if any OHLCV field is NaN or infinite.
    pub fn is_void(&self) -> bool {
        !(self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite())
    }

    /// Basic OHLC sanity check: high >= low, high >= open, high >= close, etc.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.volume >= 0.0
    }

    /// Midpoint of the bar's range.
    pub fn hl2(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    /// Typical price used by VWAP.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

/// Validate a series before it enters the pipeline.
///
/// Timestamps must be strictly increasing, every OHLCV value finite, and
/// every bar sane (low <= open/close <= high, volume >= 0). Out-of-order or duplicate timestamps are rejected rather than producing
/// silently wrong indicator output.
pub fn validate_series(bars: &[Bar]) -> Result<()> {
    for (i, bar) in bars.iter().enumerate() {
        if bar.is_void() {
            return Err(CoreError::invalid(
                "bars",
                format!("bar {i} ({}) has a non-finite OHLCV value", bar.timestamp),
            ));
        }
        if !bar.is_sane() {
            return Err(CoreError::invalid(
                "bars",
                format!(
                    "bar {i} ({}) has an inconsistent range: o={} h={} l={} c={} v={}",
                    bar.timestamp, bar.open, bar.high, bar.low, bar.close, bar.volume
                ),
            ));
        }
        if i > 0 && bar.timestamp <= bars[i - 1].timestamp {
            return Err(CoreError::invalid(
                "bars",
                format!(
                    "timestamp at bar {i} ({}) does not follow bar {} ({})",
                    bar.timestamp,
                    i - 1,
                    bars[i - 1].timestamp
                ),
            ));
        }
    }
    Ok(())
}

/// Extract one column of a series.
pub(crate) fn column(bars: &[Bar], field: impl Fn(&Bar) -> f64) -> Vec<f64> {
    bars.iter().map(field).collect()
}
