//! MACD: Moving Average Convergence Divergence.
//!
//! line = EMA(close, fast) - EMA(close, slow)
//! signal = EMA(line, signal)
//! histogram = line - signal
//!
//! All three EMAs use the unadjusted recurrence, so there is no warmup.
//! Three lines (separate Indicator instances).

use crate::components::indicator::Indicator;
use crate::domain::Bar;
use crate::error::{ensure_length, Result};
use crate::indicators::ema::ema_of_series;

/// Which MACD line to expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdLine {
    Line,
    Signal,
    Histogram,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MacdOutput {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    output: MacdLine,
    name: String,
}

impl Macd {
    fn with_output(fast: usize, slow: usize, signal: usize, output: MacdLine) -> Result<Self> {
        ensure_length("macd_fast", fast)?;
        ensure_length("macd_slow", slow)?;
        ensure_length("macd_signal", signal)?;
        let prefix = match output {
            MacdLine::Line => "macd",
            MacdLine::Signal => "macd_signal",
            MacdLine::Histogram => "macd_hist",
        };
        Ok(Self {
            fast,
            slow,
            signal,
            output,
            name: format!("{prefix}_{fast}_{slow}_{signal}"),
        })
    }

    pub fn line(fast: usize, slow: usize, signal: usize) -> Result<Self> {
        Self::with_output(fast, slow, signal, MacdLine::Line)
    }

    pub fn signal(fast: usize, slow: usize, signal: usize) -> Result<Self> {
        Self::with_output(fast, slow, signal, MacdLine::Signal)
    }

    pub fn histogram(fast: usize, slow: usize, signal: usize) -> Result<Self> {
        Self::with_output(fast, slow, signal, MacdLine::Histogram)
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let out = macd_of_series(&closes, self.fast, self.slow, self.signal);
        match self.output {
            MacdLine::Line => out.line,
            MacdLine::Signal => out.signal,
            MacdLine::Histogram => out.histogram,
        }
    }
}

/// MACD of a close series, validating all three lengths.
pub fn macd(close: &[f64], fast: usize, slow: usize, signal: usize) -> Result<MacdOutput> {
    ensure_length("macd_fast", fast)?;
    ensure_length("macd_slow", slow)?;
    ensure_length("macd_signal", signal)?;
    Ok(macd_of_series(close, fast, slow, signal))
}

fn macd_of_series(close: &[f64], fast: usize, slow: usize, signal: usize) -> MacdOutput {
    let ema_fast = ema_of_series(close, fast);
    let ema_slow = ema_of_series(close, slow);
    let line: Vec<f64> = ema_fast.iter().zip(&ema_slow).map(|(f, s)| f - s).collect();
    let signal = ema_of_series(&line, signal);
    let histogram = line.iter().zip(&signal).map(|(l, s)| l - s).collect();
    MacdOutput {
        line,
        signal,
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn macd_flat_series_is_zero() {
        let out = macd(&[100.0; 10], 3, 6, 2).unwrap();
        assert!(out.line.iter().all(|&v| v == 0.0));
        assert!(out.signal.iter().all(|&v| v == 0.0));
        assert!(out.histogram.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn macd_known_values() {
        // fast=1 → EMA = close; slow=3 → alpha 0.5
        // closes 10, 12: slow EMA = 10, 11 → line = 0, 1
        // signal=3: 0, 0.5 → hist = 0, 0.5
        let out = macd(&[10.0, 12.0], 1, 3, 3).unwrap();
        assert_approx(out.line[1], 1.0, DEFAULT_EPSILON);
        assert_approx(out.signal[1], 0.5, DEFAULT_EPSILON);
        assert_approx(out.histogram[1], 0.5, DEFAULT_EPSILON);
    }

    #[test]
    fn macd_line_positive_in_uptrend() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let out = macd(&closes, 12, 26, 9).unwrap();
        assert!(out.line[39] > 0.0);
        assert!(out.line[39] > out.signal[39]);
    }

    #[test]
    fn macd_instances_match_function() {
        let bars = make_bars(&[10.0, 11.0, 13.0, 12.0, 15.0]);
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let out = macd(&closes, 2, 4, 3).unwrap();

        let line = Macd::line(2, 4, 3).unwrap();
        let signal = Macd::signal(2, 4, 3).unwrap();
        let hist = Macd::histogram(2, 4, 3).unwrap();
        assert_eq!(line.name(), "macd_2_4_3");
        assert_eq!(signal.name(), "macd_signal_2_4_3");
        assert_eq!(hist.name(), "macd_hist_2_4_3");
        assert_eq!(line.compute(&bars), out.line);
        assert_eq!(signal.compute(&bars), out.signal);
        assert_eq!(hist.compute(&bars), out.histogram);
    }

    #[test]
    fn macd_rejects_zero_lengths() {
        assert!(macd(&[1.0], 0, 26, 9).is_err());
        assert!(Macd::signal(12, 26, 0).is_err());
    }
}
