//! DMI / ADX: Directional Movement Index and Average Directional Index.
//!
//! Steps:
//! 1. +DM = max(high[t] - high[t-1], 0), -DM = max(low[t-1] - low[t], 0)
//!    The smaller side is zeroed. On a tie +DM is zeroed and -DM kept.
//! 2. +DI = 100 * SMA(+DM, period) / ATR(period), -DI likewise
//! 3. DX = 100 * |+DI - -DI| / (+DI + -DI); NaN when the sum is 0
//! 4. ADX = SMA(DX, period)
//!
//! DM is undefined on the first bar, so DI starts at index `period` and ADX
//! at index `2 * period - 1`. A NaN DX poisons every ADX window it falls in.

use crate::components::indicator::Indicator;
use crate::domain::Bar;
use crate::error::{ensure_length, Result};
use crate::indicators::atr::atr_of_bars;
use crate::indicators::sma::sma_of_series;

/// Which DMI line to expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmiLine {
    Adx,
    PlusDi,
    MinusDi,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DmiOutput {
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
    pub dx: Vec<f64>,
    pub adx: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
    output: DmiLine,
    name: String,
}

impl Adx {
    fn with_output(period: usize, output: DmiLine) -> Result<Self> {
        ensure_length("adx", period)?;
        let prefix = match output {
            DmiLine::Adx => "adx",
            DmiLine::PlusDi => "di_plus",
            DmiLine::MinusDi => "di_minus",
        };
        Ok(Self {
            period,
            output,
            name: format!("{prefix}_{period}"),
        })
    }

    pub fn new(period: usize) -> Result<Self> {
        Self::with_output(period, DmiLine::Adx)
    }

    pub fn plus_di(period: usize) -> Result<Self> {
        Self::with_output(period, DmiLine::PlusDi)
    }

    pub fn minus_di(period: usize) -> Result<Self> {
        Self::with_output(period, DmiLine::MinusDi)
    }
}

impl Indicator for Adx {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.output {
            DmiLine::Adx => 2 * self.period - 1,
            DmiLine::PlusDi | DmiLine::MinusDi => self.period,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let out = dmi_of_bars(bars, self.period);
        match self.output {
            DmiLine::Adx => out.adx,
            DmiLine::PlusDi => out.plus_di,
            DmiLine::MinusDi => out.minus_di,
        }
    }
}

/// DMI/ADX over bars, validating `length`.
pub fn dmi(bars: &[Bar], length: usize) -> Result<DmiOutput> {
    ensure_length("adx", length)?;
    Ok(dmi_of_bars(bars, length))
}

fn dmi_of_bars(bars: &[Bar], period: usize) -> DmiOutput {
    let n = bars.len();
    let mut plus_dm = vec![f64::NAN; n];
    let mut minus_dm = vec![f64::NAN; n];

    for i in 1..n {
        let up = (bars[i].high - bars[i - 1].high).max(0.0);
        let down = (bars[i - 1].low - bars[i].low).max(0.0);
        if up > down {
            plus_dm[i] = up;
            minus_dm[i] = 0.0;
        } else {
            plus_dm[i] = 0.0;
            minus_dm[i] = down;
        }
    }

    let atr = atr_of_bars(bars, period);
    let plus_avg = sma_of_series(&plus_dm, period);
    let minus_avg = sma_of_series(&minus_dm, period);

    let plus_di: Vec<f64> = plus_avg
        .iter()
        .zip(&atr)
        .map(|(dm, tr)| 100.0 * dm / tr)
        .collect();
    let minus_di: Vec<f64> = minus_avg
        .iter()
        .zip(&atr)
        .map(|(dm, tr)| 100.0 * dm / tr)
        .collect();

    let dx: Vec<f64> = plus_di
        .iter()
        .zip(&minus_di)
        .map(|(&p, &m)| {
            let sum = p + m;
            if sum == 0.0 {
                f64::NAN
            } else {
                100.0 * (p - m).abs() / sum
            }
        })
        .collect();

    let adx = sma_of_series(&dx, period);

    DmiOutput {
        plus_di,
        minus_di,
        dx,
        adx,
    }
}
