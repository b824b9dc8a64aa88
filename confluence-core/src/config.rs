//! Strategy configuration: indicator parameters and engine thresholds.
//!
//! Every key is optional and falls back to its documented default. Configs
//! are validated once, at construction, so nothing downstream re-checks them.
//!
//! ```toml
//! [indicators]
//! ema9 = 9
//! st_mult = 3.0
//!
//! [engine]
//! min_quality = 55
//! min_rr = 2.0
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::{ConfigId, QualityGrade};
use crate::error::{ensure_length, ensure_positive, CoreError, Result};

/// Indicator parameters for the feature pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndicatorConfig {
    pub ema9: usize,
    pub ema21: usize,
    pub ema50: usize,
    pub ema200: usize,
    /// SuperTrend ATR period.
    pub st_length: usize,
    /// SuperTrend band multiplier.
    pub st_mult: f64,
    pub atr_period: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    /// Volume SMA length for relative volume and spike detection.
    pub vol_sma: usize,
    /// Volume above `vol_mult * volume_sma` is a spike.
    pub vol_mult: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            ema9: 9,
            ema21: 21,
            ema50: 50,
            ema200: 200,
            st_length: 10,
            st_mult: 3.0,
            atr_period: 14,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            vol_sma: 20,
            vol_mult: 1.3,
        }
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, length) in [
            ("ema9", self.ema9),
            ("ema21", self.ema21),
            ("ema50", self.ema50),
            ("ema200", self.ema200),
            ("st_length", self.st_length),
            ("atr_period", self.atr_period),
            ("rsi_period", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("vol_sma", self.vol_sma),
        ] {
            ensure_length(name, length)?;
        }
        if self.macd_fast >= self.macd_slow {
            return Err(CoreError::invalid(
                "macd_fast",
                format!(
                    "fast period ({}) must be < slow period ({})",
                    self.macd_fast, self.macd_slow
                ),
            ));
        }
        ensure_positive("st_mult", self.st_mult)?;
        ensure_positive("vol_mult", self.vol_mult)?;
        Ok(())
    }
}

/// Thresholds for the quality engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Minimum quality score for an entry (grade B).
    pub min_quality: u8,
    pub a_grade_min: u8,
    pub a_plus_min: u8,
    /// Minimum reward:risk, measured to the second target.
    pub min_rr: f64,
    pub tp1_rr: f64,
    pub tp2_rr: f64,
    pub tp3_rr: f64,
    /// ATR multiple subtracted from (added to) the swing extreme for the stop.
    pub sl_buffer: f64,
    /// Fraction of equity risked per trade. Carried for the execution side.
    pub risk_per_trade: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_quality: 50,
            a_grade_min: 65,
            a_plus_min: 80,
            min_rr: 1.5,
            tp1_rr: 1.0,
            tp2_rr: 2.0,
            tp3_rr: 3.0,
            sl_buffer: 0.2,
            risk_per_trade: 0.01,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_quality > self.a_grade_min
            || self.a_grade_min > self.a_plus_min
            || self.a_plus_min > 100
        {
            return Err(CoreError::invalid(
                "min_quality",
                format!(
                    "grade thresholds must satisfy min_quality <= a_grade_min <= a_plus_min <= 100, \
                     got {} / {} / {}",
                    self.min_quality, self.a_grade_min, self.a_plus_min
                ),
            ));
        }
        for (name, value) in [
            ("min_rr", self.min_rr),
            ("tp1_rr", self.tp1_rr),
            ("tp2_rr", self.tp2_rr),
            ("tp3_rr", self.tp3_rr),
        ] {
            ensure_positive(name, value)?;
        }
        if !self.sl_buffer.is_finite() || self.sl_buffer < 0.0 {
            return Err(CoreError::invalid(
                "sl_buffer",
                format!("must be a finite value >= 0, got {}", self.sl_buffer),
            ));
        }
        if !(self.risk_per_trade > 0.0 && self.risk_per_trade <= 1.0) {
            return Err(CoreError::invalid(
                "risk_per_trade",
                format!("must be in (0, 1], got {}", self.risk_per_trade),
            ));
        }
        Ok(())
    }

    /// Letter grade for a quality score.
    pub fn grade(&self, score: u8) -> QualityGrade {
        if score >= self.a_plus_min {
            QualityGrade::APlus
        } else if score >= self.a_grade_min {
            QualityGrade::A
        } else if score >= self.min_quality {
            QualityGrade::B
        } else {
            QualityGrade::C
        }
    }
}

/// Complete configuration of one evaluation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StrategyConfig {
    pub indicators: IndicatorConfig,
    pub engine: EngineConfig,
}

impl StrategyConfig {
    pub fn validate(&self) -> Result<()> {
        self.indicators.validate()?;
        self.engine.validate()
    }

    /// Parse and validate a TOML document with `[indicators]` / `[engine]`
    /// tables. Missing keys take their defaults.
    ///
    /// Broken TOML syntax is `CoreError::Config`. Unknown keys and wrongly
    /// typed values are `CoreError::InvalidParameter` named `config`.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(input)?;
        let config = toml::Value::Table(table)
            .try_into::<Self>()
            .map_err(|e| CoreError::invalid("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// BLAKE3 of the canonical JSON serialization.
    ///
    /// Struct fields serialize in declaration order, so equal configs hash
    /// equally regardless of how they were loaded.
    pub fn config_hash(&self) -> Result<ConfigId> {
        let json = serde_json::to_string(self)
            .map_err(|e| CoreError::Config(format!("config serialization failed: {e}")))?;
        Ok(ConfigId::from_bytes(json.as_bytes()))
    }
}
