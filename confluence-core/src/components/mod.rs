//! Component traits.
//!
//! - Indicator: pure bar-series transform, precomputed once per series
//! - Strategy: consumes feature records bar by bar and emits decisions

pub mod indicator;
pub mod strategy;

pub use indicator::{compute_warmup, precompute_indicators, Indicator, IndicatorValues};
pub use strategy::Strategy;
