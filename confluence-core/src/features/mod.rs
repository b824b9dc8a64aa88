//! Derived per-bar features: patterns, regime labels, and the aggregated
//! `FeatureRecord`.

pub mod patterns;
pub mod pipeline;
pub mod record;
pub mod regime;

pub use patterns::{Candle, PivotLevels};
pub use pipeline::{FeaturePipeline, FeatureSet, ADX_PERIOD, ATR_RATIO_LENGTH};
pub use record::FeatureRecord;
pub use regime::{Bias, VolState};
