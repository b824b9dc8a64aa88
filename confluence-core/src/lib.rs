//! Confluence Core: indicator pipeline and multi-factor signal engine.
//!
//! A pure function of bar history to per-bar decisions:
//! - Domain types (bars, decisions, trade levels)
//! - Indicators (EMA, SMA, RSI, ATR, MACD, DMI/ADX, VWAP, SuperTrend)
//! - Structural features and regime labels, aggregated into one record per bar
//! - Quality engine: vetoes, weighted score, confirmations, stop/targets
//!
//! Data retrieval, fills, sizing and P&L belong to the caller.

pub mod components;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod features;
pub mod indicators;

pub use config::{EngineConfig, IndicatorConfig, StrategyConfig};
pub use error::{CoreError, Result};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything shared across runs is Send + Sync, so
    /// independent evaluations can run on separate threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::Decision>();
        require_sync::<domain::Decision>();
        require_send::<domain::ConfigId>();
        require_sync::<domain::ConfigId>();

        // Features
        require_send::<features::FeatureRecord>();
        require_sync::<features::FeatureRecord>();
        require_send::<features::FeaturePipeline>();
        require_sync::<features::FeaturePipeline>();
        require_send::<features::FeatureSet<'static>>();
        require_sync::<features::FeatureSet<'static>>();
        require_send::<components::IndicatorValues>();
        require_sync::<components::IndicatorValues>();

        // Config
        require_send::<StrategyConfig>();
        require_sync::<StrategyConfig>();

        // Engine
        require_send::<engine::ScoringContext>();
        require_sync::<engine::ScoringContext>();
        require_send::<engine::QualityEngine>();
        require_sync::<engine::QualityEngine>();
        require_send::<engine::CrossoverStrategy>();
        require_sync::<engine::CrossoverStrategy>();
    }

    /// Architecture contract: strategies get position state only through the
    /// context argument, never as hidden fields.
    #[test]
    fn strategy_trait_takes_context_explicitly() {
        fn _check_trait_object_builds(
            strategy: &dyn components::Strategy,
            record: &features::FeatureRecord,
            context: &mut engine::ScoringContext,
        ) -> domain::Decision {
            strategy.produce(record, context)
        }
    }

    #[test]
    fn independent_runs_in_parallel() {
        use rayon::prelude::*;

        let record = features::record::bullish_fixture();
        let engine = engine::QualityEngine::new(EngineConfig::default()).unwrap();
        let decisions: Vec<domain::Decision> = (0..8)
            .into_par_iter()
            .map(|_| {
                let mut context = engine::ScoringContext::new();
                components::Strategy::produce(&engine, &record, &mut context)
            })
            .collect();
        assert!(decisions
            .iter()
            .all(|d| d.action == domain::Action::EnterLong));
    }
}
