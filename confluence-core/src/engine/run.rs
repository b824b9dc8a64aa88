//! Evaluation driver: feeds complete records to a strategy in bar order.

use tracing::{debug, warn};

use crate::components::strategy::Strategy;
use crate::config::StrategyConfig;
use crate::domain::{Bar, Decision};
use crate::engine::quality::QualityEngine;
use crate::engine::state::ScoringContext;
use crate::error::Result;
use crate::features::{FeaturePipeline, FeatureRecord};

/// One run of a strategy over a record stream.
///
/// Owns the run's `ScoringContext`. The execution side calls
/// `context_mut().close_position()` when its stop or target fires, so the
/// strategy can look for the next entry.
pub struct Evaluation<'s> {
    strategy: &'s dyn Strategy,
    context: ScoringContext,
    last_index: Option<usize>,
}

impl<'s> Evaluation<'s> {
    pub fn new(strategy: &'s dyn Strategy) -> Self {
        Self {
            strategy,
            context: ScoringContext::new(),
            last_index: None,
        }
    }

    /// Decide on the next record. Records must arrive in increasing bar order.
    pub fn step(&mut self, record: &FeatureRecord) -> Decision {
        debug_assert!(
            self.last_index.map_or(true, |last| record.bar_index > last),
            "records out of order: {} after {:?}",
            record.bar_index,
            self.last_index
        );
        self.last_index = Some(record.bar_index);
        self.strategy.produce(record, &mut self.context)
    }

    pub fn context(&self) -> &ScoringContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut ScoringContext {
        &mut self.context
    }

    /// Start a new run with the same strategy.
    pub fn reset(&mut self) {
        self.context.reset();
        self.last_index = None;
    }
}

/// Run `strategy` over `records` with a fresh context.
///
/// No exits are simulated, so after the first entry every later bar holds.
pub fn evaluate_records(strategy: &dyn Strategy, records: &[FeatureRecord]) -> Vec<Decision> {
    let mut evaluation = Evaluation::new(strategy);
    let decisions: Vec<Decision> = records.iter().map(|r| evaluation.step(r)).collect();
    debug!(
        strategy = strategy.name(),
        records = records.len(),
        entries = evaluation.context().entries(),
        "evaluation finished"
    );
    decisions
}

/// Bars to decisions with the quality engine: validate, compute features,
/// drop incomplete records, evaluate.
///
/// One decision per complete record; bars inside the warm-up get none.
pub fn evaluate_series(bars: &[Bar], config: &StrategyConfig) -> Result<Vec<Decision>> {
    config.validate()?;
    let pipeline = FeaturePipeline::new(config.indicators.clone())?;
    let engine = QualityEngine::new(config.engine.clone())?;

    let features = pipeline.compute(bars)?;
    let records = features.complete_records();
    if records.is_empty() {
        warn!(bars = bars.len(), warmup = pipeline.warmup(), "no complete records to evaluate");
    }
    Ok(evaluate_records(&engine, &records))
}
