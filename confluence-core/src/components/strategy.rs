//! Strategy trait: turns one feature record into one decision.
//!
//! Strategies are stateless with respect to the run: every piece of cross-bar
//! state (the open position) lives in the `ScoringContext` passed in by the
//! caller. One strategy instance can therefore drive any number of
//! independent runs, each with its own context.

use crate::domain::Decision;
use crate::engine::state::ScoringContext;
use crate::features::FeatureRecord;

/// Trait for bar-by-bar decision makers.
///
/// # Architecture invariant
/// `produce` is only ever called with complete records, in bar order. It may
/// read and update the context (open a position on entry), but must not read
/// anything beyond the record it is given.
pub trait Strategy: Send + Sync {
    /// Human-readable name (e.g., "quality_engine").
    fn name(&self) -> &str;

    /// Decide what to do on this bar.
    fn produce(&self, record: &FeatureRecord, context: &mut ScoringContext) -> Decision;
}
