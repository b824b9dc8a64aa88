//! Signal engine: turns the complete feature-record stream into decisions.
//!
//! Strictly sequential over bar order: the only cross-bar state is the
//! run's `ScoringContext` (the open position). Each bar:
//!
//! 1. Position gate: HOLD while a position is open
//! 2. Veto: volatility regime, neutral bias
//! 3. Quality score and confirmation count
//! 4. Stop / target placement and reward:risk check

pub mod crossover;
pub mod levels;
pub mod quality;
pub mod run;
pub mod state;

pub use crossover::CrossoverStrategy;
pub use levels::{reward_risk, trade_levels};
pub use quality::{confirmations, quality_score, veto, QualityEngine};
pub use run::{evaluate_records, evaluate_series, Evaluation};
pub use state::{OpenPosition, PositionSide, ScoringContext};
