//! Domain types: input bars, per-bar decisions, and content IDs.

pub mod bar;
pub mod decision;
pub mod ids;

pub use bar::{validate_series, Bar};
pub use decision::{Action, Decision, QualityGrade, RejectReason, TradeLevels};
pub use ids::{ConfigId, FeatureHash};
