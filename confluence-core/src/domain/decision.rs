//! Per-bar output of a strategy: action, conviction, and price levels.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::features::regime::VolState;

/// What the execution collaborator should do on this bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Hold,
    EnterLong,
    EnterShort,
}

impl Action {
    pub fn is_entry(self) -> bool {
        !matches!(self, Self::Hold)
    }
}

/// Letter grade attached to a scored decision.
///
/// Informational only: entry is gated on `min_quality`, not on the grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualityGrade {
    C,
    B,
    A,
    APlus,
}

/// Protective and target levels for a candidate position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeLevels {
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit_1: f64,
    pub take_profit_2: f64,
    pub take_profit_3: f64,
    /// Distance to `take_profit_2` over distance to `stop_loss`; 0 when risk <= 0.
    pub reward_risk: f64,
}

/// Why a bar produced HOLD instead of an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    /// Volatility regime is ULTRA_LOW or EXTREME.
    Volatility { state: VolState },
    /// Bias is NEUTRAL.
    NoConfluence,
    LowQuality { score: u8, min_quality: u8 },
    InsufficientConfirmations { count: u8, required: u8 },
    RewardRisk { reward_risk: f64, min_rr: f64 },
}

impl RejectReason {
    /// Vetoes suppress scoring entirely; the other reasons come after scoring.
    pub fn is_veto(&self) -> bool {
        matches!(self, Self::Volatility { .. } | Self::NoConfluence)
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Volatility { state } => write!(f, "Volatility: {state}"),
            Self::NoConfluence => f.write_str("No MTF Confluence"),
            Self::LowQuality { score, min_quality } => {
                write!(f, "Quality {score} below {min_quality}")
            }
            Self::InsufficientConfirmations { count, required } => {
                write!(f, "Confirmations {count}/{required}")
            }
            Self::RewardRisk {
                reward_risk,
                min_rr,
            } => write!(f, "Reward:risk {reward_risk:.2} below {min_rr:.2}"),
        }
    }
}

/// One decision per evaluated bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub bar_index: usize,
    pub timestamp: NaiveDateTime,
    pub action: Action,
    /// 0-100; 0 when the bar was not scored.
    pub quality_score: u8,
    pub grade: Option<QualityGrade>,
    /// Present on entries and on bars rejected for reward:risk.
    pub levels: Option<TradeLevels>,
    pub reject_reason: Option<RejectReason>,
}

impl Decision {
    /// Plain HOLD without a reason (e.g. a position is already open).
    pub fn hold(bar_index: usize, timestamp: NaiveDateTime) -> Self {
        Self {
            bar_index,
            timestamp,
            action: Action::Hold,
            quality_score: 0,
            grade: None,
            levels: None,
            reject_reason: None,
        }
    }

    pub fn rejected(bar_index: usize, timestamp: NaiveDateTime, reason: RejectReason) -> Self {
        Self {
            reject_reason: Some(reason),
            ..Self::hold(bar_index, timestamp)
        }
    }

    pub fn with_score(mut self, score: u8, grade: QualityGrade) -> Self {
        self.quality_score = score;
        self.grade = Some(grade);
        self
    }

    pub fn stop_loss(&self) -> Option<f64> {
        self.levels.map(|l| l.stop_loss)
    }

    pub fn take_profits(&self) -> Option<[f64; 3]> {
        self.levels
            .map(|l| [l.take_profit_1, l.take_profit_2, l.take_profit_3])
    }
}
