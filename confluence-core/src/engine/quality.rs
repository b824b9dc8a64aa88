//! Multi-factor quality engine.
//!
//! Per bar, in order:
//! 1. In a position: HOLD, nothing else is evaluated.
//! 2. Veto: ULTRA_LOW / EXTREME volatility, or NEUTRAL bias.
//! 3. Quality score (0-100) must reach `min_quality`.
//! 4. At least 3 of 5 directional confirmations.
//! 5. Reward:risk to the second target must reach `min_rr`.
//!
//! The RSI test differs between steps 3 and 4: scoring accepts RSI in
//! (30, 70) for either direction, confirmation uses (40, 70) for longs and
//! (30, 60) for shorts. Both are kept as-is.

use tracing::{debug, trace};

use crate::components::strategy::Strategy;
use crate::config::EngineConfig;
use crate::domain::{Action, Decision, RejectReason};
use crate::engine::levels::trade_levels;
use crate::engine::state::{PositionSide, ScoringContext};
use crate::error::Result;
use crate::features::{Bias, FeatureRecord, VolState};

/// Cap of the MTF-magnitude term.
pub const MTF_TERM_CAP: f64 = 20.0;
/// Confirmations needed out of five.
pub const REQUIRED_CONFIRMATIONS: u8 = 3;

const STACK_POINTS: f64 = 15.0;
const SIGNAL_POINTS: f64 = 10.0;
const NORMAL_VOL_POINTS: f64 = 5.0;

/// Veto reason for the bar, if any. Volatility is checked before bias.
pub fn veto(record: &FeatureRecord) -> Option<RejectReason> {
    if record.vol_state.is_veto() {
        return Some(RejectReason::Volatility {
            state: record.vol_state,
        });
    }
    if record.bias == Bias::Neutral {
        return Some(RejectReason::NoConfluence);
    }
    None
}

/// Weighted quality score, truncated to an integer and capped at 100.
pub fn quality_score(record: &FeatureRecord) -> u8 {
    let bias = record.bias;
    let directional = bias != Bias::Neutral;

    let mut score = (f64::from(record.mtf_score.unsigned_abs()) / 100.0 * 20.0).min(MTF_TERM_CAP);
    if record.bullish_stack || record.bearish_stack {
        score += STACK_POINTS;
    }
    if record.supertrend_agrees(bias) {
        score += SIGNAL_POINTS;
    }
    if directional && record.rsi > 30.0 && record.rsi < 70.0 {
        score += SIGNAL_POINTS;
    }
    if record.macd_agrees(bias) {
        score += SIGNAL_POINTS;
    }
    if record.volume_spike {
        score += SIGNAL_POINTS;
    }
    if record.pattern_agrees(bias) {
        score += SIGNAL_POINTS;
    }
    if record.breakout_agrees(bias) {
        score += SIGNAL_POINTS;
    }
    if record.vol_state == VolState::Normal {
        score += NORMAL_VOL_POINTS;
    }
    score.min(100.0) as u8
}

/// RSI inside the direction-specific confirmation band.
pub fn rsi_confirms(rsi: f64, bias: Bias) -> bool {
    match bias {
        Bias::Bullish => rsi > 40.0 && rsi < 70.0,
        Bias::Bearish => rsi > 30.0 && rsi < 60.0,
        Bias::Neutral => false,
    }
}

/// Directional confirmations (0-5): stack, SuperTrend, MACD side, RSI band,
/// volume spike.
pub fn confirmations(record: &FeatureRecord) -> u8 {
    let bias = record.bias;
    [
        record.stack_agrees(bias),
        record.supertrend_agrees(bias),
        record.macd_agrees(bias),
        rsi_confirms(record.rsi, bias),
        record.volume_spike,
    ]
    .iter()
    .filter(|&&c| c)
    .count() as u8
}

/// The confluence strategy: veto, score, confirm, then size the risk.
#[derive(Debug, Clone)]
pub struct QualityEngine {
    config: EngineConfig,
}

impl QualityEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate one bar without touching any position state.
    pub fn evaluate(&self, record: &FeatureRecord) -> Decision {
        let (index, ts) = (record.bar_index, record.timestamp);

        if let Some(reason) = veto(record) {
            trace!(bar = index, %reason, "vetoed");
            return Decision::rejected(index, ts, reason);
        }

        let score = quality_score(record);
        let grade = self.config.grade(score);
        if score < self.config.min_quality {
            trace!(bar = index, score, "quality below minimum");
            return Decision::rejected(
                index,
                ts,
                RejectReason::LowQuality {
                    score,
                    min_quality: self.config.min_quality,
                },
            )
            .with_score(score, grade);
        }

        let count = confirmations(record);
        if count < REQUIRED_CONFIRMATIONS {
            trace!(bar = index, count, "not enough confirmations");
            return Decision::rejected(
                index,
                ts,
                RejectReason::InsufficientConfirmations {
                    count,
                    required: REQUIRED_CONFIRMATIONS,
                },
            )
            .with_score(score, grade);
        }

        let (side, action) = match record.bias {
            Bias::Bullish => (PositionSide::Long, Action::EnterLong),
            Bias::Bearish => (PositionSide::Short, Action::EnterShort),
            // Vetoed above.
            Bias::Neutral => return Decision::rejected(index, ts, RejectReason::NoConfluence),
        };
        let levels = trade_levels(record, side, &self.config);
        if levels.reward_risk < self.config.min_rr {
            trace!(bar = index, rr = levels.reward_risk, "reward:risk below minimum");
            let mut decision = Decision::rejected(
                index,
                ts,
                RejectReason::RewardRisk {
                    reward_risk: levels.reward_risk,
                    min_rr: self.config.min_rr,
                },
            )
            .with_score(score, grade);
            decision.levels = Some(levels);
            return decision;
        }

        debug!(
            bar = index,
            ?action,
            score,
            ?grade,
            stop = levels.stop_loss,
            tp2 = levels.take_profit_2,
            rr = levels.reward_risk,
            "entry signal"
        );
        Decision {
            action,
            levels: Some(levels),
            ..Decision::hold(index, ts)
        }
        .with_score(score, grade)
    }
}

impl Strategy for QualityEngine {
    fn name(&self) -> &str {
        "quality_engine"
    }

    fn produce(&self, record: &FeatureRecord, context: &mut ScoringContext) -> Decision {
        if !context.is_flat() {
            return Decision::hold(record.bar_index, record.timestamp);
        }
        let decision = self.evaluate(record);
        context.open_from(&decision);
        decision
    }
}
