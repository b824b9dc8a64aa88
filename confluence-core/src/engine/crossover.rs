//! Simplified EMA-crossover strategy.
//!
//! Long when the fast EMA crosses above the slow EMA while SuperTrend is UP;
//! short on the mirror. Stop at 1.5 ATR, every target at 3 ATR. No scoring.

use tracing::debug;

use crate::components::strategy::Strategy;
use crate::domain::{Action, Decision, QualityGrade, TradeLevels};
use crate::engine::levels::reward_risk;
use crate::engine::state::ScoringContext;
use crate::features::FeatureRecord;
use crate::indicators::TrendDirection;

pub const STOP_ATR: f64 = 1.5;
pub const TARGET_ATR: f64 = 3.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct CrossoverStrategy;

impl CrossoverStrategy {
    pub fn new() -> Self {
        Self
    }

    fn levels(record: &FeatureRecord, direction: TrendDirection) -> TradeLevels {
        let sign = direction.as_f64();
        let stop_loss = record.close - sign * record.atr * STOP_ATR;
        let target = record.close + sign * record.atr * TARGET_ATR;
        TradeLevels {
            entry: record.close,
            stop_loss,
            take_profit_1: target,
            take_profit_2: target,
            take_profit_3: target,
            reward_risk: reward_risk(
                (record.close - stop_loss) * sign,
                (target - record.close) * sign,
            ),
        }
    }
}

impl Strategy for CrossoverStrategy {
    fn name(&self) -> &str {
        "ema_crossover"
    }

    fn produce(&self, record: &FeatureRecord, context: &mut ScoringContext) -> Decision {
        let hold = Decision::hold(record.bar_index, record.timestamp);
        if !context.is_flat() {
            return hold;
        }

        let (action, direction) = if record.ema_cross_up && record.st_bullish() {
            (Action::EnterLong, TrendDirection::Up)
        } else if record.ema_cross_down && record.st_bearish() {
            (Action::EnterShort, TrendDirection::Down)
        } else {
            return hold;
        };

        let decision = Decision {
            action,
            levels: Some(Self::levels(record, direction)),
            ..hold
        }
        .with_score(0, QualityGrade::C);
        debug!(bar = record.bar_index, ?action, "crossover entry");
        context.open_from(&decision);
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::record::{bearish_fixture, bullish_fixture};
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn long_on_cross_up_with_supertrend() {
        let mut record = bullish_fixture();
        record.ema_cross_up = true;
        let mut ctx = ScoringContext::new();
        let decision = CrossoverStrategy::new().produce(&record, &mut ctx);

        assert_eq!(decision.action, Action::EnterLong);
        assert_eq!(decision.grade, Some(QualityGrade::C));
        let levels = decision.levels.unwrap();
        assert_approx(levels.stop_loss, 107.0, DEFAULT_EPSILON);
        assert_eq!(decision.take_profits(), Some([116.0; 3]));
        assert_approx(levels.reward_risk, 2.0, DEFAULT_EPSILON);
        assert!(!ctx.is_flat());
    }

    #[test]
    fn short_on_cross_down_with_supertrend() {
        let mut record = bearish_fixture();
        record.ema_cross_down = true;
        let mut ctx = ScoringContext::new();
        let decision = CrossoverStrategy::new().produce(&record, &mut ctx);

        assert_eq!(decision.action, Action::EnterShort);
        assert_eq!(decision.stop_loss(), Some(113.0));
        assert_eq!(decision.take_profits(), Some([104.0; 3]));
    }

    #[test]
    fn supertrend_must_agree() {
        let mut record = bullish_fixture();
        record.ema_cross_down = true;
        let mut ctx = ScoringContext::new();
        let decision = CrossoverStrategy::new().produce(&record, &mut ctx);
        assert_eq!(decision.action, Action::Hold);
        assert!(ctx.is_flat());
    }

    #[test]
    fn no_cross_no_entry() {
        let mut ctx = ScoringContext::new();
        let decision = CrossoverStrategy::new().produce(&bullish_fixture(), &mut ctx);
        assert_eq!(decision.action, Action::Hold);
    }

    #[test]
    fn holds_while_in_position() {
        let mut record = bullish_fixture();
        record.ema_cross_up = true;
        let strategy = CrossoverStrategy::new();
        let mut ctx = ScoringContext::new();
        strategy.produce(&record, &mut ctx);
        assert_eq!(strategy.produce(&record, &mut ctx).action, Action::Hold);
        assert_eq!(ctx.entries(), 1);
    }
}
