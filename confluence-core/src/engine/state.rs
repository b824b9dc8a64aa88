//! Cross-bar mutable state of one evaluation run.

use serde::{Deserialize, Serialize};

use crate::domain::{Action, Decision};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionSide {
    Long,
    Short,
}

/// Entry parameters of the position the engine believes is open.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub side: PositionSide,
    pub bar_index: usize,
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profits: [f64; 3],
}

/// Position state carried from bar to bar.
///
/// Owned by exactly one run. The strategy opens a position when it emits an
/// entry; closing it is the execution side's call (stop/target hits are not
/// tracked here).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoringContext {
    position: Option<OpenPosition>,
    entries: usize,
}

impl ScoringContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_flat(&self) -> bool {
        self.position.is_none()
    }

    pub fn position(&self) -> Option<&OpenPosition> {
        self.position.as_ref()
    }

    /// Entries recorded since the last reset.
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Record the position an entry decision opens. Non-entries are ignored.
    pub fn open_from(&mut self, decision: &Decision) {
        let side = match decision.action {
            Action::EnterLong => PositionSide::Long,
            Action::EnterShort => PositionSide::Short,
            Action::Hold => return,
        };
        if let Some(levels) = decision.levels {
            self.position = Some(OpenPosition {
                side,
                bar_index: decision.bar_index,
                entry: levels.entry,
                stop_loss: levels.stop_loss,
                take_profits: [
                    levels.take_profit_1,
                    levels.take_profit_2,
                    levels.take_profit_3,
                ],
            });
            self.entries += 1;
        }
    }

    /// Forget the open position (the execution side exited it).
    pub fn close_position(&mut self) -> Option<OpenPosition> {
        self.position.take()
    }

    /// Back to a fresh run.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TradeLevels;
    use chrono::NaiveDate;

    fn entry(action: Action) -> Decision {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Decision {
            action,
            levels: Some(TradeLevels {
                entry: 100.0,
                stop_loss: 95.0,
                take_profit_1: 105.0,
                take_profit_2: 110.0,
                take_profit_3: 115.0,
                reward_risk: 2.0,
            }),
            ..Decision::hold(7, ts)
        }
    }

    #[test]
    fn starts_flat() {
        let ctx = ScoringContext::new();
        assert!(ctx.is_flat());
        assert_eq!(ctx.entries(), 0);
        assert!(ctx.position().is_none());
    }

    #[test]
    fn entry_opens_position() {
        let mut ctx = ScoringContext::new();
        ctx.open_from(&entry(Action::EnterLong));
        assert!(!ctx.is_flat());
        let pos = ctx.position().unwrap();
        assert_eq!(pos.side, PositionSide::Long);
        assert_eq!(pos.bar_index, 7);
        assert_eq!(pos.stop_loss, 95.0);
        assert_eq!(pos.take_profits, [105.0, 110.0, 115.0]);
        assert_eq!(ctx.entries(), 1);
    }

    #[test]
    fn hold_does_not_open() {
        let mut ctx = ScoringContext::new();
        ctx.open_from(&entry(Action::Hold));
        assert!(ctx.is_flat());
    }

    #[test]
    fn close_and_reset() {
        let mut ctx = ScoringContext::new();
        ctx.open_from(&entry(Action::EnterShort));
        let closed = ctx.close_position().unwrap();
        assert_eq!(closed.side, PositionSide::Short);
        assert!(ctx.is_flat());
        assert_eq!(ctx.entries(), 1);

        ctx.open_from(&entry(Action::EnterLong));
        ctx.reset();
        assert_eq!(ctx, ScoringContext::new());
    }
}
