//! Stop-loss and take-profit placement.
//!
//! Long: stop = min(swing_low - ATR * sl_buffer, close - ATR * 1.2), i.e. the
//! wider of a structure stop and a volatility stop. Targets sit at multiples
//! of the risk (close - stop) above the close. Shorts mirror this with the
//! swing high.

use crate::config::EngineConfig;
use crate::domain::TradeLevels;
use crate::engine::state::PositionSide;
use crate::features::FeatureRecord;

/// ATR multiple of the volatility-based stop.
pub const VOLATILITY_STOP_ATR: f64 = 1.2;

/// Distance to the second target over distance to the stop.
///
/// Zero when the stop is on the wrong side of (or at) the entry.
pub fn reward_risk(risk: f64, reward: f64) -> f64 {
    if risk > 0.0 {
        reward / risk
    } else {
        0.0
    }
}

/// Levels for entering `side` at the record's close.
pub fn trade_levels(record: &FeatureRecord, side: PositionSide, config: &EngineConfig) -> TradeLevels {
    let close = record.close;
    let atr = record.atr;

    let (stop_loss, risk) = match side {
        PositionSide::Long => {
            let structure = record.swing_low - atr * config.sl_buffer;
            let volatility = close - atr * VOLATILITY_STOP_ATR;
            let stop = structure.min(volatility);
            (stop, close - stop)
        }
        PositionSide::Short => {
            let structure = record.swing_high + atr * config.sl_buffer;
            let volatility = close + atr * VOLATILITY_STOP_ATR;
            let stop = structure.max(volatility);
            (stop, stop - close)
        }
    };

    let target = |multiple: f64| match side {
        PositionSide::Long => close + risk * multiple,
        PositionSide::Short => close - risk * multiple,
    };
    let take_profit_2 = target(config.tp2_rr);

    TradeLevels {
        entry: close,
        stop_loss,
        take_profit_1: target(config.tp1_rr),
        take_profit_2,
        take_profit_3: target(config.tp3_rr),
        reward_risk: reward_risk(risk, (take_profit_2 - close).abs()),
    }
}
