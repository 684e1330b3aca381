//! Stop-loss and take-profit checking.
//!
//! **The stop has priority over the target in the same candle.** When both
//! levels lie inside one bar's range the intrabar order is unknown, so the
//! conservative resolution is taken.

use tradepilot_types::{Candle, Direction, ExitReason};

/// Result of a stop check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopHit {
    /// Exit reason
    pub reason: ExitReason,
    /// Exit price (exactly the stop or target level)
    pub exit_price: f64,
}

/// Levels of an open position, as seen by the stop check.
#[derive(Debug, Clone, Copy)]
pub struct StopLevels {
    /// Trade direction
    pub direction: Direction,
    /// Entry price
    pub entry_price: f64,
    /// Current stop
    pub stop_loss: f64,
    /// Current target
    pub take_profit: f64,
}

/// Checks whether `candle` touches the stop or the target.
#[must_use]
pub fn check_stops(levels: &StopLevels, candle: &Candle) -> Option<StopHit> {
    let (stop_hit, target_hit) = match levels.direction {
        Direction::Long => (
            candle.low <= levels.stop_loss,
            candle.high >= levels.take_profit,
        ),
        Direction::Short => (
            candle.high >= levels.stop_loss,
            candle.low <= levels.take_profit,
        ),
    };

    if stop_hit {
        return Some(StopHit {
            reason: stop_reason(levels),
            exit_price: levels.stop_loss,
        });
    }
    if target_hit {
        return Some(StopHit {
            reason: ExitReason::TakeProfit,
            exit_price: levels.take_profit,
        });
    }
    None
}

/// Classifies a stop exit by where the stop sits relative to entry.
fn stop_reason(levels: &StopLevels) -> ExitReason {
    let locked = levels.direction.sign() * (levels.stop_loss - levels.entry_price);
    let tolerance = levels.entry_price.abs() * f64::EPSILON;
    if locked > tolerance {
        ExitReason::TrailingStopLoss
    } else if locked >= -tolerance {
        ExitReason::BreakEvenStopLoss
    } else {
        ExitReason::StopLoss
    }
}
