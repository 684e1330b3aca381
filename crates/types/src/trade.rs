//! Executed trades and their outcomes.

use crate::action::{Action, Direction};
use crate::state::MarketState;

/// Reason for trade exit
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// Hit take profit
    TakeProfit,
    /// Hit stop loss
    StopLoss,
    /// Stop moved to entry by the trailing ladder was hit
    BreakEvenStopLoss,
    /// Stop moved into profit by the trailing ladder was hit
    TrailingStopLoss,
}

/// Terminal outcome of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    /// Target reached (or a protected stop closed in profit)
    Win,
    /// Stop reached
    Loss,
}

impl Outcome {
    /// Training reward for this outcome: 1.0 for a win, 0.0 for a loss.
    #[must_use]
    pub const fn reward(self) -> f64 {
        match self {
            Outcome::Win => 1.0,
            Outcome::Loss => 0.0,
        }
    }

    /// Whether this is a win.
    #[must_use]
    pub const fn is_win(self) -> bool {
        matches!(self, Outcome::Win)
    }
}

/// Completed trade, created exactly once when a position resolves.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExecutedTrade {
    /// Position ID
    pub id: u64,
    /// Entry timestamp in nanoseconds
    pub entry_time_ns: i64,
    /// Exit timestamp in nanoseconds
    pub exit_time_ns: i64,
    /// Direction of the trade
    pub direction: Direction,
    /// Trading symbol
    pub symbol: String,
    /// Entry price
    pub entry_price: f64,
    /// Exit price
    pub exit_price: f64,
    /// Stop loss price at exit
    pub stop_loss: f64,
    /// Take profit price at exit
    pub take_profit: f64,
    /// Position size
    pub quantity: f64,
    /// `PnL` in account currency
    pub pnl: f64,
    /// R-multiple (`PnL` / risk)
    pub r_multiple: f64,
    /// WIN or LOSS
    pub outcome: Outcome,
    /// Reason for exit
    pub reason: ExitReason,
    /// Confidence at entry
    pub confidence: f64,
    /// State that produced the entry
    pub state: MarketState,
    /// Action that produced the entry
    pub action: Action,
}
