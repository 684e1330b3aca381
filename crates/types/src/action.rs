//! Actions scored by the network and trade directions.

use std::fmt;

/// Candidate action scored by the decision network.
///
/// The declaration order is the tie-break priority: BUY > SELL > HOLD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Open a long position
    Buy,
    /// Open a short position
    Sell,
    /// Stay flat
    Hold,
}

impl Action {
    /// All actions in output-slot and priority order.
    pub const ALL: [Action; 3] = [Action::Buy, Action::Sell, Action::Hold];

    /// Number of actions (network output width).
    pub const COUNT: usize = 3;

    /// Output slot of this action in a Q-value vector.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Action::Buy => 0,
            Action::Sell => 1,
            Action::Hold => 2,
        }
    }

    /// Inverse of [`Action::index`].
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Action::Buy),
            1 => Some(Action::Sell),
            2 => Some(Action::Hold),
            _ => None,
        }
    }

    /// Trade direction opened by this action, `None` for HOLD.
    #[must_use]
    pub const fn direction(self) -> Option<Direction> {
        match self {
            Action::Buy => Some(Direction::Long),
            Action::Sell => Some(Direction::Short),
            Action::Hold => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
            Action::Hold => "HOLD",
        };
        f.write_str(label)
    }
}

/// Direction of a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Long position
    Long,
    /// Short position
    Short,
}

impl Direction {
    /// +1 for long, -1 for short.
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }

    /// Action that opens a position in this direction.
    #[must_use]
    pub const fn action(self) -> Action {
        match self {
            Direction::Long => Action::Buy,
            Direction::Short => Action::Sell,
        }
    }
}
