//! Trade signal emitted by the decision engine.

use crate::action::Action;

/// Trading decision emitted to callers.
///
/// Built once by the signal builder and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TradeSignal {
    /// Decided action
    pub action: Action,
    /// Entry price
    pub entry_price: f64,
    /// Stop loss price
    pub stop_loss: f64,
    /// Take profit price
    pub take_profit: f64,
    /// Blended confidence in [0,100]
    pub confidence: f64,
    /// Human-readable reasoning
    pub reasoning: String,
    /// Confluence tags (e.g. `rsi_oversold`, `near_support`)
    #[serde(default)]
    pub confluence: Vec<String>,
    /// Reward distance divided by risk distance
    pub risk_reward: f64,
    /// Timestamp of the bar that produced the signal
    pub timestamp_ns: i64,
}

impl TradeSignal {
    /// Whether the signal asks to open a position.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        self.action != Action::Hold
    }

    /// Absolute distance between entry and stop.
    #[must_use]
    pub fn stop_distance(&self) -> f64 {
        (self.entry_price - self.stop_loss).abs()
    }
}
