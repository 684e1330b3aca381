//! Break-even / trailing ladder.
//!
//! Each rung fires once the bar closes at least `trigger_pct` in profit and
//! moves the stop to `entry ± stop_offset_pct` (and optionally the target to
//! `entry ± target_pct`). Rungs only ever move forward.

use tradepilot_types::{Direction, TrailingConfig, TrailingLevel};

/// New levels produced by a rung.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailingUpdate {
    /// Index of the rung that fired
    pub rung: usize,
    /// New stop
    pub stop_loss: f64,
    /// New target, if the rung moves it
    pub take_profit: Option<f64>,
}

/// Ordered set of rungs.
#[derive(Debug, Clone, Default)]
pub struct TrailingLadder {
    levels: Vec<TrailingLevel>,
}

impl TrailingLadder {
    /// Ladder from config; empty when disabled.
    #[must_use]
    pub fn from_config(config: &TrailingConfig) -> Self {
        if config.enabled {
            Self {
                levels: config.levels.clone(),
            }
        } else {
            Self::default()
        }
    }

    /// Whether any rung is configured.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.levels.is_empty()
    }

    /// Highest rung above `current_rung` reached by `close`, with its levels.
    ///
    /// The returned stop never moves against the trade relative to `current_stop`.
    #[must_use]
    pub fn evaluate(
        &self,
        direction: Direction,
        entry: f64,
        current_stop: f64,
        current_rung: Option<usize>,
        close: f64,
    ) -> Option<TrailingUpdate> {
        if entry <= 0.0 {
            return None;
        }
        let sign = direction.sign();
        let profit_pct = sign * (close - entry) / entry;

        let (rung, level) = self
            .levels
            .iter()
            .enumerate()
            .rev()
            .find(|(_, level)| profit_pct >= level.trigger_pct)?;
        if current_rung.is_some_and(|current| rung <= current) {
            return None;
        }

        let candidate = entry * (1.0 + sign * level.stop_offset_pct);
        let stop_loss = if sign * (candidate - current_stop) > 0.0 {
            candidate
        } else {
            current_stop
        };
        Some(TrailingUpdate {
            rung,
            stop_loss,
            take_profit: level.target_pct.map(|pct| entry * (1.0 + sign * pct)),
        })
    }
}
