//! Strategy error types

use thiserror::Error;
use tradepilot_model::ModelError;

/// Errors raised by the decision policy and the decision engine.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// Exploration rate outside [0,1] or NaN
    #[error("invalid epsilon {0}: must be within [0, 1]")]
    InvalidEpsilon(f64),

    /// Q-vector with the wrong number of entries or NaN values
    #[error("invalid q-values: {0}")]
    InvalidQValues(String),

    /// Evaluation requested without any candle
    #[error("empty candle window")]
    EmptyWindow,

    /// Configuration rejected at construction
    #[error("configuration error: {0}")]
    Config(String),

    /// Network, pattern memory or confidence failure
    #[error(transparent)]
    Model(#[from] ModelError),
}
