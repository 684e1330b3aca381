//! Live monitor error types.

use thiserror::Error;

/// Errors raised by the live monitor.
#[derive(Debug, Error)]
pub enum LiveError {
    /// The event receiver was dropped
    #[error("event channel closed")]
    ChannelClosed,

    /// Indicator set could not be built
    #[error("indicator error: {0}")]
    Indicator(#[from] tradepilot_indicators::IndicatorError),

    /// Decision engine failure
    #[error("strategy error: {0}")]
    Strategy(#[from] tradepilot_strategy::StrategyError),

    /// Position lifecycle failure
    #[error("lifecycle error: {0}")]
    Lifecycle(#[from] tradepilot_portfolio::LifecycleError),
}
