//! Error types for the portfolio crate.

use thiserror::Error;

/// Errors raised by the position lifecycle.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// A position is already open for the instrument
    #[error("position {id} already open")]
    AlreadyOpen {
        /// ID of the open position
        id: u64,
    },

    /// Resolution requested for a position that is no longer pending
    #[error("position {id} is not pending")]
    NotPending {
        /// Position ID
        id: u64,
    },

    /// HOLD signal, or stop/target on the wrong side of entry
    #[error("invalid signal: {0}")]
    InvalidSignal(String),

    /// Quantity could not be derived from balance and stop distance
    #[error("invalid position size: {0}")]
    InvalidSize(String),
}
