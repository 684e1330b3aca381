//! Core error type.

use thiserror::Error;

/// Core error types for TradePilot
#[derive(Debug, Error)]
pub enum CoreError {
    /// Configuration error
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Candle failed a structural check
    #[error("invalid candle: {0}")]
    InvalidCandle(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
