//! Backtest error types.

use serde_json::json;
use thiserror::Error;
use tradepilot_types::ErrorResult;

/// Errors that can occur during a backtest run.
#[derive(Debug, Error)]
pub enum BacktestError {
    /// JSON config parse error
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// Config validation error
    #[error("config validation error: {0}")]
    ConfigValidation(String),

    /// Bar failed OHLC validation
    #[error("malformed bar at index {index}: {reason}")]
    MalformedBar {
        /// Position in the input series
        index: usize,
        /// Violated rule
        reason: String,
    },

    /// Bar timestamp not strictly after the previous one
    #[error("non-monotonic timestamp at index {index}: {current} after {previous}")]
    NonMonotonic {
        /// Position in the input series
        index: usize,
        /// Timestamp of the previous bar
        previous: i64,
        /// Timestamp of the offending bar
        current: i64,
    },

    /// Not enough data for warmup
    #[error("insufficient data: need {required}, have {available}")]
    InsufficientData {
        /// Required number of bars
        required: usize,
        /// Available number of bars
        available: usize,
    },

    /// Data loading or validation error
    #[error("data error: {0}")]
    Data(#[from] tradepilot_data::DataError),

    /// Indicator configuration error
    #[error("indicator error: {0}")]
    Indicator(#[from] tradepilot_indicators::IndicatorError),

    /// Decision engine error
    #[error("strategy error: {0}")]
    Strategy(#[from] tradepilot_strategy::StrategyError),

    /// Position lifecycle error
    #[error("lifecycle error: {0}")]
    Lifecycle(#[from] tradepilot_portfolio::LifecycleError),

    /// Model store could not be opened
    #[error("model store error: {0}")]
    Store(#[from] tradepilot_model::StoreError),

    /// Result serialization error
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BacktestError {
    /// Returns true if this is a config parse/validation error.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            BacktestError::ConfigParse(_) | BacktestError::ConfigValidation(_)
        )
    }

    /// Returns the error category for the output contract.
    /// Categories: `config`, `market_data`, `execution`, `strategy`, `runtime`
    #[must_use]
    pub fn error_category(&self) -> &'static str {
        match self {
            BacktestError::ConfigParse(_) | BacktestError::ConfigValidation(_) => "config",

            BacktestError::Data(_)
            | BacktestError::MalformedBar { .. }
            | BacktestError::NonMonotonic { .. }
            | BacktestError::InsufficientData { .. } => "market_data",

            BacktestError::Lifecycle(_) => "execution",

            BacktestError::Strategy(_) => "strategy",

            BacktestError::Indicator(_) | BacktestError::Store(_) | BacktestError::Json(_) => {
                "runtime"
            }
        }
    }

    fn details(&self) -> serde_json::Value {
        match self {
            BacktestError::MalformedBar { index, .. } => json!({ "index": index }),
            BacktestError::NonMonotonic {
                index,
                previous,
                current,
            } => json!({ "index": index, "previous": previous, "current": current }),
            BacktestError::InsufficientData {
                required,
                available,
            } => json!({ "required": required, "available": available }),
            _ => json!({}),
        }
    }
}

impl From<BacktestError> for ErrorResult {
    fn from(err: BacktestError) -> Self {
        Self {
            category: err.error_category().to_string(),
            message: err.to_string(),
            details: err.details(),
        }
    }
}
