//! Backtest result and error envelope.

use crate::trade::ExecutedTrade;

/// Backtest result container.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BacktestResult {
    /// Success flag
    pub ok: bool,
    /// Error information if not ok
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorResult>,
    /// List of completed trades
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trades: Option<Vec<ExecutedTrade>>,
    /// Performance metrics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Metrics>,
    /// Equity curve data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equity_curve: Option<Vec<EquityPoint>>,
    /// Result metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResultMeta>,
}

impl BacktestResult {
    /// Result carrying only an error envelope.
    #[must_use]
    pub fn from_error(category: &str, message: String) -> Self {
        Self {
            ok: false,
            error: Some(ErrorResult {
                category: category.to_string(),
                message,
                details: serde_json::Value::Null,
            }),
            trades: None,
            metrics: None,
            equity_curve: None,
            meta: None,
        }
    }
}

/// Error result information
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ErrorResult {
    /// Error category
    pub category: String,
    /// Error message
    pub message: String,
    /// Additional error details
    #[serde(default)]
    pub details: serde_json::Value,
}

/// Point in equity curve
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EquityPoint {
    /// Timestamp in nanoseconds
    pub timestamp_ns: i64,
    /// Balance plus open `PnL`
    pub equity: f64,
    /// Realized balance
    pub balance: f64,
    /// Drawdown fraction from the high water mark
    pub drawdown: f64,
    /// High water mark
    pub high_water: f64,
    /// Whether a position was open at this bar
    #[serde(default)]
    pub in_market: bool,
}

/// Performance metrics
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Metrics {
    /// Total number of trades
    pub total_trades: u64,
    /// Number of winning trades
    pub wins: u64,
    /// Number of losing trades
    pub losses: u64,
    /// Win rate (wins / `total_trades`)
    pub win_rate: f64,
    /// Sum of positive `PnL`
    pub gross_profit: f64,
    /// Sum of negative `PnL` (absolute)
    pub gross_loss: f64,
    /// Net profit
    pub net_profit: f64,
    /// Profit factor (gross profit / gross loss)
    pub profit_factor: f64,
    /// Average win amount
    pub avg_win: f64,
    /// Average loss amount (absolute)
    pub avg_loss: f64,
    /// Largest win
    pub largest_win: f64,
    /// Largest loss (absolute)
    pub largest_loss: f64,
    /// Average R-multiple
    pub avg_r_multiple: f64,
    /// Expected `PnL` per trade
    pub expectancy: f64,
    /// Maximum drawdown fraction
    pub max_drawdown: f64,
    /// Maximum drawdown absolute value
    pub max_drawdown_abs: f64,
    /// Sharpe ratio of per-bar equity returns, annualized with sqrt(252 * 24)
    pub sharpe_ratio: f64,
    /// Total return / max drawdown
    pub calmar_ratio: f64,
    /// Final equity over initial balance minus one
    pub total_return: f64,
    /// Last close over first close minus one
    pub buy_and_hold_return: f64,
    /// Fraction of processed bars with an open position
    pub time_in_market: f64,
}

/// Result metadata
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ResultMeta {
    /// Trading symbol
    #[serde(default)]
    pub symbol: String,
    /// Backtest runtime in seconds
    #[serde(default)]
    pub runtime_seconds: f64,
    /// Number of candles in the input
    #[serde(default)]
    pub candles_total: u64,
    /// Number of candles processed before completion or cancellation
    #[serde(default)]
    pub candles_processed: u64,
    /// Whether the run was stopped early
    #[serde(default)]
    pub cancelled: bool,
    /// Initial balance
    #[serde(default)]
    pub initial_balance: f64,
    /// Final realized balance
    #[serde(default)]
    pub final_balance: f64,
    /// Network training iterations at the end of the run
    #[serde(default)]
    pub network_iterations: u64,
    /// Distinct pattern signatures in memory
    #[serde(default)]
    pub patterns_known: u64,
    /// Start timestamp
    #[serde(default)]
    pub start_timestamp: Option<i64>,
    /// End timestamp
    #[serde(default)]
    pub end_timestamp: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backtest_result_success_serde() {
        let result = BacktestResult {
            ok: true,
            error: None,
            trades: Some(Vec::new()),
            metrics: Some(Metrics {
                total_trades: 1,
                wins: 1,
                win_rate: 1.0,
                net_profit: 30.0,
                ..Metrics::default()
            }),
            equity_curve: None,
            meta: Some(ResultMeta {
                symbol: "BTCUSDT".to_string(),
                candles_total: 10,
                candles_processed: 10,
                ..ResultMeta::default()
            }),
        };

        let json = serde_json::to_string(&result).unwrap();
        let deserialized: BacktestResult = serde_json::from_str(&json).unwrap();

        assert!(deserialized.ok);
        assert!(deserialized.error.is_none());
        assert_eq!(deserialized.metrics.unwrap().total_trades, 1);
        assert!(!json.contains("equity_curve"));
    }

    #[test]
    fn test_backtest_result_error_serde() {
        let result = BacktestResult::from_error("data", "bar 7 is malformed".to_string());

        let json = serde_json::to_string(&result).unwrap();
        let deserialized: BacktestResult = serde_json::from_str(&json).unwrap();

        assert!(!deserialized.ok);
        let error = deserialized.error.unwrap();
        assert_eq!(error.category, "data");
        assert_eq!(error.message, "bar 7 is malformed");
        assert!(deserialized.trades.is_none());
    }
}
