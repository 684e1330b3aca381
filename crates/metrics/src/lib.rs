//! TradePilot Metrics
//!
//! Performance metrics over executed trades and the per-bar equity curve.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(missing_docs)]

/// Metric computation entrypoints.
pub mod compute;
/// Equity-curve metric helpers.
pub mod equity_metrics;
/// Output rounding helpers.
pub mod output;
/// Trade-based metric helpers.
pub mod trade_metrics;

pub use compute::{PriceRange, compute_metrics};
pub use equity_metrics::{BARS_PER_YEAR, compute_drawdown, sharpe_ratio};
pub use output::round_metrics;
