//! TradePilot Types
//!
//! Core data structures for the TradePilot decision engine.
//! This crate provides candles, actions, market states, indicator bundles,
//! signals, executed trades, configuration, and backtest results.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(missing_docs)]

pub mod action;
pub mod candle;
pub mod config;
pub mod error;
pub mod indicator;
pub mod result;
pub mod signal;
pub mod state;
pub mod stop;
pub mod trade;

// Re-export main types for convenience
pub use action::{Action, Direction};
pub use candle::Candle;
pub use config::{
    BacktestConfig, EngineConfig, FeatureConfig, IndicatorConfig, PrefilterConfig, RiskConfig,
    TrailingConfig, TrailingLevel,
};
pub use error::CoreError;
pub use indicator::{IndicatorBundle, Trend};
pub use result::{BacktestResult, EquityPoint, ErrorResult, Metrics, ResultMeta};
pub use signal::TradeSignal;
pub use state::{FEATURE_COUNT, Feature, MarketState, NEUTRAL_FEATURE};
pub use stop::StopFlag;
pub use trade::{ExecutedTrade, ExitReason, Outcome};
