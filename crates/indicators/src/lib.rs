//! TradePilot Indicators
//!
//! Causal technical indicators for the TradePilot decision engine.
//! Every indicator value at index `i` depends only on candles `0..=i`.
//!
//! # Features
//! - Indicator trait with vectorized computation
//! - Multi-output indicators (Bollinger Bands, support/resistance)
//! - [`IndicatorSnapshot`] building an [`IndicatorBundle`](tradepilot_types::IndicatorBundle)
//!   for the last bar of a candle window
//!
//! # Available Indicators
//! - SMA: Simple Moving Average
//! - EMA: Exponential Moving Average
//! - RSI: Relative Strength Index (Wilder smoothing)
//! - ATR: Average True Range (Wilder smoothing)
//! - Bollinger Bands: Upper, Middle, Lower bands
//! - Support/Resistance: rolling low/high
//! - Trend classification from fast/slow EMA

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(missing_docs)]

pub mod error;
pub mod impl_;
pub mod snapshot;
pub mod traits;

// Re-export main types
pub use error::IndicatorError;
pub use snapshot::IndicatorSnapshot;
pub use traits::{Indicator, MultiOutputIndicator};

// Re-export indicator implementations
pub use impl_::{
    atr::ATR,
    bollinger::{BollingerBands, BollingerResult},
    ema::EMA,
    rsi::RSI,
    sma::SMA,
    structure::{StructureLevels, SupportResistance},
    trend::classify_trend,
};
