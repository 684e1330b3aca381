//! TradePilot Strategy
//!
//! Per-bar decision pipeline of the trading engine.
//!
//! # Features
//! - [`FeatureExtractor`]: candles + indicators → normalized [`MarketState`](tradepilot_types::MarketState)
//! - [`DecisionPolicy`]: epsilon-greedy selection with an injectable [`RandomSource`]
//! - [`prefilter`]: cheap gate before a full evaluation
//! - [`build_signal`]: ATR/structure priced [`TradeSignal`](tradepilot_types::TradeSignal)
//! - [`DecisionEngine`]: single owner of network, pattern memory and confidence
//!
//! # Example
//! ```ignore
//! use tradepilot_strategy::DecisionEngine;
//!
//! let mut engine = DecisionEngine::new(&config.engine, config.features, config.risk)?;
//! let eval = engine.evaluate(&window, &bundle, sentiment)?;
//! if let Some(signal) = eval.signal {
//!     // open a position...
//! }
//! ```

#![deny(clippy::all)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]

pub mod engine;
pub mod error;
pub mod features;
pub mod policy;
pub mod prefilter;
pub mod signal;

pub use engine::{
    DecisionEngine, Evaluation, LabeledTrade, MEMORY_KEY, NETWORK_KEY, RetrainReport,
};
pub use error::StrategyError;
pub use features::FeatureExtractor;
pub use policy::{Decision, DecisionPolicy, RandomSource, SeededRandom};
pub use prefilter::{PrefilterHit, prefilter};
pub use signal::{Rejection, SignalContext, build_signal};
