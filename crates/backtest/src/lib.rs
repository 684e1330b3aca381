//! TradePilot Backtest
//!
//! Replays historical candles through the decision engine one bar at a time:
//! exit checks, online learning from resolved trades, pre-filter, evaluation
//! and entry. Produces trades, an equity curve and metrics.
//!
//! # Example
//! ```ignore
//! use tradepilot_backtest::{BacktestSimulator, StopFlag, build_engine};
//!
//! let mut engine = build_engine(&config)?;
//! let stop = StopFlag::new();
//! let run = BacktestSimulator::new(&mut engine, &config)?
//!     .with_stop_flag(stop.clone())
//!     .with_progress(|p| tracing::debug!(progress = p))
//!     .run(candles)?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(missing_docs)]

pub mod error;
mod result_builder;
pub mod runner;
pub mod simulator;
pub mod warmup;

pub use error::BacktestError;
pub use runner::{
    build_engine, run_backtest, run_backtest_from_json, run_backtest_to_json, run_with_engine,
    serialize_error,
};
pub use simulator::{BacktestRun, BacktestSimulator};
pub use tradepilot_types::StopFlag;
