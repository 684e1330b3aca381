//! # TradePilot Portfolio
//!
//! Position lifecycle and account bookkeeping for the decision engine.
//!
//! ## Overview
//!
//! - **Position Lifecycle**: NONE → PENDING → WIN/LOSS, one position per instrument
//! - **Stop Checks**: stop/target detection, stop-first on same-bar ambiguity
//! - **Trailing Ladder**: optional break-even and trailing stop rungs
//! - **Sizing**: fixed-fractional risk per trade
//! - **Equity Tracker**: equity curve, drawdown and time in market
//!
//! ## Example
//!
//! ```rust
//! use tradepilot_portfolio::PositionLifecycle;
//! use tradepilot_types::{Action, Candle, MarketState, Outcome, RiskConfig, TradeSignal};
//!
//! let mut lifecycle = PositionLifecycle::new("BTCUSDT", &RiskConfig::default());
//! let signal = TradeSignal {
//!     action: Action::Buy,
//!     entry_price: 100.0,
//!     stop_loss: 98.0,
//!     take_profit: 106.0,
//!     confidence: 60.0,
//!     reasoning: String::new(),
//!     confluence: Vec::new(),
//!     risk_reward: 3.0,
//!     timestamp_ns: 1,
//! };
//! lifecycle.open(&signal, MarketState::neutral(), 1_000.0).unwrap();
//!
//! let bar = Candle { timestamp_ns: 2, open: 101.0, high: 106.5, low: 100.5, close: 106.0, volume: 1.0 };
//! let trade = lifecycle.check_bar(&bar).unwrap().unwrap();
//! assert_eq!(trade.outcome, Outcome::Win);
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(missing_docs)]

pub mod equity;
pub mod error;
pub mod lifecycle;
pub mod sizing;
pub mod stops;
pub mod trailing;

pub use equity::EquityTracker;
pub use error::LifecycleError;
pub use lifecycle::{Position, PositionLifecycle, PositionState};
pub use sizing::{position_size, risk_amount};
pub use stops::{StopHit, StopLevels, check_stops};
pub use trailing::{TrailingLadder, TrailingUpdate};
