//! TradePilot Live
//!
//! Periodic monitoring loop around the decision engine. A [`MarketFeed`]
//! supplies snapshots; [`LiveMonitor`] checks exits, learns from resolved
//! trades, decides and opens positions, and publishes [`MonitorEvent`]s on a
//! `tokio::sync::mpsc` channel.
//!
//! # Example
//! ```ignore
//! let (tx, mut rx) = tokio::sync::mpsc::channel(256);
//! let mut monitor = LiveMonitor::new(engine, &MonitorConfig::default(), tx)?;
//! let stop = StopFlag::new();
//! tokio::spawn(async move { while let Some(event) = rx.recv().await { /* ... */ } });
//! monitor.run(&mut feed, Duration::from_secs(15), &stop).await?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(missing_docs)]

pub mod error;
pub mod feed;
pub mod monitor;

pub use error::LiveError;
pub use feed::{MarketFeed, MarketSnapshot, ReplayFeed};
pub use monitor::{LiveMonitor, MonitorConfig, MonitorEvent};
