//! Market input for the live monitor.

use tradepilot_types::Candle;

/// Latest market view handed to one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSnapshot {
    /// Recent candles, ascending, the last one being the bar to act on
    pub candles: Vec<Candle>,
    /// Sentiment in [-1, 1]
    pub sentiment: f64,
}

/// Source of market snapshots.
///
/// Transport, retries and caching live in the implementation. Returning
/// `None` ends the monitor loop.
pub trait MarketFeed: Send {
    /// Current snapshot, or `None` when the feed is exhausted.
    fn latest(&mut self) -> Option<MarketSnapshot>;
}

/// Replays a candle series as a growing window, one bar per call.
#[derive(Debug, Clone)]
pub struct ReplayFeed {
    candles: Vec<Candle>,
    next: usize,
    sentiment: f64,
}

impl ReplayFeed {
    /// First snapshot holds `min_window` candles (at least one).
    #[must_use]
    pub fn new(candles: Vec<Candle>, min_window: usize) -> Self {
        Self {
            candles,
            next: min_window.max(1),
            sentiment: 0.0,
        }
    }

    /// Constant sentiment attached to every snapshot.
    #[must_use]
    pub fn with_sentiment(mut self, sentiment: f64) -> Self {
        self.sentiment = sentiment;
        self
    }

    /// Snapshots left.
    #[must_use]
    pub fn remaining(&self) -> usize {
        (self.candles.len() + 1).saturating_sub(self.next)
    }
}

impl MarketFeed for ReplayFeed {
    fn latest(&mut self) -> Option<MarketSnapshot> {
        if self.next > self.candles.len() {
            return None;
        }
        let snapshot = MarketSnapshot {
            candles: self.candles[..self.next].to_vec(),
            sentiment: self.sentiment,
        };
        self.next += 1;
        Some(snapshot)
    }
}
