//! Tick-driven position monitor.
//!
//! Each tick runs exit check → learning → decision → open against the latest
//! snapshot and publishes what happened on an mpsc channel. The monitor owns
//! its engine, so one task serializes every mutation of the learned state.
//!
//! Like the backtest, no decision is made until a snapshot holds more than
//! `warmup` bars.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tradepilot_indicators::IndicatorSnapshot;
use tradepilot_portfolio::{LifecycleError, Position, PositionLifecycle};
use tradepilot_strategy::{DecisionEngine, PrefilterHit, prefilter};
use tradepilot_types::{
    Action, BacktestConfig, ExecutedTrade, IndicatorConfig, PrefilterConfig, StopFlag,
    TradeSignal,
};

use crate::error::LiveError;
use crate::feed::{MarketFeed, MarketSnapshot};

/// Something the monitor did during a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorEvent {
    /// The engine scored a bar that passed the pre-filter
    Decision {
        /// Bar open time
        timestamp_ns: i64,
        /// Chosen action
        action: Action,
        /// Blended confidence (0–100)
        confidence: f64,
        /// Chosen by exploration
        explored: bool,
        /// Why the bar qualified
        hit: PrefilterHit,
    },
    /// A signal was accepted and a position opened
    PositionOpened {
        /// Position id
        id: u64,
        /// Accepted signal
        signal: TradeSignal,
    },
    /// The open position resolved
    PositionClosed(ExecutedTrade),
}

/// Monitor settings.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Instrument
    pub symbol: String,
    /// Starting balance used for sizing
    pub initial_balance: f64,
    /// Indicator periods
    pub indicators: IndicatorConfig,
    /// Pre-filter thresholds
    pub prefilter: PrefilterConfig,
    /// Bars a snapshot must exceed before the engine is asked to decide.
    /// Raised to the indicator window when smaller.
    pub warmup: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::from(&BacktestConfig::default())
    }
}

impl From<&BacktestConfig> for MonitorConfig {
    fn from(config: &BacktestConfig) -> Self {
        Self {
            symbol: config.symbol.clone(),
            initial_balance: config.initial_balance,
            indicators: config.indicators.clone(),
            prefilter: config.prefilter.clone(),
            warmup: config.effective_warmup(),
        }
    }
}

/// Live counterpart of the backtest simulator.
#[derive(Debug)]
pub struct LiveMonitor {
    engine: DecisionEngine,
    indicators: IndicatorSnapshot,
    prefilter: PrefilterConfig,
    lifecycle: PositionLifecycle,
    warmup: usize,
    balance: f64,
    last_timestamp: Option<i64>,
    events: mpsc::Sender<MonitorEvent>,
}

impl LiveMonitor {
    /// Creates a flat monitor publishing on `events`.
    ///
    /// # Errors
    /// Returns [`LiveError::Indicator`] when the indicator config is invalid.
    pub fn new(
        engine: DecisionEngine,
        config: &MonitorConfig,
        events: mpsc::Sender<MonitorEvent>,
    ) -> Result<Self, LiveError> {
        let indicators = IndicatorSnapshot::new(&config.indicators)?;
        let lifecycle = PositionLifecycle::new(config.symbol.clone(), engine.risk());
        let warmup = config.warmup.max(config.indicators.longest_window());
        Ok(Self {
            engine,
            indicators,
            prefilter: config.prefilter.clone(),
            lifecycle,
            warmup,
            balance: config.initial_balance,
            last_timestamp: None,
            events,
        })
    }

    /// Bars a snapshot must exceed before decisions start.
    #[must_use]
    pub fn warmup(&self) -> usize {
        self.warmup
    }

    /// Realized balance.
    #[must_use]
    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// Open position, if any.
    #[must_use]
    pub fn position(&self) -> Option<&Position> {
        self.lifecycle.position()
    }

    /// The owned engine.
    #[must_use]
    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    /// Releases the engine, e.g. to persist or reuse it.
    #[must_use]
    pub fn into_engine(self) -> DecisionEngine {
        self.engine
    }

    /// Processes the last candle of `snapshot` once.
    ///
    /// Snapshots whose last bar is not newer than the previous tick's, and
    /// malformed bars, produce no events. Exits are always checked; a new
    /// decision needs more than [`LiveMonitor::warmup`] bars.
    ///
    /// # Errors
    /// - [`LiveError::ChannelClosed`] when the receiver is gone
    /// - engine and lifecycle errors
    pub async fn tick(&mut self, snapshot: MarketSnapshot) -> Result<Vec<MonitorEvent>, LiveError> {
        let Some(candle) = snapshot.candles.last().copied() else {
            return Ok(Vec::new());
        };
        if let Some(last) = self.last_timestamp
            && candle.timestamp_ns <= last
        {
            tracing::debug!(timestamp_ns = candle.timestamp_ns, last, "stale snapshot");
            return Ok(Vec::new());
        }
        if let Err(err) = candle.check() {
            tracing::warn!(timestamp_ns = candle.timestamp_ns, %err, "malformed bar ignored");
            return Ok(Vec::new());
        }
        self.last_timestamp = Some(candle.timestamp_ns);

        let mut events = Vec::new();
        let was_open = self.lifecycle.is_open();
        if let Some(trade) = self.lifecycle.check_bar(&candle)? {
            self.balance += trade.pnl;
            self.engine.learn(&trade)?;
            events.push(MonitorEvent::PositionClosed(trade));
        }

        if !was_open && snapshot.candles.len() > self.warmup {
            let start = snapshot.candles.len().saturating_sub(self.indicators.window());
            let window = &snapshot.candles[start..];
            let bundle = self.indicators.bundle(window);
            if let Some(hit) = prefilter(&self.prefilter, candle.close, &bundle) {
                let evaluation = self.engine.evaluate(window, &bundle, snapshot.sentiment)?;
                events.push(MonitorEvent::Decision {
                    timestamp_ns: candle.timestamp_ns,
                    action: evaluation.decision.action,
                    confidence: evaluation.confidence,
                    explored: evaluation.decision.explored,
                    hit,
                });
                if let Some(signal) = evaluation.signal {
                    match self.lifecycle.open(&signal, evaluation.state, self.balance) {
                        Ok(position) => events.push(MonitorEvent::PositionOpened {
                            id: position.id(),
                            signal,
                        }),
                        Err(LifecycleError::InvalidSize(reason)) => {
                            tracing::warn!(timestamp_ns = candle.timestamp_ns, %reason, "entry skipped");
                        }
                        Err(err) => return Err(err.into()),
                    }
                }
            }
        }

        for event in &events {
            self.events
                .send(event.clone())
                .await
                .map_err(|_| LiveError::ChannelClosed)?;
        }
        Ok(events)
    }

    /// Ticks every `period` until `stop` is set or the feed is exhausted.
    ///
    /// Returns the number of snapshots processed.
    ///
    /// # Errors
    /// Stops at the first tick error.
    pub async fn run<F: MarketFeed>(
        &mut self,
        feed: &mut F,
        period: Duration,
        stop: &StopFlag,
    ) -> Result<usize, LiveError> {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut ticks = 0;

        tracing::info!(period_ms = period.as_millis(), "live monitor started");
        loop {
            interval.tick().await;
            if stop.is_stopped() {
                break;
            }
            let Some(snapshot) = feed.latest() else {
                break;
            };
            self.tick(snapshot).await?;
            ticks += 1;
        }
        tracing::info!(ticks, balance = self.balance, "live monitor stopped");
        Ok(ticks)
    }
}
