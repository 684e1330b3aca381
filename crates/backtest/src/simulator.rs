//! Causal bar-by-bar simulation.
//!
//! Candles are pulled from the input iterator one at a time and appended to a
//! growing history. Everything computed for bar `i` (indicators, features,
//! decisions, exits) reads `history[..=i]` only.

use tradepilot_indicators::IndicatorSnapshot;
use tradepilot_metrics::PriceRange;
use tradepilot_portfolio::{EquityTracker, LifecycleError, PositionLifecycle};
use tradepilot_strategy::{DecisionEngine, prefilter};
use tradepilot_types::{
    BacktestConfig, Candle, EquityPoint, ExecutedTrade, PrefilterConfig, StopFlag,
};

use crate::error::BacktestError;
use crate::warmup::validate_warmup;

/// Output of one [`BacktestSimulator::run`].
#[derive(Debug, Clone)]
pub struct BacktestRun {
    /// Resolved trades in exit order
    pub trades: Vec<ExecutedTrade>,
    /// One point per processed bar
    pub equity_curve: Vec<EquityPoint>,
    /// Starting balance
    pub initial_balance: f64,
    /// Realized balance after the last processed bar
    pub final_balance: f64,
    /// Length of the input series
    pub bars_total: usize,
    /// Bars after warmup that went through the pipeline
    pub bars_processed: usize,
    /// Close of the first processed bar
    pub first_close: Option<f64>,
    /// Close of the last processed bar
    pub last_close: Option<f64>,
    /// Timestamp of the first processed bar
    pub start_timestamp: Option<i64>,
    /// Timestamp of the last processed bar
    pub end_timestamp: Option<i64>,
    /// A position was still pending when the run ended
    pub open_at_end: bool,
    /// The stop flag ended the run early
    pub cancelled: bool,
}

impl BacktestRun {
    /// First/last processed close, when any bar was processed.
    #[must_use]
    pub fn price_range(&self) -> Option<PriceRange> {
        Some(PriceRange {
            first_close: self.first_close?,
            last_close: self.last_close?,
        })
    }
}

/// Drives the decision engine and position lifecycle over historical candles.
///
/// Borrows the engine mutably for its whole lifetime, so learning from
/// resolved trades carries over to later bars and survives the run.
pub struct BacktestSimulator<'a> {
    engine: &'a mut DecisionEngine,
    indicators: IndicatorSnapshot,
    prefilter: PrefilterConfig,
    lifecycle: PositionLifecycle,
    warmup: usize,
    sentiment: f64,
    initial_balance: f64,
    stop: StopFlag,
    progress: Option<Box<dyn FnMut(f64) + 'a>>,
}

impl<'a> BacktestSimulator<'a> {
    /// Creates a simulator for `config`.
    ///
    /// Exit levels and sizing follow the engine's risk config.
    ///
    /// # Errors
    /// - [`BacktestError::ConfigValidation`] when `config` fails validation
    /// - [`BacktestError::Indicator`] when the indicator set cannot be built
    pub fn new(engine: &'a mut DecisionEngine, config: &BacktestConfig) -> Result<Self, BacktestError> {
        config
            .validate()
            .map_err(|e| BacktestError::ConfigValidation(e.to_string()))?;
        let indicators = IndicatorSnapshot::new(&config.indicators)?;
        let lifecycle = PositionLifecycle::new(config.symbol.clone(), engine.risk());

        Ok(Self {
            engine,
            indicators,
            prefilter: config.prefilter.clone(),
            lifecycle,
            warmup: config.effective_warmup(),
            sentiment: config.sentiment,
            initial_balance: config.initial_balance,
            stop: StopFlag::new(),
            progress: None,
        })
    }

    /// Uses `stop` for cooperative cancellation.
    #[must_use]
    pub fn with_stop_flag(mut self, stop: StopFlag) -> Self {
        self.stop = stop;
        self
    }

    /// Reports `(i + 1) / total` after every input bar.
    #[must_use]
    pub fn with_progress(mut self, callback: impl FnMut(f64) + 'a) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Bars skipped before the first decision.
    #[must_use]
    pub fn warmup(&self) -> usize {
        self.warmup
    }

    /// Runs the simulation to the end of `candles` or until the stop flag is set.
    ///
    /// A cancelled run still returns `Ok` with everything produced so far.
    ///
    /// # Errors
    /// - [`BacktestError::InsufficientData`] when the series does not exceed the warmup
    /// - [`BacktestError::MalformedBar`] / [`BacktestError::NonMonotonic`] at the first bad bar
    /// - engine and lifecycle errors raised while processing a bar
    #[allow(clippy::cast_precision_loss)] // bar counts stay far below 2^52
    pub fn run<I>(mut self, candles: I) -> Result<BacktestRun, BacktestError>
    where
        I: IntoIterator<Item = Candle>,
        I::IntoIter: ExactSizeIterator,
    {
        let candles = candles.into_iter();
        let total = candles.len();
        validate_warmup(total, self.warmup)?;

        tracing::info!(
            "Starting backtest: {} bars ({} warmup, {} trading)",
            total,
            self.warmup,
            total - self.warmup
        );

        let mut history: Vec<Candle> = Vec::with_capacity(total);
        let mut tracker = EquityTracker::new(self.initial_balance);
        let mut balance = self.initial_balance;
        let mut run = BacktestRun {
            trades: Vec::new(),
            equity_curve: Vec::new(),
            initial_balance: self.initial_balance,
            final_balance: self.initial_balance,
            bars_total: total,
            bars_processed: 0,
            first_close: None,
            last_close: None,
            start_timestamp: None,
            end_timestamp: None,
            open_at_end: false,
            cancelled: false,
        };

        for (index, candle) in candles.enumerate() {
            if self.stop.is_stopped() {
                tracing::info!(index, "backtest cancelled");
                run.cancelled = true;
                break;
            }

            candle.check().map_err(|e| BacktestError::MalformedBar {
                index,
                reason: e.to_string(),
            })?;
            if let Some(previous) = history.last()
                && candle.timestamp_ns <= previous.timestamp_ns
            {
                return Err(BacktestError::NonMonotonic {
                    index,
                    previous: previous.timestamp_ns,
                    current: candle.timestamp_ns,
                });
            }
            history.push(candle);

            if index >= self.warmup {
                balance = self.process_bar(&history, balance, &mut run)?;
                let equity = balance + self.lifecycle.unrealized_pnl(candle.close);
                tracker.update(candle.timestamp_ns, equity, balance, self.lifecycle.is_open());

                run.bars_processed += 1;
                run.first_close.get_or_insert(candle.close);
                run.start_timestamp.get_or_insert(candle.timestamp_ns);
                run.last_close = Some(candle.close);
                run.end_timestamp = Some(candle.timestamp_ns);
            }

            if let Some(progress) = self.progress.as_mut() {
                progress((index + 1) as f64 / total as f64);
            }
        }

        run.final_balance = balance;
        run.open_at_end = self.lifecycle.is_open();
        run.equity_curve = tracker.into_equity_curve();

        tracing::info!(
            trades = run.trades.len(),
            bars_processed = run.bars_processed,
            final_balance = run.final_balance,
            open_at_end = run.open_at_end,
            cancelled = run.cancelled,
            "Backtest finished"
        );

        Ok(run)
    }

    /// Exit check, then (when flat at bar start) pre-filter, evaluation and entry.
    /// Returns the updated realized balance.
    fn process_bar(
        &mut self,
        history: &[Candle],
        mut balance: f64,
        run: &mut BacktestRun,
    ) -> Result<f64, BacktestError> {
        let Some(candle) = history.last() else {
            return Ok(balance);
        };

        let was_open = self.lifecycle.is_open();
        if let Some(trade) = self.lifecycle.check_bar(candle)? {
            balance += trade.pnl;
            self.engine.learn(&trade)?;
            run.trades.push(trade);
        }
        if was_open {
            return Ok(balance);
        }

        let start = history.len().saturating_sub(self.indicators.window());
        let window = &history[start..];
        let bundle = self.indicators.bundle(window);
        let Some(hit) = prefilter(&self.prefilter, candle.close, &bundle) else {
            return Ok(balance);
        };

        let evaluation = self.engine.evaluate(window, &bundle, self.sentiment)?;
        tracing::debug!(
            timestamp_ns = candle.timestamp_ns,
            ?hit,
            action = %evaluation.decision.action,
            "pre-filter passed"
        );
        if let Some(signal) = evaluation.signal {
            match self.lifecycle.open(&signal, evaluation.state, balance) {
                Ok(_) => {}
                Err(LifecycleError::InvalidSize(reason)) => {
                    tracing::warn!(timestamp_ns = candle.timestamp_ns, %reason, "entry skipped");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Ok(balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradepilot_types::{EngineConfig, IndicatorConfig};

    fn small_config() -> BacktestConfig {
        BacktestConfig {
            warmup_bars: Some(30),
            engine: EngineConfig {
                epsilon: 0.0,
                action_threshold: 0.0,
                ..EngineConfig::default()
            },
            indicators: IndicatorConfig {
                rsi_period: 5,
                ema_fast: 5,
                ema_slow: 20,
                sma_period: 10,
                atr_period: 5,
                bollinger_period: 10,
                bollinger_std: 2.0,
                structure_lookback: 10,
            },
            ..BacktestConfig::default()
        }
    }

    fn engine(config: &BacktestConfig) -> DecisionEngine {
        DecisionEngine::new(&config.engine, config.features.clone(), config.risk.clone()).unwrap()
    }

    fn zigzag(len: usize) -> Vec<Candle> {
        (0..len)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let x = i as f64;
                let close = 100.0 + 8.0 * (x / 6.0).sin() + 0.05 * x;
                Candle {
                    timestamp_ns: 1_000 + i64::try_from(i).unwrap() * 60,
                    open: close - 0.3,
                    high: close + 1.2,
                    low: close - 1.2,
                    close,
                    volume: 10.0,
                }
            })
            .collect()
    }

    #[test]
    fn test_run_processes_bars_after_warmup() {
        let config = small_config();
        let mut engine = engine(&config);
        let candles = zigzag(120);

        let run = BacktestSimulator::new(&mut engine, &config)
            .unwrap()
            .run(candles.clone())
            .unwrap();

        assert_eq!(run.bars_total, 120);
        assert_eq!(run.bars_processed, 90);
        assert_eq!(run.equity_curve.len(), 90);
        assert_eq!(run.start_timestamp, Some(candles[30].timestamp_ns));
        assert_eq!(run.end_timestamp, Some(candles[119].timestamp_ns));
        assert!(!run.cancelled);
        let realized: f64 = run.trades.iter().map(|t| t.pnl).sum();
        approx::assert_relative_eq!(run.final_balance, 1_000.0 + realized, epsilon = 1e-9);
    }

    #[test]
    fn test_warmup_never_below_longest_indicator() {
        let mut config = small_config();
        config.warmup_bars = Some(1);
        let mut engine = engine(&config);
        let simulator = BacktestSimulator::new(&mut engine, &config).unwrap();
        assert_eq!(simulator.warmup(), 20);
    }

    #[test]
    fn test_insufficient_data() {
        let config = small_config();
        let mut engine = engine(&config);
        let err = BacktestSimulator::new(&mut engine, &config)
            .unwrap()
            .run(zigzag(30))
            .unwrap_err();
        assert!(matches!(
            err,
            BacktestError::InsufficientData {
                required: 31,
                available: 30
            }
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = small_config();
        config.initial_balance = 0.0;
        let mut engine = engine(&small_config());
        assert!(matches!(
            BacktestSimulator::new(&mut engine, &config),
            Err(BacktestError::ConfigValidation(_))
        ));
    }

    #[test]
    fn test_malformed_bar_halts_with_index() {
        let config = small_config();
        let mut engine = engine(&config);
        let mut candles = zigzag(60);
        candles[42].high = candles[42].low - 1.0;

        let err = BacktestSimulator::new(&mut engine, &config)
            .unwrap()
            .run(candles)
            .unwrap_err();
        assert!(matches!(err, BacktestError::MalformedBar { index: 42, .. }));
    }

    #[test]
    fn test_duplicate_timestamp_halts() {
        let config = small_config();
        let mut engine = engine(&config);
        let mut candles = zigzag(60);
        candles[10].timestamp_ns = candles[9].timestamp_ns;

        let err = BacktestSimulator::new(&mut engine, &config)
            .unwrap()
            .run(candles)
            .unwrap_err();
        assert!(matches!(err, BacktestError::NonMonotonic { index: 10, .. }));
    }

    #[test]
    fn test_progress_is_monotonic_and_complete() {
        let config = small_config();
        let mut engine = engine(&config);
        let mut seen = Vec::new();

        BacktestSimulator::new(&mut engine, &config)
            .unwrap()
            .with_progress(|p| seen.push(p))
            .run(zigzag(50))
            .unwrap();

        assert_eq!(seen.len(), 50);
        assert!(seen.windows(2).all(|w| w[1] > w[0]));
        approx::assert_relative_eq!(seen[0], 1.0 / 50.0);
        approx::assert_relative_eq!(seen[49], 1.0);
    }

    #[test]
    fn test_stop_before_start_returns_empty_cancelled_run() {
        let config = small_config();
        let mut engine = engine(&config);
        let stop = StopFlag::new();
        stop.stop();

        let run = BacktestSimulator::new(&mut engine, &config)
            .unwrap()
            .with_stop_flag(stop)
            .run(zigzag(80))
            .unwrap();

        assert!(run.cancelled);
        assert_eq!(run.bars_processed, 0);
        assert!(run.price_range().is_none());
        approx::assert_relative_eq!(run.final_balance, 1_000.0);
    }
}
