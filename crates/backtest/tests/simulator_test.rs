//! Integration tests for the backtest simulator and JSON runner.
//!
//! Tests cover:
//! - Causality (no bar is pulled before it is processed, prefix invariance)
//! - Determinism with exploration disabled
//! - Cooperative cancellation with partial results
//! - Online learning carried over to the caller's engine, for wins and losses
//! - JSON runner end to end with file fixtures

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use approx::assert_relative_eq;
use tradepilot_backtest::{
    BacktestRun, BacktestSimulator, StopFlag, build_engine, run_backtest_from_json,
};
use tradepilot_model::PatternSignature;
use tradepilot_strategy::DecisionEngine;
use tradepilot_types::{
    Action, BacktestConfig, BacktestResult, Candle, EngineConfig, IndicatorConfig, Outcome,
};

// ============================================================================
// FIXTURES
// ============================================================================

fn test_config() -> BacktestConfig {
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

fn oscillating_candles(len: usize) -> Vec<Candle> {
    (0..len)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let x = i as f64;
            let close = 100.0 + 6.0 * (x / 5.0).sin() + 2.0 * (x / 13.0).cos();
            Candle {
                timestamp_ns: 1_704_067_200_000_000_000 + i64::try_from(i).unwrap() * 3_600_000_000_000,
                open: close - 0.4,
                high: close + 1.5,
                low: close - 1.5,
                close,
                volume: 50.0,
            }
        })
        .collect()
}

fn exploring_config() -> BacktestConfig {
    let mut config = test_config();
    config.engine.epsilon = 1.0;
    config
}

/// Steady climb of 0.5 per bar closing on the high, so ATR is 0.5 and each
/// bar's low equals the previous close. A BUY (stop 0.75 below, target 2.25
/// above) always reaches its target; a SELL always reaches its stop.
fn rising_candles(len: usize) -> Vec<Candle> {
    (0..len)
        .map(|i| {
            let close = 100.0 + 0.5 * f64::from(u32::try_from(i).unwrap());
            Candle {
                timestamp_ns: 1_704_067_200_000_000_000 + i64::try_from(i).unwrap() * 3_600_000_000_000,
                open: close - 0.4,
                high: close,
                low: close - 0.5,
                close,
                volume: 50.0,
            }
        })
        .collect()
}

fn run(config: &BacktestConfig, candles: Vec<Candle>) -> (BacktestRun, DecisionEngine) {
    let mut engine = build_engine(config).unwrap();
    let run = BacktestSimulator::new(&mut engine, config)
        .unwrap()
        .run(candles)
        .unwrap();
    (run, engine)
}

/// Iterator that counts how many candles have been pulled.
struct Counting<I> {
    inner: I,
    pulled: Rc<Cell<usize>>,
}

impl<I: Iterator<Item = Candle>> Iterator for Counting<I> {
    type Item = Candle;

    fn next(&mut self) -> Option<Candle> {
        let item = self.inner.next();
        if item.is_some() {
            self.pulled.set(self.pulled.get() + 1);
        }
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<I: ExactSizeIterator<Item = Candle>> ExactSizeIterator for Counting<I> {}

// ============================================================================
// CAUSALITY
// ============================================================================

#[test]
fn test_bars_are_pulled_one_at_a_time() {
    let config = test_config();
    let mut engine = build_engine(&config).unwrap();
    let pulled = Rc::new(Cell::new(0));
    let observed = Rc::new(RefCell::new(Vec::new()));

    let input = Counting {
        inner: oscillating_candles(150).into_iter(),
        pulled: Rc::clone(&pulled),
    };
    let seen = Rc::clone(&observed);
    let counter = Rc::clone(&pulled);
    BacktestSimulator::new(&mut engine, &config)
        .unwrap()
        .with_progress(move |_| seen.borrow_mut().push(counter.get()))
        .run(input)
        .unwrap();

    let observed = observed.borrow();
    assert_eq!(observed.len(), 150);
    for (index, pulled_so_far) in observed.iter().enumerate() {
        assert_eq!(*pulled_so_far, index + 1, "bar {index} saw future candles");
    }
}

#[test]
fn test_prefix_run_matches_full_run() {
    let config = test_config();
    let candles = oscillating_candles(260);

    let (full, _) = run(&config, candles.clone());
    let (prefix, _) = run(&config, candles[..140].to_vec());

    assert_eq!(prefix.equity_curve[..], full.equity_curve[..prefix.equity_curve.len()]);
    assert!(prefix.trades.len() <= full.trades.len());
    assert_eq!(prefix.trades[..], full.trades[..prefix.trades.len()]);
}

#[test]
fn test_prefix_run_matches_full_run_with_exploration() {
    let config = exploring_config();
    let candles = rising_candles(260);

    let (full, _) = run(&config, candles.clone());
    let (prefix, _) = run(&config, candles[..140].to_vec());

    assert!(!prefix.trades.is_empty());
    assert_eq!(prefix.equity_curve[..], full.equity_curve[..prefix.equity_curve.len()]);
    assert_eq!(prefix.trades[..], full.trades[..prefix.trades.len()]);
}

// ============================================================================
// DETERMINISM / LEARNING
// ============================================================================

#[test]
fn test_runs_are_deterministic_without_exploration() {
    let config = test_config();
    let candles = oscillating_candles(300);

    let (first, first_engine) = run(&config, candles.clone());
    let (second, second_engine) = run(&config, candles);

    assert_eq!(first.trades, second.trades);
    assert_eq!(first.equity_curve, second.equity_curve);
    assert_eq!(
        first_engine.network().export(),
        second_engine.network().export()
    );
}

#[test]
fn test_every_resolved_trade_trains_the_engine() {
    let config = test_config();
    let (run, engine) = run(&config, oscillating_candles(400));

    assert_eq!(engine.network().iterations(), run.trades.len() as u64);
    assert_eq!(engine.confidence().recorded() as usize, run.trades.len());
    assert!(engine.memory().len() <= run.trades.len());

    let realized: f64 = run.trades.iter().map(|t| t.pnl).sum();
    assert_relative_eq!(run.final_balance, 1_000.0 + realized, epsilon = 1e-6);
    for pair in run.trades.windows(2) {
        assert!(pair[1].entry_time_ns >= pair[0].exit_time_ns, "positions overlap");
    }
}

#[test]
fn test_uptrend_buys_win_and_sells_lose() {
    let config = exploring_config();
    let (run, engine) = run(&config, rising_candles(200));

    assert!(!run.trades.is_empty());
    assert!(run.trades.iter().any(|t| t.outcome == Outcome::Win));
    for trade in &run.trades {
        match trade.action {
            Action::Buy => {
                assert_eq!(trade.outcome, Outcome::Win);
                assert_relative_eq!(trade.exit_price, trade.take_profit);
                assert!(trade.pnl > 0.0);
            }
            Action::Sell => {
                assert_eq!(trade.outcome, Outcome::Loss);
                assert_relative_eq!(trade.exit_price, trade.stop_loss);
                assert!(trade.pnl < 0.0);
            }
            Action::Hold => panic!("HOLD never opens a position"),
        }
        assert!(trade.entry_time_ns < trade.exit_time_ns);
    }
    for pair in run.trades.windows(2) {
        assert!(pair[1].entry_time_ns >= pair[0].exit_time_ns, "positions overlap");
    }

    // each resolution reached the engine with its own outcome
    assert_eq!(engine.network().iterations(), run.trades.len() as u64);
    let mut expected: BTreeMap<PatternSignature, (u32, u32)> = BTreeMap::new();
    for trade in &run.trades {
        let counts = expected
            .entry(PatternSignature::encode(&trade.state))
            .or_default();
        match trade.outcome {
            Outcome::Win => counts.0 += 1,
            Outcome::Loss => counts.1 += 1,
        }
    }
    for (signature, (wins, losses)) in &expected {
        let entry = engine.memory().get(signature).unwrap();
        assert_eq!((entry.win_count, entry.loss_count), (*wins, *losses), "{signature}");
    }
}

// ============================================================================
// CANCELLATION
// ============================================================================

#[test]
fn test_stop_mid_run_keeps_partial_results() {
    let config = test_config();
    let mut engine = build_engine(&config).unwrap();
    let stop = StopFlag::new();
    let trigger = stop.clone();

    let run = BacktestSimulator::new(&mut engine, &config)
        .unwrap()
        .with_stop_flag(stop)
        .with_progress(move |p| {
            if p >= 0.5 {
                trigger.stop();
            }
        })
        .run(oscillating_candles(120))
        .unwrap();

    assert!(run.cancelled);
    // bars 30..=59 processed, bar 60 sees the flag
    assert_eq!(run.bars_processed, 30);
    assert_eq!(run.equity_curve.len(), 30);
    assert_eq!(run.bars_total, 120);
}

// ============================================================================
// RUNNER
// ============================================================================

#[test]
fn test_runner_end_to_end_with_model_dir() {
    let dir = tempfile::tempdir().unwrap();
    let data_path = dir.path().join("candles.json");
    let model_dir = dir.path().join("model");
    std::fs::write(
        &data_path,
        serde_json::to_string(&oscillating_candles(200)).unwrap(),
    )
    .unwrap();

    let mut config = test_config();
    config.symbol = "ETHUSDT".to_string();
    config.data_path = Some(data_path.display().to_string());
    config.model_dir = Some(model_dir.display().to_string());

    let json = run_backtest_from_json(&serde_json::to_string(&config).unwrap()).unwrap();
    let result: BacktestResult = serde_json::from_str(&json).unwrap();

    assert!(result.ok);
    let meta = result.meta.unwrap();
    assert_eq!(meta.symbol, "ETHUSDT");
    assert_eq!(meta.candles_total, 200);
    assert_eq!(meta.candles_processed, 170);
    assert!(!meta.cancelled);

    let trades = result.trades.unwrap();
    let metrics = result.metrics.unwrap();
    assert_eq!(metrics.total_trades, trades.len() as u64);
    assert_eq!(result.equity_curve.unwrap().len(), 170);

    assert!(model_dir.is_dir());
    if meta.network_iterations > 0 {
        assert!(model_dir.join("q_network.json").is_file());
        assert!(model_dir.join("pattern_memory.json").is_file());
    }
}

#[test]
fn test_runner_applies_date_range() {
    let dir = tempfile::tempdir().unwrap();
    let data_path = dir.path().join("candles.json");
    let candles = oscillating_candles(200);
    std::fs::write(&data_path, serde_json::to_string(&candles).unwrap()).unwrap();

    let mut config = test_config();
    config.data_path = Some(data_path.display().to_string());
    config.start_ns = Some(candles[50].timestamp_ns);
    config.end_ns = Some(candles[149].timestamp_ns);

    let json = run_backtest_from_json(&serde_json::to_string(&config).unwrap()).unwrap();
    let meta = serde_json::from_str::<BacktestResult>(&json)
        .unwrap()
        .meta
        .unwrap();

    assert_eq!(meta.candles_total, 100);
    assert_eq!(meta.candles_processed, 70);
    assert_eq!(meta.start_timestamp, Some(candles[80].timestamp_ns));
    assert_eq!(meta.end_timestamp, Some(candles[149].timestamp_ns));
}

#[test]
fn test_runner_reports_insufficient_data() {
    let dir = tempfile::tempdir().unwrap();
    let data_path = dir.path().join("short.json");
    std::fs::write(
        &data_path,
        serde_json::to_string(&oscillating_candles(25)).unwrap(),
    )
    .unwrap();

    let mut config = test_config();
    config.data_path = Some(data_path.display().to_string());

    let err = run_backtest_from_json(&serde_json::to_string(&config).unwrap()).unwrap_err();
    assert_eq!(err.error_category(), "market_data");
    assert!(err.to_string().contains("insufficient data"));
}
