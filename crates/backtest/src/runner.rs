//! High-level backtest runner helpers.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tradepilot_data::{filter_by_date_range, load_and_validate};
use tradepilot_model::{BlobStore, FileBlobStore};
use tradepilot_strategy::DecisionEngine;
use tradepilot_types::{BacktestConfig, BacktestResult, Candle, ErrorResult, StopFlag};

use crate::error::BacktestError;
use crate::result_builder::{build_meta, build_result};
use crate::simulator::BacktestSimulator;

/// Main entry point: receives config JSON, returns result JSON.
///
/// # Errors
/// - [`BacktestError::ConfigParse`] when JSON parsing fails.
/// - [`BacktestError::ConfigValidation`] for invalid configuration values.
/// - Any errors from data loading, model restore or the simulation.
pub fn run_backtest_from_json(config_json: &str) -> Result<String, BacktestError> {
    let config: BacktestConfig = serde_json::from_str(config_json)
        .map_err(|e| BacktestError::ConfigParse(e.to_string()))?;

    let result = run_backtest(&config, &StopFlag::new())?;
    Ok(serde_json::to_string(&result)?)
}

/// Like [`run_backtest_from_json`], but errors become an `ok: false` result.
#[must_use]
pub fn run_backtest_to_json(config_json: &str) -> String {
    match run_backtest_from_json(config_json) {
        Ok(result_json) => result_json,
        Err(err) => serialize_error(err),
    }
}

/// Serializes a backtest error into the JSON error envelope.
#[must_use]
pub fn serialize_error(err: BacktestError) -> String {
    tracing::warn!(category = err.error_category(), "backtest failed: {err}");
    let error_result = BacktestResult {
        ok: false,
        error: Some(ErrorResult::from(err)),
        trades: None,
        metrics: None,
        equity_curve: None,
        meta: None,
    };

    serde_json::to_string(&error_result).unwrap_or_else(|_| {
        r#"{"ok":false,"error":{"category":"runtime","message":"serialization_failed"}}"#
            .to_string()
    })
}

/// Loads `config.data_path`, builds the engine and runs the simulation.
///
/// # Errors
/// - [`BacktestError::ConfigValidation`] for invalid values or a missing `data_path`
/// - [`BacktestError::Data`] when the candle file cannot be loaded or the
///   date range leaves nothing
/// - engine, store and simulation errors
pub fn run_backtest(config: &BacktestConfig, stop: &StopFlag) -> Result<BacktestResult, BacktestError> {
    config
        .validate()
        .map_err(|e| BacktestError::ConfigValidation(e.to_string()))?;
    let Some(data_path) = config.data_path.as_deref() else {
        return Err(BacktestError::ConfigValidation(
            "data_path is required".to_string(),
        ));
    };

    let mut candles = load_and_validate(Path::new(data_path))?;
    if config.start_ns.is_some() || config.end_ns.is_some() {
        candles = filter_by_date_range(
            &candles,
            config.start_ns.unwrap_or(i64::MIN),
            config.end_ns.unwrap_or(i64::MAX),
        )?;
    }
    tracing::info!(symbol = %config.symbol, path = data_path, candles = candles.len(), "data loaded");

    let mut engine = build_engine(config)?;
    run_with_engine(config, &mut engine, candles, stop)
}

/// Builds a decision engine and, when `model_dir` is set, restores and
/// persists its weights and pattern memory there.
///
/// # Errors
/// Returns engine construction, store or restore errors.
pub fn build_engine(config: &BacktestConfig) -> Result<DecisionEngine, BacktestError> {
    let mut engine = DecisionEngine::new(
        &config.engine,
        config.features.clone(),
        config.risk.clone(),
    )?;

    if let Some(dir) = config.model_dir.as_deref() {
        let store: Arc<dyn BlobStore> = Arc::new(FileBlobStore::open(dir)?);
        let (weights, memory) = engine.attach_store(&store)?;
        tracing::info!(
            model_dir = dir,
            weights_restored = weights,
            memory_restored = memory,
            "model store attached"
        );
    }

    Ok(engine)
}

/// Runs the simulator over in-memory candles with a caller-owned engine.
///
/// The engine keeps everything it learned after the call returns.
///
/// # Errors
/// Returns simulation errors.
pub fn run_with_engine(
    config: &BacktestConfig,
    engine: &mut DecisionEngine,
    candles: Vec<Candle>,
    stop: &StopFlag,
) -> Result<BacktestResult, BacktestError> {
    let started = Instant::now();
    let run = BacktestSimulator::new(engine, config)?
        .with_stop_flag(stop.clone())
        .run(candles)?;
    let meta = build_meta(
        &config.symbol,
        &run,
        engine,
        started.elapsed().as_secs_f64(),
    );
    Ok(build_result(run, meta))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_json_is_config_parse() {
        let err = run_backtest_from_json("{not json").unwrap_err();
        assert!(matches!(err, BacktestError::ConfigParse(_)));
    }

    #[test]
    fn test_missing_data_path() {
        let err = run_backtest_from_json("{}").unwrap_err();
        match err {
            BacktestError::ConfigValidation(msg) => assert!(msg.contains("data_path")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validation_runs_before_loading() {
        let json = r#"{"data_path": "/does/not/exist.json", "initial_balance": -5}"#;
        let err = run_backtest_from_json(json).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_envelope_on_error() {
        let json = run_backtest_to_json(r#"{"data_path": "/does/not/exist.json"}"#);
        let result: BacktestResult = serde_json::from_str(&json).unwrap();
        assert!(!result.ok);
        assert_eq!(result.error.unwrap().category, "market_data");
    }
}
