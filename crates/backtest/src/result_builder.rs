//! Backtest result assembly helpers.

use tradepilot_metrics::compute_metrics;
use tradepilot_strategy::DecisionEngine;
use tradepilot_types::{BacktestResult, ResultMeta};

use crate::simulator::BacktestRun;

/// Builds a successful backtest result payload.
#[must_use]
pub(crate) fn build_result(run: BacktestRun, meta: ResultMeta) -> BacktestResult {
    let metrics = compute_metrics(
        &run.trades,
        &run.equity_curve,
        run.initial_balance,
        run.price_range(),
    );

    BacktestResult {
        ok: true,
        error: None,
        trades: Some(run.trades),
        metrics: Some(metrics),
        equity_curve: Some(run.equity_curve),
        meta: Some(meta),
    }
}

/// Builds metadata for a backtest result.
#[must_use]
pub(crate) fn build_meta(
    symbol: &str,
    run: &BacktestRun,
    engine: &DecisionEngine,
    runtime_seconds: f64,
) -> ResultMeta {
    ResultMeta {
        symbol: symbol.to_string(),
        runtime_seconds,
        candles_total: run.bars_total as u64,
        candles_processed: run.bars_processed as u64,
        cancelled: run.cancelled,
        initial_balance: run.initial_balance,
        final_balance: run.final_balance,
        network_iterations: engine.network().iterations(),
        patterns_known: engine.memory().len() as u64,
        start_timestamp: run.start_timestamp,
        end_timestamp: run.end_timestamp,
    }
}
