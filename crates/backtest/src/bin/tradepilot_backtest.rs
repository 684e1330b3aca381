//! `tradepilot-backtest <config.json>`
//!
//! Runs a backtest from a JSON config file and prints the result JSON to
//! stdout. Failures print the `ok: false` envelope and exit with status 1.
//! Logs go to stderr, filtered by `RUST_LOG` (default `info`).

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;
use tradepilot_backtest::{BacktestError, run_backtest_from_json, serialize_error};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let Some(config_path) = std::env::args().nth(1) else {
        eprintln!("usage: tradepilot-backtest <config.json>");
        return ExitCode::from(2);
    };

    let outcome = std::fs::read_to_string(&config_path)
        .map_err(|e| BacktestError::ConfigParse(format!("cannot read {config_path}: {e}")))
        .and_then(|json| run_backtest_from_json(&json));

    match outcome {
        Ok(result_json) => {
            println!("{result_json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            println!("{}", serialize_error(err));
            ExitCode::FAILURE
        }
    }
}
