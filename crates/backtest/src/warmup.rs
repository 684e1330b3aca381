//! Warmup validation helpers.

use crate::error::BacktestError;

/// Validates that the series leaves at least one bar after warmup.
///
/// # Errors
/// Returns [`BacktestError::InsufficientData`] if `available` does not exceed
/// `warmup_bars`.
pub fn validate_warmup(available: usize, warmup_bars: usize) -> Result<(), BacktestError> {
    if available <= warmup_bars {
        return Err(BacktestError::InsufficientData {
            required: warmup_bars + 1,
            available,
        });
    }

    tracing::info!(
        "Warmup validated: {} bars required, {} available ({} trading bars)",
        warmup_bars,
        available,
        available - warmup_bars
    );

    Ok(())
}
