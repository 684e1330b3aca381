//! Candle sequence validation.

use crate::error::DataError;
use tradepilot_types::Candle;

/// Validates a candle sequence: every candle coherent, timestamps strictly ascending.
///
/// # Errors
/// - [`DataError::EmptyData`] when `candles` is empty.
/// - [`DataError::CorruptData`] naming the first offending index.
pub fn validate_candles(candles: &[Candle]) -> Result<(), DataError> {
    if candles.is_empty() {
        return Err(DataError::EmptyData);
    }

    for (i, candle) in candles.iter().enumerate() {
        candle
            .check()
            .map_err(|e| DataError::CorruptData(format!("{e} at index {i}: {candle:?}")))?;

        if i > 0 && candle.timestamp_ns <= candles[i - 1].timestamp_ns {
            return Err(DataError::CorruptData(format!(
                "non-monotonic timestamp at index {i}: {} <= {}",
                candle.timestamp_ns,
                candles[i - 1].timestamp_ns
            )));
        }
    }

    Ok(())
}
