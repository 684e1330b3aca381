//! Indicator traits.

use tradepilot_types::Candle;

/// Trait for single-output indicators.
///
/// All indicators compute over the full candle series and return a Vec<f64>
/// of the same length. Values before the warmup period are NaN.
pub trait Indicator: Send + Sync {
    /// Computes the indicator for all candles.
    ///
    /// Returns Vec<f64> with the same length as candles.
    /// Values at indices < `warmup_periods() - 1` are `f64::NAN`.
    fn compute(&self, candles: &[Candle]) -> Vec<f64>;

    /// Name of the indicator (e.g., "EMA", "ATR").
    fn name(&self) -> &str;

    /// Minimum number of bars required for valid output.
    fn warmup_periods(&self) -> usize;

    /// Value at the last candle, `None` while warming up.
    fn last(&self, candles: &[Candle]) -> Option<f64> {
        self.compute(candles)
            .last()
            .copied()
            .filter(|v| v.is_finite())
    }
}

/// Trait for multi-output indicators like Bollinger Bands.
///
/// These indicators produce multiple series (e.g., upper, middle, lower bands)
/// that are computed together for efficiency.
pub trait MultiOutputIndicator: Send + Sync {
    /// Type of the output structure
    type Output;

    /// Computes all outputs at once.
    fn compute_all(&self, candles: &[Candle]) -> Self::Output;

    /// Name of the indicator.
    fn name(&self) -> &str;

    /// Minimum number of bars for valid output.
    fn warmup_periods(&self) -> usize;
}
