//! Relative Strength Index (RSI) with Wilder smoothing.
//!
//! ```text
//! RS  = Average Gain / Average Loss
//! RSI = 100 - (100 / (1 + RS))
//! ```

use crate::error::IndicatorError;
use crate::traits::Indicator;
use tradepilot_types::Candle;

/// Relative Strength Index over close prices.
///
/// The first `period` values are NaN; the first valid value sits at index `period`.
#[derive(Debug, Clone)]
pub struct RSI {
    period: usize,
}

impl RSI {
    /// Creates a new RSI indicator.
    ///
    /// # Errors
    /// Returns [`IndicatorError::InvalidParams`] when `period < 2`.
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        if period < 2 {
            return Err(IndicatorError::invalid_params(format!(
                "rsi period must be at least 2, got {period}"
            )));
        }
        Ok(Self { period })
    }

    /// RSI period.
    #[must_use]
    pub fn period(&self) -> usize {
        self.period
    }
}

#[allow(clippy::float_cmp)] // exact zero means no movement at all
fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 { 50.0 } else { 100.0 }
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

impl Indicator for RSI {
    #[allow(clippy::cast_precision_loss)] // period is a small window length
    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let len = candles.len();
        let mut result = vec![f64::NAN; len];
        if len <= self.period {
            return result;
        }

        let n = self.period as f64;
        let (mut avg_gain, mut avg_loss) = (0.0, 0.0);
        for i in 1..len {
            let change = candles[i].close - candles[i - 1].close;
            let (gain, loss) = (change.max(0.0), (-change).max(0.0));

            if i < self.period {
                avg_gain += gain;
                avg_loss += loss;
                continue;
            }
            if i == self.period {
                avg_gain = (avg_gain + gain) / n;
                avg_loss = (avg_loss + loss) / n;
            } else {
                avg_gain = (avg_gain * (n - 1.0) + gain) / n;
                avg_loss = (avg_loss * (n - 1.0) + loss) / n;
            }
            result[i] = rsi_value(avg_gain, avg_loss);
        }
        result
    }

    fn name(&self) -> &str {
        "RSI"
    }

    fn warmup_periods(&self) -> usize {
        self.period + 1
    }
}
