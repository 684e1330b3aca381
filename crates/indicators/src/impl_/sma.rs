//! Simple Moving Average (SMA) indicator

use crate::traits::Indicator;
use tradepilot_types::Candle;

/// Simple Moving Average of close prices.
#[derive(Debug, Clone)]
pub struct SMA {
    /// Number of periods for the moving average
    pub period: usize,
}

impl SMA {
    /// Creates a new SMA indicator with the given period.
    #[must_use]
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for SMA {
    #[allow(clippy::cast_precision_loss)] // period is a small window length
    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let mut result = vec![f64::NAN; candles.len()];
        if self.period == 0 || candles.len() < self.period {
            return result;
        }

        let n = self.period as f64;
        let mut sum = 0.0;
        for (i, candle) in candles.iter().enumerate() {
            sum += candle.close;
            if i >= self.period {
                sum -= candles[i - self.period].close;
            }
            if i + 1 >= self.period {
                result[i] = sum / n;
            }
        }
        result
    }

    fn name(&self) -> &str {
        "SMA"
    }

    fn warmup_periods(&self) -> usize {
        self.period
    }
}
