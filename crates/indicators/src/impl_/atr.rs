//! Average True Range (ATR) indicator with Wilder smoothing

use crate::traits::Indicator;
use tradepilot_types::Candle;

/// Average True Range (Wilder)
///
/// Seeded with the mean of the first `period` true ranges, then
/// `atr = (prev_atr * (n - 1) + tr) / n`.
#[derive(Debug, Clone)]
pub struct ATR {
    /// Number of periods for ATR calculation
    pub period: usize,
}

impl ATR {
    /// Creates a new ATR indicator with the given period.
    #[must_use]
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    /// TR = max(High - Low, |High - Prev_Close|, |Low - Prev_Close|)
    #[inline]
    fn true_range(candle: &Candle, prev_close: Option<f64>) -> f64 {
        let range = candle.high - candle.low;
        match prev_close {
            Some(pc) => range
                .max((candle.high - pc).abs())
                .max((candle.low - pc).abs()),
            None => range,
        }
    }
}

impl Indicator for ATR {
    #[allow(clippy::cast_precision_loss)] // period is a small window length
    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let mut result = vec![f64::NAN; candles.len()];
        if self.period == 0 || candles.len() < self.period {
            return result;
        }

        let n = self.period as f64;
        let mut seed_sum = 0.0;
        let mut atr = f64::NAN;
        for (i, candle) in candles.iter().enumerate() {
            let prev_close = i.checked_sub(1).map(|p| candles[p].close);
            let tr = Self::true_range(candle, prev_close);

            if i + 1 < self.period {
                seed_sum += tr;
                continue;
            }
            atr = if i + 1 == self.period {
                (seed_sum + tr) / n
            } else {
                (atr * (n - 1.0) + tr) / n
            };
            result[i] = atr;
        }
        result
    }

    fn name(&self) -> &str {
        "ATR"
    }

    fn warmup_periods(&self) -> usize {
        self.period
    }
}
