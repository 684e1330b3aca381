//! Exponential Moving Average (EMA) indicator

use crate::traits::Indicator;
use tradepilot_types::Candle;

/// Exponential Moving Average
///
/// Seeded with the first close, then `ema = alpha * close + (1 - alpha) * ema`
/// with `alpha = 2 / (period + 1)` (pandas `ewm(span, adjust=False)`).
#[derive(Debug, Clone)]
pub struct EMA {
    /// Span of the EMA
    pub period: usize,
}

impl EMA {
    /// Creates a new EMA indicator with the given period.
    #[must_use]
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    /// Smoothing factor.
    #[allow(clippy::cast_precision_loss)] // period is a small window length
    fn alpha(&self) -> f64 {
        2.0 / (self.period as f64 + 1.0)
    }
}

impl Indicator for EMA {
    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        if self.period == 0 {
            return vec![f64::NAN; candles.len()];
        }

        let alpha = self.alpha();
        let mut state: Option<f64> = None;
        candles
            .iter()
            .map(|candle| {
                let next = match state {
                    Some(prev) => alpha.mul_add(candle.close - prev, prev),
                    None => candle.close,
                };
                state = Some(next);
                next
            })
            .collect()
    }

    fn name(&self) -> &str {
        "EMA"
    }

    fn warmup_periods(&self) -> usize {
        self.period
    }
}
