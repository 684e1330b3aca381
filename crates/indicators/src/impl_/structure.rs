//! Rolling support/resistance levels.

use crate::traits::MultiOutputIndicator;
use tradepilot_types::Candle;

/// Rolling structural levels.
#[derive(Debug, Clone)]
pub struct StructureLevels {
    /// Lowest low of the lookback window
    pub support: Vec<f64>,
    /// Highest high of the lookback window
    pub resistance: Vec<f64>,
}

/// Support = rolling min of lows, resistance = rolling max of highs,
/// both over the last `lookback` bars including the current one.
#[derive(Debug, Clone)]
pub struct SupportResistance {
    /// Window length
    pub lookback: usize,
}

impl SupportResistance {
    /// Creates a new support/resistance indicator.
    #[must_use]
    pub fn new(lookback: usize) -> Self {
        Self { lookback }
    }
}

impl MultiOutputIndicator for SupportResistance {
    type Output = StructureLevels;

    fn compute_all(&self, candles: &[Candle]) -> Self::Output {
        let len = candles.len();
        let mut levels = StructureLevels {
            support: vec![f64::NAN; len],
            resistance: vec![f64::NAN; len],
        };
        if self.lookback == 0 {
            return levels;
        }

        for end in self.lookback..=len {
            let window = &candles[end - self.lookback..end];
            levels.support[end - 1] = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
            levels.resistance[end - 1] = window
                .iter()
                .map(|c| c.high)
                .fold(f64::NEG_INFINITY, f64::max);
        }
        levels
    }

    fn name(&self) -> &str {
        "STRUCTURE"
    }

    fn warmup_periods(&self) -> usize {
        self.lookback
    }
}
