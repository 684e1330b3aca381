//! Bollinger Bands indicator

use crate::traits::MultiOutputIndicator;
use tradepilot_types::Candle;

/// Bollinger Bands result containing upper, middle, and lower bands.
#[derive(Debug, Clone)]
pub struct BollingerResult {
    /// Upper band = SMA + `std_factor` * std
    pub upper: Vec<f64>,
    /// Middle band = SMA
    pub middle: Vec<f64>,
    /// Lower band = SMA - `std_factor` * std
    pub lower: Vec<f64>,
}

/// Bollinger Bands over close prices.
///
/// Uses population standard deviation (divide by n).
#[derive(Debug, Clone)]
pub struct BollingerBands {
    /// Period for the SMA and standard deviation
    pub period: usize,
    /// Multiplier for standard deviation (typically 2.0)
    pub std_factor: f64,
}

impl BollingerBands {
    /// Creates new Bollinger Bands with the given parameters.
    #[must_use]
    pub fn new(period: usize, std_factor: f64) -> Self {
        Self { period, std_factor }
    }
}

impl MultiOutputIndicator for BollingerBands {
    type Output = BollingerResult;

    #[allow(clippy::cast_precision_loss)] // period is a small window length
    fn compute_all(&self, candles: &[Candle]) -> Self::Output {
        let len = candles.len();
        let mut out = BollingerResult {
            upper: vec![f64::NAN; len],
            middle: vec![f64::NAN; len],
            lower: vec![f64::NAN; len],
        };
        if self.period == 0 || len < self.period {
            return out;
        }

        let n = self.period as f64;
        for end in self.period..=len {
            let window = &candles[end - self.period..end];
            let mean = window.iter().map(|c| c.close).sum::<f64>() / n;
            let variance = window
                .iter()
                .map(|c| (c.close - mean).powi(2))
                .sum::<f64>()
                / n;
            let width = self.std_factor * variance.sqrt();

            let i = end - 1;
            out.middle[i] = mean;
            out.upper[i] = mean + width;
            out.lower[i] = mean - width;
        }
        out
    }

    fn name(&self) -> &str {
        "BOLLINGER"
    }

    fn warmup_periods(&self) -> usize {
        self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn closes(values: &[f64]) -> Vec<Candle> {
        values
            .iter()
            .map(|&close| Candle {
                timestamp_ns: 0,
                open: close,
                high: close,
                low: close,
                close,
                volume: 0.0,
            })
            .collect()
    }

    #[test]
    fn test_bollinger_basic() {
        let result = BollingerBands::new(3, 2.0).compute_all(&closes(&[1.0, 2.0, 3.0, 4.0]));

        assert!(result.middle[1].is_nan());
        let std = (2.0_f64 / 3.0).sqrt();
        assert_relative_eq!(result.middle[2], 2.0);
        assert_relative_eq!(result.upper[2], 2.0 + 2.0 * std, epsilon = 1e-12);
        assert_relative_eq!(result.lower[2], 2.0 - 2.0 * std, epsilon = 1e-12);
        assert_relative_eq!(result.middle[3], 3.0);
    }

    #[test]
    fn test_bollinger_constant_input_has_zero_width() {
        let result = BollingerBands::new(5, 2.0).compute_all(&closes(&[100.0; 8]));
        for i in 4..8 {
            assert_relative_eq!(result.upper[i], 100.0);
            assert_relative_eq!(result.lower[i], 100.0);
        }
    }

    #[test]
    fn test_bollinger_insufficient_data() {
        let result = BollingerBands::new(5, 2.0).compute_all(&closes(&[1.0, 2.0]));
        assert!(result.upper.iter().all(|v| v.is_nan()));
        assert!(result.lower.iter().all(|v| v.is_nan()));
    }
}
