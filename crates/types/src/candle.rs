//! OHLCV candle.

use crate::error::CoreError;

/// Repräsentiert eine OHLCV-Kerze
/// `timestamp_ns` ist die **Open-Time** (nicht Close-Time)
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Candle {
    /// Unix epoch nanoseconds UTC (Open-Time)
    pub timestamp_ns: i64,
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Volume
    #[serde(default)]
    pub volume: f64,
}

impl Candle {
    /// Checks that prices are finite and positive and that the OHLC range is coherent.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidCandle`] describing the first violated rule.
    pub fn check(&self) -> Result<(), CoreError> {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite()) || !self.volume.is_finite() {
            return Err(CoreError::InvalidCandle("non-finite value".to_string()));
        }
        if prices.iter().any(|p| *p <= 0.0) {
            return Err(CoreError::InvalidCandle("non-positive price".to_string()));
        }
        if self.volume < 0.0 {
            return Err(CoreError::InvalidCandle("negative volume".to_string()));
        }
        if self.high < self.low {
            return Err(CoreError::InvalidCandle(format!(
                "high {} below low {}",
                self.high, self.low
            )));
        }
        if self.high < self.open.max(self.close) || self.low > self.open.min(self.close) {
            return Err(CoreError::InvalidCandle(
                "open/close outside high/low range".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_candle(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            timestamp_ns: 1_234_567_890_000_000_000,
            open,
            high,
            low,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn test_candle_serde_roundtrip() {
        let candle = make_candle(1.1000, 1.1020, 1.0980, 1.1010);

        let json = serde_json::to_string(&candle).unwrap();
        let deserialized: Candle = serde_json::from_str(&json).unwrap();

        assert_eq!(candle, deserialized);
    }

    #[test]
    fn test_volume_defaults_when_missing() {
        let json = r#"{"timestamp_ns": 1, "open": 1.0, "high": 2.0, "low": 0.5, "close": 1.5}"#;
        let candle: Candle = serde_json::from_str(json).unwrap();
        assert!(candle.volume.abs() < f64::EPSILON);
    }

    #[test]
    fn test_check_accepts_valid_candle() {
        assert!(make_candle(100.0, 101.0, 99.0, 100.5).check().is_ok());
    }

    #[test]
    fn test_check_rejects_nan() {
        let candle = make_candle(100.0, f64::NAN, 99.0, 100.5);
        assert!(matches!(candle.check(), Err(CoreError::InvalidCandle(_))));
    }

    #[test]
    fn test_check_rejects_inverted_range() {
        assert!(make_candle(100.0, 98.0, 99.0, 100.0).check().is_err());
        assert!(make_candle(102.0, 101.0, 99.0, 100.0).check().is_err());
    }

    #[test]
    fn test_check_rejects_non_positive_price() {
        assert!(make_candle(0.0, 1.0, 0.0, 0.5).check().is_err());
    }
}
