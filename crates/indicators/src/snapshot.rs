//! Builds an [`IndicatorBundle`] for the last bar of a candle window.

use crate::error::IndicatorError;
use crate::impl_::{
    atr::ATR, bollinger::BollingerBands, ema::EMA, rsi::RSI, sma::SMA,
    structure::SupportResistance, trend::classify_trend,
};
use crate::traits::{Indicator, MultiOutputIndicator};
use tradepilot_types::{Candle, IndicatorBundle, IndicatorConfig};

/// Configured set of indicators evaluated together.
///
/// Only the candles passed in are read, so callers control causality by
/// handing in `history[..=i]` (or a trailing slice of it).
#[derive(Debug, Clone)]
pub struct IndicatorSnapshot {
    rsi: RSI,
    ema_fast: EMA,
    ema_slow: EMA,
    sma: SMA,
    atr: ATR,
    bands: BollingerBands,
    structure: SupportResistance,
    window: usize,
}

impl IndicatorSnapshot {
    /// Creates the indicator set from config.
    ///
    /// # Errors
    /// Returns [`IndicatorError`] when the config is invalid.
    pub fn new(config: &IndicatorConfig) -> Result<Self, IndicatorError> {
        config
            .validate()
            .map_err(|e| IndicatorError::invalid_params(e.to_string()))?;

        Ok(Self {
            rsi: RSI::new(config.rsi_period)?,
            ema_fast: EMA::new(config.ema_fast),
            ema_slow: EMA::new(config.ema_slow),
            sma: SMA::new(config.sma_period),
            atr: ATR::new(config.atr_period),
            bands: BollingerBands::new(config.bollinger_period, config.bollinger_std),
            structure: SupportResistance::new(config.structure_lookback),
            window: config.history_window(),
        })
    }

    /// Number of trailing candles used by [`IndicatorSnapshot::at_end`].
    #[must_use]
    pub fn window(&self) -> usize {
        self.window
    }

    /// Indicator values at the last candle of `candles`.
    #[must_use]
    pub fn bundle(&self, candles: &[Candle]) -> IndicatorBundle {
        if candles.is_empty() {
            return IndicatorBundle::default();
        }

        let fast = self.ema_fast.compute(candles);
        let slow = self.ema_slow.compute(candles);
        let bands = self.bands.compute_all(candles);
        let levels = self.structure.compute_all(candles);

        IndicatorBundle {
            rsi: self.rsi.last(candles),
            ema_fast: last_finite(&fast),
            ema_slow: (candles.len() >= self.ema_slow.warmup_periods())
                .then(|| last_finite(&slow))
                .flatten(),
            sma: self.sma.last(candles),
            trend: classify_trend(&fast, &slow),
            support: last_finite(&levels.support),
            resistance: last_finite(&levels.resistance),
            band_upper: last_finite(&bands.upper),
            band_middle: last_finite(&bands.middle),
            band_lower: last_finite(&bands.lower),
            atr: self.atr.last(candles),
        }
    }

    /// Indicator values at the last candle, computed over the trailing window.
    #[must_use]
    pub fn at_end(&self, history: &[Candle]) -> IndicatorBundle {
        let start = history.len().saturating_sub(self.window);
        self.bundle(&history[start..])
    }
}

fn last_finite(series: &[f64]) -> Option<f64> {
    series.last().copied().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradepilot_types::Trend;

    fn trending_candles(len: usize, step: f64) -> Vec<Candle> {
        (0..len)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let close = 100.0 + step * i as f64;
                Candle {
                    timestamp_ns: i64::try_from(i).unwrap(),
                    open: close - step / 2.0,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1.0,
                }
            })
            .collect()
    }

    fn small_config() -> IndicatorConfig {
        IndicatorConfig {
            rsi_period: 5,
            ema_fast: 3,
            ema_slow: 10,
            sma_period: 5,
            atr_period: 5,
            bollinger_period: 5,
            bollinger_std: 2.0,
            structure_lookback: 8,
        }
    }

    #[test]
    fn test_empty_window_yields_empty_bundle() {
        let snapshot = IndicatorSnapshot::new(&small_config()).unwrap();
        assert_eq!(snapshot.bundle(&[]), IndicatorBundle::default());
    }

    #[test]
    fn test_bundle_is_complete_after_longest_window() {
        let config = small_config();
        let snapshot = IndicatorSnapshot::new(&config).unwrap();
        let candles = trending_candles(config.longest_window(), 0.5);

        let bundle = snapshot.bundle(&candles);
        assert!(bundle.rsi.is_some());
        assert!(bundle.ema_slow.is_some());
        assert!(bundle.sma.is_some());
        assert!(bundle.atr.is_some());
        assert!(bundle.support.is_some());
        assert!(bundle.band_lower.is_some());
        assert_eq!(bundle.trend, Some(Trend::Up));
    }

    #[test]
    fn test_slow_average_absent_before_span() {
        let snapshot = IndicatorSnapshot::new(&small_config()).unwrap();
        let bundle = snapshot.bundle(&trending_candles(4, 0.5));
        assert!(bundle.ema_fast.is_some());
        assert!(bundle.ema_slow.is_none());
    }

    #[test]
    fn test_downtrend_classified() {
        let snapshot = IndicatorSnapshot::new(&small_config()).unwrap();
        let bundle = snapshot.bundle(&trending_candles(30, -0.5));
        assert_eq!(bundle.trend, Some(Trend::Down));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = small_config();
        config.rsi_period = 1;
        assert!(IndicatorSnapshot::new(&config).is_err());
    }

    #[test]
    fn test_at_end_uses_trailing_window() {
        let config = small_config();
        let snapshot = IndicatorSnapshot::new(&config).unwrap();
        let candles = trending_candles(100, 0.5);

        let tail = &candles[candles.len() - snapshot.window()..];
        assert_eq!(snapshot.at_end(&candles), snapshot.bundle(tail));
    }
}
