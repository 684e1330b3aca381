//! Market data → normalized [`MarketState`].
//!
//! | slot | feature       | value                                    |
//! |------|---------------|------------------------------------------|
//! | 0    | oscillator    | `rsi / 100`                              |
//! | 1    | trend flag    | `1.0` when the trend is up, else `0.0`   |
//! | 2    | band position | `(close - lower) / (upper - lower)`      |
//! | 3    | volatility    | `(atr / close) / volatility_ceiling`     |
//! | 4    | sentiment     | `(sentiment + 1) / 2`                    |
//! | 5    | momentum      | `0.5 + scale * rate_of_change(lookback)` |
//!
//! Every value is clamped to [0,1]; anything that cannot be computed is 0.5.

use tradepilot_types::{
    Candle, Feature, FeatureConfig, FEATURE_COUNT, IndicatorBundle, MarketState, NEUTRAL_FEATURE,
    Trend,
};

/// Stateless feature extractor.
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    config: FeatureConfig,
}

impl FeatureExtractor {
    /// Creates an extractor with the given normalization constants.
    #[must_use]
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    /// Normalization constants in use.
    #[must_use]
    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Builds the state for the last candle of `window`.
    ///
    /// `window` must be in ascending time order; only its tail is read.
    #[must_use]
    pub fn extract(
        &self,
        window: &[Candle],
        indicators: &IndicatorBundle,
        sentiment: f64,
    ) -> MarketState {
        let close = window.last().map(|c| c.close);

        let mut features = [NEUTRAL_FEATURE; FEATURE_COUNT];
        let mut set = |feature: Feature, value: Option<f64>| {
            if let Some(v) = value.filter(|v| v.is_finite()) {
                features[feature.index()] = v;
            }
        };

        set(
            Feature::Oscillator,
            indicators.rsi.map(|rsi| rsi / 100.0),
        );
        set(
            Feature::TrendFlag,
            indicators
                .trend
                .map(|t| if t == Trend::Up { 1.0 } else { 0.0 }),
        );
        set(Feature::BandPosition, band_position(close, indicators));
        set(
            Feature::Volatility,
            volatility(close, indicators.atr, self.config.volatility_ceiling),
        );
        set(Feature::Sentiment, Some((sentiment + 1.0) / 2.0));
        set(Feature::Momentum, self.momentum(window));

        MarketState::new(features)
    }

    fn momentum(&self, window: &[Candle]) -> Option<f64> {
        let lookback = self.config.momentum_lookback;
        let last = window.len().checked_sub(1)?;
        let reference = window.get(last.checked_sub(lookback)?)?.close;
        if reference <= 0.0 {
            return None;
        }
        let roc = (window[last].close - reference) / reference;
        Some(0.5 + self.config.momentum_scale * roc)
    }
}

fn band_position(close: Option<f64>, indicators: &IndicatorBundle) -> Option<f64> {
    let close = close?;
    let upper = indicators.band_upper?;
    let lower = indicators.band_lower?;
    let width = upper - lower;
    if width.is_nan() || width <= 0.0 {
        return None;
    }
    Some((close - lower) / width)
}

fn volatility(close: Option<f64>, atr: Option<f64>, ceiling: f64) -> Option<f64> {
    let close = close?;
    let atr = atr?;
    if close <= 0.0 || ceiling <= 0.0 {
        return None;
    }
    Some(atr / close / ceiling)
}
