//! Normalized market state fed to the decision network.

/// Number of features in a [`MarketState`].
pub const FEATURE_COUNT: usize = 6;

/// Value used for any feature that cannot be computed.
pub const NEUTRAL_FEATURE: f64 = 0.5;

/// Named slots of a [`MarketState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// RSI scaled to [0,1]
    Oscillator,
    /// 1.0 when the trend is up, else 0.0
    TrendFlag,
    /// Close position inside the Bollinger band
    BandPosition,
    /// ATR relative to price, clamped
    Volatility,
    /// External sentiment rescaled from [-1,1]
    Sentiment,
    /// Rate of change around 0.5, clamped
    Momentum,
}

impl Feature {
    /// All features in vector order.
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Oscillator,
        Feature::TrendFlag,
        Feature::BandPosition,
        Feature::Volatility,
        Feature::Sentiment,
        Feature::Momentum,
    ];

    /// Slot of this feature in the state vector.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Fixed-length feature vector, every component in [0,1].
///
/// There is no mutable access; a state is immutable once produced.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct MarketState([f64; FEATURE_COUNT]);

impl MarketState {
    /// Builds a state, clamping each value to [0,1] and mapping non-finite values to 0.5.
    #[must_use]
    pub fn new(features: [f64; FEATURE_COUNT]) -> Self {
        Self(features.map(sanitize))
    }

    /// State with every feature at the neutral value.
    #[must_use]
    pub const fn neutral() -> Self {
        Self([NEUTRAL_FEATURE; FEATURE_COUNT])
    }

    /// Builds a state from a slice of exactly [`FEATURE_COUNT`] values.
    #[must_use]
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        let features: [f64; FEATURE_COUNT] = values.try_into().ok()?;
        Some(Self::new(features))
    }

    /// Value of a single feature.
    #[must_use]
    pub const fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }

    /// Features as a slice, in [`Feature::ALL`] order.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl Default for MarketState {
    fn default() -> Self {
        Self::neutral()
    }
}

impl TryFrom<Vec<f64>> for MarketState {
    type Error = String;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::from_slice(&values).ok_or_else(|| {
            format!(
                "market state needs {FEATURE_COUNT} features, got {}",
                values.len()
            )
        })
    }
}

impl From<MarketState> for Vec<f64> {
    fn from(state: MarketState) -> Self {
        state.0.to_vec()
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        NEUTRAL_FEATURE
    }
}
