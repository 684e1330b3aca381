//! Per-bar indicator snapshot consumed by feature extraction and the pre-filter.

/// Trend classification of the current bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    /// Fast average above slow average and rising
    Up,
    /// Fast average below slow average and falling
    Down,
    /// Neither
    #[default]
    Sideways,
}

/// Read-only indicator values at one bar.
///
/// Every field is `None` while the underlying indicator is still warming up.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct IndicatorBundle {
    /// RSI in [0,100]
    pub rsi: Option<f64>,
    /// Fast EMA
    pub ema_fast: Option<f64>,
    /// Slow (long) EMA, the pre-filter reference
    pub ema_slow: Option<f64>,
    /// Simple moving average
    pub sma: Option<f64>,
    /// Trend classification
    pub trend: Option<Trend>,
    /// Rolling low over the structure lookback
    pub support: Option<f64>,
    /// Rolling high over the structure lookback
    pub resistance: Option<f64>,
    /// Upper Bollinger band
    pub band_upper: Option<f64>,
    /// Middle Bollinger band
    pub band_middle: Option<f64>,
    /// Lower Bollinger band
    pub band_lower: Option<f64>,
    /// Average true range
    pub atr: Option<f64>,
}
