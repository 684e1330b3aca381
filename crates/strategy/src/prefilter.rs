//! Cheap gate that decides whether a bar is worth a full evaluation.

use tradepilot_types::{IndicatorBundle, PrefilterConfig};

/// Why a bar passed the pre-filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefilterHit {
    /// Close within the proximity band of the slow EMA
    NearSlowAverage,
    /// RSI below the lower bound
    Oversold,
    /// RSI above the upper bound
    Overbought,
}

/// Returns the first reason the bar qualifies, or `None` to skip it.
#[must_use]
pub fn prefilter(
    config: &PrefilterConfig,
    close: f64,
    indicators: &IndicatorBundle,
) -> Option<PrefilterHit> {
    if let Some(ema) = indicators.ema_slow
        && ema > 0.0
        && ((close - ema) / ema).abs() <= config.ma_proximity_pct
    {
        return Some(PrefilterHit::NearSlowAverage);
    }
    match indicators.rsi {
        Some(rsi) if rsi < config.rsi_lower => Some(PrefilterHit::Oversold),
        Some(rsi) if rsi > config.rsi_upper => Some(PrefilterHit::Overbought),
        _ => None,
    }
}
