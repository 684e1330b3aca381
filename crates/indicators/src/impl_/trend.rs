//! Trend classification from a fast and a slow moving average.

use tradepilot_types::Trend;

/// Classifies the trend at the last index of two aligned average series.
///
/// `Up` when fast > slow and fast is rising, `Down` when fast < slow and fast is
/// falling, otherwise `Sideways`. `None` when the last two fast values or the
/// last slow value are not finite.
#[must_use]
pub fn classify_trend(fast: &[f64], slow: &[f64]) -> Option<Trend> {
    let [.., prev_fast, fast_now] = fast else {
        return None;
    };
    let slow_now = *slow.last()?;
    if !(fast_now.is_finite() && prev_fast.is_finite() && slow_now.is_finite()) {
        return None;
    }

    let trend = if *fast_now > slow_now && fast_now > prev_fast {
        Trend::Up
    } else if *fast_now < slow_now && fast_now < prev_fast {
        Trend::Down
    } else {
        Trend::Sideways
    };
    Some(trend)
}
