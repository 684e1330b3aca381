//! Helpers for equity-curve derived metrics.

use tradepilot_types::EquityPoint;

/// Hourly bars in a 252-day trading year.
pub const BARS_PER_YEAR: f64 = 252.0 * 24.0;

/// Computes maximum drawdown (relative, absolute).
#[must_use]
pub fn compute_drawdown(equity: &[EquityPoint]) -> (f64, f64) {
    let Some(first) = equity.first() else {
        return (0.0, 0.0);
    };

    let mut high_water: f64 = first.equity;
    let mut max_dd_rel: f64 = 0.0;
    let mut max_dd_abs: f64 = 0.0;

    for point in equity {
        if point.equity > high_water {
            high_water = point.equity;
        } else if high_water > 0.0 {
            let dd_abs: f64 = high_water - point.equity;
            max_dd_abs = max_dd_abs.max(dd_abs);
            max_dd_rel = max_dd_rel.max(dd_abs / high_water);
        }
    }

    (max_dd_rel.clamp(0.0, 1.0), max_dd_abs)
}

/// Annualized Sharpe ratio of bar-to-bar equity returns (risk-free rate 0).
///
/// Zero with fewer than two returns or a flat curve.
#[must_use]
#[allow(clippy::cast_precision_loss)] // bar counts
pub fn sharpe_ratio(equity: &[EquityPoint]) -> f64 {
    let returns: Vec<f64> = equity
        .windows(2)
        .filter(|w| w[0].equity > 0.0)
        .map(|w| w[1].equity / w[0].equity - 1.0)
        .collect();
    if returns.len() < 2 {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std = variance.sqrt();
    if std <= f64::EPSILON {
        return 0.0;
    }
    mean / std * BARS_PER_YEAR.sqrt()
}
