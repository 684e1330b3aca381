//! Output rounding helpers for metrics.

use tradepilot_types::Metrics;

const CURRENCY_DECIMALS: u32 = 2;
const RATIO_DECIMALS: u32 = 6;

/// Rounds currency values to cents and ratios to six decimals.
#[must_use]
pub fn round_metrics(mut metrics: Metrics) -> Metrics {
    for value in [
        &mut metrics.gross_profit,
        &mut metrics.gross_loss,
        &mut metrics.net_profit,
        &mut metrics.avg_win,
        &mut metrics.avg_loss,
        &mut metrics.largest_win,
        &mut metrics.largest_loss,
        &mut metrics.expectancy,
        &mut metrics.max_drawdown_abs,
    ] {
        *value = round_to_decimals(*value, CURRENCY_DECIMALS);
    }
    for value in [
        &mut metrics.win_rate,
        &mut metrics.profit_factor,
        &mut metrics.avg_r_multiple,
        &mut metrics.max_drawdown,
        &mut metrics.sharpe_ratio,
        &mut metrics.calmar_ratio,
        &mut metrics.total_return,
        &mut metrics.buy_and_hold_return,
        &mut metrics.time_in_market,
    ] {
        *value = round_to_decimals(*value, RATIO_DECIMALS);
    }
    metrics
}

#[allow(clippy::cast_possible_wrap)] // decimals is always small (< 10)
fn round_to_decimals(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding() {
        let metrics = round_metrics(Metrics {
            net_profit: 12.345_678,
            win_rate: 0.123_456_789,
            ..Metrics::default()
        });
        assert!((metrics.net_profit - 12.35).abs() < 1e-12);
        assert!((metrics.win_rate - 0.123_457).abs() < 1e-12);
    }
}
