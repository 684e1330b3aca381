//! Fixed-fractional position sizing.

/// Amount of balance put at risk on one trade.
#[must_use]
pub fn risk_amount(balance: f64, risk_per_trade: f64) -> f64 {
    balance * risk_per_trade
}

/// Quantity such that hitting the stop loses exactly `risk_amount`.
///
/// Returns `None` for non-positive or non-finite inputs.
#[must_use]
pub fn position_size(risk_amount: f64, stop_distance: f64) -> Option<f64> {
    if !risk_amount.is_finite() || !stop_distance.is_finite() {
        return None;
    }
    if risk_amount <= 0.0 || stop_distance <= 0.0 {
        return None;
    }
    Some(risk_amount / stop_distance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_one_percent_of_balance() {
        let risk = risk_amount(1000.0, 0.01);
        assert_relative_eq!(risk, 10.0);
        assert_relative_eq!(position_size(risk, 2.0).unwrap(), 5.0);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(position_size(10.0, 0.0).is_none());
        assert!(position_size(0.0, 1.0).is_none());
        assert!(position_size(10.0, f64::NAN).is_none());
        assert!(position_size(-5.0, 1.0).is_none());
    }
}
