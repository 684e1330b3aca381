//! Turns a BUY/SELL decision into a priced [`TradeSignal`].

use tradepilot_types::{Action, Candle, IndicatorBundle, RiskConfig, TradeSignal, Trend};

/// RSI level tagged as oversold.
const RSI_OVERSOLD: f64 = 30.0;
/// RSI level tagged as overbought.
const RSI_OVERBOUGHT: f64 = 70.0;
/// Distance to a structure level (fraction of price) tagged as "near".
const STRUCTURE_PROXIMITY: f64 = 0.01;

/// Inputs describing the decision being priced.
#[derive(Debug, Clone, Copy)]
pub struct SignalContext<'a> {
    /// Bar the decision was made on; entry is its close
    pub candle: &'a Candle,
    /// Indicators at that bar
    pub indicators: &'a IndicatorBundle,
    /// Blended confidence (0–100)
    pub confidence: f64,
    /// Whether the pattern already has enough history
    pub pattern_known: bool,
    /// Whether the action came from exploration
    pub explored: bool,
}

/// Why a decision did not become a signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    /// HOLD never produces a signal
    Hold,
    /// Entry or stop distance unusable
    Degenerate,
    /// Risk:reward below the configured minimum
    RiskReward(f64),
}

/// Prices `action` with ATR-based stop/target clamped against structure.
///
/// # Errors
/// Returns a [`Rejection`] when no acceptable signal exists.
pub fn build_signal(
    risk: &RiskConfig,
    action: Action,
    ctx: &SignalContext<'_>,
) -> Result<TradeSignal, Rejection> {
    let Some(direction) = action.direction() else {
        return Err(Rejection::Hold);
    };
    let entry = ctx.candle.close;
    if !entry.is_finite() || entry <= 0.0 {
        return Err(Rejection::Degenerate);
    }

    let distance = match ctx.indicators.atr {
        Some(atr) if atr.is_finite() && atr > 0.0 => atr * risk.stop_atr_multiple,
        _ => entry * risk.fallback_stop_pct,
    };
    let sign = direction.sign();
    let mut stop = entry - sign * distance;
    let mut target = entry + sign * distance * risk.reward_multiple;

    // structure between stop and entry tightens the stop, between entry and target caps it
    let (stop_level, target_level) = match action {
        Action::Buy => (ctx.indicators.support, ctx.indicators.resistance),
        _ => (ctx.indicators.resistance, ctx.indicators.support),
    };
    if let Some(level) = stop_level
        && strictly_between(level, stop, entry)
    {
        stop = level;
    }
    if let Some(level) = target_level
        && strictly_between(level, entry, target)
    {
        target = level;
    }

    let risk_distance = (entry - stop).abs();
    let reward_distance = (target - entry).abs();
    if risk_distance <= 0.0 || !risk_distance.is_finite() {
        return Err(Rejection::Degenerate);
    }
    let risk_reward = reward_distance / risk_distance;
    if risk_reward < risk.min_risk_reward {
        return Err(Rejection::RiskReward(risk_reward));
    }

    let confluence = confluence_tags(action, entry, ctx);
    let reasoning = format!(
        "{action} at {entry:.4}: stop {stop:.4}, target {target:.4}, r:r {risk_reward:.2}, confidence {:.1}{}",
        ctx.confidence,
        if ctx.explored { " (exploration)" } else { "" }
    );

    Ok(TradeSignal {
        action,
        entry_price: entry,
        stop_loss: stop,
        take_profit: target,
        confidence: ctx.confidence,
        reasoning,
        confluence,
        risk_reward,
        timestamp_ns: ctx.candle.timestamp_ns,
    })
}

fn strictly_between(value: f64, a: f64, b: f64) -> bool {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    value > lo && value < hi
}

fn confluence_tags(action: Action, entry: f64, ctx: &SignalContext<'_>) -> Vec<String> {
    let ind = ctx.indicators;
    let near = |level: Option<f64>| {
        level.is_some_and(|l| ((entry - l) / entry).abs() <= STRUCTURE_PROXIMITY)
    };
    let mut tags = Vec::new();
    let mut tag = |cond: bool, name: &str| {
        if cond {
            tags.push(name.to_string());
        }
    };

    let long = action == Action::Buy;
    tag(long && ind.rsi.is_some_and(|r| r < RSI_OVERSOLD), "rsi_oversold");
    tag(!long && ind.rsi.is_some_and(|r| r > RSI_OVERBOUGHT), "rsi_overbought");
    tag(long && ind.trend == Some(Trend::Up), "trend_up");
    tag(!long && ind.trend == Some(Trend::Down), "trend_down");
    tag(long && near(ind.support), "near_support");
    tag(!long && near(ind.resistance), "near_resistance");
    tag(long && ind.band_lower.is_some_and(|b| entry <= b), "band_lower");
    tag(!long && ind.band_upper.is_some_and(|b| entry >= b), "band_upper");
    tag(ctx.pattern_known, "pattern_known");
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn candle(close: f64) -> Candle {
        Candle {
            timestamp_ns: 42,
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 10.0,
        }
    }

    fn ctx<'a>(candle: &'a Candle, indicators: &'a IndicatorBundle) -> SignalContext<'a> {
        SignalContext {
            candle,
            indicators,
            confidence: 60.0,
            pattern_known: false,
            explored: false,
        }
    }

    #[test]
    fn test_buy_uses_atr_distance() {
        let c = candle(100.0);
        let ind = IndicatorBundle {
            atr: Some(2.0),
            ..IndicatorBundle::default()
        };
        let s = build_signal(&RiskConfig::default(), Action::Buy, &ctx(&c, &ind)).unwrap();
        assert_relative_eq!(s.stop_loss, 97.0);
        assert_relative_eq!(s.take_profit, 109.0);
        assert_relative_eq!(s.risk_reward, 3.0);
        assert_eq!(s.timestamp_ns, 42);
    }

    #[test]
    fn test_sell_mirrors() {
        let c = candle(100.0);
        let ind = IndicatorBundle {
            atr: Some(2.0),
            ..IndicatorBundle::default()
        };
        let s = build_signal(&RiskConfig::default(), Action::Sell, &ctx(&c, &ind)).unwrap();
        assert_relative_eq!(s.stop_loss, 103.0);
        assert_relative_eq!(s.take_profit, 91.0);
    }

    #[test]
    fn test_fallback_stop_without_atr() {
        let c = candle(200.0);
        let ind = IndicatorBundle::default();
        let s = build_signal(&RiskConfig::default(), Action::Buy, &ctx(&c, &ind)).unwrap();
        assert_relative_eq!(s.stop_loss, 199.0);
        assert_relative_eq!(s.take_profit, 203.0);
    }

    #[test]
    fn test_structure_clamps_stop_and_target() {
        let c = candle(100.0);
        let ind = IndicatorBundle {
            atr: Some(2.0),
            support: Some(98.0),
            resistance: Some(105.0),
            ..IndicatorBundle::default()
        };
        let s = build_signal(&RiskConfig::default(), Action::Buy, &ctx(&c, &ind)).unwrap();
        assert_relative_eq!(s.stop_loss, 98.0);
        assert_relative_eq!(s.take_profit, 105.0);
        assert_relative_eq!(s.risk_reward, 2.5);
    }

    #[test]
    fn test_low_risk_reward_rejected() {
        let c = candle(100.0);
        let ind = IndicatorBundle {
            atr: Some(2.0),
            resistance: Some(101.0),
            ..IndicatorBundle::default()
        };
        let err = build_signal(&RiskConfig::default(), Action::Buy, &ctx(&c, &ind)).unwrap_err();
        assert!(matches!(err, Rejection::RiskReward(rr) if rr < 1.0));
    }

    #[test]
    fn test_hold_rejected() {
        let c = candle(100.0);
        let ind = IndicatorBundle::default();
        assert_eq!(
            build_signal(&RiskConfig::default(), Action::Hold, &ctx(&c, &ind)).unwrap_err(),
            Rejection::Hold
        );
    }

    #[test]
    fn test_confluence_tags() {
        let c = candle(100.0);
        let ind = IndicatorBundle {
            atr: Some(2.0),
            rsi: Some(25.0),
            trend: Some(Trend::Up),
            support: Some(99.5),
            band_lower: Some(100.5),
            ..IndicatorBundle::default()
        };
        let mut context = ctx(&c, &ind);
        context.pattern_known = true;
        let s = build_signal(&RiskConfig::default(), Action::Buy, &context).unwrap();
        assert_eq!(
            s.confluence,
            vec![
                "rsi_oversold",
                "trend_up",
                "near_support",
                "band_lower",
                "pattern_known"
            ]
        );
    }
}
