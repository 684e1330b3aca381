//! Metric computation entrypoints.

use tradepilot_types::{EquityPoint, ExecutedTrade, Metrics};

use crate::equity_metrics::{compute_drawdown, sharpe_ratio};
use crate::output::round_metrics;
use crate::trade_metrics::{count_trades, gross_profit_loss, win_loss_stats};

/// First and last close of the processed bars, for the buy-and-hold benchmark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    /// Close of the first processed bar
    pub first_close: f64,
    /// Close of the last processed bar
    pub last_close: f64,
}

/// Computes performance metrics for a completed backtest.
#[must_use]
#[allow(clippy::cast_precision_loss)] // Trade counts will never exceed f64 mantissa precision
pub fn compute_metrics(
    trades: &[ExecutedTrade],
    equity_curve: &[EquityPoint],
    initial_balance: f64,
    prices: Option<PriceRange>,
) -> Metrics {
    let mut metrics = Metrics::default();

    let (total_trades, wins, losses) = count_trades(trades);
    metrics.total_trades = total_trades;
    metrics.wins = wins;
    metrics.losses = losses;

    let total_trades_f = total_trades as f64;
    metrics.win_rate = if total_trades > 0 {
        wins as f64 / total_trades_f
    } else {
        0.0
    };

    let (gross_profit, gross_loss) = gross_profit_loss(trades);
    metrics.gross_profit = gross_profit;
    metrics.gross_loss = gross_loss;
    metrics.net_profit = trades.iter().map(|t| t.pnl).sum();
    metrics.profit_factor = if gross_loss > 0.0 {
        gross_profit / gross_loss
    } else {
        0.0
    };

    let (avg_win, avg_loss, largest_win, largest_loss) = win_loss_stats(trades);
    metrics.avg_win = avg_win;
    metrics.avg_loss = avg_loss;
    metrics.largest_win = largest_win;
    metrics.largest_loss = largest_loss;

    if total_trades > 0 {
        metrics.avg_r_multiple = trades.iter().map(|t| t.r_multiple).sum::<f64>() / total_trades_f;
        metrics.expectancy = metrics.net_profit / total_trades_f;
    }

    let (max_dd, max_dd_abs) = compute_drawdown(equity_curve);
    metrics.max_drawdown = max_dd;
    metrics.max_drawdown_abs = max_dd_abs;
    metrics.sharpe_ratio = sharpe_ratio(equity_curve);

    let final_equity = equity_curve.last().map_or(initial_balance, |p| p.equity);
    if initial_balance > 0.0 {
        metrics.total_return = final_equity / initial_balance - 1.0;
    }
    metrics.calmar_ratio = if max_dd > 0.0 {
        metrics.total_return / max_dd
    } else {
        0.0
    };

    if let Some(range) = prices
        && range.first_close > 0.0
    {
        metrics.buy_and_hold_return = range.last_close / range.first_close - 1.0;
    }

    if !equity_curve.is_empty() {
        let in_market = equity_curve.iter().filter(|p| p.in_market).count();
        metrics.time_in_market = in_market as f64 / equity_curve.len() as f64;
    }

    round_metrics(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tradepilot_types::{Action, Direction, ExitReason, MarketState, Outcome};

    fn trade(pnl: f64, r: f64, outcome: Outcome) -> ExecutedTrade {
        ExecutedTrade {
            id: 1,
            entry_time_ns: 0,
            exit_time_ns: 1,
            direction: Direction::Long,
            symbol: "BTCUSDT".to_string(),
            entry_price: 100.0,
            exit_price: 100.0,
            stop_loss: 98.0,
            take_profit: 106.0,
            quantity: 1.0,
            pnl,
            r_multiple: r,
            outcome,
            reason: ExitReason::TakeProfit,
            confidence: 50.0,
            state: MarketState::neutral(),
            action: Action::Buy,
        }
    }

    fn point(i: i64, equity: f64, in_market: bool) -> EquityPoint {
        EquityPoint {
            timestamp_ns: i,
            equity,
            balance: equity,
            drawdown: 0.0,
            high_water: equity,
            in_market,
        }
    }

    #[test]
    fn test_empty_run() {
        let m = compute_metrics(&[], &[], 1000.0, None);
        assert_eq!(m.total_trades, 0);
        assert_relative_eq!(m.win_rate, 0.0);
        assert_relative_eq!(m.total_return, 0.0);
        assert_relative_eq!(m.time_in_market, 0.0);
    }

    #[test]
    fn test_trade_metrics() {
        let trades = vec![
            trade(30.0, 3.0, Outcome::Win),
            trade(-10.0, -1.0, Outcome::Loss),
            trade(-10.0, -1.0, Outcome::Loss),
            trade(0.0, 0.0, Outcome::Win),
        ];
        let m = compute_metrics(&trades, &[], 1000.0, None);
        assert_eq!((m.total_trades, m.wins, m.losses), (4, 2, 2));
        assert_relative_eq!(m.win_rate, 0.5);
        assert_relative_eq!(m.gross_profit, 30.0);
        assert_relative_eq!(m.gross_loss, 20.0);
        assert_relative_eq!(m.net_profit, 10.0);
        assert_relative_eq!(m.profit_factor, 1.5);
        assert_relative_eq!(m.avg_win, 30.0);
        assert_relative_eq!(m.avg_loss, 10.0);
        assert_relative_eq!(m.expectancy, 2.5);
        assert_relative_eq!(m.avg_r_multiple, 0.25);
    }

    #[test]
    fn test_equity_metrics() {
        let curve = vec![
            point(0, 1000.0, false),
            point(1, 1100.0, true),
            point(2, 990.0, true),
            point(3, 1050.0, false),
        ];
        let prices = PriceRange {
            first_close: 100.0,
            last_close: 120.0,
        };
        let m = compute_metrics(&[], &curve, 1000.0, Some(prices));
        assert_relative_eq!(m.max_drawdown, 0.1);
        assert_relative_eq!(m.max_drawdown_abs, 110.0);
        assert_relative_eq!(m.total_return, 0.05);
        assert_relative_eq!(m.calmar_ratio, 0.5);
        assert_relative_eq!(m.buy_and_hold_return, 0.2);
        assert_relative_eq!(m.time_in_market, 0.5);
    }
}
