//! Helpers for trade-derived metrics.

use tradepilot_types::ExecutedTrade;

/// Counts total trades, wins, and losses (by outcome, not `PnL` sign).
#[must_use]
pub(crate) fn count_trades(trades: &[ExecutedTrade]) -> (u64, u64, u64) {
    let total = usize_to_u64(trades.len());
    let wins = usize_to_u64(trades.iter().filter(|t| t.outcome.is_win()).count());
    (total, wins, total - wins)
}

/// Computes gross profit and gross loss (absolute sum of negative results).
#[must_use]
pub(crate) fn gross_profit_loss(trades: &[ExecutedTrade]) -> (f64, f64) {
    let mut gross_profit = 0.0;
    let mut gross_loss = 0.0;

    for trade in trades {
        if trade.pnl > 0.0 {
            gross_profit += trade.pnl;
        } else if trade.pnl < 0.0 {
            gross_loss += trade.pnl.abs();
        }
    }

    (gross_profit, gross_loss)
}

/// Computes average win, average loss, largest win, and largest loss.
///
/// Returns (`avg_win`, `avg_loss`, `largest_win`, `largest_loss`), losses as
/// absolute values, each 0 when there is no trade on that side.
#[must_use]
#[allow(clippy::cast_precision_loss)] // Trade counts never exceed f64 mantissa precision
pub(crate) fn win_loss_stats(trades: &[ExecutedTrade]) -> (f64, f64, f64, f64) {
    let mut sum_wins = 0.0;
    let mut sum_losses = 0.0;
    let mut win_count = 0usize;
    let mut loss_count = 0usize;
    let mut largest_win = 0.0_f64;
    let mut largest_loss = 0.0_f64;

    for trade in trades {
        if trade.pnl > 0.0 {
            sum_wins += trade.pnl;
            win_count += 1;
            largest_win = largest_win.max(trade.pnl);
        } else if trade.pnl < 0.0 {
            sum_losses += trade.pnl.abs();
            loss_count += 1;
            largest_loss = largest_loss.max(trade.pnl.abs());
        }
    }

    let avg_win = if win_count > 0 {
        sum_wins / win_count as f64
    } else {
        0.0
    };

    let avg_loss = if loss_count > 0 {
        sum_losses / loss_count as f64
    } else {
        0.0
    };

    (avg_win, avg_loss, largest_win, largest_loss)
}

fn usize_to_u64(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}
