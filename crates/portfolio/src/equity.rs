//! Equity tracking and drawdown calculation.

use tradepilot_types::EquityPoint;

/// Tracks equity changes over time.
#[derive(Debug, Clone)]
pub struct EquityTracker {
    initial_balance: f64,
    high_water_mark: f64,
    max_drawdown: f64,
    max_drawdown_abs: f64,
    current_equity: f64,
    current_balance: f64,
    bars_in_market: usize,
    equity_curve: Vec<EquityPoint>,
}

impl EquityTracker {
    /// Creates a tracker starting at `initial_balance`.
    #[must_use]
    pub fn new(initial_balance: f64) -> Self {
        Self {
            initial_balance,
            high_water_mark: initial_balance,
            max_drawdown: 0.0,
            max_drawdown_abs: 0.0,
            current_equity: initial_balance,
            current_balance: initial_balance,
            bars_in_market: 0,
            equity_curve: Vec::new(),
        }
    }

    /// Records one bar.
    ///
    /// # Arguments
    /// * `timestamp_ns` - Bar timestamp
    /// * `equity` - Balance plus open `PnL` marked at the close
    /// * `balance` - Realized balance
    /// * `in_market` - Whether a position was open at the close
    pub fn update(&mut self, timestamp_ns: i64, equity: f64, balance: f64, in_market: bool) {
        self.current_equity = equity;
        self.current_balance = balance;
        if in_market {
            self.bars_in_market += 1;
        }

        if equity > self.high_water_mark {
            self.high_water_mark = equity;
        }

        let drawdown_abs = self.high_water_mark - equity;
        let drawdown = if self.high_water_mark > 0.0 {
            drawdown_abs / self.high_water_mark
        } else {
            0.0
        };

        if drawdown > self.max_drawdown {
            self.max_drawdown = drawdown;
            self.max_drawdown_abs = drawdown_abs;
        }

        self.equity_curve.push(EquityPoint {
            timestamp_ns,
            equity,
            balance,
            drawdown,
            high_water: self.high_water_mark,
            in_market,
        });
    }

    /// Starting balance.
    #[must_use]
    pub fn initial_balance(&self) -> f64 {
        self.initial_balance
    }

    /// Latest equity.
    #[must_use]
    pub fn equity(&self) -> f64 {
        self.current_equity
    }

    /// Latest realized balance.
    #[must_use]
    pub fn balance(&self) -> f64 {
        self.current_balance
    }

    /// Peak equity.
    #[must_use]
    pub fn high_water_mark(&self) -> f64 {
        self.high_water_mark
    }

    /// Maximum drawdown fraction (0-1).
    #[must_use]
    pub fn max_drawdown(&self) -> f64 {
        self.max_drawdown
    }

    /// Maximum drawdown in account currency.
    #[must_use]
    pub fn max_drawdown_abs(&self) -> f64 {
        self.max_drawdown_abs
    }

    /// Fraction of recorded bars with an open position.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // bar counts
    pub fn time_in_market(&self) -> f64 {
        if self.equity_curve.is_empty() {
            return 0.0;
        }
        self.bars_in_market as f64 / self.equity_curve.len() as f64
    }

    /// Recorded points.
    #[must_use]
    pub fn equity_curve(&self) -> &[EquityPoint] {
        &self.equity_curve
    }

    /// Consumes the tracker and returns the equity curve.
    #[must_use]
    pub fn into_equity_curve(self) -> Vec<EquityPoint> {
        self.equity_curve
    }

    /// Number of recorded points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.equity_curve.len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.equity_curve.is_empty()
    }
}
