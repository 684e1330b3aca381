//! Position lifecycle: NONE → PENDING → {WIN, LOSS}.
//!
//! A position is created only from an accepted [`TradeSignal`], mutated only by
//! [`PositionLifecycle::check_bar`], and converted into an [`ExecutedTrade`]
//! exactly once.

use tradepilot_types::{
    Action, Candle, Direction, ExecutedTrade, ExitReason, MarketState, Outcome, RiskConfig,
    TradeSignal,
};

use crate::error::LifecycleError;
use crate::sizing::{position_size, risk_amount};
use crate::stops::{StopLevels, check_stops};
use crate::trailing::TrailingLadder;

/// Lifecycle state of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionState {
    /// Open, awaiting resolution
    Pending,
    /// Resolved as a win
    Win,
    /// Resolved as a loss
    Loss,
}

/// One open trade.
#[derive(Debug, Clone)]
pub struct Position {
    id: u64,
    symbol: String,
    direction: Direction,
    entry_price: f64,
    stop_loss: f64,
    take_profit: f64,
    initial_stop: f64,
    quantity: f64,
    risk_amount: f64,
    entry_time_ns: i64,
    confidence: f64,
    market_state: MarketState,
    trailing_rung: Option<usize>,
    state: PositionState,
}

impl Position {
    /// Position ID.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Trade direction.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Entry price.
    #[must_use]
    pub fn entry_price(&self) -> f64 {
        self.entry_price
    }

    /// Current stop.
    #[must_use]
    pub fn stop_loss(&self) -> f64 {
        self.stop_loss
    }

    /// Current target.
    #[must_use]
    pub fn take_profit(&self) -> f64 {
        self.take_profit
    }

    /// Size in units of the instrument.
    #[must_use]
    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    /// Balance at risk between entry and the initial stop.
    #[must_use]
    pub fn risk_amount(&self) -> f64 {
        self.risk_amount
    }

    /// Timestamp of the entry bar.
    #[must_use]
    pub fn entry_time_ns(&self) -> i64 {
        self.entry_time_ns
    }

    /// State that produced the entry.
    #[must_use]
    pub fn market_state(&self) -> &MarketState {
        &self.market_state
    }

    /// Lifecycle state.
    #[must_use]
    pub fn state(&self) -> PositionState {
        self.state
    }

    /// Open `PnL` marked at `price`.
    #[must_use]
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.direction.sign() * (price - self.entry_price) * self.quantity
    }

    fn levels(&self) -> StopLevels {
        StopLevels {
            direction: self.direction,
            entry_price: self.entry_price,
            stop_loss: self.stop_loss,
            take_profit: self.take_profit,
        }
    }

    /// Moves PENDING to WIN/LOSS and builds the trade record.
    pub(crate) fn resolve(
        &mut self,
        exit_price: f64,
        exit_time_ns: i64,
        reason: ExitReason,
    ) -> Result<ExecutedTrade, LifecycleError> {
        if self.state != PositionState::Pending {
            return Err(LifecycleError::NotPending { id: self.id });
        }

        let pnl = self.unrealized_pnl(exit_price);
        let outcome = match reason {
            ExitReason::TakeProfit => Outcome::Win,
            ExitReason::StopLoss => Outcome::Loss,
            ExitReason::BreakEvenStopLoss | ExitReason::TrailingStopLoss => {
                if pnl >= 0.0 {
                    Outcome::Win
                } else {
                    Outcome::Loss
                }
            }
        };
        self.state = match outcome {
            Outcome::Win => PositionState::Win,
            Outcome::Loss => PositionState::Loss,
        };

        let initial_risk = (self.entry_price - self.initial_stop).abs() * self.quantity;
        let r_multiple = if initial_risk > 0.0 {
            pnl / initial_risk
        } else {
            0.0
        };

        Ok(ExecutedTrade {
            id: self.id,
            entry_time_ns: self.entry_time_ns,
            exit_time_ns,
            direction: self.direction,
            symbol: self.symbol.clone(),
            entry_price: self.entry_price,
            exit_price,
            stop_loss: self.stop_loss,
            take_profit: self.take_profit,
            quantity: self.quantity,
            pnl,
            r_multiple,
            outcome,
            reason,
            confidence: self.confidence,
            state: self.market_state,
            action: self.direction.action(),
        })
    }
}

/// Single-position state machine for one instrument.
#[derive(Debug)]
pub struct PositionLifecycle {
    symbol: String,
    risk_per_trade: f64,
    ladder: TrailingLadder,
    position: Option<Position>,
    next_id: u64,
}

impl PositionLifecycle {
    /// Creates a lifecycle with no open position.
    #[must_use]
    pub fn new(symbol: impl Into<String>, risk: &RiskConfig) -> Self {
        Self {
            symbol: symbol.into(),
            risk_per_trade: risk.risk_per_trade,
            ladder: TrailingLadder::from_config(&risk.trailing),
            position: None,
            next_id: 1,
        }
    }

    /// Currently open position.
    #[must_use]
    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    /// Whether a position is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.position.is_some()
    }

    /// Open `PnL` marked at `price`, zero when flat.
    #[must_use]
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.position.as_ref().map_or(0.0, |p| p.unrealized_pnl(price))
    }

    /// NONE → PENDING on an accepted signal. The entry bar is `signal.timestamp_ns`.
    ///
    /// # Errors
    /// - [`LifecycleError::AlreadyOpen`] when a position exists
    /// - [`LifecycleError::InvalidSignal`] for HOLD or levels on the wrong side
    /// - [`LifecycleError::InvalidSize`] when no quantity can be derived
    pub fn open(
        &mut self,
        signal: &TradeSignal,
        market_state: MarketState,
        balance: f64,
    ) -> Result<&Position, LifecycleError> {
        if let Some(open) = &self.position {
            return Err(LifecycleError::AlreadyOpen { id: open.id });
        }
        let direction = match signal.action {
            Action::Buy => Direction::Long,
            Action::Sell => Direction::Short,
            Action::Hold => {
                return Err(LifecycleError::InvalidSignal(
                    "hold cannot open a position".to_string(),
                ));
            }
        };

        let sign = direction.sign();
        let entry = signal.entry_price;
        let levels_ok = entry.is_finite()
            && sign * (entry - signal.stop_loss) > 0.0
            && sign * (signal.take_profit - entry) > 0.0;
        if !levels_ok {
            return Err(LifecycleError::InvalidSignal(format!(
                "{} with entry {entry}, stop {}, target {}",
                signal.action, signal.stop_loss, signal.take_profit
            )));
        }

        let risk = risk_amount(balance, self.risk_per_trade);
        let quantity = position_size(risk, signal.stop_distance()).ok_or_else(|| {
            LifecycleError::InvalidSize(format!(
                "balance {balance}, stop distance {}",
                signal.stop_distance()
            ))
        })?;

        let id = self.next_id;
        self.next_id += 1;
        tracing::info!(
            id,
            symbol = %self.symbol,
            ?direction,
            entry,
            stop_loss = signal.stop_loss,
            take_profit = signal.take_profit,
            quantity,
            "position opened"
        );

        Ok(&*self.position.insert(Position {
            id,
            symbol: self.symbol.clone(),
            direction,
            entry_price: entry,
            stop_loss: signal.stop_loss,
            take_profit: signal.take_profit,
            initial_stop: signal.stop_loss,
            quantity,
            risk_amount: risk,
            entry_time_ns: signal.timestamp_ns,
            confidence: signal.confidence,
            market_state,
            trailing_rung: None,
            state: PositionState::Pending,
        }))
    }

    /// Evaluates exit rules against `candle`.
    ///
    /// Returns the trade when the position resolves. The entry bar itself and
    /// bars at or before it are never evaluated. When the position survives the
    /// bar, the trailing ladder is applied at its close.
    ///
    /// # Errors
    /// Returns [`LifecycleError::NotPending`] if the position was already resolved.
    pub fn check_bar(&mut self, candle: &Candle) -> Result<Option<ExecutedTrade>, LifecycleError> {
        let Some(position) = self.position.as_mut() else {
            return Ok(None);
        };
        if candle.timestamp_ns <= position.entry_time_ns {
            return Ok(None);
        }

        if let Some(hit) = check_stops(&position.levels(), candle) {
            let trade = position.resolve(hit.exit_price, candle.timestamp_ns, hit.reason)?;
            self.position = None;
            tracing::info!(
                id = trade.id,
                outcome = ?trade.outcome,
                reason = ?trade.reason,
                exit_price = trade.exit_price,
                pnl = trade.pnl,
                "position closed"
            );
            return Ok(Some(trade));
        }

        if let Some(update) = self.ladder.evaluate(
            position.direction,
            position.entry_price,
            position.stop_loss,
            position.trailing_rung,
            candle.close,
        ) {
            tracing::debug!(
                id = position.id,
                rung = update.rung,
                stop_loss = update.stop_loss,
                take_profit = ?update.take_profit,
                "trailing levels moved"
            );
            position.trailing_rung = Some(update.rung);
            position.stop_loss = update.stop_loss;
            if let Some(target) = update.take_profit {
                position.take_profit = target;
            }
        }
        Ok(None)
    }
}
