//! Decision engine: one owner for the learned state and the per-bar pipeline.
//!
//! ```text
//! candles + indicators → FeatureExtractor → MarketState
//!   → QDecisionNetwork::predict → DecisionPolicy → build_signal
//! ExecutedTrade → QDecisionNetwork::train + PatternMemory::update
//!   + ConfidenceEstimator::record_prediction
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tradepilot_model::{
    BlobStore, ConfidenceEstimator, PatternMemory, PatternSignature, QDecisionNetwork,
};
use tradepilot_types::{
    Action, Candle, EngineConfig, ExecutedTrade, FeatureConfig, IndicatorBundle, MarketState,
    Outcome, RiskConfig, TradeSignal,
};

use crate::error::StrategyError;
use crate::features::FeatureExtractor;
use crate::policy::{Decision, DecisionPolicy};
use crate::signal::{Rejection, SignalContext, build_signal};

/// Store key of the network weights.
pub const NETWORK_KEY: &str = "q_network";
/// Store key of the pattern memory snapshot.
pub const MEMORY_KEY: &str = "pattern_memory";

/// Everything computed for one bar.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Extracted state
    pub state: MarketState,
    /// Network output, one per action
    pub q_values: Vec<f64>,
    /// Policy output
    pub decision: Decision,
    /// Discretized state
    pub signature: PatternSignature,
    /// Blended confidence (0–100)
    pub confidence: f64,
    /// Priced signal when the decision was BUY/SELL and passed the risk checks
    pub signal: Option<TradeSignal>,
    /// Why an actionable decision produced no signal
    pub rejection: Option<Rejection>,
}

/// Historical trade used for cold-start training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledTrade {
    /// Pattern the trade was taken in
    pub signature: PatternSignature,
    /// State at entry, when recorded
    #[serde(default)]
    pub state: Option<MarketState>,
    /// Action taken, when recorded
    #[serde(default)]
    pub action: Option<Action>,
    /// Resolution
    pub outcome: Outcome,
    /// Realized PnL
    #[serde(default)]
    pub pnl: f64,
    /// Resolution time
    #[serde(default)]
    pub timestamp_ns: i64,
}

/// Counters of a [`DecisionEngine::retrain`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RetrainReport {
    /// Trades read
    pub replayed: usize,
    /// Network `train` calls
    pub network_updates: usize,
    /// Pattern memory updates
    pub memory_updates: usize,
}

/// Owns the network, pattern memory, confidence estimator and policy.
#[derive(Debug)]
pub struct DecisionEngine {
    extractor: FeatureExtractor,
    network: QDecisionNetwork,
    memory: PatternMemory,
    confidence: ConfidenceEstimator,
    policy: DecisionPolicy,
    risk: RiskConfig,
}

impl DecisionEngine {
    /// Creates an untrained engine.
    ///
    /// # Errors
    /// Returns [`StrategyError::Config`] when any config fails validation.
    pub fn new(
        engine: &EngineConfig,
        features: FeatureConfig,
        risk: RiskConfig,
    ) -> Result<Self, StrategyError> {
        engine
            .validate()
            .and_then(|()| features.validate())
            .and_then(|()| risk.validate())
            .map_err(|e| StrategyError::Config(e.to_string()))?;
        let policy = DecisionPolicy::from_config(engine)?;
        Ok(Self::from_parts(
            FeatureExtractor::new(features),
            QDecisionNetwork::from_config(engine),
            ConfidenceEstimator::new(engine.experience_cap),
            policy,
            risk,
        ))
    }

    /// Assembles an engine from prebuilt components.
    #[must_use]
    pub fn from_parts(
        extractor: FeatureExtractor,
        network: QDecisionNetwork,
        confidence: ConfidenceEstimator,
        policy: DecisionPolicy,
        risk: RiskConfig,
    ) -> Self {
        Self {
            extractor,
            network,
            memory: PatternMemory::new(),
            confidence,
            policy,
            risk,
        }
    }

    /// Wires persistence for weights and pattern memory and restores any stored state.
    ///
    /// Returns whether weights and memory were found, in that order.
    ///
    /// # Errors
    /// Returns [`StrategyError::Model`] on store failure or corrupt blobs.
    pub fn attach_store(&mut self, store: &Arc<dyn BlobStore>) -> Result<(bool, bool), StrategyError> {
        self.network.attach_store(Arc::clone(store), NETWORK_KEY);
        self.memory.attach_store(Arc::clone(store), MEMORY_KEY);
        let weights = self.network.load_from_store()?;
        let memory = self.memory.load_from_store()?;
        Ok((weights, memory))
    }

    /// Scores the last candle of `window` and prices the chosen action.
    ///
    /// # Errors
    /// Returns [`StrategyError::EmptyWindow`] for an empty window, or a model
    /// error if the network rejects the state.
    pub fn evaluate(
        &mut self,
        window: &[Candle],
        indicators: &IndicatorBundle,
        sentiment: f64,
    ) -> Result<Evaluation, StrategyError> {
        let Some(candle) = window.last() else {
            return Err(StrategyError::EmptyWindow);
        };

        let state = self.extractor.extract(window, indicators, sentiment);
        let q_values = self.network.predict(state.as_slice())?;
        let decision = self.policy.decide(&q_values)?;
        let signature = PatternSignature::encode(&state);
        let confidence = self.confidence.blend(
            &q_values,
            decision.action.index(),
            self.memory.confidence(&signature),
            self.network.iterations(),
        )?;

        let (signal, rejection) = if decision.action == Action::Hold {
            (None, None)
        } else {
            let ctx = SignalContext {
                candle,
                indicators,
                confidence,
                pattern_known: self.memory.is_established(&signature),
                explored: decision.explored,
            };
            match build_signal(&self.risk, decision.action, &ctx) {
                Ok(signal) => (Some(signal), None),
                Err(rejection) => {
                    tracing::warn!(
                        timestamp_ns = candle.timestamp_ns,
                        action = %decision.action,
                        ?rejection,
                        "signal rejected"
                    );
                    (None, Some(rejection))
                }
            }
        };

        tracing::debug!(
            timestamp_ns = candle.timestamp_ns,
            action = %decision.action,
            explored = decision.explored,
            max_q = decision.max_q,
            confidence,
            %signature,
            "bar evaluated"
        );

        Ok(Evaluation {
            state,
            q_values,
            decision,
            signature,
            confidence,
            signal,
            rejection,
        })
    }

    /// Feeds a resolved trade back into the network, memory and calibration.
    ///
    /// # Errors
    /// Returns [`StrategyError::Model`] on training or persistence failure.
    pub fn learn(&mut self, trade: &ExecutedTrade) -> Result<(), StrategyError> {
        let error =
            self.network
                .train(trade.state.as_slice(), trade.action.index(), trade.outcome.reward())?;
        self.memory.update(
            PatternSignature::encode(&trade.state),
            trade.outcome,
            trade.pnl,
            trade.exit_time_ns,
        )?;
        self.confidence
            .record_prediction(trade.confidence, trade.outcome);
        tracing::debug!(
            trade_id = trade.id,
            outcome = ?trade.outcome,
            error,
            iterations = self.network.iterations(),
            "learned from trade"
        );
        Ok(())
    }

    /// Replays labeled history through the same update path as [`Self::learn`].
    ///
    /// # Errors
    /// Stops at the first model error.
    pub fn retrain(&mut self, trades: &[LabeledTrade]) -> Result<RetrainReport, StrategyError> {
        let mut report = RetrainReport::default();
        for trade in trades {
            report.replayed += 1;
            if let (Some(state), Some(action)) = (&trade.state, trade.action) {
                self.network
                    .train(state.as_slice(), action.index(), trade.outcome.reward())?;
                report.network_updates += 1;
            }
            self.memory
                .update(trade.signature, trade.outcome, trade.pnl, trade.timestamp_ns)?;
            report.memory_updates += 1;
        }
        tracing::info!(
            replayed = report.replayed,
            network_updates = report.network_updates,
            memory_updates = report.memory_updates,
            "retrain finished"
        );
        Ok(report)
    }

    /// Changes the exploration rate.
    ///
    /// # Errors
    /// Returns [`StrategyError::InvalidEpsilon`] when out of range.
    pub fn set_epsilon(&mut self, epsilon: f64) -> Result<(), StrategyError> {
        self.policy.set_epsilon(epsilon)
    }

    /// Risk parameters used for pricing.
    #[must_use]
    pub fn risk(&self) -> &RiskConfig {
        &self.risk
    }

    /// The scoring network.
    #[must_use]
    pub fn network(&self) -> &QDecisionNetwork {
        &self.network
    }

    /// The pattern memory.
    #[must_use]
    pub fn memory(&self) -> &PatternMemory {
        &self.memory
    }

    /// The confidence estimator.
    #[must_use]
    pub fn confidence(&self) -> &ConfidenceEstimator {
        &self.confidence
    }

    /// The decision policy.
    #[must_use]
    pub fn policy(&self) -> &DecisionPolicy {
        &self.policy
    }
}
