//! Epsilon-greedy action selection.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tradepilot_types::{Action, EngineConfig};

use crate::error::StrategyError;

/// Source of uniform random draws, injectable for reproducible tests.
pub trait RandomSource: Send {
    /// Uniform value in [0, 1).
    fn next_f64(&mut self) -> f64;

    /// Uniform index in `0..bound`. `bound` is never zero.
    fn next_index(&mut self, bound: usize) -> usize;
}

/// [`RandomSource`] backed by a seeded ChaCha8 stream.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    /// Creates a deterministic stream from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }

    fn next_index(&mut self, bound: usize) -> usize {
        self.rng.gen_range(0..bound)
    }
}

/// Outcome of one policy call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    /// Chosen action
    pub action: Action,
    /// Whether the action came from the exploration branch
    pub explored: bool,
    /// Largest Q-value of the input
    pub max_q: f64,
}

/// Epsilon-greedy policy with a low-conviction guard.
pub struct DecisionPolicy {
    epsilon: f64,
    action_threshold: f64,
    random: Box<dyn RandomSource>,
}

impl std::fmt::Debug for DecisionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionPolicy")
            .field("epsilon", &self.epsilon)
            .field("action_threshold", &self.action_threshold)
            .finish_non_exhaustive()
    }
}

impl DecisionPolicy {
    /// Creates a policy.
    ///
    /// # Errors
    /// Returns [`StrategyError::InvalidEpsilon`] when `epsilon` is outside [0,1].
    pub fn new(
        epsilon: f64,
        action_threshold: f64,
        random: Box<dyn RandomSource>,
    ) -> Result<Self, StrategyError> {
        check_epsilon(epsilon)?;
        Ok(Self {
            epsilon,
            action_threshold,
            random,
        })
    }

    /// Creates a policy seeded from the engine config.
    ///
    /// # Errors
    /// Returns [`StrategyError::InvalidEpsilon`] for an out-of-range epsilon.
    pub fn from_config(config: &EngineConfig) -> Result<Self, StrategyError> {
        Self::new(
            config.epsilon,
            config.action_threshold,
            Box::new(SeededRandom::new(config.rng_seed)),
        )
    }

    /// Current exploration rate.
    #[must_use]
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Minimum conviction required to act.
    #[must_use]
    pub fn action_threshold(&self) -> f64 {
        self.action_threshold
    }

    /// Changes the exploration rate.
    ///
    /// # Errors
    /// Returns [`StrategyError::InvalidEpsilon`] when `epsilon` is NaN or outside [0,1];
    /// the previous value is kept.
    pub fn set_epsilon(&mut self, epsilon: f64) -> Result<(), StrategyError> {
        check_epsilon(epsilon)?;
        self.epsilon = epsilon;
        Ok(())
    }

    /// Picks an action for `q_values` (one per [`Action`], index order).
    ///
    /// When `max(q)` does not exceed the action threshold the result is HOLD,
    /// regardless of exploration.
    ///
    /// # Errors
    /// Returns [`StrategyError::InvalidQValues`] for a wrong-length or NaN vector.
    pub fn decide(&mut self, q_values: &[f64]) -> Result<Decision, StrategyError> {
        if q_values.len() != Action::COUNT {
            return Err(StrategyError::InvalidQValues(format!(
                "expected {} values, got {}",
                Action::COUNT,
                q_values.len()
            )));
        }
        if q_values.iter().any(|q| q.is_nan()) {
            return Err(StrategyError::InvalidQValues("NaN q-value".to_string()));
        }

        let greedy = argmax(q_values);
        let max_q = q_values[greedy.index()];

        let explored = self.epsilon > 0.0 && self.random.next_f64() < self.epsilon;
        let candidate = if explored {
            Action::from_index(self.random.next_index(Action::COUNT)).unwrap_or(Action::Hold)
        } else {
            greedy
        };

        let action = if max_q > self.action_threshold {
            candidate
        } else {
            Action::Hold
        };

        Ok(Decision {
            action,
            explored,
            max_q,
        })
    }
}

/// Index of the largest value; exact ties resolve BUY > SELL > HOLD.
fn argmax(q_values: &[f64]) -> Action {
    let mut best = Action::Buy;
    for action in Action::ALL {
        if q_values[action.index()] > q_values[best.index()] {
            best = action;
        }
    }
    best
}

fn check_epsilon(epsilon: f64) -> Result<(), StrategyError> {
    if (0.0..=1.0).contains(&epsilon) {
        Ok(())
    } else {
        Err(StrategyError::InvalidEpsilon(epsilon))
    }
}
