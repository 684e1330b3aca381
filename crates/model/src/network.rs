//! Fixed-topology feed-forward scorer with single-step online correction.
//!
//! Layout: `input → hidden (ReLU) → output (sigmoid)`, one output per
//! [`Action`](tradepilot_types::Action). Weight matrices are stored row-major,
//! one row per destination unit.
//!
//! `train` corrects only the chosen action's output:
//!
//! ```text
//! target = out[a] + learning_rate * (reward - out[a])
//! ```
//!
//! and backpropagates the squared error of that one slot through both layers
//! with plain SGD. There is no bootstrapping across a trajectory.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tradepilot_types::{Action, EngineConfig, FEATURE_COUNT};

use crate::error::ModelError;
use crate::store::{BlobStore, Persistence};

/// Half-width of the uniform weight initialization interval.
const INIT_SCALE: f64 = 0.5;

/// SGD step applied to the backpropagated gradient.
const SGD_STEP: f64 = 0.5;

/// Portable weight snapshot.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NetworkWeights {
    /// Input width
    pub input_size: usize,
    /// Hidden width
    pub hidden_size: usize,
    /// Output width
    pub output_size: usize,
    /// Input→hidden weights, `hidden_size × input_size`
    pub w1: Vec<f64>,
    /// Hidden biases
    pub b1: Vec<f64>,
    /// Hidden→output weights, `output_size × hidden_size`
    pub w2: Vec<f64>,
    /// Output biases
    pub b2: Vec<f64>,
    /// Number of `train` calls applied
    #[serde(default)]
    pub iterations: u64,
}

impl NetworkWeights {
    fn initialized(input: usize, hidden: usize, output: usize, rng: &mut ChaCha8Rng) -> Self {
        let mut draw = |n: usize| -> Vec<f64> {
            (0..n)
                .map(|_| rng.gen_range(-INIT_SCALE..=INIT_SCALE))
                .collect()
        };
        Self {
            input_size: input,
            hidden_size: hidden,
            output_size: output,
            w1: draw(hidden * input),
            b1: vec![0.0; hidden],
            w2: draw(output * hidden),
            b2: vec![0.0; output],
            iterations: 0,
        }
    }

    /// Checks that every vector matches the declared sizes and holds finite values.
    ///
    /// # Errors
    /// Returns [`ModelError::DimensionMismatch`] or [`ModelError::NonFinite`].
    pub fn validate(&self) -> Result<(), ModelError> {
        ModelError::check_len("w1", &self.w1, self.hidden_size * self.input_size)?;
        ModelError::check_len("b1", &self.b1, self.hidden_size)?;
        ModelError::check_len("w2", &self.w2, self.output_size * self.hidden_size)?;
        ModelError::check_len("b2", &self.b2, self.output_size)?;
        for (context, values) in [
            ("w1", &self.w1),
            ("b1", &self.b1),
            ("w2", &self.w2),
            ("b2", &self.b2),
        ] {
            ModelError::check_finite(context, values)?;
        }
        Ok(())
    }
}

/// Intermediate activations of one forward pass.
struct Forward {
    hidden_pre: Vec<f64>,
    hidden: Vec<f64>,
    output: Vec<f64>,
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Q-value scorer owned by exactly one engine.
#[derive(Debug)]
pub struct QDecisionNetwork {
    weights: NetworkWeights,
    learning_rate: f64,
    rng: ChaCha8Rng,
    persistence: Option<Persistence>,
}

impl QDecisionNetwork {
    /// Creates a network with the default topology (`FEATURE_COUNT → hidden → 3`).
    #[must_use]
    pub fn new(hidden: usize, learning_rate: f64, seed: u64) -> Self {
        Self::with_topology(FEATURE_COUNT, hidden, Action::COUNT, learning_rate, seed)
    }

    /// Creates a network from engine config.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.hidden_units, config.learning_rate, config.rng_seed)
    }

    /// Creates a network with an explicit topology.
    #[must_use]
    pub fn with_topology(
        input: usize,
        hidden: usize,
        output: usize,
        learning_rate: f64,
        seed: u64,
    ) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let weights = NetworkWeights::initialized(input, hidden, output, &mut rng);
        Self {
            weights,
            learning_rate,
            rng,
            persistence: None,
        }
    }

    /// Persists weights under `key` after every mutation.
    pub fn attach_store(&mut self, store: Arc<dyn BlobStore>, key: impl Into<String>) {
        self.persistence = Some(Persistence::new(store, key));
    }

    /// Replaces the weights with the stored blob, if one exists.
    ///
    /// Returns `true` when weights were loaded.
    ///
    /// # Errors
    /// Returns [`ModelError`] on store failure, corrupt blobs, or a topology mismatch.
    pub fn load_from_store(&mut self) -> Result<bool, ModelError> {
        let Some(persistence) = &self.persistence else {
            return Ok(false);
        };
        let Some(weights) = persistence.load::<NetworkWeights>()? else {
            return Ok(false);
        };
        self.check_topology(&weights)?;
        tracing::info!(
            key = persistence.key(),
            iterations = weights.iterations,
            "loaded network weights"
        );
        self.weights = weights;
        Ok(true)
    }

    /// Input width.
    #[must_use]
    pub fn input_size(&self) -> usize {
        self.weights.input_size
    }

    /// Output width.
    #[must_use]
    pub fn output_size(&self) -> usize {
        self.weights.output_size
    }

    /// Number of `train` calls since init/reset.
    #[must_use]
    pub fn iterations(&self) -> u64 {
        self.weights.iterations
    }

    /// Target-correction rate.
    #[must_use]
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    fn forward(&self, state: &[f64]) -> Forward {
        let w = &self.weights;
        let hidden_pre: Vec<f64> = w
            .w1
            .chunks_exact(w.input_size)
            .zip(&w.b1)
            .map(|(row, bias)| row.iter().zip(state).map(|(a, b)| a * b).sum::<f64>() + bias)
            .collect();
        let hidden: Vec<f64> = hidden_pre.iter().map(|z| z.max(0.0)).collect();
        let output = w
            .w2
            .chunks_exact(w.hidden_size)
            .zip(&w.b2)
            .map(|(row, bias)| {
                sigmoid(row.iter().zip(&hidden).map(|(a, b)| a * b).sum::<f64>() + bias)
            })
            .collect();
        Forward {
            hidden_pre,
            hidden,
            output,
        }
    }

    fn check_state(&self, state: &[f64]) -> Result<(), ModelError> {
        ModelError::check_len("state", state, self.weights.input_size)?;
        ModelError::check_finite("state", state)
    }

    /// One conviction value in [0,1] per action.
    ///
    /// # Errors
    /// Returns [`ModelError`] when `state` has the wrong length or non-finite values.
    pub fn predict(&self, state: &[f64]) -> Result<Vec<f64>, ModelError> {
        self.check_state(state)?;
        Ok(self.forward(state).output)
    }

    /// Single-step correction of output `action` toward `reward`.
    ///
    /// Returns the corrected slot's error (`target - output`) before the update.
    ///
    /// # Errors
    /// Returns [`ModelError`] for malformed state, an out-of-range action,
    /// a non-finite reward, or a persistence failure.
    pub fn train(&mut self, state: &[f64], action: usize, reward: f64) -> Result<f64, ModelError> {
        self.check_state(state)?;
        if action >= self.weights.output_size {
            return Err(ModelError::InvalidAction {
                index: action,
                outputs: self.weights.output_size,
            });
        }
        ModelError::check_finite("reward", &[reward])?;

        let pass = self.forward(state);
        let out = pass.output[action];
        let target = out + self.learning_rate * (reward - out);
        let error = target - out;

        // descent direction of 0.5 * (target - out)^2 w.r.t. the pre-sigmoid activation
        let delta_out = error * out * (1.0 - out);

        let w = &mut self.weights;
        let hidden_size = w.hidden_size;
        let out_row = &mut w.w2[action * hidden_size..(action + 1) * hidden_size];

        let delta_hidden: Vec<f64> = out_row
            .iter()
            .zip(&pass.hidden_pre)
            .map(|(weight, pre)| if *pre > 0.0 { delta_out * weight } else { 0.0 })
            .collect();

        for (weight, h) in out_row.iter_mut().zip(&pass.hidden) {
            *weight += SGD_STEP * delta_out * h;
        }
        w.b2[action] += SGD_STEP * delta_out;

        for ((row, bias), delta) in w
            .w1
            .chunks_exact_mut(w.input_size)
            .zip(w.b1.iter_mut())
            .zip(&delta_hidden)
        {
            for (weight, x) in row.iter_mut().zip(state) {
                *weight += SGD_STEP * delta * x;
            }
            *bias += SGD_STEP * delta;
        }
        w.iterations += 1;

        self.persist()?;
        Ok(error)
    }

    /// Reinitializes with small symmetric random weights and zero biases.
    ///
    /// # Errors
    /// Returns [`ModelError`] when persisting the new weights fails.
    pub fn reset(&mut self) -> Result<(), ModelError> {
        let w = &self.weights;
        self.weights =
            NetworkWeights::initialized(w.input_size, w.hidden_size, w.output_size, &mut self.rng);
        self.persist()
    }

    /// Copy of the current weights.
    #[must_use]
    pub fn export(&self) -> NetworkWeights {
        self.weights.clone()
    }

    /// Replaces the weights.
    ///
    /// # Errors
    /// Returns [`ModelError::DimensionMismatch`] when the topology differs from
    /// this network's, or when the vectors are inconsistent with their declared sizes.
    pub fn import(&mut self, weights: NetworkWeights) -> Result<(), ModelError> {
        self.check_topology(&weights)?;
        self.weights = weights;
        self.persist()
    }

    /// Weights encoded as a JSON blob.
    ///
    /// # Errors
    /// Returns [`ModelError::Serialization`] if encoding fails.
    pub fn to_blob(&self) -> Result<Vec<u8>, ModelError> {
        Ok(serde_json::to_vec(&self.weights)?)
    }

    /// Imports weights from a JSON blob.
    ///
    /// # Errors
    /// Returns [`ModelError`] on decode failure or topology mismatch.
    pub fn import_blob(&mut self, blob: &[u8]) -> Result<(), ModelError> {
        let weights: NetworkWeights = serde_json::from_slice(blob)?;
        self.import(weights)
    }

    fn check_topology(&self, weights: &NetworkWeights) -> Result<(), ModelError> {
        let expected = &self.weights;
        for (context, want, got) in [
            ("input_size", expected.input_size, weights.input_size),
            ("hidden_size", expected.hidden_size, weights.hidden_size),
            ("output_size", expected.output_size, weights.output_size),
        ] {
            if want != got {
                return Err(ModelError::DimensionMismatch {
                    context,
                    expected: want,
                    actual: got,
                });
            }
        }
        weights.validate()
    }

    fn persist(&self) -> Result<(), ModelError> {
        match &self.persistence {
            Some(p) => p.save(&self.weights),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBlobStore;
    use approx::assert_relative_eq;

    const SAMPLE_STATE: [f64; 6] = [0.3, 1.0, 0.7, 0.2, 0.5, 0.6];

    fn make_network() -> QDecisionNetwork {
        QDecisionNetwork::new(16, 0.1, 42)
    }

    #[test]
    fn test_predict_shape_and_bounds() {
        let net = make_network();
        let q = net.predict(&SAMPLE_STATE).unwrap();
        assert_eq!(q.len(), 3);
        assert!(q.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_same_seed_same_weights() {
        assert_eq!(make_network().export(), make_network().export());
        assert_ne!(
            make_network().export(),
            QDecisionNetwork::new(16, 0.1, 7).export()
        );
    }

    #[test]
    fn test_initial_weights_small_and_symmetric() {
        let weights = make_network().export();
        assert!(weights.w1.iter().chain(&weights.w2).all(|w| w.abs() <= INIT_SCALE));
        assert!(weights.b1.iter().chain(&weights.b2).all(|b| *b == 0.0));
    }

    #[test]
    fn test_predict_rejects_wrong_dimension() {
        let net = make_network();
        let err = net.predict(&[0.5; 5]).unwrap_err();
        assert!(matches!(
            err,
            ModelError::DimensionMismatch {
                expected: 6,
                actual: 5,
                ..
            }
        ));
    }

    #[test]
    fn test_predict_rejects_nan() {
        let mut state = SAMPLE_STATE;
        state[2] = f64::NAN;
        assert!(matches!(
            make_network().predict(&state),
            Err(ModelError::NonFinite { position: 2, .. })
        ));
    }

    #[test]
    fn test_train_rejects_bad_action_and_reward() {
        let mut net = make_network();
        assert!(matches!(
            net.train(&SAMPLE_STATE, 3, 1.0),
            Err(ModelError::InvalidAction { index: 3, .. })
        ));
        assert!(net.train(&SAMPLE_STATE, 0, f64::NAN).is_err());
        assert!(net.train(&[0.5; 7], 0, 1.0).is_err());
        assert_eq!(net.iterations(), 0);
    }

    #[test]
    fn test_train_error_is_learning_rate_scaled() {
        let mut net = make_network();
        let before = net.predict(&SAMPLE_STATE).unwrap()[0];
        let error = net.train(&SAMPLE_STATE, 0, 1.0).unwrap();
        assert_relative_eq!(error, 0.1 * (1.0 - before), epsilon = 1e-12);
        assert_eq!(net.iterations(), 1);
    }

    #[test]
    fn test_repeated_reward_one_increases_monotonically() {
        let mut net = make_network();
        let action = Action::Sell.index();
        let mut previous = net.predict(&SAMPLE_STATE).unwrap()[action];
        let start = previous;

        for _ in 0..50 {
            net.train(&SAMPLE_STATE, action, 1.0).unwrap();
            let current = net.predict(&SAMPLE_STATE).unwrap()[action];
            assert!(current > previous, "{current} <= {previous}");
            assert!(current < 1.0);
            previous = current;
        }
        assert!(previous > start + 0.02);
    }

    #[test]
    fn test_repeated_reward_zero_decreases() {
        let mut net = make_network();
        let action = Action::Buy.index();
        let start = net.predict(&SAMPLE_STATE).unwrap()[action];
        for _ in 0..30 {
            net.train(&SAMPLE_STATE, action, 0.0).unwrap();
        }
        assert!(net.predict(&SAMPLE_STATE).unwrap()[action] < start);
    }

    #[test]
    fn test_export_import_roundtrip_reproduces_predictions() {
        let mut source = make_network();
        for _ in 0..5 {
            source.train(&SAMPLE_STATE, 1, 1.0).unwrap();
        }
        let exported = source.export();

        let mut target = QDecisionNetwork::new(16, 0.1, 99);
        target.import(exported).unwrap();

        assert_eq!(
            source.predict(&SAMPLE_STATE).unwrap(),
            target.predict(&SAMPLE_STATE).unwrap()
        );
        assert_eq!(target.iterations(), 5);
    }

    #[test]
    fn test_blob_roundtrip_reproduces_predictions() {
        let source = make_network();
        let blob = source.to_blob().unwrap();
        let mut target = QDecisionNetwork::new(16, 0.1, 1);
        target.import_blob(&blob).unwrap();
        assert_eq!(
            source.predict(&SAMPLE_STATE).unwrap(),
            target.predict(&SAMPLE_STATE).unwrap()
        );
    }

    #[test]
    fn test_trained_blob_roundtrip_is_exact() {
        let states = [SAMPLE_STATE, [0.9, 0.0, 0.1, 0.8, 0.4, 0.2], [0.5; 6]];
        for seed in 0..50 {
            let mut source = QDecisionNetwork::new(16, 0.1, seed);
            for (step, state) in states.iter().enumerate() {
                let reward = if step % 2 == 0 { 1.0 } else { 0.0 };
                source.train(state, step % 3, reward).unwrap();
            }
            let mut target = QDecisionNetwork::new(16, 0.1, seed + 1);
            target.import_blob(&source.to_blob().unwrap()).unwrap();

            assert_eq!(target.export(), source.export(), "seed {seed}");
            assert_eq!(
                target.predict(&SAMPLE_STATE).unwrap(),
                source.predict(&SAMPLE_STATE).unwrap()
            );
        }
    }

    #[test]
    fn test_import_rejects_mismatched_topology() {
        let mut net = make_network();
        let other = QDecisionNetwork::new(8, 0.1, 42).export();
        assert!(matches!(
            net.import(other),
            Err(ModelError::DimensionMismatch {
                context: "hidden_size",
                ..
            })
        ));

        let mut truncated = net.export();
        truncated.w1.pop();
        assert!(matches!(
            net.import(truncated),
            Err(ModelError::DimensionMismatch { context: "w1", .. })
        ));
    }

    #[test]
    fn test_reset_changes_weights_and_clears_iterations() {
        let mut net = make_network();
        net.train(&SAMPLE_STATE, 0, 1.0).unwrap();
        let before = net.export();
        net.reset().unwrap();
        let after = net.export();
        assert_ne!(before.w1, after.w1);
        assert_eq!(after.iterations, 0);
    }

    #[test]
    fn test_weights_persist_after_every_train() {
        let store = Arc::new(MemoryBlobStore::new());
        let mut net = make_network();
        net.attach_store(store.clone(), "q_network");

        net.train(&SAMPLE_STATE, 0, 1.0).unwrap();
        let mut restored = QDecisionNetwork::new(16, 0.1, 5);
        restored.attach_store(store.clone(), "q_network");
        assert!(restored.load_from_store().unwrap());
        assert_eq!(restored.export(), net.export());

        net.train(&SAMPLE_STATE, 2, 0.0).unwrap();
        assert!(restored.load_from_store().unwrap());
        assert_eq!(restored.iterations(), 2);
    }

    #[test]
    fn test_load_from_empty_store_keeps_weights() {
        let mut net = make_network();
        let before = net.export();
        net.attach_store(Arc::new(MemoryBlobStore::new()), "q_network");
        assert!(!net.load_from_store().unwrap());
        assert_eq!(net.export(), before);
    }
}
