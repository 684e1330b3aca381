//! Blended decision confidence and calibration tracking.

use serde::Serialize;
use tradepilot_types::Outcome;

use crate::error::ModelError;

const Q_WEIGHT: f64 = 0.4;
const PATTERN_WEIGHT: f64 = 0.4;
const EXPERIENCE_WEIGHT: f64 = 0.2;
const BUCKETS: usize = 10;

/// One decile of the calibration curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalibrationBucket {
    /// Inclusive lower bound of the confidence range
    pub lower: f64,
    /// Upper bound (exclusive except for the last bucket)
    pub upper: f64,
    /// Predictions recorded in this range
    pub count: u32,
    /// Mean predicted confidence (0–100), 0 when empty
    pub mean_confidence: f64,
    /// Realized win rate (0–100), 0 when empty
    pub win_rate: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    count: u32,
    wins: u32,
    confidence_sum: f64,
}

/// Combines network margin, pattern history and training experience into 0–100.
#[derive(Debug, Clone)]
pub struct ConfidenceEstimator {
    experience_cap: u64,
    tallies: [Tally; BUCKETS],
}

impl Default for ConfidenceEstimator {
    fn default() -> Self {
        Self::new(500)
    }
}

impl ConfidenceEstimator {
    /// Creates an estimator that reaches full experience after `experience_cap` iterations.
    #[must_use]
    pub fn new(experience_cap: u64) -> Self {
        Self {
            experience_cap: experience_cap.max(1),
            tallies: [Tally::default(); BUCKETS],
        }
    }

    /// Blended confidence for choosing `action` given `q_values`.
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidAction`] when `action` is out of range and
    /// [`ModelError::NonFinite`] for NaN Q-values.
    pub fn blend(
        &self,
        q_values: &[f64],
        action: usize,
        pattern_confidence: f64,
        iterations: u64,
    ) -> Result<f64, ModelError> {
        let Some(&chosen) = q_values.get(action) else {
            return Err(ModelError::InvalidAction {
                index: action,
                outputs: q_values.len(),
            });
        };
        ModelError::check_finite("q_values", q_values)?;

        let best_other = q_values
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != action)
            .map(|(_, q)| *q)
            .fold(f64::NEG_INFINITY, f64::max);
        let margin = if best_other.is_finite() {
            (chosen - best_other).clamp(-1.0, 1.0)
        } else {
            0.0
        };
        let q_score = (margin + 1.0) / 2.0 * 100.0;

        let pattern = if pattern_confidence.is_finite() {
            pattern_confidence.clamp(0.0, 100.0)
        } else {
            50.0
        };

        #[allow(clippy::cast_precision_loss)] // iteration counts stay far below 2^52
        let experience = (iterations as f64 / self.experience_cap as f64).min(1.0) * 100.0;

        let blended =
            Q_WEIGHT * q_score + PATTERN_WEIGHT * pattern + EXPERIENCE_WEIGHT * experience;
        Ok(blended.clamp(0.0, 100.0))
    }

    /// Records a resolved prediction in its decile.
    pub fn record_prediction(&mut self, confidence: f64, outcome: Outcome) {
        if !confidence.is_finite() {
            return;
        }
        let confidence = confidence.clamp(0.0, 100.0);
        let tally = &mut self.tallies[bucket_index(confidence)];
        tally.count += 1;
        tally.confidence_sum += confidence;
        if outcome.is_win() {
            tally.wins += 1;
        }
    }

    /// Total recorded predictions.
    #[must_use]
    pub fn recorded(&self) -> u32 {
        self.tallies.iter().map(|t| t.count).sum()
    }

    /// Ten buckets over [0,100].
    #[must_use]
    pub fn calibration_curve(&self) -> Vec<CalibrationBucket> {
        self.tallies
            .iter()
            .enumerate()
            .map(|(i, tally)| {
                #[allow(clippy::cast_precision_loss)] // i < 10
                let lower = i as f64 * 10.0;
                let (mean_confidence, win_rate) = if tally.count == 0 {
                    (0.0, 0.0)
                } else {
                    let n = f64::from(tally.count);
                    (tally.confidence_sum / n, f64::from(tally.wins) / n * 100.0)
                };
                CalibrationBucket {
                    lower,
                    upper: lower + 10.0,
                    count: tally.count,
                    mean_confidence,
                    win_rate,
                }
            })
            .collect()
    }

    /// Count-weighted mean of `|mean_confidence - win_rate|`, in percentage points.
    #[must_use]
    pub fn expected_calibration_error(&self) -> f64 {
        let total = self.recorded();
        if total == 0 {
            return 0.0;
        }
        let weighted: f64 = self
            .calibration_curve()
            .iter()
            .map(|b| f64::from(b.count) * (b.mean_confidence - b.win_rate).abs())
            .sum();
        weighted / f64::from(total)
    }

    /// Forgets all recorded predictions.
    pub fn clear(&mut self) {
        self.tallies = [Tally::default(); BUCKETS];
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // confidence clamped to [0,100]
fn bucket_index(confidence: f64) -> usize {
    ((confidence / 10.0).floor() as usize).min(BUCKETS - 1)
}
