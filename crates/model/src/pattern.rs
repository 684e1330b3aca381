//! Discretized market patterns with running win/loss statistics.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tradepilot_types::{Feature, MarketState, Outcome};

use crate::error::ModelError;
use crate::store::{BlobStore, Persistence};

/// Minimum samples before a pattern's win rate is trusted.
pub const MIN_SAMPLES: u32 = 3;

/// Confidence reported for unknown or under-sampled patterns.
pub const NEUTRAL_CONFIDENCE: f64 = 50.0;

const OSCILLATOR_LOW: f64 = 0.30;
const OSCILLATOR_HIGH: f64 = 0.70;
const BAND_LOW: f64 = 0.20;
const BAND_HIGH: f64 = 0.80;
const VOLATILITY_HIGH: f64 = 0.50;
const MOMENTUM_UP: f64 = 0.55;
const MOMENTUM_DOWN: f64 = 0.45;

/// Oscillator bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OscillatorBucket {
    /// Below 0.30
    Low,
    /// 0.30 to 0.70
    Mid,
    /// Above 0.70
    High,
}

/// Trend bucket, combining the trend flag and momentum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendBucket {
    /// Uptrend confirmed by positive momentum
    Up,
    /// Downtrend confirmed by negative momentum
    Down,
    /// Anything else
    Sideways,
}

/// Band position bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandBucket {
    /// Near the lower band
    Low,
    /// Inside the band
    Mid,
    /// Near the upper band
    High,
}

/// Volatility bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityBucket {
    /// At or below half the volatility ceiling
    Low,
    /// Above half the volatility ceiling
    High,
}

/// Typed pattern key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PatternSignature {
    /// Oscillator bucket
    pub oscillator: OscillatorBucket,
    /// Trend bucket
    pub trend: TrendBucket,
    /// Band bucket
    pub band: BandBucket,
    /// Volatility bucket
    pub volatility: VolatilityBucket,
}

impl PatternSignature {
    /// Discretizes a market state.
    #[must_use]
    pub fn encode(state: &MarketState) -> Self {
        let oscillator = match state.get(Feature::Oscillator) {
            v if v < OSCILLATOR_LOW => OscillatorBucket::Low,
            v if v > OSCILLATOR_HIGH => OscillatorBucket::High,
            _ => OscillatorBucket::Mid,
        };

        let flag = state.get(Feature::TrendFlag);
        let momentum = state.get(Feature::Momentum);
        let trend = if flag >= 0.5 && momentum > MOMENTUM_UP {
            TrendBucket::Up
        } else if flag < 0.5 && momentum < MOMENTUM_DOWN {
            TrendBucket::Down
        } else {
            TrendBucket::Sideways
        };

        let band = match state.get(Feature::BandPosition) {
            v if v < BAND_LOW => BandBucket::Low,
            v if v > BAND_HIGH => BandBucket::High,
            _ => BandBucket::Mid,
        };

        let volatility = if state.get(Feature::Volatility) > VOLATILITY_HIGH {
            VolatilityBucket::High
        } else {
            VolatilityBucket::Low
        };

        Self {
            oscillator,
            trend,
            band,
            volatility,
        }
    }
}

impl fmt::Display for PatternSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "osc={:?}/trend={:?}/band={:?}/vol={:?}",
            self.oscillator, self.trend, self.band, self.volatility
        )
    }
}

/// Running statistics of one pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternEntry {
    /// Resolved winners
    pub win_count: u32,
    /// Resolved losers
    pub loss_count: u32,
    /// Sum of realized PnL
    pub total_pnl: f64,
    /// Timestamp of the most recent update
    pub last_seen_ns: i64,
}

impl PatternEntry {
    /// `win_count + loss_count`.
    #[must_use]
    pub fn samples(&self) -> u32 {
        self.win_count + self.loss_count
    }

    /// Win rate in percent, or 50 below [`MIN_SAMPLES`].
    #[must_use]
    pub fn confidence(&self) -> f64 {
        let samples = self.samples();
        if samples < MIN_SAMPLES {
            return NEUTRAL_CONFIDENCE;
        }
        f64::from(self.win_count) / f64::from(samples) * 100.0
    }
}

/// Serialized form of one entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRecord {
    /// Key
    pub signature: PatternSignature,
    /// Statistics
    #[serde(flatten)]
    pub entry: PatternEntry,
}

/// Serializable memory contents, ordered by signature.
pub type PatternSnapshot = Vec<PatternRecord>;

/// Win/loss cache keyed by [`PatternSignature`].
#[derive(Debug, Default)]
pub struct PatternMemory {
    entries: BTreeMap<PatternSignature, PatternEntry>,
    persistence: Option<Persistence>,
}

impl PatternMemory {
    /// Creates an empty memory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Persists a snapshot under `key` after every update.
    pub fn attach_store(&mut self, store: Arc<dyn BlobStore>, key: impl Into<String>) {
        self.persistence = Some(Persistence::new(store, key));
    }

    /// Restores the stored snapshot, if any. Returns `true` when one was loaded.
    ///
    /// # Errors
    /// Returns [`ModelError`] on store failure or a corrupt blob.
    pub fn load_from_store(&mut self) -> Result<bool, ModelError> {
        let Some(persistence) = &self.persistence else {
            return Ok(false);
        };
        let Some(snapshot) = persistence.load::<PatternSnapshot>()? else {
            return Ok(false);
        };
        tracing::info!(
            key = persistence.key(),
            patterns = snapshot.len(),
            "loaded pattern memory"
        );
        self.restore(snapshot);
        Ok(true)
    }

    /// Records a resolved trade, creating the entry on first sight.
    ///
    /// # Errors
    /// Returns [`ModelError`] when persisting the snapshot fails. The in-memory
    /// update is applied regardless.
    pub fn update(
        &mut self,
        signature: PatternSignature,
        outcome: Outcome,
        pnl: f64,
        timestamp_ns: i64,
    ) -> Result<(), ModelError> {
        let entry = self.entries.entry(signature).or_default();
        match outcome {
            Outcome::Win => entry.win_count += 1,
            Outcome::Loss => entry.loss_count += 1,
        }
        if pnl.is_finite() {
            entry.total_pnl += pnl;
        }
        entry.last_seen_ns = entry.last_seen_ns.max(timestamp_ns);

        tracing::debug!(%signature, samples = entry.samples(), "pattern updated");
        self.persist()
    }

    /// Historical confidence of `signature`, 50 when unknown or under-sampled.
    #[must_use]
    pub fn confidence(&self, signature: &PatternSignature) -> f64 {
        self.entries
            .get(signature)
            .map_or(NEUTRAL_CONFIDENCE, PatternEntry::confidence)
    }

    /// Statistics of `signature`.
    #[must_use]
    pub fn get(&self, signature: &PatternSignature) -> Option<&PatternEntry> {
        self.entries.get(signature)
    }

    /// Whether `signature` has at least [`MIN_SAMPLES`] resolutions.
    #[must_use]
    pub fn is_established(&self, signature: &PatternSignature) -> bool {
        self.entries
            .get(signature)
            .is_some_and(|e| e.samples() >= MIN_SAMPLES)
    }

    /// Number of distinct signatures seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no signature has been seen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, ordered by signature.
    #[must_use]
    pub fn snapshot(&self) -> PatternSnapshot {
        self.entries
            .iter()
            .map(|(signature, entry)| PatternRecord {
                signature: *signature,
                entry: *entry,
            })
            .collect()
    }

    /// Replaces all entries. Duplicate signatures are merged.
    pub fn restore(&mut self, snapshot: PatternSnapshot) {
        self.entries.clear();
        for record in snapshot {
            let entry = self.entries.entry(record.signature).or_default();
            entry.win_count += record.entry.win_count;
            entry.loss_count += record.entry.loss_count;
            entry.total_pnl += record.entry.total_pnl;
            entry.last_seen_ns = entry.last_seen_ns.max(record.entry.last_seen_ns);
        }
    }

    fn persist(&self) -> Result<(), ModelError> {
        match &self.persistence {
            Some(p) => p.save(&self.snapshot()),
            None => Ok(()),
        }
    }
}
