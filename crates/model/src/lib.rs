//! TradePilot Model
//!
//! Learned state of the decision engine:
//! - [`QDecisionNetwork`]: 6 → H (ReLU) → 3 (sigmoid) scorer with single-step online correction
//! - [`PatternMemory`]: win/loss statistics keyed by a discretized [`PatternSignature`]
//! - [`ConfidenceEstimator`]: blended 0–100 confidence plus calibration diagnostics
//! - [`BlobStore`]: persistence boundary for weights and memory snapshots
//!
//! All mutation goes through `&mut self`; one owner per instance.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(missing_docs)]

pub mod confidence;
pub mod error;
pub mod network;
pub mod pattern;
pub mod store;

pub use confidence::{CalibrationBucket, ConfidenceEstimator};
pub use error::{ModelError, StoreError};
pub use network::{NetworkWeights, QDecisionNetwork};
pub use pattern::{
    BandBucket, OscillatorBucket, PatternEntry, PatternMemory, PatternRecord, PatternSignature,
    PatternSnapshot, TrendBucket, VolatilityBucket,
};
pub use store::{BlobStore, FileBlobStore, MemoryBlobStore, Persistence};
