//! Model error types.

use thiserror::Error;

/// Errors raised by the network, pattern memory and confidence estimator.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Input or weight shape does not match the network topology
    #[error("dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Which input was malformed
        context: &'static str,
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Action index outside the output layer
    #[error("invalid action index {index} for {outputs} outputs")]
    InvalidAction {
        /// Offending index
        index: usize,
        /// Number of outputs
        outputs: usize,
    },

    /// NaN or infinite value where a finite one is required
    #[error("non-finite value in {context} at position {position}")]
    NonFinite {
        /// Which input was malformed
        context: &'static str,
        /// Position of the first bad value
        position: usize,
    },

    /// Persistence backend failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Blob could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ModelError {
    /// Checks that `values` has `expected` entries.
    ///
    /// # Errors
    /// Returns [`ModelError::DimensionMismatch`] otherwise.
    pub fn check_len(context: &'static str, values: &[f64], expected: usize) -> Result<(), Self> {
        if values.len() == expected {
            Ok(())
        } else {
            Err(ModelError::DimensionMismatch {
                context,
                expected,
                actual: values.len(),
            })
        }
    }

    /// Checks that every value is finite.
    ///
    /// # Errors
    /// Returns [`ModelError::NonFinite`] with the first offending position.
    pub fn check_finite(context: &'static str, values: &[f64]) -> Result<(), Self> {
        match values.iter().position(|v| !v.is_finite()) {
            Some(position) => Err(ModelError::NonFinite { context, position }),
            None => Ok(()),
        }
    }
}

/// Errors raised by [`BlobStore`](crate::store::BlobStore) implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure
    #[error("io error for key {key}: {source}")]
    Io {
        /// Blob key
        key: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Key contains characters the backend cannot map
    #[error("invalid key: {0:?}")]
    InvalidKey(String),

    /// A writer panicked while holding the store lock
    #[error("store lock poisoned")]
    Poisoned,
}
