//! TradePilot Data
//!
//! Candle loading (Parquet and JSON) and validation.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(missing_docs)]

/// Data-layer error types.
pub mod error;
/// Parquet/JSON loading and data filters.
pub mod loader;
/// Candle sequence validation.
pub mod validation;

/// Re-export: data-layer error type.
pub use error::DataError;
/// Re-export: date-range filter for candles.
pub use loader::filter_by_date_range;
/// Re-export: load and validate candles, format chosen by extension.
pub use loader::load_and_validate;
/// Re-export: load candles from Parquet.
pub use loader::load_candles;
/// Re-export: load candles from a JSON array.
pub use loader::load_candles_json;
/// Re-export: candle validation.
pub use validation::validate_candles;
