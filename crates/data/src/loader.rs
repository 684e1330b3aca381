//! Candle loading from Parquet and JSON files.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use arrow::array::{Float64Array, Int64Array, TimestampNanosecondArray};
use arrow::datatypes::{DataType, TimeUnit};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::DataError;
use crate::validation::validate_candles;
use tradepilot_types::Candle;

const TIMESTAMP_COLUMN: &str = "UTC time";

/// Loads candles from a Parquet file with schema:
/// `UTC time` (timestamp ns, UTC), `Open`, `High`, `Low`, `Close`, `Volume`.
/// Duplicates with identical OHLCV are deduplicated (keep-first); divergent duplicates error.
///
/// # Errors
/// Returns [`DataError`] for missing files, schema violations, out-of-order rows,
/// divergent duplicates, or an empty file.
pub fn load_candles(path: &Path) -> Result<Vec<Candle>, DataError> {
    let file = File::open(path)
        .map_err(|e| DataError::FileNotFound(path.display().to_string(), e.to_string()))?;

    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| DataError::ParseError(e.to_string()))?;
    let reader = builder
        .build()
        .map_err(|e| DataError::ParseError(e.to_string()))?;

    let mut candles = Vec::new();
    let mut seen: HashMap<i64, Candle> = HashMap::new();
    let mut last_ts: Option<i64> = None;
    let mut processed_rows = 0usize;

    for batch_result in reader {
        let batch = batch_result.map_err(|e| DataError::ParseError(e.to_string()))?;

        let ts_arr = timestamp_column(&batch)?;
        let open_arr = numeric_f64_column(&batch, "Open")?;
        let high_arr = numeric_f64_column(&batch, "High")?;
        let low_arr = numeric_f64_column(&batch, "Low")?;
        let close_arr = numeric_f64_column(&batch, "Close")?;
        let volume_arr = numeric_f64_or_i64_column(&batch, "Volume")?;

        for row_idx in 0..batch.num_rows() {
            let ts = ts_arr.value(row_idx);
            if let Some(prev) = last_ts
                && ts < prev
            {
                return Err(DataError::CorruptData(format!(
                    "out-of-order timestamp at row {}: {} < {}",
                    processed_rows + row_idx,
                    ts,
                    prev
                )));
            }

            let candle = Candle {
                timestamp_ns: ts,
                open: open_arr.value(row_idx),
                high: high_arr.value(row_idx),
                low: low_arr.value(row_idx),
                close: close_arr.value(row_idx),
                volume: volume_arr.value(row_idx),
            };

            match seen.get(&ts) {
                Some(existing) => {
                    if !same_candle(existing, &candle) {
                        return Err(DataError::CorruptData(format!(
                            "divergent duplicate timestamp {} at row {}",
                            ts,
                            processed_rows + row_idx
                        )));
                    }
                }
                None => {
                    seen.insert(ts, candle);
                    last_ts = Some(ts);
                    candles.push(candle);
                }
            }
        }

        processed_rows += batch.num_rows();
    }

    if candles.is_empty() {
        return Err(DataError::EmptyData);
    }

    tracing::debug!(path = %path.display(), rows = processed_rows, candles = candles.len(), "loaded parquet candles");
    Ok(candles)
}

/// Loads candles from a JSON array of `{timestamp_ns, open, high, low, close, volume}` objects.
///
/// # Errors
/// Returns [`DataError::FileNotFound`], [`DataError::ParseError`], or [`DataError::EmptyData`].
pub fn load_candles_json(path: &Path) -> Result<Vec<Candle>, DataError> {
    let file = File::open(path)
        .map_err(|e| DataError::FileNotFound(path.display().to_string(), e.to_string()))?;
    let candles: Vec<Candle> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| DataError::ParseError(e.to_string()))?;

    if candles.is_empty() {
        return Err(DataError::EmptyData);
    }
    Ok(candles)
}

/// Convenience: load candles by file extension (`.parquet` / `.json`) and validate them.
///
/// # Errors
/// Returns [`DataError::UnsupportedFormat`] for other extensions, or any loading/validation error.
pub fn load_and_validate(path: &Path) -> Result<Vec<Candle>, DataError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let candles = match extension.as_deref() {
        Some("parquet") => load_candles(path)?,
        Some("json") => load_candles_json(path)?,
        _ => return Err(DataError::UnsupportedFormat(path.display().to_string())),
    };
    validate_candles(&candles)?;
    Ok(candles)
}

/// Keeps candles whose timestamp lies in `[start_ns, end_ns]`.
///
/// # Errors
/// Returns [`DataError::DateRangeEmpty`] when nothing remains.
pub fn filter_by_date_range(
    candles: &[Candle],
    start_ns: i64,
    end_ns: i64,
) -> Result<Vec<Candle>, DataError> {
    let filtered: Vec<Candle> = candles
        .iter()
        .filter(|c| c.timestamp_ns >= start_ns && c.timestamp_ns <= end_ns)
        .copied()
        .collect();

    if filtered.is_empty() {
        return Err(DataError::DateRangeEmpty { start_ns, end_ns });
    }
    Ok(filtered)
}

#[allow(clippy::float_cmp)] // exact duplicate detection
fn same_candle(a: &Candle, b: &Candle) -> bool {
    a.open == b.open
        && a.high == b.high
        && a.low == b.low
        && a.close == b.close
        && a.volume == b.volume
}

fn timestamp_column(batch: &RecordBatch) -> Result<&TimestampNanosecondArray, DataError> {
    let col = batch
        .column_by_name(TIMESTAMP_COLUMN)
        .ok_or_else(|| DataError::MissingColumn(TIMESTAMP_COLUMN.to_string()))?;

    match col.data_type() {
        DataType::Timestamp(TimeUnit::Nanosecond, Some(tz))
            if tz.as_ref() == "UTC" || tz.as_ref() == "+00:00" => {}
        DataType::Timestamp(TimeUnit::Nanosecond, tz) => {
            return Err(DataError::InvalidTimezone {
                column: TIMESTAMP_COLUMN.to_string(),
                timezone: tz
                    .as_ref()
                    .map_or_else(|| "<none>".to_string(), ToString::to_string),
            });
        }
        _ => return Err(DataError::InvalidColumnType(TIMESTAMP_COLUMN.to_string())),
    }

    col.as_any()
        .downcast_ref::<TimestampNanosecondArray>()
        .ok_or_else(|| DataError::InvalidColumnType(TIMESTAMP_COLUMN.to_string()))
}

enum NumericAccessor<'a> {
    F64(&'a Float64Array),
    I64(&'a Int64Array),
}

impl NumericAccessor<'_> {
    #[allow(clippy::cast_precision_loss)] // volumes fit well inside f64 mantissa
    fn value(&self, idx: usize) -> f64 {
        match self {
            NumericAccessor::F64(arr) => arr.value(idx),
            NumericAccessor::I64(arr) => arr.value(idx) as f64,
        }
    }
}

fn numeric_f64_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Float64Array, DataError> {
    let col = batch
        .column_by_name(name)
        .ok_or_else(|| DataError::MissingColumn(name.to_string()))?;
    col.as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| DataError::InvalidColumnType(name.to_string()))
}

fn numeric_f64_or_i64_column<'a>(
    batch: &'a RecordBatch,
    name: &str,
) -> Result<NumericAccessor<'a>, DataError> {
    let col = batch
        .column_by_name(name)
        .ok_or_else(|| DataError::MissingColumn(name.to_string()))?;

    if let Some(arr) = col.as_any().downcast_ref::<Float64Array>() {
        Ok(NumericAccessor::F64(arr))
    } else if let Some(arr) = col.as_any().downcast_ref::<Int64Array>() {
        Ok(NumericAccessor::I64(arr))
    } else {
        Err(DataError::InvalidColumnType(name.to_string()))
    }
}
