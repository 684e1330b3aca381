#![allow(dead_code)]

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, TimestampNanosecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_writer::ArrowWriter;
use tradepilot_types::Candle;

pub fn write_candle_parquet(
    path: &Path,
    candles: &[Candle],
) -> Result<(), Box<dyn std::error::Error>> {
    write_candle_parquet_with_timezone(path, candles, Some("UTC"))
}

pub fn write_candle_parquet_with_timezone(
    path: &Path,
    candles: &[Candle],
    timezone: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let timestamps: Vec<i64> = candles.iter().map(|c| c.timestamp_ns).collect();
    let opens: Vec<f64> = candles.iter().map(|c| c.open).collect();
    let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
    let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let volumes: Vec<f64> = candles.iter().map(|c| c.volume).collect();

    let ts_array = match timezone {
        Some(tz) => TimestampNanosecondArray::from(timestamps).with_timezone(tz),
        None => TimestampNanosecondArray::from(timestamps),
    };

    let fields = vec![
        Field::new(
            "UTC time",
            DataType::Timestamp(TimeUnit::Nanosecond, timezone.map(Into::into)),
            false,
        ),
        Field::new("Open", DataType::Float64, false),
        Field::new("High", DataType::Float64, false),
        Field::new("Low", DataType::Float64, false),
        Field::new("Close", DataType::Float64, false),
        Field::new("Volume", DataType::Float64, false),
    ];

    let columns: Vec<ArrayRef> = vec![
        Arc::new(ts_array),
        Arc::new(Float64Array::from(opens)),
        Arc::new(Float64Array::from(highs)),
        Arc::new(Float64Array::from(lows)),
        Arc::new(Float64Array::from(closes)),
        Arc::new(Float64Array::from(volumes)),
    ];

    write_custom_parquet(path, fields, columns)
}

pub fn write_custom_parquet(
    path: &Path,
    fields: Vec<Field>,
    columns: Vec<ArrayRef>,
) -> Result<(), Box<dyn std::error::Error>> {
    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns)?;
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close().map(|_| ()).map_err(Into::into)
}

pub fn sample_candles() -> Vec<Candle> {
    vec![
        Candle {
            timestamp_ns: 1_700_000_000_000_000_000,
            open: 101.0,
            high: 102.0,
            low: 100.0,
            close: 101.5,
            volume: 100.0,
        },
        Candle {
            timestamp_ns: 1_700_000_060_000_000_000,
            open: 101.5,
            high: 102.5,
            low: 100.5,
            close: 102.0,
            volume: 120.0,
        },
    ]
}
