//! Benchmarks for the bar-by-bar simulator.
//!
//! Run with: `cargo bench -p tradepilot_backtest`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use tradepilot_backtest::{BacktestSimulator, build_engine};
use tradepilot_types::{BacktestConfig, Candle, EngineConfig};

#[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
fn synthetic_candles(len: usize) -> Vec<Candle> {
    (0..len)
        .map(|i| {
            let t = i as f64;
            let close = 100.0 + (t * 0.05).sin() * 5.0 + t * 0.01;
            Candle {
                timestamp_ns: i as i64 * 3_600_000_000_000,
                open: close - 0.2,
                high: close + 0.8,
                low: close - 0.9,
                close,
                volume: 10.0,
            }
        })
        .collect()
}

fn bench_run(c: &mut Criterion) {
    let config = BacktestConfig {
        engine: EngineConfig {
            epsilon: 0.0,
            ..EngineConfig::default()
        },
        ..BacktestConfig::default()
    };

    let mut group = c.benchmark_group("simulator");
    group.sample_size(10);
    for size in [1_000usize, 5_000] {
        let candles = synthetic_candles(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("run", size), &candles, |b, data| {
            b.iter(|| {
                let mut engine = build_engine(&config).expect("valid config");
                BacktestSimulator::new(&mut engine, &config)
                    .expect("valid config")
                    .run(black_box(data.clone()))
                    .expect("clean data")
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_run);
criterion_main!(benches);
