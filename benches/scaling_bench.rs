//! Scaling Benchmarks - Display Conversion Hot Path
//!
//! Every market refresh scales a dozen raw integers and every quote
//! unscales user input, so these run on each poll and keystroke.
//!
//! Run with: cargo bench --bench scaling_bench

use alloy::primitives::U256;
use alloy::sol_types::SolCall;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use djed_client::domain::abi::IDjed;
use djed_client::domain::scaling::{decimal_scaling, decimal_unscaling, percent_scaling};

/// Benchmark scaling an 18-decimal base-asset amount.
fn bench_decimal_scaling(c: &mut Criterion) {
    let value = U256::from(7_500_250_000_000_000_000_000u128);

    c.bench_function("decimal_scaling_18", |b| {
        b.iter(|| {
            let _scaled = decimal_scaling(black_box(value), black_box(18));
        });
    });
}

/// Benchmark parsing a user-entered amount.
fn bench_decimal_unscaling(c: &mut Criterion) {
    c.bench_function("decimal_unscaling_18", |b| {
        b.iter(|| {
            let _raw = decimal_unscaling(black_box("12345.678901234567890123"), black_box(18));
        });
    });
}

/// Benchmark the reserve ratio percentage at protocol precision.
fn bench_percent_scaling(c: &mut Criterion) {
    let ratio = U256::from(4_512_345_678_901_234_567_890_123u128);

    c.bench_function("percent_scaling_24", |b| {
        b.iter(|| {
            let _pct = percent_scaling(black_box(ratio), black_box(24));
        });
    });
}

/// Benchmark encoding a price query.
fn bench_price_call_encoding(c: &mut Criterion) {
    c.bench_function("encode_get_price_buy_rc", |b| {
        b.iter(|| {
            let _data = IDjed::getPriceBuyNReserveCoinsBCCall {
                amountRC: black_box(U256::from(1_500_000u64)),
            }
            .abi_encode();
        });
    });
}

criterion_group!(
    benches,
    bench_decimal_scaling,
    bench_decimal_unscaling,
    bench_percent_scaling,
    bench_price_call_encoding,
);
criterion_main!(benches);
