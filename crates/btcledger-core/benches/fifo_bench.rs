//! FIFO matching and ledger benchmarks.
//!
//! Run with: cargo bench -p btcledger-core

#![allow(missing_docs)]

use std::hint::black_box;

use btcledger_core::fifo::match_fifo;
use btcledger_core::{BuyLot, Ledger, NaiveDate, TradeInput};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn input(i: usize, amount: Decimal) -> TradeInput {
    let date = NaiveDate::from_ymd_opt(2024, 1, 1 + (i % 28) as u32).unwrap();
    TradeInput::new(date, amount, dec!(30000) + Decimal::from(i), dec!(1.5)).unwrap()
}

/// Generate N lots of 0.1 BTC each.
fn generate_lots(num_lots: usize) -> Vec<BuyLot> {
    (0..num_lots).map(|i| BuyLot::new(&input(i, dec!(0.1)))).collect()
}

fn generate_ledger(num_lots: usize, num_sells: usize) -> Ledger {
    let mut ledger = Ledger::new();
    for i in 0..num_lots {
        ledger.add_buy(input(i, dec!(0.1))).unwrap();
    }
    for i in 0..num_sells {
        ledger.add_sell(input(i, dec!(0.07))).unwrap();
    }
    ledger
}

fn bench_match_fifo(c: &mut Criterion) {
    let mut group = c.benchmark_group("match_fifo");

    for size in [10, 100, 1000] {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_batched(
                || generate_lots(size),
                |mut lots| {
                    // Consume all but the last lot in one sale
                    let amount = dec!(0.1) * Decimal::from(size - 1);
                    black_box(match_fifo(&mut lots, amount).unwrap())
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_add_sell_sequence(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_sell_sequence");

    for size in [10, 100, 500] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_batched(
                || generate_ledger(size, 0),
                |mut ledger| {
                    for i in 0..size {
                        let _ = ledger.add_sell(input(i, dec!(0.05)));
                    }
                    black_box(ledger)
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("rebuild");

    for size in [10, 100, 500] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_batched(
                || generate_ledger(size, size),
                |mut ledger| {
                    ledger.rebuild().unwrap();
                    black_box(ledger)
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_aggregates(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_aggregates");

    for size in [10, 100, 1000] {
        let ledger = generate_ledger(size, size);

        group.bench_with_input(BenchmarkId::from_parameter(size), &ledger, |b, ledger| {
            b.iter(|| black_box(ledger.compute_aggregates()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_match_fifo,
    bench_add_sell_sequence,
    bench_rebuild,
    bench_aggregates
);
criterion_main!(benches);
