use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use nge_containers::AmortizedArray;
use std::collections::VecDeque;
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn bench_push_100k(c: &mut Criterion) {
    c.bench_function("amortized::push_100k", |b| {
        b.iter_batched(
            AmortizedArray::<u64>::new,
            |mut a| {
                for x in lcg(1).take(100_000) {
                    a.push(x);
                }
                black_box(a)
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("vecdeque::push_back_100k", |b| {
        b.iter_batched(
            VecDeque::<u64>::new,
            |mut a| {
                for x in lcg(1).take(100_000) {
                    a.push_back(x);
                }
                black_box(a)
            },
            BatchSize::SmallInput,
        )
    });
}

// Queue churn: a steady-state FIFO that repeatedly grows and drains.
fn bench_fifo_churn(c: &mut Criterion) {
    c.bench_function("amortized::fifo_churn_10x10k", |b| {
        b.iter_batched(
            AmortizedArray::<u64>::new,
            |mut a| {
                for round in 0..10u64 {
                    for x in lcg(round).take(10_000) {
                        a.push(x);
                    }
                    while let Some(x) = a.pop_front() {
                        black_box(x);
                    }
                }
                black_box(a)
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("vecdeque::fifo_churn_10x10k", |b| {
        b.iter_batched(
            VecDeque::<u64>::new,
            |mut a| {
                for round in 0..10u64 {
                    for x in lcg(round).take(10_000) {
                        a.push_back(x);
                    }
                    while let Some(x) = a.pop_front() {
                        black_box(x);
                    }
                }
                black_box(a)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_index_random_10k(c: &mut Criterion) {
    let a: AmortizedArray<u64> = lcg(5).take(100_000).collect();
    let idx: Vec<usize> = lcg(6).take(10_000).map(|x| (x % 100_000) as usize).collect();
    c.bench_function("amortized::index_random_10k", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for &i in &idx {
                sum = sum.wrapping_add(a[i]);
            }
            black_box(sum)
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_push_100k, bench_fifo_churn, bench_index_random_10k
}
criterion_main!(benches);
