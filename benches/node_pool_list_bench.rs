use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use nge_containers::NodePoolList;
use slotmap::SlotMap;
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn bench_push_100k(c: &mut Criterion) {
    c.bench_function("list::push_100k", |b| {
        b.iter_batched(
            NodePoolList::<u64>::new,
            |mut l| {
                for x in lcg(1).take(100_000) {
                    l.push(x);
                }
                black_box(l)
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("slotmap::insert_100k", |b| {
        b.iter_batched(
            SlotMap::<slotmap::DefaultKey, u64>::new,
            |mut m| {
                for x in lcg(1).take(100_000) {
                    m.insert(x);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

// Remove every third item while walking, then refill from the freed slots.
fn bench_filter_and_refill(c: &mut Criterion) {
    c.bench_function("list::filter_refill_30k", |b| {
        b.iter_batched(
            || lcg(2).take(30_000).collect::<NodePoolList<u64>>(),
            |mut l| {
                let mut cur = l.cursor_mut();
                let mut i = 0u64;
                while cur.current().is_some() {
                    if i % 3 == 0 {
                        cur.remove_current();
                    } else {
                        cur.move_next();
                    }
                    i += 1;
                }
                for x in lcg(3).take(10_000) {
                    l.push_front(x);
                }
                black_box(l)
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("slotmap::filter_refill_30k", |b| {
        b.iter_batched(
            || {
                let mut m = SlotMap::new();
                for x in lcg(2).take(30_000) {
                    m.insert(x);
                }
                m
            },
            |mut m| {
                let mut i = 0u64;
                m.retain(|_, _| {
                    i += 1;
                    (i - 1) % 3 != 0
                });
                for x in lcg(3).take(10_000) {
                    m.insert(x);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_iter_100k(c: &mut Criterion) {
    let l: NodePoolList<u64> = lcg(4).take(100_000).collect();
    c.bench_function("list::iter_sum_100k", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for v in l.iter() {
                sum = sum.wrapping_add(*v);
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
    targets = bench_push_100k, bench_filter_and_refill, bench_iter_100k
}
criterion_main!(benches);
