use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use stagemap::Map;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> Vec<u8> {
    format!("k{:016x}", n).into_bytes()
}

fn bench_put(c: &mut Criterion) {
    c.bench_function("stagemap_put_10k", |b| {
        b.iter_batched(
            Map::new,
            |mut m| {
                for (i, x) in lcg(1).take(10_000).enumerate() {
                    m.put(key(x), i.to_string()).unwrap();
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit(c: &mut Criterion) {
    c.bench_function("stagemap_get_hit", |b| {
        let mut m = Map::new();
        let keys: Vec<_> = lcg(7).take(20_000).map(key).collect();
        for (i, k) in keys.iter().enumerate() {
            m.put(k, i.to_string()).unwrap();
        }
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(m.get(k).unwrap());
        })
    });
}

fn bench_get_miss(c: &mut Criterion) {
    c.bench_function("stagemap_get_miss", |b| {
        let mut m = Map::new();
        for (i, x) in lcg(11).take(10_000).enumerate() {
            m.put(key(x), i.to_string()).unwrap();
        }
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            let k = key(miss.next().unwrap());
            black_box(m.get(&k).unwrap());
        })
    });
}

fn bench_keys_walk(c: &mut Criterion) {
    c.bench_function("stagemap_keys_10k", |b| {
        let mut m = Map::new();
        for (i, x) in lcg(23).take(10_000).enumerate() {
            m.put(key(x), i.to_string()).unwrap();
        }
        b.iter(|| black_box(m.keys().unwrap()))
    });
}

criterion_group!(
    benches,
    bench_put,
    bench_get_hit,
    bench_get_miss,
    bench_keys_walk
);
criterion_main!(benches);
