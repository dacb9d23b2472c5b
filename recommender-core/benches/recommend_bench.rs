mod common;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_recommend(c: &mut Criterion) {
    let mut group = c.benchmark_group("recommend");

    for &users in &[100i64, 500, 1_000] {
        let engine = common::seed_engine(users, 1_500, 50);
        let mut user = 0i64;

        group.bench_with_input(BenchmarkId::from_parameter(users), &users, |bencher, _| {
            bencher.iter(|| {
                user = user % users + 1;
                engine.recommend(black_box(user), 10)
            })
        });
    }

    group.finish();
}

fn bench_recommend_unknown_user(c: &mut Criterion) {
    let engine = common::seed_engine(500, 1_500, 50);

    c.bench_function("recommend/unknown_user", |bencher| {
        bencher.iter(|| engine.recommend(black_box(-1), 10))
    });
}

criterion_group!(benches, bench_recommend, bench_recommend_unknown_user);
criterion_main!(benches);
