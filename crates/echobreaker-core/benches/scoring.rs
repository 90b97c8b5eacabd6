use criterion::{black_box, criterion_group, criterion_main, Criterion};

use echobreaker_core::model::{Pct, ScoredGuess};
use echobreaker_core::scorer::{score, score_raw};
use echobreaker_core::statistics::aggregate;

fn make_scores(n: usize) -> Vec<ScoredGuess> {
    (0..n)
        .map(|i| {
            let dem = (i * 37 % 101) as f64;
            let rep = (i * 53 % 101) as f64;
            ScoredGuess {
                dem_score: dem,
                rep_score: rep,
                total_score: (dem + rep) / 2.0,
            }
        })
        .collect()
}

fn bench_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("score");
    let guess = Pct::new(60.0, 40.0).unwrap();
    let actual = Pct::new(65.0, 35.0).unwrap();

    group.bench_function("validated", |b| {
        b.iter(|| score(black_box(&guess), black_box(&actual)))
    });

    group.bench_function("raw", |b| {
        b.iter(|| score_raw(black_box(60.0), black_box(40.0), black_box(65.0), black_box(35.0)))
    });

    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");

    for n in [5, 100, 10_000] {
        let scores = make_scores(n);
        group.bench_function(format!("n={n}"), |b| b.iter(|| aggregate(black_box(&scores))));
    }

    group.finish();
}

criterion_group!(benches, bench_score, bench_aggregate);
criterion_main!(benches);
