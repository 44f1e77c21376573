//! Benchmarks for the recommendation engine
//!
//! Run with: cargo bench --package engine
//!
//! Uses a synthetic catalog so the benchmark does not depend on the dataset.

use catalog::{BookRecord, CatalogSnapshot, RatingRecord};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use engine::{EngineConfig, PopularityRanker, SimilarityIndex};

const AUTHORS: &[&str] = &["Herbert", "Austen", "Tolkien", "Gibson", "Le Guin", "Stoker"];
const PUBLISHERS: &[&str] = &["Ace", "Penguin", "Ballantine", "Signet", "Tor"];
const WORDS: &[&str] = &[
    "dune", "ring", "shadow", "winter", "garden", "storm", "machine", "river", "crown", "glass",
];

fn synthetic_snapshot(n_books: usize) -> CatalogSnapshot {
    let books: Vec<BookRecord> = (0..n_books)
        .map(|i| {
            let title = format!(
                "{} {} {}",
                WORDS[i % WORDS.len()],
                WORDS[(i / 7) % WORDS.len()],
                i
            );
            BookRecord::new(
                format!("{:010}", i),
                title,
                AUTHORS[i % AUTHORS.len()],
                PUBLISHERS[i % PUBLISHERS.len()],
                1990,
            )
        })
        .collect();

    let ratings: Vec<RatingRecord> = (0..n_books)
        .flat_map(|i| {
            let count = (i * 13) % 40;
            (0..count).map(move |k| RatingRecord::new(format!("{:010}", i), (k % 10) as u8 + 1))
        })
        .collect();

    CatalogSnapshot::new(books, ratings)
}

fn bench_popularity(c: &mut Criterion) {
    let snapshot = synthetic_snapshot(5_000);
    let ranker = PopularityRanker::new();

    c.bench_function("popularity_rank", |b| {
        b.iter(|| {
            let titles = ranker.rank(black_box(&snapshot.books), black_box(&snapshot.ratings));
            black_box(titles)
        })
    });
}

fn bench_content_based(c: &mut Criterion) {
    let snapshot = synthetic_snapshot(5_000);
    let index = SimilarityIndex::new(EngineConfig::default());

    // Book 3 has 39 ratings, comfortably above the default threshold
    c.bench_function("content_based_popular_subset", |b| {
        b.iter(|| {
            let result = index.recommend(black_box(&snapshot), black_box("0000000003"));
            black_box(result)
        })
    });

    // Book 0 has no ratings, so every call widens to the full catalog
    c.bench_function("content_based_full_catalog", |b| {
        b.iter(|| {
            let result = index.recommend(black_box(&snapshot), black_box("0000000000"));
            black_box(result)
        })
    });
}

criterion_group!(benches, bench_popularity, bench_content_based);
criterion_main!(benches);
