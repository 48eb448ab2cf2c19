/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

extern crate criterion;
extern crate kestrel;

use criterion::*;
use kestrel::{BgpEvaluator, OptimizerConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::memory_store::MemoryStore;
use shared::statistics::StoreStatistics;
use shared::store::ActiveGraphs;
use shared::terms::{PatternTerm, TriplePattern};

const EX: &str = "http://example.org/";

// Synthetic social graph: people know each other, live in cities, work for companies.
fn setup_store(people: usize) -> MemoryStore {
    let mut rng = StdRng::seed_from_u64(42);
    let mut store = MemoryStore::new();
    let person = |i: usize| format!("{}person{}", EX, i);
    for i in 0..people {
        store.insert_uris(&person(i), &format!("{}type", EX), &format!("{}Person", EX));
        store.insert_uris(&person(i), &format!("{}livesIn", EX), &format!("{}city{}", EX, rng.gen_range(0..50)));
        if rng.gen_bool(0.3) {
            store.insert_uris(&person(i), &format!("{}worksFor", EX), &format!("{}company{}", EX, rng.gen_range(0..200)));
        }
        for _ in 0..rng.gen_range(1..8) {
            store.insert_uris(&person(i), &format!("{}knows", EX), &person(rng.gen_range(0..people)));
        }
    }
    store
}

fn term(text: &str) -> PatternTerm {
    match text.strip_prefix('?') {
        Some(name) => PatternTerm::var(name),
        None => PatternTerm::uri(format!("{}{}", EX, text)),
    }
}

fn tp(s: &str, p: &str, o: &str) -> TriplePattern {
    TriplePattern::new(term(s), term(p), term(o))
}

fn bench_star_join(c: &mut Criterion) {
    let store = setup_store(20_000);
    let patterns = vec![
        tp("?p", "type", "Person"),
        tp("?p", "livesIn", "?city"),
        tp("?p", "worksFor", "?company"),
    ];
    let evaluator = BgpEvaluator::with_store(&store);
    c.bench_function("star_join_three_patterns", |b| {
        b.iter(|| evaluator.evaluate(black_box(&patterns), &ActiveGraphs::All))
    });
}

fn bench_path_join(c: &mut Criterion) {
    let store = setup_store(20_000);
    let statistics = StoreStatistics::gather(&store);
    let patterns = vec![
        tp("?a", "knows", "?b"),
        tp("?b", "livesIn", "city7"),
        tp("?a", "worksFor", "?company"),
    ];
    let plain = BgpEvaluator::with_store(&store);
    let with_stats = BgpEvaluator::new(&store, Some(&statistics), OptimizerConfig::default());

    let mut group = c.benchmark_group("path_join");
    group.bench_function("default_weights", |b| {
        b.iter(|| plain.evaluate(black_box(&patterns), &ActiveGraphs::All))
    });
    group.bench_function("with_statistics", |b| {
        b.iter(|| with_stats.evaluate(black_box(&patterns), &ActiveGraphs::All))
    });
    group.finish();
}

fn bench_cross_product(c: &mut Criterion) {
    let store = setup_store(2_000);
    let patterns = vec![tp("?c", "worksFor", "company3"), tp("?p", "livesIn", "city1")];
    let evaluator = BgpEvaluator::with_store(&store);
    c.bench_function("cross_product", |b| {
        b.iter(|| evaluator.evaluate(black_box(&patterns), &ActiveGraphs::All))
    });
}

criterion_group!(benches, bench_star_join, bench_path_join, bench_cross_product);
criterion_main!(benches);
