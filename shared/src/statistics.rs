/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::index_manager::Permutation;
use crate::memory_store::MemoryStore;
use crate::resource::ResourceId;
use crate::store::{PredicateCounts, PredicateStatistics};

/// Per-predicate triple statistics for cost-based pattern ordering
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreStatistics {
    total_triples: u64,
    predicates: FxHashMap<String, PredicateCounts>,
}

impl StoreStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gathers exact statistics from the store, one predicate per rayon task.
    /// Triples asserted in several graphs are counted once.
    pub fn gather(store: &MemoryStore) -> Self {
        let index = store.index();
        let mut predicates: Vec<ResourceId> = index.iter(Permutation::Pso).map(|key| key[0]).collect();
        predicates.dedup();

        let per_predicate: Vec<(ResourceId, PredicateCounts)> = predicates
            .par_iter()
            .map(|&predicate| {
                let mut counts = PredicateCounts::default();
                let mut last_pair: Option<(ResourceId, ResourceId)> = None;
                let mut last_subject: Option<ResourceId> = None;
                for key in index.scan_prefix(Permutation::Pso, &[predicate]) {
                    let pair = (key[1], key[2]);
                    if last_pair != Some(pair) {
                        counts.triple_count += 1;
                        last_pair = Some(pair);
                    }
                    if last_subject != Some(key[1]) {
                        counts.subject_predicate_count += 1;
                        last_subject = Some(key[1]);
                    }
                }
                let mut last_object: Option<ResourceId> = None;
                for key in index.scan_prefix(Permutation::Pos, &[predicate]) {
                    if last_object != Some(key[1]) {
                        counts.predicate_object_count += 1;
                        last_object = Some(key[1]);
                    }
                }
                (predicate, counts)
            })
            .collect();

        let mut stats = Self::new();
        for (predicate, counts) in per_predicate {
            stats.total_triples += counts.triple_count;
            let uri = match store.dictionary.decode(predicate) {
                Some(resource) => resource.lexical.clone(),
                None => continue,
            };
            stats.predicates.insert(uri, counts);
        }
        stats
    }

    /// Overrides the counts of one predicate, keeping the total consistent.
    pub fn set_predicate(&mut self, predicate_uri: &str, counts: PredicateCounts) {
        if let Some(previous) = self.predicates.insert(predicate_uri.to_string(), counts) {
            self.total_triples = self.total_triples.saturating_sub(previous.triple_count);
        }
        self.total_triples += counts.triple_count;
    }
}

impl PredicateStatistics for StoreStatistics {
    fn predicate_counts(&self, predicate_uri: &str) -> Option<PredicateCounts> {
        self.predicates.get(predicate_uri).copied()
    }

    fn total_triple_count(&self) -> u64 {
        self.total_triples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terms::Constant;

    #[test]
    fn test_gather_counts() {
        let mut store = MemoryStore::new();
        store.insert_uris("http://example.org/a", "http://example.org/knows", "http://example.org/b");
        store.insert_uris("http://example.org/a", "http://example.org/knows", "http://example.org/c");
        store.insert_uris("http://example.org/d", "http://example.org/knows", "http://example.org/c");
        store.insert_in_graph(
            &Constant::uri("http://example.org/d"),
            &Constant::uri("http://example.org/knows"),
            &Constant::uri("http://example.org/c"),
            Some("http://example.org/graphs/g2"),
        );
        store.insert(
            &Constant::uri("http://example.org/b"),
            &Constant::uri("http://example.org/age"),
            &Constant::plain_literal("30"),
        );

        let stats = StoreStatistics::gather(&store);
        assert_eq!(stats.total_triple_count(), 4);
        let knows = stats.predicate_counts("http://example.org/knows").unwrap();
        assert_eq!(knows.triple_count, 3);
        assert_eq!(knows.subject_predicate_count, 2);
        assert_eq!(knows.predicate_object_count, 2);
        assert!(stats.predicate_counts("http://example.org/missing").is_none());
    }

    #[test]
    fn test_gather_keys_predicates_by_full_uri() {
        let mut store = MemoryStore::new();
        store.add_prefix("ex", "http://example.org/");
        store.insert_uris("http://example.org/a", "http://example.org/age", "http://example.org/b");
        let stats = StoreStatistics::gather(&store);
        assert!(stats.predicate_counts("http://example.org/age").is_some());
    }

    #[test]
    fn test_set_predicate_replaces_counts() {
        let mut stats = StoreStatistics::new();
        let counts = |triple_count| PredicateCounts {
            triple_count,
            subject_predicate_count: 1,
            predicate_object_count: 1,
        };
        stats.set_predicate("http://example.org/knows", counts(10));
        stats.set_predicate("http://example.org/age", counts(4));
        assert_eq!(stats.total_triple_count(), 14);
        stats.set_predicate("http://example.org/knows", counts(2));
        assert_eq!(stats.total_triple_count(), 6);
        assert_eq!(stats.predicate_counts("http://example.org/knows"), Some(counts(2)));
    }

    #[test]
    fn test_set_predicate_over_gathered_counts() {
        let mut store = MemoryStore::new();
        store.insert_uris("http://example.org/a", "http://example.org/knows", "http://example.org/b");
        let mut stats = StoreStatistics::gather(&store);
        stats.set_predicate(
            "http://example.org/knows",
            PredicateCounts { triple_count: 0, ..PredicateCounts::default() },
        );
        assert_eq!(stats.total_triple_count(), 0);
    }
}
