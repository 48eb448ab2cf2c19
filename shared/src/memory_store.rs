/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use log::debug;

use crate::dictionary::Dictionary;
use crate::error::StoreError;
use crate::index_manager::{IndexKey, Permutation, QuadIndex};
use crate::resource::{ResolvedResource, ResourceId};
use crate::store::{ActiveGraphs, IdIter, PairIter, PairOrder, TripleIter, TripleStore};
use crate::terms::Constant;
use crate::triple::{Quad, Triple};

/// Graph that triples land in when no graph is named.
pub const DEFAULT_GRAPH: &str = "urn:x-local:default-graph";

/// In-memory triple store backed by six sorted permutation indexes.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    pub dictionary: Dictionary,
    index: QuadIndex,
    default_graph: ResourceId,
    native_pair_orders: Option<Vec<PairOrder>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let mut dictionary = Dictionary::new();
        let default_graph = dictionary.encode_uri(DEFAULT_GRAPH);
        Self {
            dictionary,
            index: QuadIndex::new(),
            default_graph,
            native_pair_orders: None,
        }
    }

    /// Restricts the pair orders this store serves, mimicking a store that
    /// keeps only some of its permutation indexes.
    pub fn with_native_pair_orders(mut self, orders: Vec<PairOrder>) -> Self {
        self.native_pair_orders = Some(orders);
        self
    }

    pub fn add_prefix(&mut self, prefix: &str, namespace: &str) {
        self.dictionary.add_prefix(prefix, namespace);
    }

    pub fn default_graph(&self) -> ResourceId {
        self.default_graph
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &QuadIndex {
        &self.index
    }

    pub fn insert(&mut self, subject: &Constant, predicate: &Constant, object: &Constant) -> bool {
        self.insert_in_graph(subject, predicate, object, None)
    }

    pub fn insert_in_graph(
        &mut self,
        subject: &Constant,
        predicate: &Constant,
        object: &Constant,
        graph: Option<&str>,
    ) -> bool {
        let triple = Triple {
            subject: self.dictionary.encode(subject),
            predicate: self.dictionary.encode(predicate),
            object: self.dictionary.encode(object),
        };
        let graph = match graph {
            Some(uri) => self.dictionary.encode_uri(uri),
            None => self.default_graph,
        };
        self.index.insert(&Quad { triple, graph })
    }

    /// Convenience for URI-only triples in the default graph.
    pub fn insert_uris(&mut self, subject: &str, predicate: &str, object: &str) -> bool {
        self.insert(&Constant::uri(subject), &Constant::uri(predicate), &Constant::uri(object))
    }

    pub fn delete(&mut self, quad: &Quad) -> bool {
        self.index.delete(quad)
    }

    /// Replaces the index content with already-encoded quads.
    pub fn bulk_load(&mut self, quads: &[Quad]) {
        self.index.clear();
        self.index.build_from_quads(quads);
        debug!("Bulk loaded {} quads ({} distinct)", quads.len(), self.index.len());
    }

    fn scan<'a>(
        &'a self,
        perm: Permutation,
        prefix: &[ResourceId],
        graphs: &ActiveGraphs,
    ) -> impl Iterator<Item = &'a IndexKey> + 'a {
        let graphs = graphs.clone();
        self.index
            .scan_prefix(perm, prefix)
            .filter(move |key| graphs.contains(key[3]))
    }
}

/// Drops consecutive duplicates, which appear when a triple is asserted in several graphs.
fn dedup_sorted<T: PartialEq + Copy>(iter: impl Iterator<Item = T>) -> impl Iterator<Item = T> {
    let mut last: Option<T> = None;
    iter.filter(move |item| {
        if last == Some(*item) {
            false
        } else {
            last = Some(*item);
            true
        }
    })
}

impl TripleStore for MemoryStore {
    fn lookup(&self, constant: &Constant) -> Result<Option<ResourceId>, StoreError> {
        Ok(self.dictionary.lookup(constant))
    }

    fn lookup_graph(&self, graph_uri: &str) -> Result<Option<ResourceId>, StoreError> {
        Ok(self.dictionary.lookup(&Constant::uri(graph_uri)))
    }

    fn match_ids<'a>(
        &'a self,
        subject: Option<ResourceId>,
        predicate: Option<ResourceId>,
        object: Option<ResourceId>,
        graphs: &ActiveGraphs,
    ) -> Result<IdIter<'a>, StoreError> {
        let (perm, prefix) = match (subject, predicate, object) {
            (Some(s), Some(p), None) => (Permutation::Spo, [s, p]),
            (None, Some(p), Some(o)) => (Permutation::Pos, [p, o]),
            (Some(s), None, Some(o)) => (Permutation::Sop, [s, o]),
            _ => {
                return Err(StoreError::InvalidRequest(format!(
                    "single-id match needs exactly one open position, got ({:?}, {:?}, {:?})",
                    subject, predicate, object
                )))
            }
        };
        let ids = dedup_sorted(self.scan(perm, &prefix, graphs).map(|key| key[2]));
        Ok(Box::new(ids.map(Ok::<_, StoreError>)))
    }

    fn pairs<'a>(
        &'a self,
        order: PairOrder,
        fixed: ResourceId,
        graphs: &ActiveGraphs,
    ) -> Result<PairIter<'a>, StoreError> {
        if !self.supports_pair_order(order) {
            return Err(StoreError::InvalidRequest(format!("no index serves {:?}", order)));
        }
        let perm = match order {
            PairOrder::PredicateObject => Permutation::Spo,
            PairOrder::ObjectPredicate => Permutation::Sop,
            PairOrder::SubjectObject => Permutation::Pso,
            PairOrder::ObjectSubject => Permutation::Pos,
            PairOrder::SubjectPredicate => Permutation::Osp,
            PairOrder::PredicateSubject => Permutation::Ops,
        };
        let pairs = dedup_sorted(self.scan(perm, &[fixed], graphs).map(|key| [key[1], key[2]]));
        Ok(Box::new(pairs.map(Ok::<_, StoreError>)))
    }

    fn supports_pair_order(&self, order: PairOrder) -> bool {
        match &self.native_pair_orders {
            Some(orders) => orders.contains(&order),
            None => true,
        }
    }

    fn all_triples<'a>(&'a self, graphs: &ActiveGraphs) -> Result<TripleIter<'a>, StoreError> {
        let triples = dedup_sorted(
            self.scan(Permutation::Pso, &[], graphs)
                .map(|key| Permutation::Pso.quad(key).triple),
        );
        Ok(Box::new(triples.map(Ok::<_, StoreError>)))
    }

    fn contains(&self, triple: &Triple, graphs: &ActiveGraphs) -> Result<bool, StoreError> {
        let prefix = [triple.subject, triple.predicate, triple.object];
        Ok(self.scan(Permutation::Spo, &prefix, graphs).next().is_some())
    }

    fn resolve(&self, id: ResourceId) -> Result<Option<ResolvedResource>, StoreError> {
        Ok(self.dictionary.decode(id).cloned())
    }

    fn resolve_prefixed_uri(&self, value: &str) -> String {
        self.dictionary.resolve_prefixed_uri(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EX: &str = "http://example.org/";

    fn ex(local: &str) -> String {
        format!("{}{}", EX, local)
    }

    fn id(store: &MemoryStore, local: &str) -> ResourceId {
        store.lookup(&Constant::uri(ex(local))).unwrap().unwrap()
    }

    fn sample_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.insert_uris(&ex("b"), &ex("knows"), &ex("c"));
        store.insert_uris(&ex("a"), &ex("knows"), &ex("c"));
        store.insert_uris(&ex("a"), &ex("knows"), &ex("b"));
        store.insert_uris(&ex("a"), &ex("likes"), &ex("b"));
        store.insert_in_graph(
            &Constant::uri(ex("a")),
            &Constant::uri(ex("knows")),
            &Constant::uri(ex("b")),
            Some("http://example.org/graphs/other"),
        );
        store
    }

    #[test]
    fn test_match_ids_sorted_and_deduplicated() {
        let store = sample_store();
        let knows = id(&store, "knows");
        let a = id(&store, "a");
        let ids: Vec<ResourceId> = store
            .match_ids(Some(a), Some(knows), None, &ActiveGraphs::All)
            .unwrap()
            .map(Result::unwrap)
            .collect();
        assert_eq!(ids, vec![id(&store, "b"), id(&store, "c")]);
    }

    #[test]
    fn test_match_ids_rejects_two_open_positions() {
        let store = sample_store();
        let knows = id(&store, "knows");
        assert!(store.match_ids(None, Some(knows), None, &ActiveGraphs::All).is_err());
    }

    #[test]
    fn test_pairs_order() {
        let store = sample_store();
        let knows = id(&store, "knows");
        let pairs: Vec<[ResourceId; 2]> = store
            .pairs(PairOrder::ObjectSubject, knows, &ActiveGraphs::All)
            .unwrap()
            .map(Result::unwrap)
            .collect();
        let mut sorted = pairs.clone();
        sorted.sort();
        assert_eq!(pairs, sorted);
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0], [id(&store, "b"), id(&store, "a")]);
    }

    #[test]
    fn test_graph_restriction() {
        let store = sample_store();
        let graphs = ActiveGraphs::resolve(&store, &["http://example.org/graphs/other"]).unwrap();
        let triples: Vec<Triple> = store
            .all_triples(&graphs)
            .unwrap()
            .map(Result::unwrap)
            .collect();
        assert_eq!(triples.len(), 1);
        let unknown = ActiveGraphs::resolve(&store, &["http://example.org/graphs/none"]).unwrap();
        assert_eq!(store.all_triples(&unknown).unwrap().count(), 0);
    }

    #[test]
    fn test_restricted_pair_orders() {
        let store = sample_store().with_native_pair_orders(vec![PairOrder::SubjectObject]);
        let knows = id(&store, "knows");
        assert!(store.supports_pair_order(PairOrder::SubjectObject));
        assert!(!store.supports_pair_order(PairOrder::ObjectSubject));
        assert!(store.pairs(PairOrder::ObjectSubject, knows, &ActiveGraphs::All).is_err());
    }

    #[test]
    fn test_contains() {
        let store = sample_store();
        let t = Triple::new(id(&store, "a"), id(&store, "likes"), id(&store, "b"));
        assert!(store.contains(&t, &ActiveGraphs::All).unwrap());
        let missing = Triple::new(id(&store, "b"), id(&store, "likes"), id(&store, "a"));
        assert!(!store.contains(&missing, &ActiveGraphs::All).unwrap());
    }

    #[test]
    fn test_delete_removes_only_that_graph() {
        let mut store = sample_store();
        let other = store.lookup(&Constant::uri("http://example.org/graphs/other")).unwrap().unwrap();
        let default = store.default_graph();
        let t = Triple::new(id(&store, "a"), id(&store, "knows"), id(&store, "b"));
        assert!(store.delete(&Quad { triple: t, graph: default }));
        assert!(!store.delete(&Quad { triple: t, graph: default }));
        assert!(store.contains(&t, &ActiveGraphs::All).unwrap());
        assert!(store.delete(&Quad { triple: t, graph: other }));
        assert!(!store.contains(&t, &ActiveGraphs::All).unwrap());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_bulk_load_replaces_content() {
        let mut store = sample_store();
        let (a, likes, c) = (id(&store, "a"), id(&store, "likes"), id(&store, "c"));
        let quad = Quad { triple: Triple::new(a, likes, c), graph: store.default_graph() };
        store.bulk_load(&[quad, quad]);
        assert_eq!(store.len(), 1);
        let triples: Vec<Triple> = store
            .all_triples(&ActiveGraphs::All)
            .unwrap()
            .map(Result::unwrap)
            .collect();
        assert_eq!(triples, vec![quad.triple]);
    }

    #[test]
    fn test_prefixed_spelling_stays_distinct_from_expanded_uri() {
        let mut store = MemoryStore::new();
        store.add_prefix("ex", EX);
        store.insert_uris(&ex("a"), &ex("p"), "ex:b");
        store.insert_uris(&ex("a"), &ex("p"), &ex("b"));
        let (a, p) = (id(&store, "a"), id(&store, "p"));
        let objects: Vec<ResourceId> = store
            .match_ids(Some(a), Some(p), None, &ActiveGraphs::All)
            .unwrap()
            .map(Result::unwrap)
            .collect();
        assert_eq!(objects.len(), 2);
        let lexicals: Vec<String> = objects
            .iter()
            .map(|&o| store.resolve_prefixed_uri(&store.resolve(o).unwrap().unwrap().lexical))
            .collect();
        assert!(lexicals.contains(&"ex:b".to_string()));
        assert!(lexicals.contains(&ex("b")));
    }

    #[test]
    fn test_prefix_added_after_load_keeps_lookup() {
        let mut store = MemoryStore::new();
        store.insert_uris(&ex("a"), &ex("p"), &ex("b"));
        store.add_prefix("ex", EX);
        let t = Triple::new(id(&store, "a"), id(&store, "p"), id(&store, "b"));
        assert!(store.contains(&t, &ActiveGraphs::All).unwrap());
        assert_eq!(store.resolve_prefixed_uri("ex:b"), ex("b"));
    }
}
