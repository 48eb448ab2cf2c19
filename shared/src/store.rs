/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Contracts between the query core and the storage layer.
//!
//! Every enumeration handed out by a [`TripleStore`] is sorted ascending on
//! its leading column (and lexicographically on the remaining ones). The merge
//! join and the N-way intersections in the query core rely on that ordering.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::resource::{ResolvedResource, ResourceId};
use crate::terms::{Constant, Position};
use crate::triple::Triple;

pub type IdIter<'a> = Box<dyn Iterator<Item = Result<ResourceId, StoreError>> + 'a>;
pub type PairIter<'a> = Box<dyn Iterator<Item = Result<[ResourceId; 2], StoreError>> + 'a>;
pub type TripleIter<'a> = Box<dyn Iterator<Item = Result<Triple, StoreError>> + 'a>;

/// The set of graphs a pattern is matched against.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActiveGraphs {
    #[default]
    All,
    Only(Vec<ResourceId>),
}

impl ActiveGraphs {
    pub fn contains(&self, graph: ResourceId) -> bool {
        match self {
            ActiveGraphs::All => true,
            ActiveGraphs::Only(graphs) => graphs.contains(&graph),
        }
    }

    /// Resolves graph URIs against the store. URIs the store does not know are dropped,
    /// so a list of unknown graphs matches nothing rather than everything.
    pub fn resolve<S: TripleStore + ?Sized>(store: &S, graph_uris: &[&str]) -> Result<Self, StoreError> {
        let mut ids = Vec::with_capacity(graph_uris.len());
        for uri in graph_uris {
            if let Some(id) = store.lookup_graph(uri)? {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        ids.dedup();
        Ok(ActiveGraphs::Only(ids))
    }
}

/// Column order of a two-column enumeration. The position missing from the
/// name is the fixed one: `PredicateObject` enumerates `(p, o)` pairs for a fixed subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PairOrder {
    PredicateObject,
    ObjectPredicate,
    SubjectObject,
    ObjectSubject,
    SubjectPredicate,
    PredicateSubject,
}

impl PairOrder {
    pub fn from_positions(leading: Position, trailing: Position) -> Option<Self> {
        use Position::*;
        match (leading, trailing) {
            (Predicate, Object) => Some(PairOrder::PredicateObject),
            (Object, Predicate) => Some(PairOrder::ObjectPredicate),
            (Subject, Object) => Some(PairOrder::SubjectObject),
            (Object, Subject) => Some(PairOrder::ObjectSubject),
            (Subject, Predicate) => Some(PairOrder::SubjectPredicate),
            (Predicate, Subject) => Some(PairOrder::PredicateSubject),
            _ => None,
        }
    }

    pub fn positions(self) -> (Position, Position) {
        use Position::*;
        match self {
            PairOrder::PredicateObject => (Predicate, Object),
            PairOrder::ObjectPredicate => (Object, Predicate),
            PairOrder::SubjectObject => (Subject, Object),
            PairOrder::ObjectSubject => (Object, Subject),
            PairOrder::SubjectPredicate => (Subject, Predicate),
            PairOrder::PredicateSubject => (Predicate, Subject),
        }
    }

    pub fn fixed(self) -> Position {
        match self {
            PairOrder::PredicateObject | PairOrder::ObjectPredicate => Position::Subject,
            PairOrder::SubjectObject | PairOrder::ObjectSubject => Position::Predicate,
            PairOrder::SubjectPredicate | PairOrder::PredicateSubject => Position::Object,
        }
    }

    pub fn reversed(self) -> Self {
        let (leading, trailing) = self.positions();
        match Self::from_positions(trailing, leading) {
            Some(order) => order,
            None => self,
        }
    }
}

/// Read access to an indexed triple store.
pub trait TripleStore {
    /// Resolves a query constant to its resource id, without inserting it.
    fn lookup(&self, constant: &Constant) -> Result<Option<ResourceId>, StoreError>;

    fn lookup_graph(&self, graph_uri: &str) -> Result<Option<ResourceId>, StoreError>;

    /// Ascending ids filling the single open position. Exactly one argument is `None`.
    fn match_ids<'a>(
        &'a self,
        subject: Option<ResourceId>,
        predicate: Option<ResourceId>,
        object: Option<ResourceId>,
        graphs: &ActiveGraphs,
    ) -> Result<IdIter<'a>, StoreError>;

    /// Pairs for the two open positions, sorted lexicographically in `order`.
    fn pairs<'a>(
        &'a self,
        order: PairOrder,
        fixed: ResourceId,
        graphs: &ActiveGraphs,
    ) -> Result<PairIter<'a>, StoreError>;

    /// Whether `pairs` can serve `order` from an index. Callers fall back to
    /// the reversed order and sort in memory otherwise.
    fn supports_pair_order(&self, _order: PairOrder) -> bool {
        true
    }

    /// Every triple in the active graphs, sorted by predicate, subject, object.
    fn all_triples<'a>(&'a self, graphs: &ActiveGraphs) -> Result<TripleIter<'a>, StoreError>;

    fn contains(&self, triple: &Triple, graphs: &ActiveGraphs) -> Result<bool, StoreError>;

    fn resolve(&self, id: ResourceId) -> Result<Option<ResolvedResource>, StoreError>;

    fn resolve_prefixed_uri(&self, value: &str) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PredicateCounts {
    pub triple_count: u64,
    /// Distinct subjects using the predicate.
    pub subject_predicate_count: u64,
    /// Distinct objects used with the predicate.
    pub predicate_object_count: u64,
}

/// Per-predicate statistics consulted by the pattern optimizer.
pub trait PredicateStatistics {
    fn predicate_counts(&self, predicate_uri: &str) -> Option<PredicateCounts>;

    fn total_triple_count(&self) -> u64;
}
