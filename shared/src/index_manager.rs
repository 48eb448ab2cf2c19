/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::BTreeSet;
use std::ops::Bound;

use rayon::prelude::*;

use crate::resource::ResourceId;
use crate::triple::{Quad, Triple};

/// Index key: the three triple positions in permutation order, then the graph.
pub type IndexKey = [ResourceId; 4];

/// The six orderings of (subject, predicate, object).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permutation {
    Spo,
    Pos,
    Osp,
    Pso,
    Ops,
    Sop,
}

impl Permutation {
    pub const ALL: [Permutation; 6] = [
        Permutation::Spo,
        Permutation::Pos,
        Permutation::Osp,
        Permutation::Pso,
        Permutation::Ops,
        Permutation::Sop,
    ];

    pub fn key(self, quad: &Quad) -> IndexKey {
        let Triple { subject: s, predicate: p, object: o } = quad.triple;
        let g = quad.graph;
        match self {
            Permutation::Spo => [s, p, o, g],
            Permutation::Pos => [p, o, s, g],
            Permutation::Osp => [o, s, p, g],
            Permutation::Pso => [p, s, o, g],
            Permutation::Ops => [o, p, s, g],
            Permutation::Sop => [s, o, p, g],
        }
    }

    /// Inverse of [`Permutation::key`].
    pub fn quad(self, key: &IndexKey) -> Quad {
        let [a, b, c, graph] = *key;
        let (subject, predicate, object) = match self {
            Permutation::Spo => (a, b, c),
            Permutation::Pos => (c, a, b),
            Permutation::Osp => (b, c, a),
            Permutation::Pso => (b, a, c),
            Permutation::Ops => (c, b, a),
            Permutation::Sop => (a, c, b),
        };
        Quad { triple: Triple { subject, predicate, object }, graph }
    }

    fn slot(self) -> usize {
        match self {
            Permutation::Spo => 0,
            Permutation::Pos => 1,
            Permutation::Osp => 2,
            Permutation::Pso => 3,
            Permutation::Ops => 4,
            Permutation::Sop => 5,
        }
    }
}

/// Six sorted permutation indexes over quads. Every range scan yields keys in
/// ascending lexicographic order, which is what the query core merges on.
#[derive(Debug, Clone, Default)]
pub struct QuadIndex {
    indexes: [BTreeSet<IndexKey>; 6],
}

impl QuadIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.indexes[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes[0].is_empty()
    }

    /// Insert a single quad into all six indexes
    pub fn insert(&mut self, quad: &Quad) -> bool {
        if !self.indexes[0].insert(Permutation::Spo.key(quad)) {
            return false; // quad already stored
        }
        for perm in &Permutation::ALL[1..] {
            self.indexes[perm.slot()].insert(perm.key(quad));
        }
        true
    }

    /// Delete a single quad from all six indexes
    pub fn delete(&mut self, quad: &Quad) -> bool {
        if !self.indexes[0].remove(&Permutation::Spo.key(quad)) {
            return false;
        }
        for perm in &Permutation::ALL[1..] {
            self.indexes[perm.slot()].remove(&perm.key(quad));
        }
        true
    }

    /// Bulk-build the index from a list of quads, one permutation per rayon task
    pub fn build_from_quads(&mut self, quads: &[Quad]) {
        let built: Vec<BTreeSet<IndexKey>> = Permutation::ALL
            .par_iter()
            .map(|perm| {
                let mut keys: Vec<IndexKey> = quads.iter().map(|q| perm.key(q)).collect();
                keys.par_sort_unstable();
                keys.dedup();
                // Sorted input lets BTreeSet bulk-load
                keys.into_iter().collect()
            })
            .collect();

        for (slot, set) in built.into_iter().enumerate() {
            self.indexes[slot] = set;
        }
    }

    pub fn clear(&mut self) {
        for index in self.indexes.iter_mut() {
            index.clear();
        }
    }

    /// All keys of `perm` starting with `prefix` (at most three components), ascending.
    pub fn scan_prefix(
        &self,
        perm: Permutation,
        prefix: &[ResourceId],
    ) -> impl Iterator<Item = &IndexKey> + '_ {
        debug_assert!(prefix.len() <= 3, "prefix longer than a triple");
        let mut lower = [ResourceId::MIN; 4];
        let mut upper = [ResourceId::MAX; 4];
        lower[..prefix.len()].copy_from_slice(prefix);
        upper[..prefix.len()].copy_from_slice(prefix);
        self.indexes[perm.slot()].range((Bound::Included(lower), Bound::Included(upper)))
    }

    pub fn iter(&self, perm: Permutation) -> impl Iterator<Item = &IndexKey> + '_ {
        self.indexes[perm.slot()].iter()
    }
}
