/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::BTreeMap;
use std::fmt;

use log::debug;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use shared::error::StoreError;
use shared::resource::{ResourceId, NULL_ID};
use shared::store::TripleStore;

use crate::accumulator::Accumulator;
use crate::context::ExecutionContext;
use crate::error::Result;

/// A resolved RDF term.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Node {
    Uri(String),
    Literal {
        value: String,
        datatype: Option<String>,
        language: Option<String>,
    },
}

impl Node {
    pub fn uri(value: impl Into<String>) -> Self {
        Node::Uri(value.into())
    }

    pub fn plain_literal(value: impl Into<String>) -> Self {
        Node::Literal { value: value.into(), datatype: None, language: None }
    }

    /// Lexical form: the URI itself or the literal value.
    pub fn lexical(&self) -> &str {
        match self {
            Node::Uri(uri) => uri,
            Node::Literal { value, .. } => value,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Uri(uri) => write!(f, "<{}>", uri),
            Node::Literal { value, language: Some(language), .. } => write!(f, "\"{}\"@{}", value, language),
            Node::Literal { value, datatype: Some(datatype), .. } => write!(f, "\"{}\"^^<{}>", value, datatype),
            Node::Literal { value, .. } => write!(f, "\"{}\"", value),
        }
    }
}

/// One binding row: variable name to term.
pub type Solution = BTreeMap<String, Node>;

/// Bag of solutions handed to the surrounding algebra.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Multiset {
    variables: Vec<String>,
    solutions: Vec<Solution>,
}

impl Multiset {
    pub fn new(variables: Vec<String>, solutions: Vec<Solution>) -> Self {
        Self { variables, solutions }
    }

    /// Converts the rows of `accumulator`, resolving each id once.
    pub fn from_accumulator<S: TripleStore + ?Sized>(
        accumulator: Accumulator<'_>,
        store: &S,
        ctx: &ExecutionContext,
    ) -> Result<Self> {
        let header = accumulator.header().clone();
        let bound: Vec<(usize, String)> = header
            .bound_columns()
            .into_iter()
            .map(|column| (column, header.columns()[column].clone()))
            .collect();

        let mut resolver = NodeResolver::new(store);
        let mut probe = ctx.probe();
        let mut solutions = Vec::new();
        for row in accumulator.into_rows() {
            let row = row?;
            probe.tick()?;
            let mut solution = Solution::new();
            for (column, variable) in &bound {
                let id = row[*column];
                if id != NULL_ID {
                    solution.insert(variable.clone(), resolver.resolve(id)?);
                }
            }
            solutions.push(solution);
        }
        debug!(
            "resolved {} solutions over {} variables ({} distinct terms)",
            solutions.len(),
            bound.len(),
            resolver.cache.len()
        );
        Ok(Self {
            variables: bound.into_iter().map(|(_, variable)| variable).collect(),
            solutions,
        })
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn solutions(&self) -> &[Solution] {
        &self.solutions
    }

    pub fn into_solutions(self) -> Vec<Solution> {
        self.solutions
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Solution> {
        self.solutions.iter()
    }
}

impl<'m> IntoIterator for &'m Multiset {
    type Item = &'m Solution;
    type IntoIter = std::slice::Iter<'m, Solution>;

    fn into_iter(self) -> Self::IntoIter {
        self.solutions.iter()
    }
}

struct NodeResolver<'s, S: ?Sized> {
    store: &'s S,
    cache: FxHashMap<ResourceId, Node>,
}

impl<'s, S: TripleStore + ?Sized> NodeResolver<'s, S> {
    fn new(store: &'s S) -> Self {
        Self { store, cache: FxHashMap::default() }
    }

    fn resolve(&mut self, id: ResourceId) -> Result<Node> {
        if let Some(node) = self.cache.get(&id) {
            return Ok(node.clone());
        }
        let resource = self.store.resolve(id)?.ok_or(StoreError::UnknownResource(id))?;
        let node = if resource.is_literal {
            let datatype = if resource.datatype == NULL_ID {
                None
            } else {
                let datatype = self
                    .store
                    .resolve(resource.datatype)?
                    .ok_or(StoreError::UnknownResource(resource.datatype))?;
                Some(self.store.resolve_prefixed_uri(&datatype.lexical))
            };
            Node::Literal {
                value: resource.lexical,
                datatype,
                language: resource.language,
            }
        } else {
            Node::Uri(self.store.resolve_prefixed_uri(&resource.lexical))
        };
        self.cache.insert(id, node.clone());
        Ok(node)
    }
}
