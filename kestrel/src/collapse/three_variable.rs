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
use shared::store::{ActiveGraphs, TripleIter, TripleStore};
use shared::terms::{PatternTerm, TriplePattern};

use super::column_of;
use crate::accumulator::{Accumulator, RowLayout, Schema, TupleIter, VirtualizingAccumulator};
use crate::error::{EngineError, Result};

/// `?s ?p ?o`: a full scan of the active graphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreeVariableGroup {
    pattern: TriplePattern,
}

impl ThreeVariableGroup {
    pub fn new(pattern: TriplePattern) -> Result<Self> {
        if pattern.variable_positions().len() != 3 {
            return Err(EngineError::MalformedPattern(format!(
                "full scan given {} which has fixed positions",
                pattern
            )));
        }
        Ok(Self { pattern })
    }

    pub fn pattern(&self) -> &TriplePattern {
        &self.pattern
    }

    pub fn evaluate<'a>(&self, store: &'a dyn TripleStore, graphs: &ActiveGraphs) -> Result<ThreeVariableScan<'a>> {
        debug!("{} falls back to a full store scan", self.pattern);
        Ok(ThreeVariableScan {
            pattern: self.pattern.clone(),
            triples: store.all_triples(graphs)?,
        })
    }
}

pub struct ThreeVariableScan<'a> {
    pattern: TriplePattern,
    triples: TripleIter<'a>,
}

impl<'a> ThreeVariableScan<'a> {
    /// Store order is (predicate, subject, object); the layout follows it.
    pub fn build_accumulator(self, schema: &Schema) -> Result<Accumulator<'a>> {
        let column = |term: &PatternTerm| -> Result<Option<usize>> {
            match term.variable() {
                Some(variable) => column_of(schema, variable).map(Some),
                None => Err(EngineError::MalformedPattern(self.pattern.to_string())),
            }
        };
        let layout = RowLayout::new(
            schema.len(),
            [
                column(&self.pattern.predicate)?,
                column(&self.pattern.subject)?,
                column(&self.pattern.object)?,
            ],
        );
        let tuples: TupleIter<'a> = Box::new(
            self.triples
                .map(|triple| triple.map(|t| [t.predicate, t.subject, t.object])),
        );
        Ok(VirtualizingAccumulator::new(schema.clone(), layout, tuples).into())
    }
}
