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
use shared::resource::{ResourceId, NULL_ID};
use shared::store::{ActiveGraphs, IdIter, TripleStore};
use shared::terms::{Position, TriplePattern};

use super::merge::intersect_sorted;
use super::{column_of, fixed_id};
use crate::accumulator::{Accumulator, AccumulatorHeader, MaterializedAccumulator, Schema};
use crate::context::ExecutionContext;
use crate::error::{EngineError, Result};

/// Patterns with two fixed positions that all bind the same variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneVariableGroup {
    variable: String,
    patterns: Vec<TriplePattern>,
}

impl OneVariableGroup {
    pub fn new(pattern: TriplePattern) -> Result<Self> {
        let variable = single_variable(&pattern)?.to_string();
        Ok(Self { variable, patterns: vec![pattern] })
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn patterns(&self) -> &[TriplePattern] {
        &self.patterns
    }

    pub fn accepts(&self, pattern: &TriplePattern) -> bool {
        single_variable(pattern).map_or(false, |variable| variable == self.variable)
    }

    pub fn push(&mut self, pattern: TriplePattern) -> Result<()> {
        if !self.accepts(&pattern) {
            return Err(EngineError::MalformedPattern(format!(
                "{} does not bind ?{} alone",
                pattern, self.variable
            )));
        }
        self.patterns.push(pattern);
        Ok(())
    }

    /// Opens one ascending id enumeration per pattern.
    pub fn evaluate<'a>(&self, store: &'a dyn TripleStore, graphs: &ActiveGraphs) -> Result<OneVariableScan<'a>> {
        let mut streams = Vec::with_capacity(self.patterns.len());
        for pattern in &self.patterns {
            let mut fixed: [Option<ResourceId>; 3] = [None; 3];
            for (slot, position) in Position::ALL.into_iter().enumerate() {
                if pattern.term(position).is_var() {
                    continue;
                }
                match fixed_id(store, pattern, position)? {
                    Some(id) => fixed[slot] = Some(id),
                    None => {
                        debug!("{} names an unknown term, ?{} has no match", pattern, self.variable);
                        return Ok(OneVariableScan { variable: self.variable.clone(), streams: None });
                    }
                }
            }
            streams.push(store.match_ids(fixed[0], fixed[1], fixed[2], graphs)?);
        }
        Ok(OneVariableScan { variable: self.variable.clone(), streams: Some(streams) })
    }
}

fn single_variable(pattern: &TriplePattern) -> Result<&str> {
    match pattern.variable_positions().as_slice() {
        [position] => pattern
            .term(*position)
            .variable()
            .ok_or_else(|| EngineError::MalformedPattern(pattern.to_string())),
        positions => Err(EngineError::MalformedPattern(format!(
            "one-variable group given {} with {} variable positions",
            pattern,
            positions.len()
        ))),
    }
}

/// Opened enumerations of a one-variable group. `None` when a pattern can never match.
pub struct OneVariableScan<'a> {
    variable: String,
    streams: Option<Vec<IdIter<'a>>>,
}

impl<'a> OneVariableScan<'a> {
    pub fn build_accumulator(self, schema: &Schema, ctx: &ExecutionContext) -> Result<Accumulator<'a>> {
        let column = column_of(schema, &self.variable)?;
        let mut header = AccumulatorHeader::with_bound_columns(schema.clone(), &[column]);
        header.set_sort_order(vec![column]);
        let mut acc = MaterializedAccumulator::new(header);

        let Some(streams) = self.streams else {
            return Ok(acc.into());
        };
        let stream_count = streams.len();
        for id in intersect_sorted(streams, ctx)? {
            let mut row = vec![NULL_ID; schema.len()];
            row[column] = id;
            acc.add_row(row);
        }
        debug!(
            "?{}: intersected {} enumerations into {} rows",
            self.variable,
            stream_count,
            acc.len()
        );
        Ok(acc.into())
    }
}
