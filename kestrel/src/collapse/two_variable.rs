/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Patterns with one fixed position.
//!
//! Rows come out sorted on the leading variable, the one with the lower
//! schema column, then on the trailing one. The store is asked for the pair
//! order matching that; when it has no index for it the reversed order is
//! fetched and re-sorted in memory.

use log::debug;
use shared::error::StoreError;
use shared::resource::{ResourceId, NULL_ID};
use shared::store::{ActiveGraphs, PairIter, PairOrder, TripleStore};
use shared::terms::{Position, TriplePattern};

use super::merge::{compare_pairs, intersect_sorted, SortedStream};
use super::{column_of, fixed_id};
use crate::accumulator::{
    Accumulator, AccumulatorHeader, MaterializedAccumulator, RowLayout, Schema, TupleIter,
    VirtualizingAccumulator,
};
use crate::context::ExecutionContext;
use crate::error::{EngineError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwoVariableGroup {
    lead: String,
    trail: String,
    patterns: Vec<TriplePattern>,
}

impl TwoVariableGroup {
    /// A pattern repeating its variable (`?x ex:p ?x`) gets `lead == trail`.
    pub fn new(pattern: TriplePattern, schema: &Schema) -> Result<Self> {
        let (lead, trail) = ordered_variables(&pattern, schema)?;
        Ok(Self { lead, trail, patterns: vec![pattern] })
    }

    pub fn variables(&self) -> (&str, &str) {
        (&self.lead, &self.trail)
    }

    pub fn patterns(&self) -> &[TriplePattern] {
        &self.patterns
    }

    /// Only patterns over the same two distinct variables are merged.
    pub fn accepts(&self, pattern: &TriplePattern, schema: &Schema) -> bool {
        self.lead != self.trail
            && ordered_variables(pattern, schema)
                .map_or(false, |(lead, trail)| lead == self.lead && trail == self.trail)
    }

    pub fn push(&mut self, pattern: TriplePattern, schema: &Schema) -> Result<()> {
        if !self.accepts(&pattern, schema) {
            return Err(EngineError::MalformedPattern(format!(
                "{} does not bind exactly ?{} and ?{}",
                pattern, self.lead, self.trail
            )));
        }
        self.patterns.push(pattern);
        Ok(())
    }

    pub fn evaluate<'a>(&self, store: &'a dyn TripleStore, graphs: &ActiveGraphs) -> Result<TwoVariableScan<'a>> {
        let mut sources = Vec::with_capacity(self.patterns.len());
        for pattern in &self.patterns {
            let (order, fixed_position) = pair_order(pattern, &self.lead, &self.trail)?;
            let Some(fixed) = fixed_id(store, pattern, fixed_position)? else {
                debug!("{} names an unknown term, group is empty", pattern);
                return Ok(self.scan(None));
            };
            sources.push(open_pairs(store, order, fixed, graphs)?);
        }
        Ok(self.scan(Some(sources)))
    }

    fn scan<'a>(&self, sources: Option<Vec<PairSource<'a>>>) -> TwoVariableScan<'a> {
        TwoVariableScan {
            lead: self.lead.clone(),
            trail: self.trail.clone(),
            sources,
        }
    }
}

/// The pattern's two variables, lower schema column first.
fn ordered_variables(pattern: &TriplePattern, schema: &Schema) -> Result<(String, String)> {
    let positions = pattern.variable_positions();
    if positions.len() != 2 {
        return Err(EngineError::MalformedPattern(format!(
            "two-variable group given {} with {} variable positions",
            pattern,
            positions.len()
        )));
    }
    let variables = pattern.variables();
    let (first, second) = match variables.as_slice() {
        [only] => (*only, *only),
        [first, second] => (*first, *second),
        _ => return Err(EngineError::MalformedPattern(pattern.to_string())),
    };
    if column_of(schema, second)? < column_of(schema, first)? {
        Ok((second.to_string(), first.to_string()))
    } else {
        Ok((first.to_string(), second.to_string()))
    }
}

/// Pair order that lists `lead` values first, plus the fixed position.
fn pair_order(pattern: &TriplePattern, lead: &str, trail: &str) -> Result<(PairOrder, Position)> {
    let positions = pattern.variable_positions();
    let (lead_position, trail_position) = match positions.as_slice() {
        [a, b] if lead == trail => (*a, *b),
        [a, b] if pattern.term(*a).variable() == Some(lead) => {
            debug_assert_eq!(pattern.term(*b).variable(), Some(trail));
            (*a, *b)
        }
        [a, b] => (*b, *a),
        _ => return Err(EngineError::MalformedPattern(pattern.to_string())),
    };
    let order = PairOrder::from_positions(lead_position, trail_position)
        .ok_or_else(|| EngineError::MalformedPattern(pattern.to_string()))?;
    Ok((order, order.fixed()))
}

fn open_pairs<'a>(
    store: &'a dyn TripleStore,
    order: PairOrder,
    fixed: ResourceId,
    graphs: &ActiveGraphs,
) -> Result<PairSource<'a>> {
    if store.supports_pair_order(order) {
        return Ok(PairSource::Native(store.pairs(order, fixed, graphs)?));
    }
    let reversed = order.reversed();
    debug!("no native {:?} enumeration, reading {:?} and re-sorting", order, reversed);
    Ok(PairSource::Reversed(store.pairs(reversed, fixed, graphs)?))
}

enum PairSource<'a> {
    Native(PairIter<'a>),
    /// Pairs in the opposite column order; swapped and sorted before use.
    Reversed(PairIter<'a>),
}

impl<'a> PairSource<'a> {
    fn into_sorted(self, ctx: &ExecutionContext) -> Result<SortedStream<'a, [ResourceId; 2]>> {
        match self {
            PairSource::Native(pairs) => Ok(pairs),
            PairSource::Reversed(pairs) => {
                let mut probe = ctx.probe();
                let mut swapped = Vec::new();
                for pair in pairs {
                    probe.tick()?;
                    let [a, b] = pair?;
                    swapped.push([b, a]);
                }
                swapped.sort_unstable_by(compare_pairs);
                Ok(Box::new(swapped.into_iter().map(Ok::<_, StoreError>)))
            }
        }
    }
}

pub struct TwoVariableScan<'a> {
    lead: String,
    trail: String,
    sources: Option<Vec<PairSource<'a>>>,
}

impl<'a> TwoVariableScan<'a> {
    /// A single pattern stays virtual; several are intersected into memory.
    pub fn build_accumulator(self, schema: &Schema, ctx: &ExecutionContext) -> Result<Accumulator<'a>> {
        let lead = column_of(schema, &self.lead)?;
        let trail = column_of(schema, &self.trail)?;
        let layout = RowLayout::new(schema.len(), [Some(lead), Some(trail), None]);

        let Some(mut sources) = self.sources else {
            let mut header = AccumulatorHeader::with_bound_columns(schema.clone(), &layout.bound_columns());
            header.set_sort_order(layout.bound_columns());
            return Ok(MaterializedAccumulator::new(header).into());
        };

        if sources.len() == 1 {
            if let Some(source) = sources.pop() {
                let tuples: TupleIter<'a> = Box::new(
                    source
                        .into_sorted(ctx)?
                        .map(|pair| pair.map(|[a, b]| [a, b, NULL_ID])),
                );
                return Ok(VirtualizingAccumulator::new(schema.clone(), layout, tuples).into());
            }
        }

        let source_count = sources.len();
        let streams = sources
            .into_iter()
            .map(|source| source.into_sorted(ctx))
            .collect::<Result<Vec<_>>>()?;
        let mut header = AccumulatorHeader::with_bound_columns(schema.clone(), &layout.bound_columns());
        header.set_sort_order(layout.bound_columns());
        let mut acc = MaterializedAccumulator::new(header);
        for [a, b] in intersect_sorted(streams, ctx)? {
            if let Some(row) = layout.build([a, b, NULL_ID]) {
                acc.add_row(row);
            }
        }
        debug!(
            "(?{}, ?{}): merged {} pair enumerations into {} rows",
            self.lead,
            self.trail,
            source_count,
            acc.len()
        );
        Ok(acc.into())
    }
}
