/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Collapse groups: triple patterns grouped by how many positions they leave
//! open, each group turned into one accumulator by a dedicated store scan.

pub mod existence;
pub mod merge;
pub mod one_variable;
pub mod three_variable;
pub mod two_variable;

use log::debug;
use shared::resource::ResourceId;
use shared::store::{ActiveGraphs, TripleStore};
use shared::terms::{PatternTerm, Position, TriplePattern};

use crate::accumulator::{Accumulator, Schema};
use crate::context::ExecutionContext;
use crate::error::{EngineError, Result};

pub use existence::{ExistenceCheck, ExistenceGroup};
pub use merge::{compare_pairs, intersect_sorted, SortedStream};
pub use one_variable::{OneVariableGroup, OneVariableScan};
pub use three_variable::{ThreeVariableGroup, ThreeVariableScan};
pub use two_variable::{TwoVariableGroup, TwoVariableScan};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollapseGroup {
    Existence(ExistenceGroup),
    OneVariable(OneVariableGroup),
    TwoVariable(TwoVariableGroup),
    ThreeVariable(ThreeVariableGroup),
}

impl CollapseGroup {
    pub fn patterns(&self) -> &[TriplePattern] {
        match self {
            CollapseGroup::Existence(group) => std::slice::from_ref(group.pattern()),
            CollapseGroup::OneVariable(group) => group.patterns(),
            CollapseGroup::TwoVariable(group) => group.patterns(),
            CollapseGroup::ThreeVariable(group) => std::slice::from_ref(group.pattern()),
        }
    }

    /// Opens the store enumerations. Nothing is pulled yet except for ground
    /// patterns, which are answered right away.
    pub fn evaluate<'a>(
        &self,
        store: &'a dyn TripleStore,
        graphs: &ActiveGraphs,
    ) -> Result<EvaluatedGroup<'a>> {
        Ok(match self {
            CollapseGroup::Existence(group) => EvaluatedGroup::Existence(group.evaluate(store, graphs)?),
            CollapseGroup::OneVariable(group) => EvaluatedGroup::OneVariable(group.evaluate(store, graphs)?),
            CollapseGroup::TwoVariable(group) => EvaluatedGroup::TwoVariable(group.evaluate(store, graphs)?),
            CollapseGroup::ThreeVariable(group) => {
                EvaluatedGroup::ThreeVariable(group.evaluate(store, graphs)?)
            }
        })
    }
}

pub enum EvaluatedGroup<'a> {
    Existence(ExistenceCheck),
    OneVariable(OneVariableScan<'a>),
    TwoVariable(TwoVariableScan<'a>),
    ThreeVariable(ThreeVariableScan<'a>),
}

impl<'a> EvaluatedGroup<'a> {
    /// Runs the scan or merge into an accumulator over the full schema.
    pub fn build_accumulator(self, schema: &Schema, ctx: &ExecutionContext) -> Result<Accumulator<'a>> {
        match self {
            EvaluatedGroup::Existence(check) => Ok(check.build_accumulator(schema)),
            EvaluatedGroup::OneVariable(scan) => scan.build_accumulator(schema, ctx),
            EvaluatedGroup::TwoVariable(scan) => scan.build_accumulator(schema, ctx),
            EvaluatedGroup::ThreeVariable(scan) => scan.build_accumulator(schema),
        }
    }
}

/// Partitions patterns into collapse groups, keeping first-appearance order.
///
/// One-variable patterns share a group when they bind the same variable;
/// two-variable patterns when they bind the same two distinct variables.
/// Patterns repeating a variable always stand alone.
pub fn classify(patterns: &[TriplePattern], schema: &Schema) -> Result<Vec<CollapseGroup>> {
    let mut groups: Vec<CollapseGroup> = Vec::new();
    for pattern in patterns {
        match pattern.variable_positions().len() {
            0 => groups.push(CollapseGroup::Existence(ExistenceGroup::new(pattern.clone())?)),
            1 => {
                let existing = groups.iter_mut().find_map(|group| match group {
                    CollapseGroup::OneVariable(g) if g.accepts(pattern) => Some(g),
                    _ => None,
                });
                match existing {
                    Some(group) => group.push(pattern.clone())?,
                    None => groups.push(CollapseGroup::OneVariable(OneVariableGroup::new(pattern.clone())?)),
                }
            }
            2 => {
                let existing = groups.iter_mut().find_map(|group| match group {
                    CollapseGroup::TwoVariable(g) if !pattern.repeats_variable() && g.accepts(pattern, schema) => {
                        Some(g)
                    }
                    _ => None,
                });
                match existing {
                    Some(group) => group.push(pattern.clone(), schema)?,
                    None => groups.push(CollapseGroup::TwoVariable(TwoVariableGroup::new(
                        pattern.clone(),
                        schema,
                    )?)),
                }
            }
            _ => groups.push(CollapseGroup::ThreeVariable(ThreeVariableGroup::new(pattern.clone())?)),
        }
    }
    debug!("{} patterns collapsed into {} groups", patterns.len(), groups.len());
    Ok(groups)
}

/// Schema column of `variable`.
pub(crate) fn column_of(schema: &Schema, variable: &str) -> Result<usize> {
    schema
        .iter()
        .position(|column| column == variable)
        .ok_or_else(|| EngineError::MalformedPattern(format!("?{} is not part of the schema", variable)))
}

/// Dictionary id of the constant at `position`. `None` when the store has never
/// seen it, in which case the pattern cannot match.
pub(crate) fn fixed_id(
    store: &dyn TripleStore,
    pattern: &TriplePattern,
    position: Position,
) -> Result<Option<ResourceId>> {
    match pattern.term(position) {
        PatternTerm::Constant(constant) => Ok(store.lookup(constant)?),
        PatternTerm::Variable(name) => Err(EngineError::MalformedPattern(format!(
            "expected a constant at {:?} of {}, found ?{}",
            position, pattern, name
        ))),
    }
}
