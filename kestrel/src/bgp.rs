/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Evaluation of a whole basic graph pattern.
//!
//! Patterns are reordered by the optimizer, collapsed into groups, each group
//! is scanned into an accumulator, and the accumulators are folded together
//! with pairwise joins. Joins that share a bound column are preferred; a
//! cross product only happens when nothing left overlaps the running result.

use log::{debug, warn};
use rustc_hash::FxHashMap;
use shared::store::{ActiveGraphs, PredicateStatistics, TripleStore};
use shared::terms::TriplePattern;

use crate::accumulator::{schema, Accumulator, AccumulatorHeader, MaterializedAccumulator, Schema};
use crate::collapse::classify;
use crate::config::OptimizerConfig;
use crate::context::ExecutionContext;
use crate::error::Result;
use crate::multiset::Multiset;
use crate::optimizer::QueryOptimizer;

pub struct BgpEvaluator<'a> {
    store: &'a dyn TripleStore,
    statistics: Option<&'a dyn PredicateStatistics>,
    config: OptimizerConfig,
    context: ExecutionContext,
}

impl<'a> BgpEvaluator<'a> {
    pub fn new(
        store: &'a dyn TripleStore,
        statistics: Option<&'a dyn PredicateStatistics>,
        config: OptimizerConfig,
    ) -> Self {
        if let Err(err) = config.validate() {
            warn!("optimizer weights used as given, plans may be poor: {}", err);
        }
        Self {
            store,
            statistics,
            config,
            context: ExecutionContext::default(),
        }
    }

    /// Evaluator with default weights and no statistics.
    pub fn with_store(store: &'a dyn TripleStore) -> Self {
        Self::new(store, None, OptimizerConfig::default())
    }

    pub fn with_context(mut self, context: ExecutionContext) -> Self {
        self.context = context;
        self
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    pub fn evaluate(&self, patterns: &[TriplePattern], graphs: &ActiveGraphs) -> Result<Multiset> {
        let accumulator = self.evaluate_accumulator(patterns, graphs)?;
        accumulator.to_multiset(self.store, &self.context)
    }

    /// Same as [`evaluate`](Self::evaluate), restricted to the named graphs.
    pub fn evaluate_in_graphs(&self, patterns: &[TriplePattern], graph_uris: &[&str]) -> Result<Multiset> {
        let graphs = ActiveGraphs::resolve(self.store, graph_uris)?;
        self.evaluate(patterns, &graphs)
    }

    /// Runs the pattern through to a single accumulator without resolving ids.
    pub fn evaluate_accumulator(
        &self,
        patterns: &[TriplePattern],
        graphs: &ActiveGraphs,
    ) -> Result<Accumulator<'a>> {
        self.context.check()?;
        if patterns.is_empty() {
            let mut unit = MaterializedAccumulator::new(AccumulatorHeader::new(schema(Vec::<String>::new()), &[]));
            unit.add_row(Vec::new());
            return Ok(unit.into());
        }

        let optimizer = QueryOptimizer::new(self.config, self.statistics);
        let ordered = optimizer.optimize(patterns);
        let schema = build_schema(&ordered);
        debug!("schema: {:?}", schema);
        let groups = classify(&ordered, &schema)?;

        let mut accumulators = Vec::with_capacity(groups.len());
        for group in &groups {
            let accumulator = group
                .evaluate(self.store, graphs)?
                .build_accumulator(&schema, &self.context)?;
            if accumulator.is_known_empty() {
                debug!("group of {} patterns has no rows, result is empty", group.patterns().len());
                return Ok(empty_result(&schema));
            }
            accumulators.push(accumulator);
        }
        self.join_all(accumulators, &schema)
    }

    fn join_all(&self, mut pending: Vec<Accumulator<'a>>, schema: &Schema) -> Result<Accumulator<'a>> {
        if pending.is_empty() {
            return Ok(empty_result(schema));
        }
        let mut result = pending.remove(0);
        while !pending.is_empty() {
            self.context.check()?;
            let next = pending
                .iter()
                .position(|candidate| candidate.header().shares_bound_column(result.header()))
                .unwrap_or(0);
            let inner = pending.remove(next);
            debug!(
                "joining {:?} with {:?}",
                result.header().bound_variables(),
                inner.header().bound_variables()
            );
            result = result.join(inner, &self.context)?;
            if result.is_known_empty() {
                debug!("intermediate result is empty, skipping {} remaining groups", pending.len());
                return Ok(empty_result(schema));
            }
        }
        Ok(result)
    }
}

/// Every schema variable bound, no rows.
fn empty_result<'a>(schema: &Schema) -> Accumulator<'a> {
    let columns: Vec<usize> = (0..schema.len()).collect();
    MaterializedAccumulator::new(AccumulatorHeader::with_bound_columns(schema.clone(), &columns)).into()
}

/// Output columns: most frequently mentioned variables first, ties broken by
/// first appearance.
pub fn build_schema(patterns: &[TriplePattern]) -> Schema {
    let mut order: Vec<&str> = Vec::new();
    let mut mentions: FxHashMap<&str, usize> = FxHashMap::default();
    for pattern in patterns {
        for variable in pattern.variables() {
            let count = mentions.entry(variable).or_insert(0);
            if *count == 0 {
                order.push(variable);
            }
            *count += 1;
        }
    }
    order.sort_by(|a, b| mentions[b].cmp(&mentions[a]));
    order.into_iter().map(str::to_string).collect()
}
