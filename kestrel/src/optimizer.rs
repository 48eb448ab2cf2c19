/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Predicate-selectivity ordering of triple patterns.
//!
//! A pattern's weight is the product of one factor per position. Patterns
//! are evaluated in ascending weight order; ties keep their input order so
//! the same input always gives the same plan.

use log::debug;
use rustc_hash::FxHashSet;
use shared::store::{PredicateCounts, PredicateStatistics};
use shared::terms::{Constant, PatternTerm, TriplePattern};

use crate::config::OptimizerConfig;

pub struct QueryOptimizer<'s> {
    config: OptimizerConfig,
    statistics: Option<&'s dyn PredicateStatistics>,
}

/// Outcome of looking up the predicate of a pattern.
enum PredicateInfo {
    Variable,
    /// Bound, with statistics.
    Counted(PredicateCounts),
    /// Bound, but nothing is known about it.
    Unknown,
    /// Bound, and the statistics say it does not occur.
    Absent,
}

impl<'s> QueryOptimizer<'s> {
    pub fn new(config: OptimizerConfig, statistics: Option<&'s dyn PredicateStatistics>) -> Self {
        Self { config, statistics }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn optimize(&self, patterns: &[TriplePattern]) -> Vec<TriplePattern> {
        let ordered = if self.config.binding_aware {
            self.order_greedily(patterns)
        } else {
            self.order_independently(patterns)
        };
        debug!(
            "optimized pattern order: [{}]",
            ordered
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" . ")
        );
        ordered
    }

    /// Weight of a pattern considered on its own.
    pub fn pattern_weight(&self, pattern: &TriplePattern) -> f64 {
        self.weight(pattern, &FxHashSet::default())
    }

    fn order_independently(&self, patterns: &[TriplePattern]) -> Vec<TriplePattern> {
        let mut weighted: Vec<(f64, &TriplePattern)> = patterns
            .iter()
            .map(|pattern| (self.pattern_weight(pattern), pattern))
            .collect();
        weighted.sort_by(|a, b| a.0.total_cmp(&b.0));
        weighted.into_iter().map(|(_, pattern)| pattern.clone()).collect()
    }

    /// Picks the lightest remaining pattern, treating variables of already
    /// picked patterns as bound.
    fn order_greedily(&self, patterns: &[TriplePattern]) -> Vec<TriplePattern> {
        let mut remaining: Vec<&TriplePattern> = patterns.iter().collect();
        let mut bound: FxHashSet<&str> = FxHashSet::default();
        let mut ordered = Vec::with_capacity(patterns.len());
        while !remaining.is_empty() {
            let mut best = 0;
            let mut best_weight = f64::INFINITY;
            for (index, pattern) in remaining.iter().enumerate() {
                let weight = self.weight(pattern, &bound);
                if weight.total_cmp(&best_weight).is_lt() {
                    best = index;
                    best_weight = weight;
                }
            }
            let picked = remaining.remove(best);
            bound.extend(picked.variables());
            ordered.push(picked.clone());
        }
        ordered
    }

    fn weight(&self, pattern: &TriplePattern, bound: &FxHashSet<&str>) -> f64 {
        if pattern.variable_positions().is_empty() {
            return 0.0;
        }
        let is_bound = |term: &PatternTerm| match term.variable() {
            Some(variable) => bound.contains(variable),
            None => true,
        };

        let predicate = self.predicate_info(&pattern.predicate, bound);
        let predicate_weight = match &predicate {
            PredicateInfo::Variable => self.config.variable_weight,
            PredicateInfo::Counted(counts) => match self.statistics.map(|s| s.total_triple_count()) {
                Some(total) if total > 0 => counts.triple_count as f64 / total as f64,
                _ => 0.0,
            },
            PredicateInfo::Unknown => self.config.predicate_weight,
            PredicateInfo::Absent => 0.0,
        };

        let subject_weight = if !is_bound(&pattern.subject) {
            self.config.variable_weight
        } else {
            match &predicate {
                PredicateInfo::Counted(counts) => inverse(counts.subject_predicate_count),
                _ => self.config.subject_weight,
            }
        };

        let object_weight = if !is_bound(&pattern.object) {
            self.config.variable_weight
        } else {
            match &predicate {
                PredicateInfo::Counted(counts) => inverse(counts.predicate_object_count),
                _ => self.config.object_weight,
            }
        };

        subject_weight * predicate_weight * object_weight
    }

    fn predicate_info(&self, predicate: &PatternTerm, bound: &FxHashSet<&str>) -> PredicateInfo {
        match predicate {
            PatternTerm::Variable(name) if bound.contains(name.as_str()) => PredicateInfo::Unknown,
            PatternTerm::Variable(_) => PredicateInfo::Variable,
            PatternTerm::Constant(Constant::Uri(uri)) => match self.statistics {
                Some(statistics) => match statistics.predicate_counts(uri) {
                    Some(counts) => PredicateInfo::Counted(counts),
                    None => PredicateInfo::Absent,
                },
                None => PredicateInfo::Unknown,
            },
            // Only URIs can sit in predicate position of a stored triple.
            PatternTerm::Constant(_) => PredicateInfo::Absent,
        }
    }
}

fn inverse(count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        1.0 / count as f64
    }
}
