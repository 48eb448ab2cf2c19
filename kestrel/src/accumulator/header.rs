/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::sync::Arc;

/// Full output column schema, shared by every accumulator of one evaluation.
pub type Schema = Arc<[String]>;

pub fn schema<I, S>(variables: I) -> Schema
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    variables.into_iter().map(Into::into).collect()
}

/// Accumulator metadata: schema, which columns are bound in every row, and
/// the columns the rows are currently sorted on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccumulatorHeader {
    columns: Schema,
    is_bound: Vec<bool>,
    sort_order: Vec<usize>,
}

impl AccumulatorHeader {
    pub fn new(columns: Schema, bound_variables: &[&str]) -> Self {
        let is_bound = columns
            .iter()
            .map(|column| bound_variables.contains(&column.as_str()))
            .collect();
        Self { columns, is_bound, sort_order: Vec::new() }
    }

    pub fn with_bound_columns(columns: Schema, bound_columns: &[usize]) -> Self {
        let mut is_bound = vec![false; columns.len()];
        for &column in bound_columns {
            is_bound[column] = true;
        }
        Self { columns, is_bound, sort_order: Vec::new() }
    }

    /// Header of `outer ⋈ inner`: bound flags unioned, sort order taken from `outer`.
    pub fn joined(outer: &Self, inner: &Self) -> Self {
        debug_assert_eq!(outer.columns, inner.columns, "joined accumulators must share a schema");
        let is_bound = outer
            .is_bound
            .iter()
            .zip(&inner.is_bound)
            .map(|(&a, &b)| a || b)
            .collect();
        Self {
            columns: outer.columns.clone(),
            is_bound,
            sort_order: outer.sort_order.clone(),
        }
    }

    /// Same schema and bindings, no sort order.
    pub fn empty_copy(&self) -> Self {
        Self {
            columns: self.columns.clone(),
            is_bound: self.is_bound.clone(),
            sort_order: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn schema(&self) -> &Schema {
        &self.columns
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, variable: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == variable)
    }

    pub fn is_bound(&self, column: usize) -> bool {
        self.is_bound.get(column).copied().unwrap_or(false)
    }

    pub fn bound_columns(&self) -> Vec<usize> {
        self.is_bound
            .iter()
            .enumerate()
            .filter_map(|(column, &bound)| bound.then_some(column))
            .collect()
    }

    pub fn bound_variables(&self) -> Vec<&str> {
        self.bound_columns()
            .into_iter()
            .map(|column| self.columns[column].as_str())
            .collect()
    }

    pub fn highest_bound_column_index(&self) -> Option<usize> {
        self.is_bound.iter().rposition(|&bound| bound)
    }

    /// Columns bound on both sides, ascending.
    pub fn shared_bound_columns(&self, other: &Self) -> Vec<usize> {
        self.is_bound
            .iter()
            .zip(&other.is_bound)
            .enumerate()
            .filter_map(|(column, (&a, &b))| (a && b).then_some(column))
            .collect()
    }

    pub fn shares_bound_column(&self, other: &Self) -> bool {
        self.is_bound
            .iter()
            .zip(&other.is_bound)
            .any(|(&a, &b)| a && b)
    }

    pub fn sort_order(&self) -> &[usize] {
        &self.sort_order
    }

    pub fn set_sort_order(&mut self, sort_order: Vec<usize>) {
        self.sort_order = sort_order;
    }

    /// Column indices of the target variables bound here, in target order.
    pub fn sort_key(&self, target_variables: &[&str]) -> Vec<usize> {
        let mut key = Vec::with_capacity(target_variables.len());
        for variable in target_variables {
            if let Some(column) = self.column_index(variable) {
                if self.is_bound[column] && !key.contains(&column) {
                    key.push(column);
                }
            }
        }
        key
    }

    /// Rows sorted on `sort_order` are also sorted on any prefix of it.
    pub fn is_sorted_on(&self, key: &[usize]) -> bool {
        self.sort_order.starts_with(key)
    }
}
