/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::cursor::ReplayCursor;
use super::header::AccumulatorHeader;
use super::row::{compare_on, Row};

/// Accumulator whose rows live in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedAccumulator {
    header: AccumulatorHeader,
    rows: Vec<Row>,
}

impl MaterializedAccumulator {
    pub fn new(header: AccumulatorHeader) -> Self {
        Self { header, rows: Vec::new() }
    }

    pub fn with_rows(header: AccumulatorHeader, rows: Vec<Row>) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == header.width()), "row width mismatch");
        Self { header, rows }
    }

    /// Same metadata as `other`, no rows and no sort order.
    pub fn like(other: &AccumulatorHeader) -> Self {
        Self::new(other.empty_copy())
    }

    pub fn header(&self) -> &AccumulatorHeader {
        &self.header
    }

    pub fn add_row(&mut self, row: Row) {
        debug_assert_eq!(row.len(), self.header.width(), "row width mismatch");
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Stable in-place sort on `key`, recorded as the new sort order.
    pub fn sort_on(&mut self, key: &[usize]) {
        self.rows.sort_by(|a, b| compare_on(a, b, key));
        self.header.set_sort_order(key.to_vec());
    }

    pub fn cursor(&self) -> ReplayCursor<'_> {
        ReplayCursor::new(&self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulator::header::schema;

    #[test]
    fn test_sort_on_is_stable() {
        let header = AccumulatorHeader::new(schema(["a", "b"]), &["a", "b"]);
        let mut acc = MaterializedAccumulator::with_rows(
            header,
            vec![vec![2, 1], vec![1, 9], vec![2, 3], vec![1, 4]],
        );
        acc.sort_on(&[0]);
        assert_eq!(acc.rows(), &[vec![1, 9], vec![1, 4], vec![2, 1], vec![2, 3]]);
        assert_eq!(acc.header().sort_order(), &[0]);
    }

    #[test]
    fn test_like_drops_rows_and_order() {
        let mut header = AccumulatorHeader::new(schema(["a"]), &["a"]);
        header.set_sort_order(vec![0]);
        let mut acc = MaterializedAccumulator::new(header);
        acc.add_row(vec![5]);
        let copy = MaterializedAccumulator::like(acc.header());
        assert!(copy.is_empty());
        assert!(copy.header().sort_order().is_empty());
        assert_eq!(copy.header().bound_columns(), vec![0]);
    }
}
