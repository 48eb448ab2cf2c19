/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use shared::error::StoreError;
use shared::resource::{ResourceId, NULL_ID};

use super::header::{AccumulatorHeader, Schema};
use super::row::Row;

/// Store tuples fed into a virtualizing accumulator. Pair scans pad the third slot.
pub type TupleIter<'a> = Box<dyn Iterator<Item = Result<[ResourceId; 3], StoreError>> + 'a>;

/// Maps the slots of a store tuple onto schema columns.
///
/// Two slots may target the same column when a pattern repeats a variable;
/// tuples whose values disagree there do not produce a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLayout {
    width: usize,
    targets: [Option<usize>; 3],
}

impl RowLayout {
    pub fn new(width: usize, targets: [Option<usize>; 3]) -> Self {
        debug_assert!(targets.iter().flatten().all(|&column| column < width));
        Self { width, targets }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Target columns in slot order, without repeats. Tuples sorted by slot
    /// are sorted on these columns.
    pub fn bound_columns(&self) -> Vec<usize> {
        let mut columns = Vec::with_capacity(3);
        for column in self.targets.iter().flatten() {
            if !columns.contains(column) {
                columns.push(*column);
            }
        }
        columns
    }

    pub fn build(&self, tuple: [ResourceId; 3]) -> Option<Row> {
        let mut row = vec![NULL_ID; self.width];
        for (slot, target) in self.targets.iter().enumerate() {
            if let Some(column) = *target {
                let value = tuple[slot];
                if row[column] != NULL_ID && row[column] != value {
                    return None;
                }
                row[column] = value;
            }
        }
        Some(row)
    }
}

/// Accumulator backed by a single forward-only store scan.
pub struct VirtualizingAccumulator<'a> {
    header: AccumulatorHeader,
    tuples: TupleIter<'a>,
    layout: RowLayout,
}

impl<'a> VirtualizingAccumulator<'a> {
    pub fn new(columns: Schema, layout: RowLayout, tuples: TupleIter<'a>) -> Self {
        debug_assert_eq!(columns.len(), layout.width());
        let bound = layout.bound_columns();
        let mut header = AccumulatorHeader::with_bound_columns(columns, &bound);
        header.set_sort_order(bound);
        Self { header, tuples, layout }
    }

    pub fn header(&self) -> &AccumulatorHeader {
        &self.header
    }

    pub fn layout(&self) -> &RowLayout {
        &self.layout
    }

    pub(crate) fn into_parts(self) -> (AccumulatorHeader, RowLayout, TupleIter<'a>) {
        (self.header, self.layout, self.tuples)
    }
}

impl fmt::Debug for VirtualizingAccumulator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualizingAccumulator")
            .field("header", &self.header)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}
