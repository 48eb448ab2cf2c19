/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Intermediate binding relations.
//!
//! Every accumulator of one evaluation shares the same column schema. A row
//! keeps `0` in columns its accumulator does not bind, so two rows from
//! different accumulators can be compared and merged slot by slot.

pub mod cursor;
pub mod header;
mod join;
pub mod materialized;
pub mod row;
pub mod virtualizing;

use shared::store::TripleStore;

use crate::context::ExecutionContext;
use crate::error::{EngineError, Result};
use crate::multiset::Multiset;

pub use cursor::ReplayCursor;
pub use header::{schema, AccumulatorHeader, Schema};
pub use materialized::MaterializedAccumulator;
pub use row::{compare_on, row_compare, row_join, row_match, Row};
pub use virtualizing::{RowLayout, TupleIter, VirtualizingAccumulator};

pub type RowIter<'a> = Box<dyn Iterator<Item = Result<Row>> + 'a>;

/// What the join and sort logic needs from an accumulator variant.
pub trait Relation<'a> {
    fn header(&self) -> &AccumulatorHeader;

    /// Pulls every row into memory. Sort order is kept.
    fn materialize(self, ctx: &ExecutionContext) -> Result<MaterializedAccumulator>;

    /// Rows in their current order, pulled lazily where possible.
    fn into_rows(self) -> RowIter<'a>;
}

impl<'a> Relation<'a> for MaterializedAccumulator {
    fn header(&self) -> &AccumulatorHeader {
        MaterializedAccumulator::header(self)
    }

    fn materialize(self, _ctx: &ExecutionContext) -> Result<MaterializedAccumulator> {
        Ok(self)
    }

    fn into_rows(self) -> RowIter<'a> {
        Box::new(MaterializedAccumulator::into_rows(self).into_iter().map(Ok::<Row, EngineError>))
    }
}

impl<'a> Relation<'a> for VirtualizingAccumulator<'a> {
    fn header(&self) -> &AccumulatorHeader {
        VirtualizingAccumulator::header(self)
    }

    fn materialize(self, ctx: &ExecutionContext) -> Result<MaterializedAccumulator> {
        let (header, layout, tuples) = self.into_parts();
        let mut materialized = MaterializedAccumulator::new(header);
        let mut probe = ctx.probe();
        for tuple in tuples {
            probe.tick()?;
            if let Some(row) = layout.build(tuple?) {
                materialized.add_row(row);
            }
        }
        Ok(materialized)
    }

    fn into_rows(self) -> RowIter<'a> {
        let (_, layout, tuples) = self.into_parts();
        Box::new(tuples.filter_map(move |tuple| match tuple {
            Ok(tuple) => layout.build(tuple).map(Ok),
            Err(err) => Some(Err(EngineError::from(err))),
        }))
    }
}

#[derive(Debug)]
pub enum Accumulator<'a> {
    Materialized(MaterializedAccumulator),
    Virtualizing(VirtualizingAccumulator<'a>),
}

impl<'a> Relation<'a> for Accumulator<'a> {
    fn header(&self) -> &AccumulatorHeader {
        match self {
            Accumulator::Materialized(acc) => Relation::header(acc),
            Accumulator::Virtualizing(acc) => Relation::header(acc),
        }
    }

    fn materialize(self, ctx: &ExecutionContext) -> Result<MaterializedAccumulator> {
        match self {
            Accumulator::Materialized(acc) => Ok(acc),
            Accumulator::Virtualizing(acc) => acc.materialize(ctx),
        }
    }

    fn into_rows(self) -> RowIter<'a> {
        match self {
            Accumulator::Materialized(acc) => Relation::into_rows(acc),
            Accumulator::Virtualizing(acc) => acc.into_rows(),
        }
    }
}

impl<'a> Accumulator<'a> {
    pub fn header(&self) -> &AccumulatorHeader {
        Relation::header(self)
    }

    pub fn is_materialized(&self) -> bool {
        matches!(self, Accumulator::Materialized(_))
    }

    /// Only a materialized accumulator can be known to hold no rows.
    pub fn is_known_empty(&self) -> bool {
        match self {
            Accumulator::Materialized(acc) => acc.is_empty(),
            Accumulator::Virtualizing(_) => false,
        }
    }

    /// Sorts on the bound subset of `target_variables`, in their order.
    /// Returns whether a physical sort happened. `Ok(false)` means the key is a
    /// prefix of the current sort order, and a virtualizing accumulator then
    /// stays unmaterialized.
    pub fn sort(&mut self, target_variables: &[&str], ctx: &ExecutionContext) -> Result<bool> {
        let key = self.header().sort_key(target_variables);
        self.sort_on_columns(&key, ctx)
    }

    pub fn sort_on_columns(&mut self, key: &[usize], ctx: &ExecutionContext) -> Result<bool> {
        if self.header().is_sorted_on(key) {
            return Ok(false);
        }
        let placeholder =
            Accumulator::Materialized(MaterializedAccumulator::like(self.header()));
        let current = std::mem::replace(self, placeholder);
        let mut materialized = current.materialize(ctx)?;
        materialized.sort_on(key);
        *self = Accumulator::Materialized(materialized);
        Ok(true)
    }

    /// Joins with `inner`, sort-merge on shared bound columns or cross
    /// product when there are none.
    pub fn join(self, inner: Accumulator<'a>, ctx: &ExecutionContext) -> Result<Accumulator<'a>> {
        join::join(self, inner, ctx)
    }

    pub fn materialize(self, ctx: &ExecutionContext) -> Result<MaterializedAccumulator> {
        Relation::materialize(self, ctx)
    }

    pub fn into_rows(self) -> RowIter<'a> {
        Relation::into_rows(self)
    }

    /// Resolves every row into a solution over the bound columns.
    pub fn to_multiset<S: TripleStore + ?Sized>(
        self,
        store: &S,
        ctx: &ExecutionContext,
    ) -> Result<Multiset> {
        Multiset::from_accumulator(self, store, ctx)
    }
}

impl From<MaterializedAccumulator> for Accumulator<'_> {
    fn from(acc: MaterializedAccumulator) -> Self {
        Accumulator::Materialized(acc)
    }
}

impl<'a> From<VirtualizingAccumulator<'a>> for Accumulator<'a> {
    fn from(acc: VirtualizingAccumulator<'a>) -> Self {
        Accumulator::Virtualizing(acc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::StoreError;

    fn virtual_acc(tuples: Vec<[u64; 3]>) -> Accumulator<'static> {
        let iter: TupleIter<'static> = Box::new(tuples.into_iter().map(Ok::<_, StoreError>));
        VirtualizingAccumulator::new(
            schema(["a", "b"]),
            RowLayout::new(2, [Some(0), Some(1), None]),
            iter,
        )
        .into()
    }

    #[test]
    fn test_sort_is_idempotent() {
        let ctx = ExecutionContext::new();
        let header = AccumulatorHeader::new(schema(["a", "b"]), &["a", "b"]);
        let mut acc: Accumulator = MaterializedAccumulator::with_rows(
            header,
            vec![vec![3, 1], vec![1, 2], vec![2, 2], vec![1, 1]],
        )
        .into();
        assert!(acc.sort(&["b", "a"], &ctx).unwrap());
        assert_eq!(acc.header().sort_order(), &[1, 0]);
        let first = acc.materialize(&ctx).unwrap();

        let mut again: Accumulator = first.clone().into();
        assert!(!again.sort(&["b", "a"], &ctx).unwrap());
        assert!(!again.sort(&["b"], &ctx).unwrap());
        assert_eq!(again.header().sort_order(), &[1, 0]);
        assert_eq!(again.materialize(&ctx).unwrap(), first);
        assert_eq!(first.rows(), &[vec![1, 1], vec![3, 1], vec![1, 2], vec![2, 2]]);
    }

    #[test]
    fn test_virtual_already_sorted_stays_virtual() {
        let ctx = ExecutionContext::new();
        let mut acc = virtual_acc(vec![[1, 5, 0], [2, 4, 0]]);
        assert!(!acc.sort(&["a"], &ctx).unwrap());
        assert!(!acc.is_materialized());
        assert!(acc.sort(&["b"], &ctx).unwrap());
        assert!(acc.is_materialized());
        let rows = acc.materialize(&ctx).unwrap().into_rows();
        assert_eq!(rows, vec![vec![2, 4], vec![1, 5]]);
    }

    #[test]
    fn test_unchanged_sort_keeps_scan_order() {
        let ctx = ExecutionContext::new();
        let mut acc = virtual_acc(vec![[1, 9, 0], [1, 3, 0], [2, 1, 0]]);
        assert!(!acc.sort(&["a"], &ctx).unwrap());
        assert!(!acc.is_materialized());
        let rows = acc.materialize(&ctx).unwrap().into_rows();
        assert_eq!(rows, vec![vec![1, 9], vec![1, 3], vec![2, 1]]);
    }

    #[test]
    fn test_virtual_store_error_surfaces() {
        let ctx = ExecutionContext::new();
        let iter: TupleIter<'static> = Box::new(
            vec![Ok([1u64, 2, 0]), Err(StoreError::Corrupt("page 7".to_string()))].into_iter(),
        );
        let acc: Accumulator = VirtualizingAccumulator::new(
            schema(["a", "b"]),
            RowLayout::new(2, [Some(0), Some(1), None]),
            iter,
        )
        .into();
        assert!(matches!(acc.materialize(&ctx), Err(EngineError::Store(StoreError::Corrupt(_)))));
    }

    #[test]
    fn test_known_empty() {
        let header = AccumulatorHeader::new(schema(["a"]), &["a"]);
        let empty: Accumulator = MaterializedAccumulator::new(header).into();
        assert!(empty.is_known_empty());
        assert!(!virtual_acc(Vec::new()).is_known_empty());
    }
}
