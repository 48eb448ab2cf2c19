/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::cmp::Ordering;

use log::{debug, trace};

use super::cursor::ReplayCursor;
use super::header::AccumulatorHeader;
use super::materialized::MaterializedAccumulator;
use super::row::{compare_on, row_compare, row_join, row_match, Row};
use super::Accumulator;
use crate::context::ExecutionContext;
use crate::error::Result;

pub(super) fn join<'a>(
    outer: Accumulator<'a>,
    inner: Accumulator<'a>,
    ctx: &ExecutionContext,
) -> Result<Accumulator<'a>> {
    let (mut outer, inner) = if inner.header().highest_bound_column_index()
        < outer.header().highest_bound_column_index()
    {
        (inner, outer)
    } else {
        (outer, inner)
    };

    let key = outer.header().shared_bound_columns(inner.header());
    if key.is_empty() {
        let inner = inner.materialize(ctx)?;
        return cross_product(outer, &inner, ctx).map(Accumulator::Materialized);
    }

    outer.sort_on_columns(&key, ctx)?;
    let mut inner = inner.materialize(ctx)?;
    if !inner.header().is_sorted_on(&key) {
        inner.sort_on(&key);
    }
    merge_join(outer, &inner, &key, ctx).map(Accumulator::Materialized)
}

/// Sort-merge join. Both sides are sorted on `key`, which holds every column
/// bound on both sides, so `row_compare` orders rows exactly by `key`.
fn merge_join(
    outer: Accumulator<'_>,
    inner: &MaterializedAccumulator,
    key: &[usize],
    ctx: &ExecutionContext,
) -> Result<MaterializedAccumulator> {
    let mut result = MaterializedAccumulator::new(AccumulatorHeader::joined(outer.header(), inner.header()));
    let mut cursor: ReplayCursor<'_> = inner.cursor();
    let mut probe = ctx.probe();
    let mut previous: Option<Row> = None;
    let mut outer_rows = 0usize;

    for outer_row in outer.into_rows() {
        let outer_row = outer_row?;
        outer_rows += 1;
        probe.tick()?;

        if let Some(previous) = &previous {
            if compare_on(previous, &outer_row, key) == Ordering::Equal {
                trace!("repeated outer key {:?}, replaying inner run", outer_row);
                cursor.reset();
            }
        }

        while let Some(inner_row) = cursor.current() {
            if row_compare(&outer_row, inner_row) != Ordering::Greater {
                break;
            }
            cursor.advance();
            probe.tick()?;
        }
        if cursor.is_exhausted() {
            break;
        }

        cursor.mark();
        while let Some(inner_row) = cursor.current() {
            if row_compare(&outer_row, inner_row) != Ordering::Equal {
                break;
            }
            debug_assert!(row_match(&outer_row, inner_row));
            result.add_row(row_join(&outer_row, inner_row));
            cursor.advance();
            probe.tick()?;
        }
        previous = Some(outer_row);
    }

    debug!(
        "merge join on columns {:?}: {} outer rows read, {} inner, {} joined",
        key,
        outer_rows,
        inner.len(),
        result.len()
    );
    Ok(result)
}

/// Every outer row paired with every inner row, in outer order.
fn cross_product(
    outer: Accumulator<'_>,
    inner: &MaterializedAccumulator,
    ctx: &ExecutionContext,
) -> Result<MaterializedAccumulator> {
    let mut result = MaterializedAccumulator::new(AccumulatorHeader::joined(outer.header(), inner.header()));
    if inner.is_empty() {
        debug!("cross product with an empty operand");
        return Ok(result);
    }
    let mut probe = ctx.probe();
    for outer_row in outer.into_rows() {
        let outer_row = outer_row?;
        for inner_row in inner.rows() {
            probe.tick()?;
            result.add_row(row_join(&outer_row, inner_row));
        }
    }
    debug!("cross product: {} inner rows, {} joined", inner.len(), result.len());
    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::accumulator::header::{schema, Schema};
    use crate::accumulator::virtualizing::{RowLayout, TupleIter, VirtualizingAccumulator};
    use shared::error::StoreError;

    fn acc(columns: &Schema, bound: &[&str], rows: Vec<Row>) -> Accumulator<'static> {
        let header = AccumulatorHeader::new(columns.clone(), bound);
        MaterializedAccumulator::with_rows(header, rows).into()
    }

    fn row_set(acc: Accumulator<'_>) -> BTreeSet<Row> {
        acc.materialize(&ExecutionContext::new()).unwrap().into_rows().into_iter().collect()
    }

    fn row_count(acc: Accumulator<'_>) -> usize {
        acc.materialize(&ExecutionContext::new()).unwrap().len()
    }

    #[test]
    fn test_merge_join_many_to_many() {
        let columns = schema(["x", "y", "z"]);
        let ctx = ExecutionContext::new();
        let left = acc(&columns, &["x", "y"], vec![vec![1, 10, 0], vec![2, 10, 0], vec![3, 11, 0]]);
        let right = acc(&columns, &["y", "z"], vec![vec![0, 10, 7], vec![0, 10, 8], vec![0, 12, 9]]);
        let joined = left.join(right, &ctx).unwrap();
        assert_eq!(joined.header().bound_columns(), vec![0, 1, 2]);
        let expected: BTreeSet<Row> = [
            vec![1, 10, 7],
            vec![1, 10, 8],
            vec![2, 10, 7],
            vec![2, 10, 8],
        ]
        .into_iter()
        .collect();
        assert_eq!(row_set(joined), expected);
    }

    #[test]
    fn test_join_is_commutative() {
        let columns = schema(["a", "b", "c"]);
        let ctx = ExecutionContext::new();
        let rows_a = vec![vec![1, 2, 0], vec![1, 3, 0], vec![4, 3, 0], vec![5, 9, 0]];
        let rows_b = vec![vec![0, 3, 6], vec![0, 2, 7], vec![0, 3, 8], vec![0, 1, 1]];
        let ab = acc(&columns, &["a", "b"], rows_a.clone())
            .join(acc(&columns, &["b", "c"], rows_b.clone()), &ctx)
            .unwrap();
        let ba = acc(&columns, &["b", "c"], rows_b)
            .join(acc(&columns, &["a", "b"], rows_a), &ctx)
            .unwrap();
        let ab = row_set(ab);
        assert_eq!(ab.len(), 5);
        assert_eq!(ab, row_set(ba));
    }

    #[test]
    fn test_join_is_associative() {
        let columns = schema(["a", "b", "c"]);
        let ctx = ExecutionContext::new();
        let a = || acc(&columns, &["a", "b"], vec![vec![1, 1, 0], vec![1, 2, 0], vec![2, 2, 0]]);
        let b = || acc(&columns, &["b", "c"], vec![vec![0, 1, 5], vec![0, 2, 5], vec![0, 2, 6]]);
        let c = || acc(&columns, &["a", "c"], vec![vec![1, 0, 5], vec![2, 0, 6], vec![1, 0, 6]]);
        let left = a().join(b(), &ctx).unwrap().join(c(), &ctx).unwrap();
        let right = a().join(b().join(c(), &ctx).unwrap(), &ctx).unwrap();
        let left = row_set(left);
        assert_eq!(left, row_set(right));
        let expected: BTreeSet<Row> =
            [vec![1, 1, 5], vec![1, 2, 5], vec![1, 2, 6], vec![2, 2, 6]].into_iter().collect();
        assert_eq!(left, expected);
    }

    #[test]
    fn test_cross_product_cardinality() {
        let columns = schema(["a", "b"]);
        let ctx = ExecutionContext::new();
        let left = acc(&columns, &["a"], vec![vec![1, 0], vec![2, 0], vec![3, 0]]);
        let right = acc(&columns, &["b"], vec![vec![0, 7], vec![0, 8]]);
        let joined = left.join(right, &ctx).unwrap();
        assert_eq!(joined.header().bound_columns(), vec![0, 1]);
        assert_eq!(row_count(joined), 6);
    }

    #[test]
    fn test_join_with_empty_side_is_empty() {
        let columns = schema(["a", "b"]);
        let ctx = ExecutionContext::new();
        let left = acc(&columns, &["a", "b"], vec![vec![1, 2]]);
        let right = acc(&columns, &["b"], Vec::new());
        assert_eq!(row_count(left.join(right, &ctx).unwrap()), 0);
        let left = acc(&columns, &["a"], vec![vec![1, 0]]);
        let right = acc(&columns, &["b"], Vec::new());
        assert_eq!(row_count(left.join(right, &ctx).unwrap()), 0);
    }

    #[test]
    fn test_join_keeps_duplicates() {
        let columns = schema(["a", "b"]);
        let ctx = ExecutionContext::new();
        let left = acc(&columns, &["a"], vec![vec![1, 0], vec![1, 0]]);
        let right = acc(&columns, &["a", "b"], vec![vec![1, 4]]);
        assert_eq!(row_count(left.join(right, &ctx).unwrap()), 2);
    }

    #[test]
    fn test_swap_drives_from_lower_highest_bound_column() {
        let columns = schema(["a", "b", "c"]);
        let ctx = ExecutionContext::new();
        let mut wide = acc(&columns, &["b", "c"], vec![vec![0, 2, 9], vec![0, 1, 8]]);
        wide.sort(&["c"], &ctx).unwrap();
        let mut narrow = acc(&columns, &["a", "b"], vec![vec![5, 1, 0], vec![6, 2, 0]]);
        narrow.sort(&["a"], &ctx).unwrap();
        // `narrow` drives the merge, so the result is ordered on the join key.
        let joined = wide.join(narrow, &ctx).unwrap();
        assert_eq!(joined.header().sort_order()[0], 1);
        assert_eq!(row_count(joined), 2);
    }

    #[test]
    fn test_virtual_outer_sorted_on_key() {
        let columns = schema(["a", "b", "c"]);
        let ctx = ExecutionContext::new();
        let tuples: TupleIter<'static> = Box::new(
            vec![[3u64, 1, 0], [4, 2, 0], [5, 2, 0]].into_iter().map(Ok::<_, StoreError>),
        );
        let outer: Accumulator = VirtualizingAccumulator::new(
            columns.clone(),
            RowLayout::new(3, [Some(1), Some(0), None]),
            tuples,
        )
        .into();
        let inner = acc(&columns, &["b", "c"], vec![vec![0, 3, 7], vec![0, 5, 8], vec![0, 6, 9]]);
        let joined = outer.join(inner, &ctx).unwrap();
        assert_eq!(joined.header().sort_order(), &[1, 0]);
        let expected: BTreeSet<Row> = [vec![1, 3, 7], vec![2, 5, 8]].into_iter().collect();
        assert_eq!(row_set(joined), expected);
    }
}
