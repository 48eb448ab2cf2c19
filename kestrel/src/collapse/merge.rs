/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use shared::error::StoreError;

use crate::context::ExecutionContext;
use crate::error::Result;

/// Ascending store enumeration, either single ids or lexicographically sorted tuples.
pub type SortedStream<'a, T> = Box<dyn Iterator<Item = std::result::Result<T, StoreError>> + 'a>;

/// N-way intersection of ascending streams.
///
/// Every stream is advanced to the largest head seen so far; a value is
/// emitted when all heads agree. Stops as soon as any stream runs dry, so
/// the remaining streams are never read to the end.
pub fn intersect_sorted<T: Ord + Copy>(
    mut streams: Vec<SortedStream<'_, T>>,
    ctx: &ExecutionContext,
) -> Result<Vec<T>> {
    let mut matches = Vec::new();
    let mut heads = Vec::with_capacity(streams.len());
    for stream in streams.iter_mut() {
        match stream.next().transpose()? {
            Some(head) => heads.push(head),
            None => return Ok(matches),
        }
    }

    let mut probe = ctx.probe();
    while let Some(target) = heads.iter().copied().max() {
        probe.tick()?;
        let mut agreed = true;
        for (head, stream) in heads.iter_mut().zip(streams.iter_mut()) {
            while *head < target {
                match stream.next().transpose()? {
                    Some(next) => *head = next,
                    None => return Ok(matches),
                }
            }
            if *head != target {
                agreed = false;
            }
        }
        if !agreed {
            continue;
        }
        matches.push(target);
        for (head, stream) in heads.iter_mut().zip(streams.iter_mut()) {
            match stream.next().transpose()? {
                Some(next) => *head = next,
                None => return Ok(matches),
            }
        }
    }
    Ok(matches)
}

/// Lexicographic comparison of two equally long id tuples.
pub fn compare_pairs(a: &[u64; 2], b: &[u64; 2]) -> std::cmp::Ordering {
    a[0].cmp(&b[0]).then(a[1].cmp(&b[1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream<T: Copy + 'static>(values: &[T]) -> SortedStream<'static, T> {
        Box::new(values.to_vec().into_iter().map(Ok::<T, StoreError>))
    }

    #[test]
    fn test_three_way_intersection() {
        let ctx = ExecutionContext::new();
        let streams = vec![
            stream(&[1u64, 3, 5, 7]),
            stream(&[3u64, 5, 9]),
            stream(&[3u64, 5, 7]),
        ];
        assert_eq!(intersect_sorted(streams, &ctx).unwrap(), vec![3, 5]);
    }

    #[test]
    fn test_single_stream_passes_through() {
        let ctx = ExecutionContext::new();
        let streams = vec![stream(&[2u64, 4, 8])];
        assert_eq!(intersect_sorted(streams, &ctx).unwrap(), vec![2, 4, 8]);
    }

    #[test]
    fn test_empty_stream_empties_result() {
        let ctx = ExecutionContext::new();
        let streams = vec![stream(&[1u64, 2]), stream(&[])];
        assert!(intersect_sorted(streams, &ctx).unwrap().is_empty());
        let none: Vec<SortedStream<'static, u64>> = Vec::new();
        assert!(intersect_sorted(none, &ctx).unwrap().is_empty());
    }

    #[test]
    fn test_pair_intersection_is_lexicographic() {
        let ctx = ExecutionContext::new();
        let streams = vec![
            stream(&[[1u64, 2], [1, 5], [2, 1], [3, 3]]),
            stream(&[[1u64, 5], [2, 0], [2, 1], [3, 4]]),
        ];
        assert_eq!(intersect_sorted(streams, &ctx).unwrap(), vec![[1, 5], [2, 1]]);
        assert_eq!(compare_pairs(&[1, 9], &[2, 0]), std::cmp::Ordering::Less);
    }

    #[test]
    fn test_store_error_propagates() {
        let ctx = ExecutionContext::new();
        let failing: SortedStream<'static, u64> = Box::new(
            vec![Ok(1u64), Err(StoreError::Corrupt("bad block".to_string()))].into_iter(),
        );
        let streams = vec![stream(&[1u64, 2, 3]), failing];
        assert!(intersect_sorted(streams, &ctx).is_err());
    }
}
