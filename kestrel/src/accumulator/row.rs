/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Row-level primitives. A `0` slot is unbound and never takes part in an
//! unequal comparison.

use std::cmp::Ordering;

use shared::resource::{ResourceId, NULL_ID};

pub type Row = Vec<ResourceId>;

/// True when no column holds two different bound values.
pub fn row_match(x: &[ResourceId], y: &[ResourceId]) -> bool {
    debug_assert_eq!(x.len(), y.len(), "row width mismatch");
    x.iter()
        .zip(y)
        .all(|(&a, &b)| a == NULL_ID || b == NULL_ID || a == b)
}

/// Column-wise union; the bound value wins. Only meaningful for matching rows.
pub fn row_join(x: &[ResourceId], y: &[ResourceId]) -> Row {
    debug_assert_eq!(x.len(), y.len(), "row width mismatch");
    x.iter()
        .zip(y)
        .map(|(&a, &b)| if a == NULL_ID { b } else { a })
        .collect()
}

/// Compares column by column, skipping columns unbound on either side.
pub fn row_compare(x: &[ResourceId], y: &[ResourceId]) -> Ordering {
    debug_assert_eq!(x.len(), y.len(), "row width mismatch");
    for (&a, &b) in x.iter().zip(y) {
        if a == NULL_ID || b == NULL_ID {
            continue;
        }
        match a.cmp(&b) {
            Ordering::Equal => continue,
            unequal => return unequal,
        }
    }
    Ordering::Equal
}

/// Compares only the given columns, in the given order.
pub fn compare_on(x: &[ResourceId], y: &[ResourceId], key: &[usize]) -> Ordering {
    for &column in key {
        match x[column].cmp(&y[column]) {
            Ordering::Equal => continue,
            unequal => return unequal,
        }
    }
    Ordering::Equal
}
