/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::row::Row;

/// Forward cursor over materialized rows that can jump back to a saved mark.
/// Used on the inner side of a merge join to replay a run of equal keys.
#[derive(Debug, Clone)]
pub struct ReplayCursor<'r> {
    rows: &'r [Row],
    position: usize,
    mark: usize,
}

impl<'r> ReplayCursor<'r> {
    pub fn new(rows: &'r [Row]) -> Self {
        Self { rows, position: 0, mark: 0 }
    }

    pub fn current(&self) -> Option<&'r Row> {
        self.rows.get(self.position)
    }

    pub fn advance(&mut self) {
        if self.position < self.rows.len() {
            self.position += 1;
        }
    }

    pub fn mark(&mut self) {
        self.mark = self.position;
    }

    pub fn reset(&mut self) {
        self.position = self.mark;
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.rows.len()
    }
}
