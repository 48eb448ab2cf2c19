/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use log::debug;
use shared::resource::NULL_ID;
use shared::store::{ActiveGraphs, TripleStore};
use shared::terms::{Position, TriplePattern};
use shared::triple::Triple;

use super::fixed_id;
use crate::accumulator::{Accumulator, AccumulatorHeader, MaterializedAccumulator, Schema};
use crate::error::{EngineError, Result};

/// A ground pattern. Contributes one all-unbound row if the triple exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistenceGroup {
    pattern: TriplePattern,
}

impl ExistenceGroup {
    pub fn new(pattern: TriplePattern) -> Result<Self> {
        if !pattern.variable_positions().is_empty() {
            return Err(EngineError::MalformedPattern(format!(
                "existence check needs a ground pattern, got {}",
                pattern
            )));
        }
        Ok(Self { pattern })
    }

    pub fn pattern(&self) -> &TriplePattern {
        &self.pattern
    }

    pub fn evaluate(&self, store: &dyn TripleStore, graphs: &ActiveGraphs) -> Result<ExistenceCheck> {
        let mut ids = [NULL_ID; 3];
        for (slot, position) in Position::ALL.into_iter().enumerate() {
            match fixed_id(store, &self.pattern, position)? {
                Some(id) => ids[slot] = id,
                None => return Ok(ExistenceCheck { exists: false }),
            }
        }
        let exists = store.contains(&Triple::new(ids[0], ids[1], ids[2]), graphs)?;
        debug!("ground pattern {} exists: {}", self.pattern, exists);
        Ok(ExistenceCheck { exists })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExistenceCheck {
    exists: bool,
}

impl ExistenceCheck {
    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn build_accumulator<'a>(self, schema: &Schema) -> Accumulator<'a> {
        let mut acc = MaterializedAccumulator::new(AccumulatorHeader::new(schema.clone(), &[]));
        if self.exists {
            acc.add_row(vec![NULL_ID; schema.len()]);
        }
        acc.into()
    }
}
