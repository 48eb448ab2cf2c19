/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */
use serde::{Serialize, Deserialize};

use crate::resource::ResourceId;

#[derive(PartialEq, Debug, Clone, Copy, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: ResourceId,
    pub predicate: ResourceId,
    pub object: ResourceId,
}

impl Triple {
    pub fn new(subject: ResourceId, predicate: ResourceId, object: ResourceId) -> Self {
        Self { subject, predicate, object }
    }
}

/// A triple together with the named graph it was asserted in.
#[derive(PartialEq, Debug, Clone, Copy, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Quad {
    pub triple: Triple,
    pub graph: ResourceId,
}
