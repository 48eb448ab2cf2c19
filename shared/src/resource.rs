/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use serde::{Deserialize, Serialize};

/// Surrogate identifier of an RDF term in the store dictionary.
pub type ResourceId = u64;

/// Marks an unbound slot inside a row. Never names a real resource.
pub const NULL_ID: ResourceId = 0;

/// First identifier handed out by a dictionary.
pub const FIRST_ID: ResourceId = 1;

/// Dictionary entry for a resource, as returned by `TripleStore::resolve`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedResource {
    pub lexical: String,
    pub is_literal: bool,
    /// Resource id of the literal's datatype URI, `NULL_ID` for URIs and plain literals.
    pub datatype: ResourceId,
    pub language: Option<String>,
}

impl ResolvedResource {
    pub fn uri(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            is_literal: false,
            datatype: NULL_ID,
            language: None,
        }
    }

    pub fn literal(lexical: impl Into<String>, datatype: ResourceId, language: Option<String>) -> Self {
        Self {
            lexical: lexical.into(),
            is_literal: true,
            datatype,
            language,
        }
    }
}
