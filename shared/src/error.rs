/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use thiserror::Error;

use crate::resource::ResourceId;

/// Failures raised by a triple store while serving an enumeration or lookup.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("store page is unreadable: {0}")]
    Corrupt(String),
    #[error("resource {0} is not present in the dictionary")]
    UnknownResource(ResourceId),
    #[error("unsupported store request: {0}")]
    InvalidRequest(String),
}
