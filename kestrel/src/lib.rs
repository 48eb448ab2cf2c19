/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

pub mod accumulator;
pub mod bgp;
pub mod collapse;
pub mod config;
pub mod context;
pub mod error;
pub mod multiset;
pub mod optimizer;

pub use accumulator::{Accumulator, AccumulatorHeader, MaterializedAccumulator, Relation, Row};
pub use bgp::{build_schema, BgpEvaluator};
pub use config::OptimizerConfig;
pub use context::ExecutionContext;
pub use error::{EngineError, Result};
pub use multiset::{Multiset, Node, Solution};
pub use optimizer::QueryOptimizer;
