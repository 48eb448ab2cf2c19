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

use crate::error::{EngineError, Result};

/// Weights used by the pattern optimizer. Lower means more selective.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Bound subject when no predicate statistics apply.
    pub subject_weight: f64,
    /// Bound predicate when no statistics provider is configured.
    pub predicate_weight: f64,
    /// Bound object when no predicate statistics apply.
    pub object_weight: f64,
    pub variable_weight: f64,
    /// Treat variables bound by already scheduled patterns as bound terms.
    /// Changes plan order (never results), so it is off by default.
    pub binding_aware: bool,
}

impl OptimizerConfig {
    pub const DEFAULT_SUBJECT_WEIGHT: f64 = 0.8;
    pub const DEFAULT_PREDICATE_WEIGHT: f64 = 0.4;
    pub const DEFAULT_OBJECT_WEIGHT: f64 = 0.6;
    pub const DEFAULT_VARIABLE_WEIGHT: f64 = 1.0;

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|err| EngineError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Weights must be positive and finite, ordered
    /// variable > subject > object > predicate.
    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("subject_weight", self.subject_weight),
            ("predicate_weight", self.predicate_weight),
            ("object_weight", self.object_weight),
            ("variable_weight", self.variable_weight),
        ];
        for (name, weight) in weights {
            if !weight.is_finite() || weight <= 0.0 {
                return Err(EngineError::InvalidConfig(format!(
                    "{} must be positive and finite, got {}",
                    name, weight
                )));
            }
        }
        let ordered = self.variable_weight > self.subject_weight
            && self.subject_weight > self.object_weight
            && self.object_weight > self.predicate_weight;
        if !ordered {
            return Err(EngineError::InvalidConfig(format!(
                "expected variable > subject > object > predicate, got {} / {} / {} / {}",
                self.variable_weight, self.subject_weight, self.object_weight, self.predicate_weight
            )));
        }
        Ok(())
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            subject_weight: Self::DEFAULT_SUBJECT_WEIGHT,
            predicate_weight: Self::DEFAULT_PREDICATE_WEIGHT,
            object_weight: Self::DEFAULT_OBJECT_WEIGHT,
            variable_weight: Self::DEFAULT_VARIABLE_WEIGHT,
            binding_aware: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = OptimizerConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.binding_aware);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = OptimizerConfig::from_json_str(r#"{ "subject_weight": 0.7, "binding_aware": true }"#).unwrap();
        assert_eq!(config.subject_weight, 0.7);
        assert_eq!(config.predicate_weight, OptimizerConfig::DEFAULT_PREDICATE_WEIGHT);
        assert!(config.binding_aware);
    }

    #[test]
    fn test_ordering_violation_rejected() {
        let outcome = OptimizerConfig::from_json_str(r#"{ "predicate_weight": 0.9 }"#);
        assert!(matches!(outcome, Err(EngineError::InvalidConfig(_))));
        let outcome = OptimizerConfig::from_json_str(r#"{ "object_weight": -1.0 }"#);
        assert!(matches!(outcome, Err(EngineError::InvalidConfig(_))));
        let outcome = OptimizerConfig::from_json_str("not json");
        assert!(matches!(outcome, Err(EngineError::InvalidConfig(_))));
    }
}
