/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use serde::{Deserialize, Serialize};

/// A bound RDF term as it appears in a query.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Constant {
    Uri(String),
    Literal {
        value: String,
        datatype: Option<String>,
        language: Option<String>,
    },
}

impl Constant {
    pub fn uri(value: impl Into<String>) -> Self {
        Constant::Uri(value.into())
    }

    pub fn plain_literal(value: impl Into<String>) -> Self {
        Constant::Literal {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Constant::Literal {
            value: value.into(),
            datatype: Some(datatype.into()),
            language: None,
        }
    }

    pub fn lang_literal(value: impl Into<String>, language: impl Into<String>) -> Self {
        Constant::Literal {
            value: value.into(),
            datatype: None,
            language: Some(language.into()),
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Constant::Literal { .. })
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Uri(uri) => write!(f, "<{}>", uri),
            Constant::Literal { value, datatype: Some(dt), .. } => write!(f, "\"{}\"^^<{}>", value, dt),
            Constant::Literal { value, language: Some(lang), .. } => write!(f, "\"{}\"@{}", value, lang),
            Constant::Literal { value, .. } => write!(f, "\"{}\"", value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PatternTerm {
    Variable(String),
    Constant(Constant),
}

impl PatternTerm {
    pub fn var(name: impl Into<String>) -> Self {
        PatternTerm::Variable(name.into())
    }

    pub fn uri(value: impl Into<String>) -> Self {
        PatternTerm::Constant(Constant::uri(value))
    }

    pub fn literal(value: impl Into<String>) -> Self {
        PatternTerm::Constant(Constant::plain_literal(value))
    }

    pub fn is_var(&self) -> bool {
        matches!(self, PatternTerm::Variable(_))
    }

    pub fn variable(&self) -> Option<&str> {
        match self {
            PatternTerm::Variable(name) => Some(name),
            PatternTerm::Constant(_) => None,
        }
    }

    pub fn constant(&self) -> Option<&Constant> {
        match self {
            PatternTerm::Constant(c) => Some(c),
            PatternTerm::Variable(_) => None,
        }
    }
}

impl fmt::Display for PatternTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternTerm::Variable(name) => write!(f, "?{}", name),
            PatternTerm::Constant(c) => c.fmt(f),
        }
    }
}

/// Position of a term inside a triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Position {
    Subject,
    Predicate,
    Object,
}

impl Position {
    pub const ALL: [Position; 3] = [Position::Subject, Position::Predicate, Position::Object];
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TriplePattern {
    pub subject: PatternTerm,
    pub predicate: PatternTerm,
    pub object: PatternTerm,
}

impl TriplePattern {
    pub fn new(subject: PatternTerm, predicate: PatternTerm, object: PatternTerm) -> Self {
        Self { subject, predicate, object }
    }

    pub fn term(&self, position: Position) -> &PatternTerm {
        match position {
            Position::Subject => &self.subject,
            Position::Predicate => &self.predicate,
            Position::Object => &self.object,
        }
    }

    /// Positions holding a variable, in subject, predicate, object order.
    pub fn variable_positions(&self) -> Vec<Position> {
        Position::ALL
            .into_iter()
            .filter(|&pos| self.term(pos).is_var())
            .collect()
    }

    /// Distinct variable names in order of first appearance.
    pub fn variables(&self) -> Vec<&str> {
        let mut vars: Vec<&str> = Vec::with_capacity(3);
        for pos in Position::ALL {
            if let Some(name) = self.term(pos).variable() {
                if !vars.contains(&name) {
                    vars.push(name);
                }
            }
        }
        vars
    }

    pub fn mentions(&self, variable: &str) -> bool {
        Position::ALL
            .into_iter()
            .any(|pos| self.term(pos).variable() == Some(variable))
    }

    /// True when the same variable occupies more than one position.
    pub fn repeats_variable(&self) -> bool {
        self.variable_positions().len() != self.variables().len()
    }
}

impl fmt::Display for TriplePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}
