/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use rustc_hash::FxHashMap;

use crate::resource::{ResolvedResource, ResourceId, FIRST_ID, NULL_ID};
use crate::terms::Constant;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum TermKey {
    Uri(String),
    Literal {
        value: String,
        datatype: ResourceId,
        language: Option<String>,
    },
}

// Dictionary for encoding and decoding RDF terms.
// URIs are keyed and stored in expanded form; prefixes only expand `prefix:local` input.
#[derive(Debug, Default, Clone)]
pub struct Dictionary {
    term_to_id: FxHashMap<TermKey, ResourceId>,
    id_to_term: Vec<ResolvedResource>,
    prefixes: Vec<(String, String)>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `prefix:` as an abbreviation of `namespace`.
    pub fn add_prefix(&mut self, prefix: &str, namespace: &str) {
        self.prefixes.retain(|(p, _)| p != prefix);
        self.prefixes.push((prefix.to_string(), namespace.to_string()));
    }

    pub fn len(&self) -> usize {
        self.id_to_term.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_term.is_empty()
    }

    pub fn encode_uri(&mut self, uri: &str) -> ResourceId {
        self.intern(TermKey::Uri(uri.to_string()), || ResolvedResource::uri(uri))
    }

    pub fn encode(&mut self, constant: &Constant) -> ResourceId {
        match constant {
            Constant::Uri(uri) => self.encode_uri(uri),
            Constant::Literal { value, datatype, language } => {
                let datatype_id = match datatype {
                    Some(dt) => self.encode_uri(dt),
                    None => NULL_ID,
                };
                let key = TermKey::Literal {
                    value: value.clone(),
                    datatype: datatype_id,
                    language: language.clone(),
                };
                self.intern(key, || {
                    ResolvedResource::literal(value.clone(), datatype_id, language.clone())
                })
            }
        }
    }

    /// Looks up a term without inserting it.
    pub fn lookup(&self, constant: &Constant) -> Option<ResourceId> {
        let key = match constant {
            Constant::Uri(uri) => TermKey::Uri(uri.clone()),
            Constant::Literal { value, datatype, language } => {
                let datatype_id = match datatype {
                    Some(dt) => *self.term_to_id.get(&TermKey::Uri(dt.clone()))?,
                    None => NULL_ID,
                };
                TermKey::Literal {
                    value: value.clone(),
                    datatype: datatype_id,
                    language: language.clone(),
                }
            }
        };
        self.term_to_id.get(&key).copied()
    }

    pub fn decode(&self, id: ResourceId) -> Option<&ResolvedResource> {
        if id < FIRST_ID {
            return None;
        }
        self.id_to_term.get((id - FIRST_ID) as usize)
    }

    /// Expands `prefix:local` into a full URI when the prefix is registered.
    /// A value that already names a stored URI is returned unchanged.
    pub fn resolve_prefixed_uri(&self, value: &str) -> String {
        if self.term_to_id.contains_key(&TermKey::Uri(value.to_string())) {
            return value.to_string();
        }
        if let Some((prefix, local)) = value.split_once(':') {
            if let Some((_, namespace)) = self.prefixes.iter().find(|(p, _)| p == prefix) {
                return format!("{}{}", namespace, local);
            }
        }
        value.to_string()
    }

    fn intern(&mut self, key: TermKey, entry: impl FnOnce() -> ResolvedResource) -> ResourceId {
        if let Some(&id) = self.term_to_id.get(&key) {
            return id;
        }
        let id = self.id_to_term.len() as ResourceId + FIRST_ID;
        self.id_to_term.push(entry());
        self.term_to_id.insert(key, id);
        id
    }
}
