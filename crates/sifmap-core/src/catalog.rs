//! Declared simple types of data object elements
//!
//! The catalog answers "what type does this path hold" for outbound mapping,
//! standing in for the schema metadata of generated data object classes.
//! Paths are registered predicate-free relative to the object element, e.g.
//! `Demographics/BirthDate` or `OtherIdList/OtherId/@Type`.
//!
//! Copyright (c) 2025 Sifmap Team
//! Licensed under the Apache-2.0 license

use std::collections::HashMap;

use crate::types::DataType;
use crate::version::SifVersion;
use crate::xpath::PathExpr;

#[derive(Debug, Clone, PartialEq)]
struct Declaration {
    since: Option<SifVersion>,
    data_type: DataType,
}

/// Registry of declared element types, keyed by object type and path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeCatalog {
    entries: HashMap<String, Vec<Declaration>>,
}

fn catalog_key(object_type: &str, path: &str) -> String {
    format!("{}/{}", object_type, path.trim_matches('/'))
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a type for all protocol versions
    pub fn declare(&mut self, object_type: &str, path: &str, data_type: DataType) -> &mut Self {
        self.push(object_type, path, None, data_type)
    }

    /// Declare a type that applies from `since` onwards
    pub fn declare_since(
        &mut self,
        object_type: &str,
        path: &str,
        since: SifVersion,
        data_type: DataType,
    ) -> &mut Self {
        self.push(object_type, path, Some(since), data_type)
    }

    fn push(
        &mut self,
        object_type: &str,
        path: &str,
        since: Option<SifVersion>,
        data_type: DataType,
    ) -> &mut Self {
        let declarations = self.entries.entry(catalog_key(object_type, path)).or_default();
        declarations.retain(|d| d.since != since);
        declarations.push(Declaration { since, data_type });
        // latest applicable declaration first
        declarations.sort_by(|a, b| b.since.cmp(&a.since));
        self
    }

    /// Declared type of a path under an object type for a version, if known
    pub fn declared_type(
        &self,
        object_type: &str,
        path: &PathExpr,
        version: SifVersion,
    ) -> Option<DataType> {
        self.lookup(object_type, &relative_key(object_type, path), version)
    }

    /// Same as [`declared_type`](Self::declared_type) for a predicate-free path string
    pub fn lookup(&self, object_type: &str, path: &str, version: SifVersion) -> Option<DataType> {
        self.entries
            .get(&catalog_key(object_type, path))?
            .iter()
            .find(|d| d.since.map_or(true, |since| since <= version))
            .map(|d| d.data_type)
    }

    /// All declarations as `(key, since, type)`, sorted by key
    pub fn declarations(&self) -> Vec<(String, Option<SifVersion>, DataType)> {
        let mut all: Vec<_> = self
            .entries
            .iter()
            .flat_map(|(key, decls)| decls.iter().map(move |d| (key.clone(), d.since, d.data_type)))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));
        all
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Schema key of a path relative to the object element
fn relative_key(object_type: &str, path: &PathExpr) -> String {
    let key = path.schema_key();
    if path.absolute {
        if let Some(rest) = key.strip_prefix(object_type) {
            return rest.trim_start_matches('/').to_string();
        }
    }
    key
}
