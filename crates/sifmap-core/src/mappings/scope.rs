//! A single scope of the rule tree
//!
//! Copyright (c) 2025 Sifmap Team
//! Licensed under the Apache-2.0 license

use std::collections::BTreeMap;
use std::fmt;

use crate::error::DefinitionKind;
use crate::object_mapping::ObjectMapping;
use crate::valueset::ValueSet;
use crate::version::{SifVersion, WILDCARD};
use crate::{Error, Result};

/// Stable handle of a scope inside a [`Mappings`](super::Mappings) tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub(crate) usize);

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Split a comma-separated filter list; a wildcard entry means "no filter"
pub fn parse_filter_list(text: &str) -> Option<Vec<String>> {
    let items: Vec<String> = text
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    normalize_filter(items)
}

fn normalize_filter(items: Vec<String>) -> Option<Vec<String>> {
    if items.is_empty() || items.iter().any(|i| i == WILDCARD) {
        None
    } else {
        Some(items)
    }
}

/// One named, filterable scope owning rule sets, value sets and properties
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub(crate) id: Option<String>,
    pub(crate) parent: Option<ScopeId>,
    pub(crate) children: Vec<ScopeId>,
    zones: Option<Vec<String>>,
    sources: Option<Vec<String>>,
    versions: Option<Vec<SifVersion>>,
    objects: Vec<ObjectMapping>,
    value_sets: Vec<ValueSet>,
    properties: BTreeMap<String, String>,
}

impl Scope {
    pub(crate) fn new(id: Option<String>, parent: Option<ScopeId>) -> Self {
        Self {
            id,
            parent,
            ..Default::default()
        }
    }

    /// Scope id; `None` only for the root
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    pub fn children(&self) -> &[ScopeId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn zones(&self) -> Option<&[String]> {
        self.zones.as_deref()
    }

    pub fn sources(&self) -> Option<&[String]> {
        self.sources.as_deref()
    }

    pub fn versions(&self) -> Option<&[SifVersion]> {
        self.versions.as_deref()
    }

    pub fn set_zones(&mut self, zones: Option<Vec<String>>) {
        self.zones = zones.and_then(normalize_filter);
    }

    pub fn set_sources(&mut self, sources: Option<Vec<String>>) {
        self.sources = sources.and_then(normalize_filter);
    }

    pub fn set_versions(&mut self, versions: Option<Vec<SifVersion>>) {
        self.versions = versions.filter(|v| !v.is_empty());
    }

    /// Parse a comma-separated version list, `*` meaning any version
    pub fn set_versions_text(&mut self, text: &str) -> Result<()> {
        let versions = match parse_filter_list(text) {
            None => None,
            Some(items) => Some(
                items
                    .iter()
                    .map(|v| v.parse::<SifVersion>())
                    .collect::<Result<Vec<_>>>()?,
            ),
        };
        self.set_versions(versions);
        Ok(())
    }

    /// Number of locally stored filter values
    pub fn restrictiveness(&self) -> usize {
        self.zones.as_ref().map_or(0, Vec::len)
            + self.sources.as_ref().map_or(0, Vec::len)
            + self.versions.as_ref().map_or(0, Vec::len)
    }

    pub fn object_mappings(&self) -> &[ObjectMapping] {
        &self.objects
    }

    pub fn object_mapping(&self, object_type: &str) -> Option<&ObjectMapping> {
        self.objects.iter().find(|o| o.object_type() == object_type)
    }

    pub fn object_mapping_mut(&mut self, object_type: &str) -> Option<&mut ObjectMapping> {
        self.objects.iter_mut().find(|o| o.object_type() == object_type)
    }

    /// Add a rule set; one per object type
    pub fn add_object_mapping(&mut self, mapping: ObjectMapping) -> Result<()> {
        if self.object_mapping(mapping.object_type()).is_some() {
            return Err(Error::duplicate(
                DefinitionKind::ObjectRules,
                format!(
                    "scope '{}' already has rules for {}",
                    self.display_id(),
                    mapping.object_type()
                ),
            ));
        }
        self.objects.push(mapping);
        Ok(())
    }

    /// Rule set for an object type, created empty if missing
    pub fn object_mapping_or_insert(&mut self, object_type: &str) -> &mut ObjectMapping {
        let index = match self.objects.iter().position(|o| o.object_type() == object_type) {
            Some(index) => index,
            None => {
                self.objects.push(ObjectMapping::new(object_type));
                self.objects.len() - 1
            }
        };
        &mut self.objects[index]
    }

    pub fn remove_object_mapping(&mut self, object_type: &str) -> Option<ObjectMapping> {
        let index = self.objects.iter().position(|o| o.object_type() == object_type)?;
        Some(self.objects.remove(index))
    }

    pub fn value_sets(&self) -> &[ValueSet] {
        &self.value_sets
    }

    pub fn value_set(&self, id: &str) -> Option<&ValueSet> {
        self.value_sets.iter().find(|v| v.id() == id)
    }

    pub fn value_set_mut(&mut self, id: &str) -> Option<&mut ValueSet> {
        self.value_sets.iter_mut().find(|v| v.id() == id)
    }

    pub fn add_value_set(&mut self, value_set: ValueSet) -> Result<()> {
        if self.value_set(value_set.id()).is_some() {
            return Err(Error::duplicate(
                DefinitionKind::ValueSet,
                format!(
                    "scope '{}' already defines value set '{}'",
                    self.display_id(),
                    value_set.id()
                ),
            ));
        }
        self.value_sets.push(value_set);
        Ok(())
    }

    pub fn remove_value_set(&mut self, id: &str) -> Option<ValueSet> {
        let index = self.value_sets.iter().position(|v| v.id() == id)?;
        Some(self.value_sets.remove(index))
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(name.into(), value.into());
    }

    pub fn remove_property(&mut self, name: &str) -> Option<String> {
        self.properties.remove(name)
    }

    pub(crate) fn display_id(&self) -> &str {
        self.id.as_deref().unwrap_or("<root>")
    }

    /// Copy of the scope's own content without tree links
    pub(crate) fn detached(&self, id: Option<String>, parent: Option<ScopeId>) -> Self {
        Self {
            id,
            parent,
            children: Vec::new(),
            ..self.clone()
        }
    }
}
