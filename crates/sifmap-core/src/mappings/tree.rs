//! Rule tree storage and inherited lookups
//!
//! Copyright (c) 2025 Sifmap Team
//! Licensed under the Apache-2.0 license

use std::collections::HashSet;
use std::sync::Arc;

use super::scope::{Scope, ScopeId};
use crate::catalog::TypeCatalog;
use crate::error::DefinitionKind;
use crate::field_rule::FieldRule;
use crate::object_mapping::ObjectMapping;
use crate::valuebuilder::FunctionRegistry;
use crate::valueset::ValueSet;
use crate::version::SifVersion;
use crate::{Error, Result};

const ROOT: ScopeId = ScopeId(0);

/// The rule tree
///
/// Scopes live in an arena and refer to each other by [`ScopeId`]. The root
/// scope always exists and has no id. A scope without its own rule set, value
/// set or property falls back to the nearest ancestor that has one.
#[derive(Debug, Clone)]
pub struct Mappings {
    nodes: Vec<Option<Scope>>,
    catalog: Arc<TypeCatalog>,
    functions: Arc<FunctionRegistry>,
}

impl Default for Mappings {
    fn default() -> Self {
        Self::new()
    }
}

impl Mappings {
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(Scope::new(None, None))],
            catalog: Arc::new(TypeCatalog::new()),
            functions: Arc::new(FunctionRegistry::new()),
        }
    }

    pub fn root(&self) -> ScopeId {
        ROOT
    }

    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> Option<&mut Scope> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    pub(crate) fn node(&self, id: ScopeId) -> Result<&Scope> {
        self.scope(id)
            .ok_or_else(|| Error::configuration(format!("unknown scope {}", id)))
    }

    fn node_mut(&mut self, id: ScopeId) -> Result<&mut Scope> {
        self.scope_mut(id)
            .ok_or_else(|| Error::configuration(format!("unknown scope {}", id)))
    }

    /// Declared element types used by outbound mapping
    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut TypeCatalog {
        Arc::make_mut(&mut self.catalog)
    }

    pub fn set_catalog(&mut self, catalog: TypeCatalog) {
        self.catalog = Arc::new(catalog);
    }

    pub(crate) fn shared_catalog(&self) -> Arc<TypeCatalog> {
        Arc::clone(&self.catalog)
    }

    /// Functions available to rule assignment expressions
    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub fn functions_mut(&mut self) -> &mut FunctionRegistry {
        Arc::make_mut(&mut self.functions)
    }

    pub(crate) fn shared_functions(&self) -> Arc<FunctionRegistry> {
        Arc::clone(&self.functions)
    }

    /// Add a child scope; ids are unique among siblings
    pub fn add_child(&mut self, parent: ScopeId, id: impl Into<String>) -> Result<ScopeId> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(Error::configuration("scope id must not be empty"));
        }
        if self.child_by_id(parent, &id).is_some() {
            let parent_id = self.node(parent)?.display_id().to_string();
            return Err(Error::duplicate(
                DefinitionKind::Scope,
                format!("scope '{}' already has a child '{}'", parent_id, id),
            ));
        }
        self.node(parent)?;

        let child = ScopeId(self.nodes.len());
        self.nodes.push(Some(Scope::new(Some(id), Some(parent))));
        self.node_mut(parent)?.children.push(child);
        Ok(child)
    }

    /// Remove a child scope and its whole subtree
    pub fn remove_child(&mut self, parent: ScopeId, id: &str) -> Result<bool> {
        let Some(child) = self.child_by_id(parent, id) else {
            return Ok(false);
        };
        for node in self.subtree(child) {
            self.nodes[node.0] = None;
        }
        self.node_mut(parent)?.children.retain(|c| *c != child);
        Ok(true)
    }

    pub fn child_by_id(&self, parent: ScopeId, id: &str) -> Option<ScopeId> {
        self.scope(parent)?
            .children
            .iter()
            .copied()
            .find(|c| self.scope(*c).and_then(Scope::id) == Some(id))
    }

    /// First scope with the given id, searching depth first from the root
    pub fn find(&self, id: &str) -> Option<ScopeId> {
        self.descendants(ROOT)
            .into_iter()
            .find(|s| self.scope(*s).and_then(Scope::id) == Some(id))
    }

    /// Child with the given id, added if missing
    pub fn find_or_create(&mut self, parent: ScopeId, id: &str) -> Result<ScopeId> {
        match self.child_by_id(parent, id) {
            Some(child) => Ok(child),
            None => self.add_child(parent, id),
        }
    }

    /// Direct children of the root
    pub fn top_level(&self) -> &[ScopeId] {
        self.scope(ROOT).map(Scope::children).unwrap_or_default()
    }

    /// All scopes below `node` in pre-order, excluding `node`
    pub fn descendants(&self, node: ScopeId) -> Vec<ScopeId> {
        let mut out = self.subtree(node);
        if !out.is_empty() {
            out.remove(0);
        }
        out
    }

    /// `node` and everything below it in pre-order
    fn subtree(&self, node: ScopeId) -> Vec<ScopeId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let Some(scope) = self.scope(current) else {
                continue;
            };
            out.push(current);
            stack.extend(scope.children.iter().rev().copied());
        }
        out
    }

    /// `node` followed by its ancestors up to the root
    pub fn ancestry(&self, node: ScopeId) -> impl Iterator<Item = (ScopeId, &Scope)> + '_ {
        std::iter::successors(self.scope(node).map(|s| (node, s)), move |(_, scope)| {
            let parent = scope.parent?;
            self.scope(parent).map(|s| (parent, s))
        })
    }

    /// Number of live scopes, root included
    pub fn len(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Inherited zone filter verdict: -1 disallowed, 0 unfiltered, 1 matched
    pub fn allows_zone(&self, node: ScopeId, zone: &str) -> i32 {
        self.inherited_verdict(node, |s| s.zones().map(|z| z.iter().any(|v| v == zone)))
    }

    pub fn allows_source(&self, node: ScopeId, source: &str) -> i32 {
        self.inherited_verdict(node, |s| s.sources().map(|z| z.iter().any(|v| v == source)))
    }

    pub fn allows_version(&self, node: ScopeId, version: SifVersion) -> i32 {
        self.inherited_verdict(node, |s| s.versions().map(|v| v.contains(&version)))
    }

    fn inherited_verdict(&self, node: ScopeId, check: impl Fn(&Scope) -> Option<bool>) -> i32 {
        self.ancestry(node)
            .find_map(|(_, scope)| check(scope))
            .map_or(0, |matched| if matched { 1 } else { -1 })
    }

    /// Rule set for an object type, optionally from the nearest ancestor
    pub fn object_mapping(
        &self,
        node: ScopeId,
        object_type: &str,
        inherited: bool,
    ) -> Option<&ObjectMapping> {
        if !inherited {
            return self.scope(node)?.object_mapping(object_type);
        }
        self.ancestry(node)
            .find_map(|(_, scope)| scope.object_mapping(object_type))
    }

    /// Field rules for an object type
    ///
    /// With `inherited`, rules of every ancestor's rule set follow the local
    /// ones, skipping any whose key was already seen closer to `node`.
    pub fn rules_for(&self, node: ScopeId, object_type: &str, inherited: bool) -> Vec<&FieldRule> {
        if !inherited {
            return self
                .object_mapping(node, object_type, false)
                .map(|m| m.rules().iter().collect())
                .unwrap_or_default();
        }

        let mut seen = HashSet::new();
        let mut rules = Vec::new();
        for (_, scope) in self.ancestry(node) {
            let Some(mapping) = scope.object_mapping(object_type) else {
                continue;
            };
            for rule in mapping.rules() {
                if seen.insert(rule.key()) {
                    rules.push(rule);
                }
            }
        }
        rules
    }

    pub fn value_set(&self, node: ScopeId, id: &str, inherited: bool) -> Option<&ValueSet> {
        if !inherited {
            return self.scope(node)?.value_set(id);
        }
        self.ancestry(node).find_map(|(_, scope)| scope.value_set(id))
    }

    pub fn property(&self, node: ScopeId, name: &str, inherited: bool) -> Option<&str> {
        if !inherited {
            return self.scope(node)?.property(name);
        }
        self.ancestry(node).find_map(|(_, scope)| scope.property(name))
    }

    /// Deep-copy `source` with its subtree under `new_parent` as `new_id`
    pub fn copy_subtree(&mut self, source: ScopeId, new_parent: ScopeId, new_id: &str) -> Result<ScopeId> {
        if self.subtree(source).contains(&new_parent) {
            return Err(Error::configuration(format!(
                "cannot copy scope '{}' into its own subtree",
                self.node(source)?.display_id()
            )));
        }
        let copy = self.add_child(new_parent, new_id)?;
        self.copy_content(source, copy)?;
        Ok(copy)
    }

    fn copy_content(&mut self, source: ScopeId, target: ScopeId) -> Result<()> {
        let original = self.node(source)?;
        let children = original.children.clone();
        let mut copied = original.detached(self.node(target)?.id.clone(), self.node(target)?.parent);
        copied.children = std::mem::take(&mut self.node_mut(target)?.children);
        *self.node_mut(target)? = copied;

        for child in children {
            let child_id = self
                .node(child)?
                .id
                .clone()
                .ok_or_else(|| Error::configuration("child scope without id"))?;
            let copied = self.add_child(target, child_id)?;
            self.copy_content(child, copied)?;
        }
        Ok(())
    }
}
