//! Conversion between rule documents and rule trees
//!
//! Copyright (c) 2025 Sifmap Team
//! Licensed under the Apache-2.0 license

use super::model::*;
use crate::catalog::TypeCatalog;
use crate::field_rule::{FieldRule, NullBehavior};
use crate::filter::MappingsFilter;
use crate::mappings::{parse_filter_list, Mappings, Scope, ScopeId};
use crate::object_mapping::ObjectMapping;
use crate::rule::Rule;
use crate::types::DataType;
use crate::valueset::ValueSet;
use crate::{Error, Result};

impl MappingsDocument {
    /// Build a rule tree, validating every entry
    pub fn to_mappings(&self) -> Result<Mappings> {
        let mut mappings = Mappings::new();
        mappings.set_catalog(load_catalog(&self.types)?);
        let root = mappings.root();
        load_body(&mut mappings, root, &self.root)?;
        Ok(mappings)
    }

    /// Document form of a rule tree
    pub fn from_mappings(mappings: &Mappings) -> Self {
        let types = mappings
            .catalog()
            .declarations()
            .into_iter()
            .filter_map(|(key, since, data_type)| {
                let (object, path) = key.split_once('/')?;
                Some(TypeDocument {
                    object: object.to_string(),
                    path: path.to_string(),
                    data_type: data_type.to_string(),
                    since: since.map(|v| v.to_string()),
                })
            })
            .collect();

        Self {
            types,
            root: save_body(mappings, mappings.root()),
        }
    }
}

fn load_catalog(types: &[TypeDocument]) -> Result<TypeCatalog> {
    let mut catalog = TypeCatalog::new();
    for entry in types {
        let data_type: DataType = entry.data_type.parse()?;
        match &entry.since {
            Some(since) => catalog.declare_since(&entry.object, &entry.path, since.parse()?, data_type),
            None => catalog.declare(&entry.object, &entry.path, data_type),
        };
    }
    Ok(catalog)
}

fn scope_mut(mappings: &mut Mappings, node: ScopeId) -> Result<&mut Scope> {
    mappings
        .scope_mut(node)
        .ok_or_else(|| Error::configuration(format!("unknown scope {}", node)))
}

fn load_body(mappings: &mut Mappings, node: ScopeId, body: &ScopeBody) -> Result<()> {
    let scope = scope_mut(mappings, node)?;
    for (name, value) in &body.properties {
        scope.set_property(name.as_str(), value.as_str());
    }
    for document in &body.valuesets {
        scope.add_value_set(load_value_set(document)?)?;
    }
    for document in &body.objects {
        if document.object.trim().is_empty() {
            return Err(Error::configuration("object rule set without an object type"));
        }
        let mut mapping = ObjectMapping::new(document.object.as_str());
        for field in &document.fields {
            mapping.add_rule(load_field(field)?)?;
        }
        scope.add_object_mapping(mapping)?;
    }

    for document in &body.scopes {
        let child = mappings.add_child(node, document.id.as_str())?;
        let scope = scope_mut(mappings, child)?;
        scope.set_zones(document.zones.as_deref().and_then(parse_filter_list));
        scope.set_sources(document.sources.as_deref().and_then(parse_filter_list));
        if let Some(versions) = &document.versions {
            scope.set_versions_text(versions).map_err(|e| {
                Error::configuration(format!("scope '{}': {}", document.id, e))
            })?;
        }
        load_body(mappings, child, &document.body)?;
    }
    Ok(())
}

fn load_value_set(document: &ValueSetDocument) -> Result<ValueSet> {
    if document.id.trim().is_empty() {
        return Err(Error::configuration("value set without an id"));
    }
    let mut set = ValueSet::new(document.id.as_str());
    if let Some(title) = &document.title {
        set = set.with_title(title.as_str());
    }
    for entry in &document.entries {
        set.define(entry.app.as_deref(), entry.sif.as_str(), entry.title.as_deref());
    }
    if let Some(default) = &document.app_default {
        set.set_app_default(Some(&default.value), default.render_if_null)?;
    }
    if let Some(default) = &document.sif_default {
        set.set_sif_default(Some(&default.value), default.render_if_null)?;
    }
    Ok(set)
}

fn load_field(document: &FieldDocument) -> Result<FieldRule> {
    let in_field = |e: Error| match e {
        Error::Configuration { message, .. } => {
            Error::configuration(format!("field '{}': {}", document.name, message))
        }
        other => other,
    };

    let rule = match (&document.rule, &document.otherid) {
        (Some(text), None) => Rule::path(text.as_str()),
        (None, Some(other_id)) => Rule::other_id(other_id.code.as_str(), other_id.prefix.clone()),
        (Some(_), Some(_)) => {
            return Err(in_field(Error::configuration("has both 'rule' and 'otherid'")))
        }
        (None, None) => return Err(in_field(Error::configuration("has no rule"))),
    };

    let mut builder = FieldRule::builder(document.name.as_str(), rule);
    if let Some(alias) = &document.alias {
        builder = builder.alias(alias.as_str());
    }
    if let Some(default) = &document.default {
        builder = builder.default_value(default.as_str());
    }
    if let Some(value_set) = &document.valueset {
        builder = builder.value_set(value_set.as_str());
    }
    if let Some(data_type) = &document.datatype {
        builder = builder.data_type(data_type.parse().map_err(in_field)?);
    }
    if let Some(null_behavior) = &document.ifnull {
        builder = builder.null_behavior(null_behavior.parse().map_err(in_field)?);
    }

    let mut filter = MappingsFilter::new();
    if let Some(direction) = &document.direction {
        filter.direction = Some(direction.parse().map_err(in_field)?);
    }
    if let Some(version) = &document.sif_version {
        filter.version = Some(version.parse().map_err(in_field)?);
    }
    builder.filter(filter).build()
}

fn save_body(mappings: &Mappings, node: ScopeId) -> ScopeBody {
    let Some(scope) = mappings.scope(node) else {
        return ScopeBody::default();
    };

    ScopeBody {
        properties: scope.properties().clone(),
        valuesets: scope.value_sets().iter().map(save_value_set).collect(),
        objects: scope
            .object_mappings()
            .iter()
            .map(|mapping| ObjectDocument {
                object: mapping.object_type().to_string(),
                fields: mapping.rules().iter().map(save_field).collect(),
            })
            .collect(),
        scopes: scope
            .children()
            .iter()
            .filter_map(|child| {
                let child_scope = mappings.scope(*child)?;
                Some(ScopeDocument {
                    id: child_scope.id()?.to_string(),
                    zones: child_scope.zones().map(|z| z.join(",")),
                    sources: child_scope.sources().map(|s| s.join(",")),
                    versions: child_scope.versions().map(|v| {
                        v.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
                    }),
                    body: save_body(mappings, *child),
                })
            })
            .collect(),
    }
}

fn save_value_set(set: &ValueSet) -> ValueSetDocument {
    ValueSetDocument {
        id: set.id().to_string(),
        title: set.title().map(str::to_string),
        entries: set
            .entries()
            .iter()
            .map(|e| ValueEntryDocument {
                app: Some(e.app.clone()),
                sif: e.sif.clone(),
                title: e.title.clone(),
            })
            .collect(),
        app_default: set.app_default().cloned(),
        sif_default: set.sif_default().cloned(),
    }
}

fn save_field(rule: &FieldRule) -> FieldDocument {
    let (path, other_id) = match rule.rule() {
        Rule::Path(path) => (Some(path.text().to_string()), None),
        Rule::OtherId(other_id) => (
            None,
            Some(OtherIdDocument {
                code: other_id.code().to_string(),
                prefix: other_id.prefix().map(str::to_string),
            }),
        ),
    };

    FieldDocument {
        name: rule.name().to_string(),
        rule: path,
        otherid: other_id,
        alias: rule.alias().map(str::to_string),
        default: rule.default_value().map(str::to_string),
        valueset: rule.value_set().map(str::to_string),
        datatype: (rule.data_type() != DataType::String).then(|| rule.data_type().to_string()),
        ifnull: match rule.null_behavior() {
            NullBehavior::Unspecified => None,
            other => Some(other.to_string()),
        },
        sif_version: rule.filter().and_then(|f| f.version).map(|v| v.to_string()),
        direction: rule.filter().and_then(|f| f.direction).map(|d| d.to_string()),
    }
}
