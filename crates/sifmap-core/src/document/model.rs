//! Serialized shape of a rule tree
//!
//! Copyright (c) 2025 Sifmap Team
//! Licensed under the Apache-2.0 license

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::valueset::DefaultEntry;

/// Top level of a rule document: the root scope plus declared types
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingsDocument {
    /// Declared element types
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<TypeDocument>,

    #[serde(flatten)]
    pub root: ScopeBody,
}

/// Content shared by the root and every named scope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScopeBody {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub valuesets: Vec<ValueSetDocument>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objects: Vec<ObjectDocument>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<ScopeDocument>,
}

/// A named scope with comma-separated filters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScopeDocument {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zones: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versions: Option<String>,

    #[serde(flatten)]
    pub body: ScopeBody,
}

/// Field rules of one object type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectDocument {
    pub object: String,

    #[serde(default)]
    pub fields: Vec<FieldDocument>,
}

/// One field rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDocument {
    pub name: String,

    /// Path rule text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,

    /// Tagged identifier rule, instead of `rule`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otherid: Option<OtherIdDocument>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valueset: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,

    /// `default` or `suppress`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ifnull: Option<String>,

    /// Version constraint such as `+2.0`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sif_version: Option<String>,

    /// `inbound` or `outbound`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OtherIdDocument {
    #[serde(rename = "type")]
    pub code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

/// A value set with its entries and default markers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueSetDocument {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default)]
    pub entries: Vec<ValueEntryDocument>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_default: Option<DefaultEntry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sif_default: Option<DefaultEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValueEntryDocument {
    /// Missing application values are skipped on load
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,

    pub sif: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Declared simple type of an element path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDocument {
    pub object: String,

    pub path: String,

    #[serde(rename = "type")]
    pub data_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
}
