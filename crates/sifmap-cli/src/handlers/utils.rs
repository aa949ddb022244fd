//! Shared utilities for command handlers

use crate::cli::SelectionArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use serde_json::{Map, Value};
use sifmap_core::{Mappings, ScopeId, SifVersion, StringMapAdaptor};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Scope chosen for a mapping pass
#[derive(Debug, Clone)]
pub struct Selection {
    pub node: ScopeId,
    /// Id of the chosen scope
    pub scope: String,
    pub version: SifVersion,
}

/// Load a rule document
pub fn load_mappings(path: &Path) -> Result<Mappings> {
    let _timer = Timer::with_details("load_mappings", &path.display().to_string());
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(Mappings::load_file(path)?)
}

/// Find a scope by id anywhere in the tree
pub fn find_scope(mappings: &Mappings, id: &str) -> Result<ScopeId> {
    mappings
        .find(id)
        .ok_or_else(|| Error::ScopeNotFound { id: id.to_string() })
}

/// Pick the scope to map with
///
/// Flags override the configured defaults; the version always has a value
/// because the configuration carries one.
pub fn resolve_selection(mappings: &Mappings, args: &SelectionArgs, config: &Config) -> Result<Selection> {
    let top = args.scope.as_deref().unwrap_or(&config.mapping.scope);
    let zone = args.zone.as_deref().or(config.mapping.zone.as_deref());
    let source = args.source.as_deref().or(config.mapping.source.as_deref());
    let version_text = args.sif_version.as_deref().unwrap_or(&config.mapping.version);
    let version = SifVersion::from_str(version_text)
        .map_err(|_| Error::invalid_args(format!("'{}' is not a SIF version", version_text)))?;

    let top_node = find_scope(mappings, top)?;
    let node = mappings.select(top_node, zone, source, Some(version))?;
    let scope = mappings
        .scope(node)
        .and_then(|s| s.id())
        .unwrap_or(top)
        .to_string();

    debug!(top, ?zone, ?source, %version, selected = %scope, "selected scope");
    Ok(Selection { node, scope, version })
}

/// Read one record object or an array of them from a JSON file
pub fn read_records(path: &Path) -> Result<Vec<StringMapAdaptor>> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = fs::read_to_string(path)?;
    let invalid = || Error::InvalidFormat {
        path: path.to_path_buf(),
        expected: "a JSON object or an array of objects".to_string(),
    };

    match serde_json::from_str::<Value>(&content)? {
        Value::Object(record) => Ok(vec![record_adaptor(&record).ok_or_else(invalid)?]),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_object().and_then(record_adaptor).ok_or_else(invalid))
            .collect(),
        _ => Err(invalid()),
    }
}

/// Record fields from JSON; nested values are rejected
fn record_adaptor(record: &Map<String, Value>) -> Option<StringMapAdaptor> {
    let mut adaptor = StringMapAdaptor::new();
    for (name, value) in record {
        match value {
            Value::Null => {
                adaptor.insert_null(name.as_str());
            }
            Value::String(text) => {
                adaptor.insert(name.as_str(), text.as_str());
            }
            Value::Bool(_) | Value::Number(_) => {
                adaptor.insert(name.as_str(), value.to_string());
            }
            Value::Array(_) | Value::Object(_) => return None,
        }
    }
    Some(adaptor)
}

/// Write output to a file, creating parent directories
pub fn save_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, content)?;
    Ok(())
}
