//! Rule tree documents
//!
//! Rule trees are stored as YAML or JSON documents. A document is the root
//! scope (properties, value sets, object rule sets, child scopes) plus the
//! declared element types used for typed outbound mapping:
//!
//! ```yaml
//! types:
//!   - { object: StudentPersonal, path: Demographics/BirthDate, type: date }
//! scopes:
//!   - id: Default
//!     versions: "2.0,2.1"
//!     objects:
//!       - object: StudentPersonal
//!         fields:
//!           - { name: FIRSTNAME, rule: "Name[@Type='04']/FirstName" }
//!           - { name: GRADE, otherid: { type: "06", prefix: "GRADE:" } }
//! ```
//!
//! Copyright (c) 2025 Sifmap Team
//! Licensed under the Apache-2.0 license

mod convert;
mod model;

pub use model::*;

use std::path::Path;

use tracing::debug;

use crate::mappings::Mappings;
use crate::{Error, Result};

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// YAML format (.yaml, .yml)
    Yaml,
    /// JSON format (.json)
    Json,
}

impl Format {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("yaml" | "yml") => Ok(Format::Yaml),
            Some("json") => Ok(Format::Json),
            _ => Err(Error::configuration(format!(
                "unsupported rule document format: {}",
                path.display()
            ))),
        }
    }

    /// Get the primary file extension for this format
    pub fn primary_extension(&self) -> &'static str {
        match self {
            Format::Yaml => "yaml",
            Format::Json => "json",
        }
    }
}

impl MappingsDocument {
    pub fn parse(content: &str, format: Format) -> Result<Self> {
        Ok(match format {
            Format::Yaml => serde_yaml::from_str(content)?,
            Format::Json => serde_json::from_str(content)?,
        })
    }

    pub fn render(&self, format: Format) -> Result<String> {
        Ok(match format {
            Format::Yaml => serde_yaml::to_string(self)?,
            Format::Json => serde_json::to_string_pretty(self)?,
        })
    }
}

impl Mappings {
    pub fn from_document(document: &MappingsDocument) -> Result<Self> {
        document.to_mappings()
    }

    pub fn to_document(&self) -> MappingsDocument {
        MappingsDocument::from_mappings(self)
    }

    pub fn from_str_format(content: &str, format: Format) -> Result<Self> {
        MappingsDocument::parse(content, format)?.to_mappings()
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Self::from_str_format(content, Format::Yaml)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Self::from_str_format(content, Format::Json)
    }

    pub fn to_string_format(&self, format: Format) -> Result<String> {
        self.to_document().render(format)
    }

    /// Load a rule document, detecting its format from the extension
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = Format::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        let mappings = Self::from_str_format(&content, format)?;
        debug!(path = %path.display(), scopes = mappings.len(), "loaded rule document");
        Ok(mappings)
    }

    pub fn save_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = Format::from_path(path)?;
        std::fs::write(path, self.to_string_format(format)?)?;
        debug!(path = %path.display(), "saved rule document");
        Ok(())
    }
}

#[cfg(test)]
mod tests;
