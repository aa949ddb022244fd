//! Error types for the Sifmap core library
//!
//! This module defines the error taxonomy of the mapping engine, using thiserror
//! for the enum definitions and anyhow for opaque internal failures.

use crate::types::DataType;
use crate::xpath::PathError;
use thiserror::Error;

/// Main error type for Sifmap operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed rule tree input, raised while the tree is being built
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Failure while evaluating a field rule; aborts the whole mapping pass
    #[error("Mapping error in rule '{rule}': {message}")]
    Mapping {
        rule: String,
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },

    /// Duplicate field rule key, scope id, rule set, value set or undefined default entry
    #[error("Duplicate definition: {message}")]
    DuplicateDefinition {
        kind: DefinitionKind,
        message: String,
    },

    /// Scope selection invoked on a node that is not a direct child of the root
    #[error("Selection error: {message}")]
    SelectionMisuse { message: String },

    /// Path expression could not be parsed
    #[error(transparent)]
    Path(#[from] PathError),

    /// Text could not be parsed into the requested simple type
    #[error("Cannot parse '{text}' as {data_type}")]
    Format { text: String, data_type: DataType },

    /// XML reading or writing failed
    #[error("XML error: {message}")]
    Xml { message: String },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// YAML parsing and serialization errors
    #[error("YAML error: {message}")]
    Yaml {
        message: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic internal error with context
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// What a duplicate-definition error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    FieldRule,
    Scope,
    ObjectRules,
    ValueSet,
    ValueSetDefault,
}

impl std::fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefinitionKind::FieldRule => write!(f, "field rule"),
            DefinitionKind::Scope => write!(f, "scope"),
            DefinitionKind::ObjectRules => write!(f, "object rule set"),
            DefinitionKind::ValueSet => write!(f, "value set"),
            DefinitionKind::ValueSetDefault => write!(f, "value set default"),
        }
    }
}

impl Error {
    /// Create a configuration error without a source
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a mapping error for a rule, wrapping the error that triggered it
    pub fn mapping(rule: impl Into<String>, source: Error) -> Self {
        Error::Mapping {
            rule: rule.into(),
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a mapping error for a rule from a plain message
    pub fn mapping_message(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Mapping {
            rule: rule.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn duplicate(kind: DefinitionKind, message: impl Into<String>) -> Self {
        Error::DuplicateDefinition {
            kind,
            message: message.into(),
        }
    }

    pub fn selection(message: impl Into<String>) -> Self {
        Error::SelectionMisuse {
            message: message.into(),
        }
    }

    pub fn format(text: impl Into<String>, data_type: DataType) -> Self {
        Error::Format {
            text: text.into(),
            data_type,
        }
    }

    pub fn xml(message: impl Into<String>) -> Self {
        Error::Xml {
            message: message.into(),
        }
    }

    /// Rule text of a mapping error, if this is one
    pub fn rule(&self) -> Option<&str> {
        match self {
            Error::Mapping { rule, .. } => Some(rule),
            _ => None,
        }
    }
}

// Conversion implementations
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Yaml {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal {
            message: err.to_string(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_error_names_rule() {
        let err = Error::mapping(
            "Name[@Type='04']/FirstName",
            Error::format("abc", DataType::Int),
        );
        assert_eq!(err.rule(), Some("Name[@Type='04']/FirstName"));
        assert!(err.to_string().contains("Name[@Type='04']/FirstName"));
        assert!(err.to_string().contains("Cannot parse 'abc' as int"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_duplicate_display() {
        let err = Error::duplicate(DefinitionKind::FieldRule, "FIRSTNAME already defined");
        assert_eq!(
            err.to_string(),
            "Duplicate definition: FIRSTNAME already defined"
        );
    }

    #[test]
    fn test_configuration_display() {
        let err = Error::configuration("missing field name");
        assert_eq!(err.to_string(), "Configuration error: missing field name");
        assert!(err.rule().is_none());
    }
}
