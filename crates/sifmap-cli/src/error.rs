//! Error types and handling for the CLI

use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error from the mapping engine
    #[error(transparent)]
    Core(#[from] sifmap_core::Error),

    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Invalid file format for {}: expected {}", path.display(), expected)]
    InvalidFormat { path: PathBuf, expected: String },

    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument combination or value
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Scope '{}' not found in the rule document", id)]
    ScopeNotFound { id: String },

    #[error("Value set '{}' not found in scope '{}' or its ancestors", id, scope)]
    ValueSetNotFound { id: String, scope: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{message}")]
    Other { message: String },
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs(message.into())
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::Core(_) => 2,
            Self::FileNotFound { .. } => 3,
            Self::InvalidFormat { .. } => 4,
            Self::Config(_) => 5,
            Self::InvalidArgs(_) => 6,
            Self::ScopeNotFound { .. } => 7,
            Self::ValueSetNotFound { .. } => 8,
            Self::Json(_) => 12,
            Self::Yaml(_) => 13,
            Self::Other { .. } => 99,
        }
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::InvalidArgs(_))
    }
}

/// Format an error for display to the user
///
/// A failed mapping pass names the rule it stopped at; the underlying
/// cause is listed below it.
pub fn format_error(error: &Error, use_color: bool) -> String {
    use colored::Colorize;

    let mut output = if use_color {
        format!("{} {}", "Error:".red().bold(), error)
    } else {
        format!("Error: {}", error)
    };

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        let line = format!("  caused by: {}", cause);
        if use_color {
            output.push_str(&format!("\n{}", line.dimmed()));
        } else {
            output.push('\n');
            output.push_str(&line);
        }
        source = cause.source();
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::config("x").exit_code(), 5);
        assert_eq!(Error::invalid_args("x").exit_code(), 6);
        assert_eq!(
            Error::ScopeNotFound {
                id: "MA".to_string()
            }
            .exit_code(),
            7
        );
        assert_eq!(Error::other("x").exit_code(), 99);
        assert!(Error::invalid_args("x").should_show_help());
        assert!(!Error::other("x").should_show_help());
    }

    #[test]
    fn test_format_error_lists_causes() {
        let cause = sifmap_core::Error::format("not a date", sifmap_core::DataType::Date);
        let error = Error::from(sifmap_core::Error::mapping("Demographics/BirthDate", cause));

        let formatted = format_error(&error, false);
        let mut lines = formatted.lines();
        assert_eq!(
            lines.next(),
            Some("Error: Mapping error in rule 'Demographics/BirthDate': Cannot parse 'not a date' as date")
        );
        assert_eq!(lines.next(), Some("  caused by: Cannot parse 'not a date' as date"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_format_error_plain() {
        let error = Error::FileNotFound {
            path: PathBuf::from("rules.yaml"),
        };
        assert_eq!(format_error(&error, false), "Error: File not found: rules.yaml");
    }
}
