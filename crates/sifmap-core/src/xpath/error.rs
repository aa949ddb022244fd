//! Error types for path expression parsing and resolution
//!
//! Copyright (c) 2025 Sifmap Team
//! Licensed under the Apache-2.0 license

use thiserror::Error;

/// Path expression errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    /// Parse errors during path expression parsing
    #[error("Parse error at position {position} in '{input}': {message}")]
    Parse {
        message: String,
        position: usize,
        input: String,
    },

    /// Syntax errors with expected/found information
    #[error("Syntax error at position {position} in '{input}': {message} (expected {}, found '{found}')", .expected.join(" or "))]
    Syntax {
        message: String,
        position: usize,
        input: String,
        expected: Vec<String>,
        found: String,
    },

    /// The path cannot be used for the requested operation
    #[error("Invalid path '{path}': {message}")]
    InvalidPath { message: String, path: String },
}

impl PathError {
    /// Create a parse error with position and context
    pub fn parse(message: impl Into<String>, position: usize, input: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            position,
            input: input.into(),
        }
    }

    /// Create a syntax error with detailed information
    pub fn syntax(
        message: impl Into<String>,
        position: usize,
        input: impl Into<String>,
        expected: Vec<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::Syntax {
            message: message.into(),
            position,
            input: input.into(),
            expected,
            found: found.into(),
        }
    }

    pub fn invalid_path(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::InvalidPath {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Byte offset of the error, if known
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Parse { position, .. } | Self::Syntax { position, .. } => Some(*position),
            Self::InvalidPath { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display() {
        let err = PathError::syntax(
            "Unexpected character",
            4,
            "Name[",
            vec!["@".to_string(), "name".to_string()],
            "EOF",
        );
        let text = err.to_string();
        assert!(text.contains("position 4"));
        assert!(text.contains("expected @ or name"));
        assert_eq!(err.position(), Some(4));
    }
}
