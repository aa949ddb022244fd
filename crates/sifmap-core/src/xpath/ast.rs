//! Abstract syntax tree for SIF path expressions
//!
//! A path is a chain of element steps, each with optional predicates, that may
//! end in an attribute reference: `OtherIdList/OtherId[@Type='06']`,
//! `Name[@Type='04']/FirstName`, `@RefId`.
//!
//! Copyright (c) 2025 Sifmap Team
//! Licensed under the Apache-2.0 license

use std::fmt;

/// A parsed path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpr {
    /// Written with a leading `/`; the first step may then name the context element
    pub absolute: bool,
    /// Element steps, relative to the context element
    pub steps: Vec<Step>,
    /// Trailing attribute reference (`@Name`), if any
    pub attribute: Option<String>,
}

/// One element step of a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Local element name
    pub name: String,
    /// Predicates that a matching element must satisfy
    pub predicates: Vec<Predicate>,
    /// Always append a fresh element when creating this step (`'value'+`)
    pub create_new: bool,
}

/// Predicate inside a step's brackets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `@Name='value'`
    Attribute { name: String, value: String },
    /// `Child='value'`
    Child { name: String, value: String },
    /// `[n]`, one-based among elements matching the other predicates
    Position(usize),
}

impl PathExpr {
    /// True if the path addresses the context element itself
    pub fn is_self(&self) -> bool {
        self.steps.is_empty() && self.attribute.is_none()
    }

    /// Predicate-free form used to look up declared types, e.g. `Name/FirstName` or `OtherId/@Type`
    pub fn schema_key(&self) -> String {
        let mut parts: Vec<String> = self.steps.iter().map(|s| s.name.clone()).collect();
        if let Some(attribute) = &self.attribute {
            parts.push(format!("@{}", attribute));
        }
        parts.join("/")
    }
}

impl Step {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            predicates: Vec::new(),
            create_new: false,
        }
    }

    /// Position predicate, if present
    pub fn position(&self) -> Option<usize> {
        self.predicates.iter().find_map(|p| match p {
            Predicate::Position(n) => Some(*n),
            _ => None,
        })
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.absolute {
            write!(f, "/")?;
        }
        let mut first = true;
        for step in &self.steps {
            if !first {
                write!(f, "/")?;
            }
            write!(f, "{}", step)?;
            first = false;
        }
        if let Some(attribute) = &self.attribute {
            if !first {
                write!(f, "/")?;
            }
            write!(f, "@{}", attribute)?;
            first = false;
        }
        if first && !self.absolute {
            write!(f, ".")?;
        }
        Ok(())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.predicates.is_empty() {
            return Ok(());
        }
        write!(f, "[")?;
        for (i, predicate) in self.predicates.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", predicate)?;
        }
        if self.create_new {
            write!(f, "+")?;
        }
        write!(f, "]")
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Attribute { name, value } => write!(f, "@{}='{}'", name, value),
            Predicate::Child { name, value } => write!(f, "{}='{}'", name, value),
            Predicate::Position(n) => write!(f, "{}", n),
        }
    }
}
