//! Field rule evaluation units
//!
//! A [`Rule`] locates the value of one field inside a data object. Path rules
//! address an element or attribute with a path expression and can create that
//! location when mapping outbound. OtherId rules pick a tagged identifier out
//! of an `OtherId` list and only take part in inbound mapping; outbound
//! tagged identifiers are written with a path rule carrying an assignment,
//! such as `OtherIdList/OtherId[@Type='ZZ'+]=SCHOOL:$(SCHOOLNUM)`.
//!
//! Copyright (c) 2025 Sifmap Team
//! Licensed under the Apache-2.0 license

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::element::Element;
use crate::xpath::{self, NodeTarget, PathExpr};
use crate::Result;

/// A rule bound to one field
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Path(PathRule),
    OtherId(OtherIdRule),
}

impl Rule {
    /// Path rule from rule text, which may carry a trailing `=expression`
    pub fn path(text: impl Into<String>) -> Self {
        Rule::Path(PathRule::new(text))
    }

    pub fn other_id(code: impl Into<String>, prefix: Option<String>) -> Self {
        Rule::OtherId(OtherIdRule::new(code, prefix))
    }

    /// Read the rule's value from a data object
    pub fn evaluate(&self, root: &Element) -> Result<Option<String>> {
        match self {
            Rule::Path(rule) => rule.evaluate(root),
            Rule::OtherId(rule) => Ok(rule.evaluate(root)),
        }
    }

    /// Resolve or create the rule's location for writing; `None` for rules
    /// that do not map outbound
    pub fn create_target<'a>(&self, root: &'a mut Element) -> Result<Option<NodeTarget<'a>>> {
        match self {
            Rule::Path(rule) => rule.create_target(root).map(Some),
            Rule::OtherId(_) => Ok(None),
        }
    }

    /// Embedded assignment expression, if any
    pub fn value_expression(&self) -> Option<&str> {
        match self {
            Rule::Path(rule) => rule.value_expression(),
            Rule::OtherId(_) => None,
        }
    }

    pub fn as_path(&self) -> Option<&PathRule> {
        match self {
            Rule::Path(rule) => Some(rule),
            Rule::OtherId(_) => None,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Path(rule) => f.write_str(rule.text()),
            Rule::OtherId(rule) => write!(f, "{}", rule),
        }
    }
}

/// Split rule text into its path and optional assignment expression.
///
/// The assignment starts at the last `=` after the last `]`, so predicate
/// comparisons are never mistaken for an assignment.
pub fn split_assignment(text: &str) -> (&str, Option<&str>) {
    let search_from = text.rfind(']').map_or(0, |i| i + 1);
    match text[search_from..].rfind('=') {
        Some(offset) => {
            let at = search_from + offset;
            (text[..at].trim(), Some(&text[at + 1..]))
        }
        None => (text.trim(), None),
    }
}

/// A rule addressing a location with a path expression
#[derive(Debug, Default)]
pub struct PathRule {
    text: String,
    path_text: String,
    value_expression: Option<String>,
    compiled: OnceLock<Arc<PathExpr>>,
}

impl PathRule {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let (path_text, value_expression) = split_assignment(&text);
        let path_text = path_text.to_string();
        let value_expression = value_expression.map(str::to_string);
        Self {
            text,
            path_text,
            value_expression,
            compiled: OnceLock::new(),
        }
    }

    /// Full rule text as written
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Path portion of the rule text
    pub fn path_text(&self) -> &str {
        &self.path_text
    }

    pub fn value_expression(&self) -> Option<&str> {
        self.value_expression.as_deref()
    }

    /// Parsed path, compiled on first use
    pub fn compiled(&self) -> Result<Arc<PathExpr>> {
        if let Some(path) = self.compiled.get() {
            return Ok(Arc::clone(path));
        }
        let path = Arc::new(xpath::parse(&self.path_text)?);
        Ok(Arc::clone(self.compiled.get_or_init(|| path)))
    }

    pub fn evaluate(&self, root: &Element) -> Result<Option<String>> {
        let path = self.compiled()?;
        Ok(xpath::select_value(root, &path))
    }

    pub fn create_target<'a>(&self, root: &'a mut Element) -> Result<NodeTarget<'a>> {
        let path = self.compiled()?;
        Ok(xpath::create(root, &path)?)
    }
}

impl Clone for PathRule {
    fn clone(&self) -> Self {
        let clone = Self::new(self.text.clone());
        if let Some(path) = self.compiled.get() {
            let _ = clone.compiled.set(Arc::clone(path));
        }
        clone
    }
}

impl PartialEq for PathRule {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

/// A rule matching a tagged `OtherId` element by type code and value prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtherIdRule {
    code: String,
    prefix: Option<String>,
}

impl OtherIdRule {
    pub fn new(code: impl Into<String>, prefix: Option<String>) -> Self {
        Self {
            code: code.into(),
            prefix: prefix.filter(|p| !p.is_empty()),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Value of the first matching identifier, prefix stripped
    pub fn evaluate(&self, root: &Element) -> Option<String> {
        let direct = root.children_named("OtherId");
        let listed = root
            .children_named("OtherIdList")
            .flat_map(|list| list.children_named("OtherId"));

        direct.chain(listed).find_map(|id| {
            if id.attribute("Type") != Some(self.code.as_str()) {
                return None;
            }
            let text = id.text().unwrap_or_default();
            match &self.prefix {
                Some(prefix) => text.strip_prefix(prefix.as_str()).map(str::to_string),
                None => Some(text.to_string()),
            }
        })
    }
}

impl fmt::Display for OtherIdRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OtherId[@Type='{}']", self.code)?;
        if let Some(prefix) = &self.prefix {
            write!(f, "{}*", prefix)?;
        }
        Ok(())
    }
}
