//! Assignment expressions of outbound rules
//!
//! The text after the assignment `=` of a path rule is a small template:
//!
//! - literal text is copied as is,
//! - `$(FIELD)` inserts the raw value of a record field (empty if absent),
//! - `@name(arg, ...)` calls a registered function with evaluated arguments.
//!
//! Arguments may be quoted with `'` or `"` to keep commas and surrounding
//! spaces. An `@` not followed by a name and `(` is literal text, so e-mail
//! addresses need no escaping. A backslash escapes the next character.
//!
//! Copyright (c) 2025 Sifmap Team
//! Licensed under the Apache-2.0 license

use std::collections::HashMap;
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;
use std::sync::Arc;

use crate::adaptor::FieldAdaptor;
use crate::{Error, Result};

/// A function callable from assignment expressions
pub type ValueFunction = Arc<dyn Fn(&[String]) -> Result<String> + Send + Sync>;

/// Named functions available to assignment expressions
#[derive(Clone)]
pub struct FunctionRegistry {
    functions: HashMap<String, ValueFunction>,
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.names())
            .finish()
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry {
    /// Registry with the built-in functions
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_builtins();
        registry
    }

    pub fn empty() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// Register a function under a name, replacing any previous one.
    ///
    /// Application functions are conventionally registered under a fully
    /// qualified name such as `district::school_code`.
    pub fn register<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&[String]) -> Result<String> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(function));
    }

    pub fn get(&self, name: &str) -> Option<&ValueFunction> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn call(&self, name: &str, args: &[String]) -> Result<String> {
        let function = self
            .get(name)
            .ok_or_else(|| Error::mapping_message(format!("@{}", name), "unknown function"))?;
        function(args)
    }

    fn register_builtins(&mut self) {
        self.register("concat", |args| Ok(args.concat()));
        self.register("upper", |args| Ok(single("upper", args)?.to_uppercase()));
        self.register("lower", |args| Ok(single("lower", args)?.to_lowercase()));
        self.register("trim", |args| Ok(single("trim", args)?.trim().to_string()));
        self.register("left", |args| {
            let (text, count) = match args {
                [text, count] => (text, parse_count("left", count)?),
                _ => return Err(arity("left", "2")),
            };
            Ok(text.chars().take(count).collect())
        });
        self.register("pad", |args| {
            let (text, width, fill) = match args {
                [text, width] => (text, parse_count("pad", width)?, ' '),
                [text, width, fill] => (
                    text,
                    parse_count("pad", width)?,
                    fill.chars().next().unwrap_or(' '),
                ),
                _ => return Err(arity("pad", "2 or 3")),
            };
            let length = text.chars().count();
            let mut padded: String = std::iter::repeat(fill)
                .take(width.saturating_sub(length))
                .collect();
            padded.push_str(text);
            Ok(padded)
        });
    }
}

fn single<'a>(name: &str, args: &'a [String]) -> Result<&'a str> {
    match args {
        [arg] => Ok(arg.as_str()),
        _ => Err(arity(name, "1")),
    }
}

fn arity(name: &str, expected: &str) -> Error {
    Error::mapping_message(
        format!("@{}", name),
        format!("expects {} argument(s)", expected),
    )
}

fn parse_count(name: &str, text: &str) -> Result<usize> {
    text.trim().parse().map_err(|_| {
        Error::mapping_message(format!("@{}", name), format!("'{}' is not a count", text))
    })
}

/// Evaluates assignment expressions against a record
pub struct ValueBuilder<'a> {
    adaptor: &'a dyn FieldAdaptor,
    registry: &'a FunctionRegistry,
}

impl<'a> ValueBuilder<'a> {
    pub fn new(adaptor: &'a dyn FieldAdaptor, registry: &'a FunctionRegistry) -> Self {
        Self { adaptor, registry }
    }

    pub fn evaluate(&self, expression: &str) -> Result<String> {
        let mut cursor = Cursor {
            source: expression,
            chars: expression.chars().peekable(),
        };
        let (value, _) = self.sequence(&mut cursor, false)?;
        match cursor.chars.peek() {
            None => Ok(value),
            Some(&ch) => Err(cursor.error(format!("unexpected '{}'", ch))),
        }
    }

    /// Evaluate up to the end of input, or inside a call up to `,` or `)`.
    ///
    /// Returns the text and where its last quoted part ended, if any.
    fn sequence(&self, cursor: &mut Cursor<'_>, in_call: bool) -> Result<(String, Option<usize>)> {
        let mut out = String::new();
        let mut quoted_end = None;

        while let Some(&ch) = cursor.chars.peek() {
            match ch {
                ',' | ')' if in_call => break,
                '\\' => {
                    cursor.chars.next();
                    if let Some(escaped) = cursor.chars.next() {
                        out.push(escaped);
                    }
                }
                '\'' | '"' if in_call => {
                    cursor.chars.next();
                    loop {
                        match cursor.chars.next() {
                            Some(c) if c == ch => break,
                            Some(c) => out.push(c),
                            None => return Err(cursor.error("unterminated string")),
                        }
                    }
                    quoted_end = Some(out.len());
                }
                '$' => {
                    cursor.chars.next();
                    if cursor.chars.peek() == Some(&'(') {
                        cursor.chars.next();
                        let name = cursor.take_until(')')?;
                        out.push_str(&self.adaptor.raw_value(name.trim()).unwrap_or_default());
                    } else {
                        out.push('$');
                    }
                }
                '@' => {
                    cursor.chars.next();
                    let name = cursor.take_name();
                    if !name.is_empty() && cursor.chars.peek() == Some(&'(') {
                        cursor.chars.next();
                        let args = self.arguments(cursor)?;
                        out.push_str(&self.registry.call(&name, &args)?);
                    } else {
                        out.push('@');
                        out.push_str(&name);
                    }
                }
                _ => {
                    out.push(ch);
                    cursor.chars.next();
                }
            }
        }
        Ok((out, quoted_end))
    }

    fn arguments(&self, cursor: &mut Cursor<'_>) -> Result<Vec<String>> {
        let mut args = Vec::new();
        loop {
            cursor.skip_whitespace();
            let (value, quoted_end) = self.sequence(cursor, true)?;
            let value = match quoted_end {
                Some(end) => {
                    let keep = end + value[end..].trim_end().len();
                    value[..keep].to_string()
                }
                None => value.trim().to_string(),
            };
            match cursor.chars.next() {
                Some(',') => args.push(value),
                Some(')') => {
                    // `f()` takes no arguments rather than one empty one
                    if !(args.is_empty() && value.is_empty() && quoted_end.is_none()) {
                        args.push(value);
                    }
                    return Ok(args);
                }
                _ => return Err(cursor.error("unterminated function call")),
            }
        }
    }
}

struct Cursor<'s> {
    source: &'s str,
    chars: Peekable<Chars<'s>>,
}

impl<'s> Cursor<'s> {
    fn take_until(&mut self, end: char) -> Result<String> {
        let mut out = String::new();
        loop {
            match self.chars.next() {
                Some(c) if c == end => return Ok(out),
                Some(c) => out.push(c),
                None => return Err(self.error(format!("missing '{}'", end))),
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn take_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() || matches!(c, '_' | '.' | ':') {
                name.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        name
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::mapping_message(self.source, message)
    }
}
