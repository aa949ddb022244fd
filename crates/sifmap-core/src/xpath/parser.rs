//! Path expression parser
//!
//! A small recursive descent parser for the SIF path subset used by field
//! rules. Positions in errors are character offsets into the input.
//!
//! Copyright (c) 2025 Sifmap Team
//! Licensed under the Apache-2.0 license

use super::ast::*;
use super::error::PathError;
use crate::element::local_name;
use std::iter::Peekable;
use std::str::Chars;

pub type PathResult<T> = std::result::Result<T, PathError>;

/// Path expression parser
pub struct Parser<'a> {
    /// Input string being parsed
    input: &'a str,
    /// Character iterator
    chars: Peekable<Chars<'a>>,
    /// Current position in input
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given input
    pub fn new(input: &'a str) -> PathResult<Self> {
        if input.trim().is_empty() {
            return Err(PathError::parse("Empty path expression", 0, input));
        }

        Ok(Self {
            input,
            chars: input.chars().peekable(),
            position: 0,
        })
    }

    /// Parse the path expression into an AST
    pub fn parse(mut self) -> PathResult<PathExpr> {
        let mut path = PathExpr {
            absolute: false,
            steps: Vec::new(),
            attribute: None,
        };

        self.skip_whitespace();
        if self.current_char() == Some('/') {
            self.advance();
            path.absolute = true;
        }

        // `.` alone addresses the context element; `./X` is the same as `X`
        if self.current_char() == Some('.') {
            self.advance();
            self.skip_whitespace();
            match self.current_char() {
                None => return Ok(path),
                Some('/') => self.advance(),
                Some(ch) => {
                    return Err(self.unexpected("Expected '/' after '.'", vec!["/".into()], ch))
                }
            }
        }

        loop {
            self.skip_whitespace();
            match self.current_char() {
                Some('@') => {
                    self.advance();
                    path.attribute = Some(self.parse_name()?);
                    self.skip_whitespace();
                    if let Some(ch) = self.current_char() {
                        return Err(self.unexpected(
                            "Attribute must be the last step of a path",
                            vec!["end of path".into()],
                            ch,
                        ));
                    }
                    break;
                }
                Some(_) => {
                    let step = self.parse_step()?;
                    path.steps.push(step);
                }
                None => {
                    return Err(PathError::parse(
                        "Unexpected end of input, expected a step",
                        self.position,
                        self.input,
                    ));
                }
            }

            self.skip_whitespace();
            match self.current_char() {
                None => break,
                Some('/') => self.advance(),
                Some(ch) => {
                    return Err(self.unexpected(
                        "Unexpected character after step",
                        vec!["/".into(), "[".into()],
                        ch,
                    ))
                }
            }
        }

        Ok(path)
    }

    /// Parse an element step with optional bracketed predicates
    fn parse_step(&mut self) -> PathResult<Step> {
        let mut step = Step::new(self.parse_name()?);

        self.skip_whitespace();
        while self.current_char() == Some('[') {
            self.parse_predicates(&mut step)?;
            self.skip_whitespace();
        }

        Ok(step)
    }

    /// Parse `[pred, pred, ...]`, with an optional `+` after a predicate value
    fn parse_predicates(&mut self, step: &mut Step) -> PathResult<()> {
        let start = self.position;
        self.advance(); // consume '['

        loop {
            self.skip_whitespace();
            let predicate = match self.current_char() {
                Some('@') => {
                    self.advance();
                    let name = self.parse_name()?;
                    let value = self.parse_assignment()?;
                    Predicate::Attribute { name, value }
                }
                Some(ch) if ch.is_ascii_digit() => Predicate::Position(self.parse_position()?),
                Some(ch) if is_name_start(ch) => {
                    let name = self.parse_name()?;
                    let value = self.parse_assignment()?;
                    Predicate::Child { name, value }
                }
                Some(ch) => {
                    return Err(self.unexpected(
                        "Invalid predicate",
                        vec!["@attribute".into(), "child name".into(), "position".into()],
                        ch,
                    ))
                }
                None => {
                    return Err(PathError::parse("Unterminated predicate", start, self.input));
                }
            };
            step.predicates.push(predicate);

            self.skip_whitespace();
            if self.current_char() == Some('+') {
                self.advance();
                step.create_new = true;
                self.skip_whitespace();
            }

            match self.current_char() {
                Some(',') => self.advance(),
                Some(']') => {
                    self.advance();
                    return Ok(());
                }
                Some(ch) => {
                    return Err(self.unexpected(
                        "Unexpected character in predicate",
                        vec![",".into(), "]".into()],
                        ch,
                    ))
                }
                None => {
                    return Err(PathError::parse("Unterminated predicate", start, self.input));
                }
            }
        }
    }

    /// Parse `= 'value'`
    fn parse_assignment(&mut self) -> PathResult<String> {
        self.skip_whitespace();
        self.expect_char('=')?;
        self.skip_whitespace();
        self.parse_quoted_string()
    }

    fn parse_position(&mut self) -> PathResult<usize> {
        let start = self.position;
        let mut digits = String::new();
        while let Some(ch) = self.current_char() {
            if !ch.is_ascii_digit() {
                break;
            }
            digits.push(ch);
            self.advance();
        }
        match digits.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(PathError::parse(
                format!("Invalid position '{}', positions start at 1", digits),
                start,
                self.input,
            )),
        }
    }

    /// Parse an element or attribute name, dropping any namespace prefix
    fn parse_name(&mut self) -> PathResult<String> {
        match self.current_char() {
            Some(ch) if is_name_start(ch) => {}
            Some(ch) => {
                return Err(self.unexpected("Expected a name", vec!["name".into()], ch));
            }
            None => {
                return Err(PathError::parse(
                    "Unexpected end of input, expected a name",
                    self.position,
                    self.input,
                ));
            }
        }

        let mut name = String::new();
        while let Some(ch) = self.current_char() {
            if !is_name_char(ch) {
                break;
            }
            name.push(ch);
            self.advance();
        }
        Ok(local_name(&name).to_string())
    }

    /// Parse a single- or double-quoted string
    fn parse_quoted_string(&mut self) -> PathResult<String> {
        let quote = match self.current_char() {
            Some(q @ ('\'' | '"')) => q,
            Some(ch) => {
                return Err(self.unexpected(
                    "Expected a quoted value",
                    vec!["'".into(), "\"".into()],
                    ch,
                ))
            }
            None => {
                return Err(PathError::parse(
                    "Unexpected end of input, expected a quoted value",
                    self.position,
                    self.input,
                ))
            }
        };
        let start = self.position;
        self.advance();

        let mut value = String::new();
        loop {
            match self.current_char() {
                Some(ch) if ch == quote => {
                    self.advance();
                    return Ok(value);
                }
                Some(ch) => {
                    value.push(ch);
                    self.advance();
                }
                None => {
                    return Err(PathError::parse("Unterminated string", start, self.input));
                }
            }
        }
    }

    fn expect_char(&mut self, expected: char) -> PathResult<()> {
        match self.current_char() {
            Some(ch) if ch == expected => {
                self.advance();
                Ok(())
            }
            Some(ch) => Err(self.unexpected(
                format!("Expected '{}'", expected),
                vec![expected.to_string()],
                ch,
            )),
            None => Err(PathError::syntax(
                format!("Expected '{}'", expected),
                self.position,
                self.input,
                vec![expected.to_string()],
                "EOF",
            )),
        }
    }

    fn unexpected(&self, message: impl Into<String>, expected: Vec<String>, found: char) -> PathError {
        PathError::syntax(message, self.position, self.input, expected, found.to_string())
    }

    fn current_char(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn advance(&mut self) {
        if self.chars.next().is_some() {
            self.position += 1;
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if !ch.is_whitespace() {
                break;
            }
            self.advance();
        }
    }
}

fn is_name_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_name_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '-' | '.' | ':')
}

/// Parse a path expression
pub fn parse(input: &str) -> PathResult<PathExpr> {
    Parser::new(input)?.parse()
}
