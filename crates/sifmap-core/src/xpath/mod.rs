//! SIF path expressions
//!
//! Parsing, resolution and creation of the XPath subset that field rules use
//! to address elements and attributes of a SIF data object.
//!
//! Copyright (c) 2025 Sifmap Team
//! Licensed under the Apache-2.0 license

pub mod ast;
pub mod error;
pub mod parser;
pub mod resolve;

pub use ast::{PathExpr, Predicate, Step};
pub use error::PathError;
pub use parser::{parse, Parser};
pub use resolve::{create, select, select_value, NodeTarget};
