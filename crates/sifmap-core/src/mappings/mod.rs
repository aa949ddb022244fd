//! Rule tree of scopes
//!
//! A [`Mappings`] tree holds named scopes filtered by zone, source and
//! protocol version. Each scope owns object rule sets, value sets and string
//! properties and inherits whatever it does not define from its ancestors.
//! Callers pick a scope with [`Mappings::select`] and map objects through a
//! [`MappingsContext`](crate::MappingsContext) built from it.
//!
//! The tree carries no internal locking: it must not be mutated while a
//! selection or mapping pass over it is in progress.
//!
//! Copyright (c) 2025 Sifmap Team
//! Licensed under the Apache-2.0 license

mod scope;
mod select;
mod tree;

pub use scope::{parse_filter_list, Scope, ScopeId};
pub use tree::Mappings;

#[cfg(test)]
mod tests;
