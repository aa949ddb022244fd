//! Sifmap Core - Rule-driven mapping between flat records and SIF data objects
//!
//! This crate translates application records (field name to string value) into
//! SIF XML data objects and back, driven by a tree of declarative field rules.
//!
//! # Main Components
//!
//! - **Rule tree**: [`Mappings`] holds scopes filtered by zone, source and
//!   protocol version; [`Mappings::select`] picks the best one for a message
//! - **Field rules**: [`FieldRule`] binds a record field to a path expression
//!   or a tagged identifier, with defaults, aliases, null policy and filters
//! - **Mapping contexts**: [`MappingsContext`] applies the rules of one object
//!   type, direction and version to a data object and a [`FieldAdaptor`]
//! - **Value sets**: [`ValueSet`] translates codes between vocabularies
//! - **Documents**: rule trees load from and save to YAML or JSON
//!
//! # Example
//!
//! ```no_run
//! use sifmap_core::{Element, Mappings, Result, SifVersion, StringMapAdaptor};
//!
//! fn example() -> Result<()> {
//!     let mappings = Mappings::load_file("rules.yaml")?;
//!     let default = mappings.find("Default").expect("rule document has a Default scope");
//!     let scope = mappings.select(default, Some("MA_ZONE"), None, Some(SifVersion::SIF20))?;
//!
//!     let record: StringMapAdaptor = [("FIRSTNAME", "Jerry")].into_iter().collect();
//!     let mut student = Element::new("StudentPersonal");
//!     mappings.map_outbound(scope, SifVersion::SIF20, &mut student, &record)?;
//!     println!("{}", student.to_xml()?);
//!     Ok(())
//! }
//! ```

pub mod adaptor;
pub mod catalog;
pub mod context;
pub mod document;
pub mod element;
pub mod error;
pub mod field_rule;
pub mod filter;
pub mod formatter;
pub mod mappings;
pub mod object_mapping;
pub mod rule;
pub mod types;
pub mod valuebuilder;
pub mod valueset;
pub mod version;
pub mod xpath;

// Re-export main types for convenience
pub use error::{DefinitionKind, Error, Result};
pub use types::{DataType, Direction, Offset, Scalar, SimpleValue};
pub use version::SifVersion;

pub use adaptor::{FieldAdaptor, StringMapAdaptor};
pub use catalog::TypeCatalog;
pub use context::MappingsContext;
pub use document::{Format, MappingsDocument};
pub use element::Element;
pub use field_rule::{FieldRule, FieldRuleBuilder, NullBehavior};
pub use filter::{MappingsFilter, VersionConstraint, VersionOperator};
pub use formatter::{FormatStyle, TextFormatter, TypeConverter};
pub use mappings::{Mappings, Scope, ScopeId};
pub use object_mapping::ObjectMapping;
pub use rule::{OtherIdRule, PathRule, Rule};
pub use valuebuilder::{FunctionRegistry, ValueBuilder};
pub use valueset::{DefaultEntry, ValueSet, ValueSetEntry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
