//! Record adaptors
//!
//! A [`FieldAdaptor`] is the application side of a mapping pass: it supplies
//! field values for outbound mapping and receives them during inbound mapping.
//!
//! Copyright (c) 2025 Sifmap Team
//! Licensed under the Apache-2.0 license

use std::collections::HashMap;

use crate::field_rule::FieldRule;
use crate::formatter::TypeConverter;
use crate::types::{DataType, SimpleValue};
use crate::Result;

/// Source and sink of flat record values
pub trait FieldAdaptor {
    /// True if the record holds the field, even with a null value
    fn has_field(&self, name: &str) -> bool;

    /// Value to write for a field, produced as the converter's type.
    ///
    /// `Ok(None)` means the record has no such field.
    fn value_for_outbound(
        &self,
        name: &str,
        converter: &TypeConverter<'_>,
        rule: &FieldRule,
    ) -> Result<Option<SimpleValue>>;

    /// Receive a value read from a data object
    fn set_from_inbound(
        &mut self,
        name: &str,
        value: SimpleValue,
        converter: &TypeConverter<'_>,
        rule: &FieldRule,
    ) -> Result<()>;

    /// Untyped value of a field, used by assignment expressions
    fn raw_value(&self, name: &str) -> Option<String>;
}

/// A [`FieldAdaptor`] over a map of field name to text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringMapAdaptor {
    fields: HashMap<String, Option<String>>,
}

impl StringMapAdaptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.fields.insert(name.into(), Some(value.into()));
        self
    }

    /// Record a field that is present with no value
    pub fn insert_null(&mut self, name: impl Into<String>) -> &mut Self {
        self.fields.insert(name.into(), None);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<Option<String>> {
        self.fields.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name)?.as_deref()
    }

    /// Field names and values, sorted by name
    pub fn fields(&self) -> Vec<(&str, Option<&str>)> {
        let mut fields: Vec<_> = self
            .fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_deref()))
            .collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));
        fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_inner(self) -> HashMap<String, Option<String>> {
        self.fields
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StringMapAdaptor {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), Some(v.into())))
                .collect(),
        }
    }
}

impl FieldAdaptor for StringMapAdaptor {
    fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    fn value_for_outbound(
        &self,
        name: &str,
        converter: &TypeConverter<'_>,
        _rule: &FieldRule,
    ) -> Result<Option<SimpleValue>> {
        match self.fields.get(name) {
            None => Ok(None),
            Some(None) => Ok(Some(converter.null())),
            // empty text is no value for anything but strings
            Some(Some(text)) if text.is_empty() && converter.data_type() != DataType::String => {
                Ok(Some(converter.null()))
            }
            Some(Some(text)) => converter.parse(text).map(Some),
        }
    }

    fn set_from_inbound(
        &mut self,
        name: &str,
        value: SimpleValue,
        converter: &TypeConverter<'_>,
        _rule: &FieldRule,
    ) -> Result<()> {
        self.fields.insert(name.to_string(), converter.format(&value));
        Ok(())
    }

    fn raw_value(&self, name: &str) -> Option<String> {
        self.fields.get(name)?.clone()
    }
}
