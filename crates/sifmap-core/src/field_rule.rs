//! Field rules
//!
//! A [`FieldRule`] binds one record field to a [`Rule`] together with the
//! metadata that shapes its mapping: default value, alias, value set, null
//! behavior, declared data type and applicability filter.
//!
//! Copyright (c) 2025 Sifmap Team
//! Licensed under the Apache-2.0 license

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::filter::MappingsFilter;
use crate::rule::Rule;
use crate::types::{DataType, Direction};
use crate::version::SifVersion;
use crate::{Error, Result};

/// What outbound mapping does when a field has no value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullBehavior {
    /// Same as `UseDefault`
    #[default]
    Unspecified,
    /// Write the default value if one is configured
    #[serde(rename = "default")]
    UseDefault,
    /// Never create the element
    Suppress,
}

impl FromStr for NullBehavior {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "unspecified" => Ok(NullBehavior::Unspecified),
            "default" => Ok(NullBehavior::UseDefault),
            "suppress" => Ok(NullBehavior::Suppress),
            other => Err(Error::configuration(format!(
                "unknown null behavior '{}', expected 'default' or 'suppress'",
                other
            ))),
        }
    }
}

impl fmt::Display for NullBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NullBehavior::Unspecified => write!(f, "unspecified"),
            NullBehavior::UseDefault => write!(f, "default"),
            NullBehavior::Suppress => write!(f, "suppress"),
        }
    }
}

/// Binding of one record field to a rule
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    name: String,
    rule: Rule,
    default_value: Option<String>,
    alias: Option<String>,
    value_set: Option<String>,
    null_behavior: NullBehavior,
    data_type: DataType,
    filter: Option<MappingsFilter>,
}

impl FieldRule {
    /// Create a rule with no optional metadata
    pub fn new(name: impl Into<String>, rule: Rule) -> Result<Self> {
        FieldRule::builder(name, rule).build()
    }

    pub fn builder(name: impl Into<String>, rule: Rule) -> FieldRuleBuilder {
        FieldRuleBuilder::new(name, rule)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Name used against the record adaptor when mapping outbound
    pub fn adaptor_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn value_set(&self) -> Option<&str> {
        self.value_set.as_deref()
    }

    pub fn null_behavior(&self) -> NullBehavior {
        self.null_behavior
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn filter(&self) -> Option<&MappingsFilter> {
        self.filter.as_ref()
    }

    pub fn set_default_value(&mut self, value: Option<String>) {
        self.default_value = value;
    }

    pub fn set_alias(&mut self, alias: Option<String>) {
        self.alias = alias.filter(|a| !a.is_empty());
    }

    pub fn set_value_set(&mut self, value_set: Option<String>) {
        self.value_set = value_set;
    }

    pub fn set_null_behavior(&mut self, behavior: NullBehavior) {
        self.null_behavior = behavior;
    }

    pub fn set_filter(&mut self, filter: Option<MappingsFilter>) {
        self.filter = filter.filter(|f| !f.is_empty());
    }

    /// Identity of the rule within an object rule set
    pub fn key(&self) -> String {
        let mut key = self.name.clone();
        if let Some(alias) = &self.alias {
            key.push_str("|alias=");
            key.push_str(alias);
        }
        if let Some(filter) = &self.filter {
            if let Some(direction) = filter.direction {
                key.push_str("|dir=");
                key.push_str(&direction.to_string());
            }
            if let Some(version) = filter.version {
                key.push_str("|ver=");
                key.push_str(&version.to_string());
            }
        }
        key
    }

    /// Whether the rule takes part in a mapping pass
    pub fn applies(&self, direction: Direction, version: SifVersion) -> bool {
        self.filter
            .as_ref()
            .map_or(true, |f| f.evaluate(direction, version))
    }
}

/// Builder for [`FieldRule`]
#[derive(Debug, Clone)]
pub struct FieldRuleBuilder {
    name: String,
    rule: Rule,
    default_value: Option<String>,
    alias: Option<String>,
    value_set: Option<String>,
    null_behavior: NullBehavior,
    data_type: DataType,
    filter: Option<MappingsFilter>,
}

impl FieldRuleBuilder {
    pub fn new(name: impl Into<String>, rule: Rule) -> Self {
        Self {
            name: name.into(),
            rule,
            default_value: None,
            alias: None,
            value_set: None,
            null_behavior: NullBehavior::Unspecified,
            data_type: DataType::String,
            filter: None,
        }
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn value_set(mut self, id: impl Into<String>) -> Self {
        self.value_set = Some(id.into());
        self
    }

    pub fn null_behavior(mut self, behavior: NullBehavior) -> Self {
        self.null_behavior = behavior;
        self
    }

    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    pub fn filter(mut self, filter: MappingsFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn build(self) -> Result<FieldRule> {
        if self.name.trim().is_empty() {
            return Err(Error::configuration(format!(
                "field rule '{}' has no field name",
                self.rule
            )));
        }
        if let Rule::Path(path) = &self.rule {
            if path.path_text().is_empty() {
                return Err(Error::configuration(format!(
                    "field '{}' has an empty rule",
                    self.name
                )));
            }
        }

        Ok(FieldRule {
            name: self.name,
            rule: self.rule,
            default_value: self.default_value,
            alias: self.alias.filter(|a| !a.is_empty()),
            value_set: self.value_set.filter(|v| !v.is_empty()),
            null_behavior: self.null_behavior,
            data_type: self.data_type,
            filter: self.filter.filter(|f| !f.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_includes_alias_and_filter() {
        let plain = FieldRule::new("FIRSTNAME", Rule::path("Name/FirstName")).unwrap();
        assert_eq!(plain.key(), "FIRSTNAME");

        let filtered = FieldRule::builder("FIRSTNAME", Rule::path("Name/FirstName"))
            .alias("FNAME")
            .filter(
                MappingsFilter::new()
                    .with_direction(Direction::Outbound)
                    .with_version("+2.0".parse().unwrap()),
            )
            .build()
            .unwrap();
        assert_eq!(filtered.key(), "FIRSTNAME|alias=FNAME|dir=outbound|ver=+2.0");
        assert_eq!(filtered.adaptor_name(), "FNAME");
        assert_eq!(plain.adaptor_name(), "FIRSTNAME");
    }

    #[test]
    fn test_empty_filter_is_dropped() {
        let rule = FieldRule::builder("A", Rule::path("A"))
            .filter(MappingsFilter::new())
            .build()
            .unwrap();
        assert!(rule.filter().is_none());
        assert!(rule.applies(Direction::Inbound, SifVersion::SIF11));
    }

    #[test]
    fn test_missing_name_rejected() {
        let err = FieldRule::new("  ", Rule::path("Name/FirstName")).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        assert!(FieldRule::new("X", Rule::path("")).is_err());
    }

    #[test]
    fn test_null_behavior_parsing() {
        assert_eq!("Suppress".parse::<NullBehavior>().unwrap(), NullBehavior::Suppress);
        assert_eq!("default".parse::<NullBehavior>().unwrap(), NullBehavior::UseDefault);
        assert!("skip".parse::<NullBehavior>().is_err());
    }

    #[test]
    fn test_applies_respects_direction() {
        let rule = FieldRule::builder("GRADE", Rule::other_id("06", None))
            .filter(MappingsFilter::new().with_direction(Direction::Inbound))
            .build()
            .unwrap();
        assert!(rule.applies(Direction::Inbound, SifVersion::SIF20));
        assert!(!rule.applies(Direction::Outbound, SifVersion::SIF20));
    }
}
