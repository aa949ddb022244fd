//! Ordered field rules of one object type
//!
//! Copyright (c) 2025 Sifmap Team
//! Licensed under the Apache-2.0 license

use crate::error::DefinitionKind;
use crate::field_rule::FieldRule;
use crate::{Error, Result};

/// The field rules a scope defines for one object type
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectMapping {
    object_type: String,
    rules: Vec<FieldRule>,
}

impl ObjectMapping {
    pub fn new(object_type: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            rules: Vec::new(),
        }
    }

    pub fn object_type(&self) -> &str {
        &self.object_type
    }

    /// Append a rule; a rule with the same key is rejected
    pub fn add_rule(&mut self, rule: FieldRule) -> Result<()> {
        let key = rule.key();
        if self.rules.iter().any(|r| r.key() == key) {
            return Err(Error::duplicate(
                DefinitionKind::FieldRule,
                format!(
                    "field rule '{}' is already defined for {}",
                    key, self.object_type
                ),
            ));
        }
        self.rules.push(rule);
        Ok(())
    }

    /// Remove the rule with the given key
    pub fn remove_rule(&mut self, key: &str) -> Option<FieldRule> {
        let index = self.rules.iter().position(|r| r.key() == key)?;
        Some(self.rules.remove(index))
    }

    /// First rule bound to a field name
    pub fn rule_by_field(&self, name: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|r| r.name() == name)
    }

    /// Rules defined locally, in insertion order
    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::MappingsFilter;
    use crate::rule::Rule;
    use crate::types::Direction;

    fn rule(name: &str, path: &str) -> FieldRule {
        FieldRule::new(name, Rule::path(path)).unwrap()
    }

    #[test]
    fn test_duplicate_key_rejected_at_insertion() {
        let mut mapping = ObjectMapping::new("StudentPersonal");
        mapping.add_rule(rule("FIRSTNAME", "Name/FirstName")).unwrap();

        let err = mapping
            .add_rule(rule("FIRSTNAME", "Name[@Type='04']/FirstName"))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateDefinition {
                kind: DefinitionKind::FieldRule,
                ..
            }
        ));
        assert_eq!(mapping.len(), 1);
    }

    #[test]
    fn test_same_field_with_different_filter_allowed() {
        let mut mapping = ObjectMapping::new("StudentPersonal");
        mapping.add_rule(rule("GRADE", "GradeLevel")).unwrap();
        let inbound_only = FieldRule::builder("GRADE", Rule::other_id("06", None))
            .filter(MappingsFilter::new().with_direction(Direction::Inbound))
            .build()
            .unwrap();
        mapping.add_rule(inbound_only).unwrap();
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.rule_by_field("GRADE").unwrap().key(), "GRADE");
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut mapping = ObjectMapping::new("StudentPersonal");
        for (name, path) in [("A", "A"), ("B", "B"), ("C", "C")] {
            mapping.add_rule(rule(name, path)).unwrap();
        }
        assert!(mapping.remove_rule("B").is_some());
        assert!(mapping.remove_rule("B").is_none());
        let names: Vec<_> = mapping.rules().iter().map(FieldRule::name).collect();
        assert_eq!(names, vec!["A", "C"]);
    }
}
