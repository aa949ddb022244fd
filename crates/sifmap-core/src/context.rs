//! Mapping contexts
//!
//! A [`MappingsContext`] fixes the object type, direction and protocol version
//! of a mapping pass and keeps the field rules that apply to them, so that a
//! batch of records is mapped without selecting and filtering rules again
//! for every record.
//!
//! Copyright (c) 2025 Sifmap Team
//! Licensed under the Apache-2.0 license

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, debug_span, warn};

use crate::adaptor::FieldAdaptor;
use crate::catalog::TypeCatalog;
use crate::element::Element;
use crate::field_rule::{FieldRule, NullBehavior};
use crate::formatter::{TextFormatter, TypeConverter};
use crate::mappings::{Mappings, ScopeId};
use crate::rule::Rule;
use crate::types::{DataType, Direction, SimpleValue};
use crate::valuebuilder::{FunctionRegistry, ValueBuilder};
use crate::valueset::ValueSet;
use crate::version::SifVersion;
use crate::{Error, Result};

/// Declared rule types for one bound element type
#[derive(Debug)]
struct TraversalCache {
    element_type: String,
    declared: Vec<Option<DataType>>,
}

/// Reusable view of the rules that apply to one object type, direction and version
#[derive(Debug)]
pub struct MappingsContext {
    object_type: String,
    direction: Direction,
    version: SifVersion,
    rules: Vec<FieldRule>,
    value_sets: HashMap<String, ValueSet>,
    catalog: Arc<TypeCatalog>,
    functions: Arc<FunctionRegistry>,
    formatter: TextFormatter,
    traversal: Mutex<Option<Arc<TraversalCache>>>,
}

impl MappingsContext {
    /// Collect the rules of `object_type` visible from `node` that apply to
    /// `direction` and `version`
    pub fn new(
        mappings: &Mappings,
        node: ScopeId,
        object_type: &str,
        direction: Direction,
        version: SifVersion,
    ) -> Result<Self> {
        mappings.node(node)?;

        let rules: Vec<FieldRule> = mappings
            .rules_for(node, object_type, true)
            .into_iter()
            .filter(|r| r.applies(direction, version))
            .cloned()
            .collect();

        let mut value_sets = HashMap::new();
        for id in rules.iter().filter_map(FieldRule::value_set) {
            if value_sets.contains_key(id) {
                continue;
            }
            match mappings.value_set(node, id, true) {
                Some(set) => {
                    value_sets.insert(id.to_string(), set.clone());
                }
                None => warn!(valueset = id, object = object_type, "value set not defined, rules using it map untranslated"),
            }
        }

        debug!(
            object = object_type,
            %direction,
            %version,
            rules = rules.len(),
            "created mappings context"
        );

        Ok(Self {
            object_type: object_type.to_string(),
            direction,
            version,
            rules,
            value_sets,
            catalog: mappings.shared_catalog(),
            functions: mappings.shared_functions(),
            formatter: TextFormatter::for_version(version),
            traversal: Mutex::new(None),
        })
    }

    pub fn object_type(&self) -> &str {
        &self.object_type
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn version(&self) -> SifVersion {
        self.version
    }

    /// Applicable rules in evaluation order
    pub fn field_rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn formatter(&self) -> &TextFormatter {
        &self.formatter
    }

    /// Map between `root` and `adaptor` in this context's direction
    pub fn map(&self, root: &mut Element, adaptor: &mut dyn FieldAdaptor) -> Result<()> {
        match self.direction {
            Direction::Inbound => self.map_inbound(root, adaptor),
            Direction::Outbound => self.map_outbound(root, adaptor),
        }
    }

    /// Populate a record from a data object
    pub fn map_inbound(&self, root: &Element, adaptor: &mut dyn FieldAdaptor) -> Result<()> {
        self.expect_direction(Direction::Inbound)?;
        let span = debug_span!("map", object = %self.object_type, direction = %self.direction);
        let _enter = span.enter();

        let traversal = self.traversal(root);
        for (index, rule) in self.rules.iter().enumerate() {
            debug!(field = rule.name(), rule = %rule.rule(), "inbound rule");
            let data_type = traversal.declared[index].unwrap_or(rule.data_type());
            self.inbound_rule(root, adaptor, rule, data_type)
                .map_err(|e| Error::mapping(rule.rule().to_string(), e))?;
        }
        Ok(())
    }

    /// Populate a data object from a record
    pub fn map_outbound(&self, root: &mut Element, adaptor: &dyn FieldAdaptor) -> Result<()> {
        self.expect_direction(Direction::Outbound)?;
        let span = debug_span!("map", object = %self.object_type, direction = %self.direction);
        let _enter = span.enter();

        let traversal = self.traversal(root);
        for (index, rule) in self.rules.iter().enumerate() {
            debug!(field = rule.adaptor_name(), rule = %rule.rule(), "outbound rule");
            let data_type = traversal.declared[index].unwrap_or(rule.data_type());
            self.outbound_rule(root, adaptor, rule, data_type)
                .map_err(|e| Error::mapping(rule.rule().to_string(), e))?;
        }
        Ok(())
    }

    fn expect_direction(&self, direction: Direction) -> Result<()> {
        if self.direction == direction {
            Ok(())
        } else {
            Err(Error::configuration(format!(
                "context for {} {} mapping cannot map {}",
                self.object_type, self.direction, direction
            )))
        }
    }

    fn inbound_rule(
        &self,
        root: &Element,
        adaptor: &mut dyn FieldAdaptor,
        rule: &FieldRule,
        data_type: DataType,
    ) -> Result<()> {
        if adaptor.has_field(rule.name()) {
            return Ok(());
        }

        let converter = self.formatter.converter(data_type);
        let mut value = match rule.rule().evaluate(root)? {
            Some(text) => converter.parse(&text)?,
            None => default_value(rule, &converter)?,
        };

        if let Some(set) = self.value_set_for(rule) {
            if value.data_type() == DataType::String {
                value = SimpleValue::optional_string(
                    set.translate_reverse(value.as_str(), rule.default_value()),
                );
            }
        }

        if value.is_null() {
            return Ok(());
        }
        adaptor.set_from_inbound(rule.name(), value, &converter, rule)
    }

    fn outbound_rule(
        &self,
        root: &mut Element,
        adaptor: &dyn FieldAdaptor,
        rule: &FieldRule,
        data_type: DataType,
    ) -> Result<()> {
        if let Rule::OtherId(_) = rule.rule() {
            return Ok(());
        }

        let name = rule.adaptor_name();
        if name.is_empty() {
            return Err(Error::configuration("field rule has no field name"));
        }
        if !adaptor.has_field(name) && rule.default_value().is_none() {
            return Ok(());
        }

        let converter = self.formatter.converter(data_type);
        let mut value = adaptor
            .value_for_outbound(name, &converter, rule)?
            .unwrap_or_else(|| converter.null());

        if let Some(set) = self.value_set_for(rule) {
            if value.data_type() == DataType::String {
                value = SimpleValue::optional_string(set.translate(value.as_str(), rule.default_value()));
            }
        }

        let mut used_default = false;
        if value.is_null() {
            if rule.null_behavior() == NullBehavior::Suppress || rule.default_value().is_none() {
                return Ok(());
            }
            value = default_value(rule, &converter)?;
            used_default = true;
        }

        if let Some(expression) = rule.rule().value_expression() {
            if !used_default {
                let text = ValueBuilder::new(adaptor, &self.functions).evaluate(expression)?;
                value = converter.parse(&text)?;
            }
        }

        if value.is_null() {
            return Ok(());
        }

        let Some(mut target) = rule.rule().create_target(root)? else {
            return Ok(());
        };
        if target.has_value() {
            return Ok(());
        }
        // the declared type comes from the same path `create_target` walked,
        // so this only converts values an adaptor returned as another type
        let value = if value.data_type() == data_type {
            value
        } else {
            self.formatter.convert(&value, data_type)?
        };
        if let Some(text) = self.formatter.format(&value) {
            target.set_value(text);
        }
        Ok(())
    }

    fn value_set_for(&self, rule: &FieldRule) -> Option<&ValueSet> {
        self.value_sets.get(rule.value_set()?)
    }

    /// Declared types of every rule for the element type of `root`, rebuilt
    /// only when a root of another type is mapped
    fn traversal(&self, root: &Element) -> Arc<TraversalCache> {
        let mut cache = self.traversal.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = cache.as_ref() {
            if existing.element_type == root.local_name() {
                return Arc::clone(existing);
            }
        }

        let element_type = root.local_name().to_string();
        let declared = self
            .rules
            .iter()
            .map(|rule| {
                let path = rule.rule().as_path()?.compiled().ok()?;
                self.catalog
                    .declared_type(&element_type, &path, self.version)
                    .or_else(|| self.catalog.declared_type(&self.object_type, &path, self.version))
            })
            .collect();
        debug!(element = %element_type, "built traversal context");

        let built = Arc::new(TraversalCache {
            element_type,
            declared,
        });
        *cache = Some(Arc::clone(&built));
        built
    }
}

/// A rule's default value parsed as the target type, or a typed null
fn default_value(rule: &FieldRule, converter: &TypeConverter<'_>) -> Result<SimpleValue> {
    match rule.default_value() {
        Some(text) => converter.parse(text).map_err(|_| {
            Error::configuration(format!(
                "default value '{}' of field '{}' is not a valid {}",
                text,
                rule.name(),
                converter.data_type()
            ))
        }),
        None => Ok(converter.null()),
    }
}

impl Mappings {
    /// Build a [`MappingsContext`] for a scope
    pub fn context(
        &self,
        node: ScopeId,
        object_type: &str,
        direction: Direction,
        version: SifVersion,
    ) -> Result<MappingsContext> {
        MappingsContext::new(self, node, object_type, direction, version)
    }

    /// Map one data object into a record
    pub fn map_inbound(
        &self,
        node: ScopeId,
        version: SifVersion,
        root: &Element,
        adaptor: &mut dyn FieldAdaptor,
    ) -> Result<()> {
        self.context(node, root.local_name(), Direction::Inbound, version)?
            .map_inbound(root, adaptor)
    }

    /// Map one record into a data object
    pub fn map_outbound(
        &self,
        node: ScopeId,
        version: SifVersion,
        root: &mut Element,
        adaptor: &dyn FieldAdaptor,
    ) -> Result<()> {
        let object_type = root.local_name().to_string();
        self.context(node, &object_type, Direction::Outbound, version)?
            .map_outbound(root, adaptor)
    }
}
