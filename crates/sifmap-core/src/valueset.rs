//! Value translation tables
//!
//! A value set translates codes between the application's vocabulary and the
//! codes transmitted in SIF messages. Each direction has its own optional
//! default entry, used when a lookup finds no match, and each default has its
//! own flag saying whether it is also rendered for a null input.
//!
//! Copyright (c) 2025 Sifmap Team
//! Licensed under the Apache-2.0 license

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::DefinitionKind;
use crate::{Error, Result};

/// One row of a value set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSetEntry {
    /// Application-side code
    pub app: String,
    /// Transmitted SIF code
    pub sif: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Insertion order
    #[serde(skip)]
    pub index: usize,
}

/// A default entry of one translation direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultEntry {
    pub value: String,
    #[serde(default)]
    pub render_if_null: bool,
}

/// Bidirectional code translation table
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValueSet {
    id: String,
    title: Option<String>,
    entries: Vec<ValueSetEntry>,
    by_app: HashMap<String, usize>,
    by_sif: HashMap<String, usize>,
    app_default: Option<DefaultEntry>,
    sif_default: Option<DefaultEntry>,
}

impl ValueSet {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Define or redefine a translation; a missing application value is ignored
    pub fn define(&mut self, app: Option<&str>, sif: impl Into<String>, title: Option<&str>) {
        let Some(app) = app else {
            return;
        };
        let sif = sif.into();

        let slot = match self.by_app.get(app) {
            Some(&slot) => {
                let old_sif = self.entries[slot].sif.clone();
                if self.by_sif.get(&old_sif) == Some(&slot) {
                    self.by_sif.remove(&old_sif);
                }
                self.entries[slot].sif = sif.clone();
                self.entries[slot].title = title.map(str::to_string);
                slot
            }
            None => {
                let slot = self.entries.len();
                self.entries.push(ValueSetEntry {
                    app: app.to_string(),
                    sif: sif.clone(),
                    title: title.map(str::to_string),
                    index: slot,
                });
                self.by_app.insert(app.to_string(), slot);
                slot
            }
        };
        self.by_sif.insert(sif, slot);
    }

    /// Remove the entry for an application value, returning it
    pub fn remove(&mut self, app: &str) -> Option<ValueSetEntry> {
        let slot = self.by_app.get(app).copied()?;
        let entry = self.entries.remove(slot);
        if self.app_default.as_ref().map(|d| d.value.as_str()) == Some(entry.app.as_str()) {
            self.app_default = None;
        }
        self.reindex();
        if self
            .sif_default
            .as_ref()
            .is_some_and(|d| !self.by_sif.contains_key(&d.value))
        {
            self.sif_default = None;
        }
        Some(entry)
    }

    fn reindex(&mut self) {
        self.by_app.clear();
        self.by_sif.clear();
        for (slot, entry) in self.entries.iter_mut().enumerate() {
            entry.index = slot;
            self.by_app.insert(entry.app.clone(), slot);
            self.by_sif.insert(entry.sif.clone(), slot);
        }
    }

    /// Entries in insertion order
    pub fn entries(&self) -> &[ValueSetEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn title_for(&self, app: &str) -> Option<&str> {
        let slot = *self.by_app.get(app)?;
        self.entries[slot].title.as_deref()
    }

    pub fn app_default(&self) -> Option<&DefaultEntry> {
        self.app_default.as_ref()
    }

    pub fn sif_default(&self) -> Option<&DefaultEntry> {
        self.sif_default.as_ref()
    }

    /// Set the application-side default used by [`translate_reverse`](Self::translate_reverse).
    ///
    /// The value must already be defined as an application value; `None` clears.
    pub fn set_app_default(&mut self, value: Option<&str>, render_if_null: bool) -> Result<()> {
        self.app_default = match value {
            None => None,
            Some(v) if self.by_app.contains_key(v) => Some(DefaultEntry {
                value: v.to_string(),
                render_if_null,
            }),
            Some(v) => {
                return Err(Error::duplicate(
                    DefinitionKind::ValueSetDefault,
                    format!("value set '{}' has no application value '{}'", self.id, v),
                ))
            }
        };
        Ok(())
    }

    /// Set the SIF-side default used by [`translate`](Self::translate).
    ///
    /// The value must already be defined as a SIF value; `None` clears.
    pub fn set_sif_default(&mut self, value: Option<&str>, render_if_null: bool) -> Result<()> {
        self.sif_default = match value {
            None => None,
            Some(v) if self.by_sif.contains_key(v) => Some(DefaultEntry {
                value: v.to_string(),
                render_if_null,
            }),
            Some(v) => {
                return Err(Error::duplicate(
                    DefinitionKind::ValueSetDefault,
                    format!("value set '{}' has no SIF value '{}'", self.id, v),
                ))
            }
        };
        Ok(())
    }

    /// Translate an application value to its SIF code
    pub fn translate(&self, app: Option<&str>, explicit_default: Option<&str>) -> Option<String> {
        let found = app.and_then(|v| self.by_app.get(v)).map(|&slot| &self.entries[slot].sif);
        let result = resolve(app, found, explicit_default, self.sif_default.as_ref());
        trace!(valueset = %self.id, input = ?app, output = ?result, "translate");
        result
    }

    /// Translate a SIF code back to the application value
    pub fn translate_reverse(&self, sif: Option<&str>, explicit_default: Option<&str>) -> Option<String> {
        let found = sif.and_then(|v| self.by_sif.get(v)).map(|&slot| &self.entries[slot].app);
        let result = resolve(sif, found, explicit_default, self.app_default.as_ref());
        trace!(valueset = %self.id, input = ?sif, output = ?result, "translate_reverse");
        result
    }
}

/// Shared lookup precedence of both directions
fn resolve(
    input: Option<&str>,
    found: Option<&String>,
    explicit_default: Option<&str>,
    table_default: Option<&DefaultEntry>,
) -> Option<String> {
    match input {
        None => table_default
            .filter(|d| d.render_if_null)
            .map(|d| d.value.clone()),
        Some(value) => {
            if let Some(found) = found {
                return Some(found.clone());
            }
            if let Some(explicit) = explicit_default {
                return Some(explicit.to_string());
            }
            match table_default {
                Some(d) => Some(d.value.clone()),
                None => Some(value.to_string()),
            }
        }
    }
}
