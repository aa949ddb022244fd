//! Diff engine for comparing mapping results

use crate::{GoldenError, Result};
use colored::*;
use regex::Regex;
use serde_json::Value;
use similar::{ChangeTag, TextDiff};
use std::collections::BTreeSet;

/// Options for diff comparison
#[derive(Debug, Clone)]
pub struct DiffOptions {
    pub colored: bool,

    /// Unchanged lines kept around each change when `full_diff` is off
    pub context_lines: usize,

    /// Whether to normalize values before comparison
    pub normalize: bool,

    pub full_diff: bool,

    /// Maximum diff lines to show (0 = unlimited)
    pub max_diff_lines: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            colored: true,
            context_lines: 3,
            normalize: true,
            full_diff: false,
            max_diff_lines: 100,
        }
    }
}

/// Result of a diff operation
#[derive(Debug)]
pub struct DiffResult {
    pub matches: bool,

    /// Human-readable diff output
    pub diff_output: String,

    pub summary: DiffSummary,
}

#[derive(Debug, Default)]
pub struct DiffSummary {
    pub added: usize,
    pub removed: usize,

    /// Paths that differ
    pub differing_paths: Vec<String>,
}

/// Compares snapshot content against a fresh mapping result
pub struct DiffEngine {
    options: DiffOptions,
    volatile_patterns: Vec<(String, Regex)>,
}

const MASK: &str = "***MASKED***";

impl DiffEngine {
    pub fn new(options: DiffOptions) -> Self {
        Self {
            options,
            volatile_patterns: Vec::new(),
        }
    }

    /// Mask the string at `path` whenever it matches `pattern`
    pub fn add_volatile_pattern(&mut self, path: &str, pattern: &str) -> Result<()> {
        let regex = Regex::new(pattern)
            .map_err(|e| GoldenError::Corpus(format!("Invalid regex pattern: {}", e)))?;

        self.volatile_patterns.push((path.to_string(), regex));
        Ok(())
    }

    pub fn compare(&self, expected: &Value, actual: &Value) -> DiffResult {
        let (expected, actual) = if self.options.normalize {
            (
                crate::snapshot::normalize_json(expected),
                crate::snapshot::normalize_json(actual),
            )
        } else {
            (expected.clone(), actual.clone())
        };

        let expected = self.mask_volatile_fields(&expected);
        let actual = self.mask_volatile_fields(&actual);

        if expected == actual {
            return DiffResult {
                matches: true,
                diff_output: String::new(),
                summary: DiffSummary::default(),
            };
        }

        let expected_text = render(&expected);
        let actual_text = render(&actual);

        let mut summary = DiffSummary::default();
        collect_diff_paths(&expected, &actual, String::new(), &mut summary.differing_paths);
        for change in TextDiff::from_lines(&expected_text, &actual_text).iter_all_changes() {
            match change.tag() {
                ChangeTag::Delete => summary.removed += 1,
                ChangeTag::Insert => summary.added += 1,
                ChangeTag::Equal => {}
            }
        }

        DiffResult {
            matches: false,
            diff_output: self.generate_diff_output(&expected_text, &actual_text),
            summary,
        }
    }

    fn generate_diff_output(&self, expected: &str, actual: &str) -> String {
        let text_diff = TextDiff::from_lines(expected, actual);
        let mut output = String::new();

        let header = "=== Diff Output ===\n";
        if self.options.colored {
            output.push_str(&header.bold().to_string());
        } else {
            output.push_str(header);
        }

        let groups = if self.options.full_diff {
            vec![text_diff.ops().to_vec()]
        } else {
            text_diff.grouped_ops(self.options.context_lines)
        };

        let mut line_count = 0;
        for (index, group) in groups.iter().enumerate() {
            if index > 0 {
                output.push_str("...\n");
            }
            for op in group {
                for change in text_diff.iter_changes(op) {
                    if self.options.max_diff_lines > 0 && line_count >= self.options.max_diff_lines {
                        output.push_str("... (diff truncated) ...\n");
                        return output;
                    }

                    let line = match change.tag() {
                        ChangeTag::Delete if self.options.colored => format!("{}{}", "-".red(), change.to_string().red()),
                        ChangeTag::Delete => format!("-{}", change),
                        ChangeTag::Insert if self.options.colored => {
                            format!("{}{}", "+".green(), change.to_string().green())
                        }
                        ChangeTag::Insert => format!("+{}", change),
                        ChangeTag::Equal => format!(" {}", change),
                    };
                    output.push_str(&line);
                    line_count += 1;
                }
            }
        }

        output
    }

    fn mask_volatile_fields(&self, value: &Value) -> Value {
        let mut masked = value.clone();

        for (path, pattern) in &self.volatile_patterns {
            let parts: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
            mask_field_recursive(&mut masked, &parts, pattern);
        }

        masked
    }

    /// Line diff of two texts without colors, for error messages
    pub fn simple_diff(&self, expected: &str, actual: &str) -> String {
        let diff = TextDiff::from_lines(expected, actual);
        let mut output = String::new();

        for change in diff.iter_all_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => "-",
                ChangeTag::Insert => "+",
                ChangeTag::Equal => " ",
            };
            output.push_str(&format!("{}{}", sign, change));
        }

        output
    }
}

/// Text used for the line diff
///
/// The XML lines are shown as they are rather than as a JSON array so a
/// changed element reads as a changed line.
fn render(value: &Value) -> String {
    let mut text = String::new();

    if let Some(lines) = value.get("xml").and_then(Value::as_array) {
        text.push_str("xml:\n");
        for line in lines {
            text.push_str("  ");
            text.push_str(line.as_str().unwrap_or_default());
            text.push('\n');
        }
    }

    match value.get("record").and_then(Value::as_object) {
        Some(record) => {
            text.push_str("record:\n");
            for (name, field) in record {
                let shown = match field {
                    Value::Null => "null".to_string(),
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                text.push_str(&format!("  {} = {}\n", name, shown));
            }
        }
        None if value.get("xml").is_none() => {
            text.push_str(&serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()));
            text.push('\n');
        }
        None => {}
    }

    text
}

fn collect_diff_paths(expected: &Value, actual: &Value, path: String, paths: &mut Vec<String>) {
    let join = |key: &str| {
        if path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", path, key)
        }
    };

    match (expected, actual) {
        (Value::Object(exp), Value::Object(act)) => {
            let all_keys: BTreeSet<_> = exp.keys().chain(act.keys()).collect();

            for key in all_keys {
                match (exp.get(key), act.get(key)) {
                    (Some(exp_val), Some(act_val)) if exp_val != act_val => {
                        collect_diff_paths(exp_val, act_val, join(key), paths)
                    }
                    (Some(_), None) => paths.push(format!("{} (missing in actual)", join(key))),
                    (None, Some(_)) => paths.push(format!("{} (extra in actual)", join(key))),
                    _ => {}
                }
            }
        }
        (Value::Array(exp), Value::Array(act)) => {
            for (i, (exp_val, act_val)) in exp.iter().zip(act.iter()).enumerate() {
                if exp_val != act_val {
                    collect_diff_paths(exp_val, act_val, format!("{}[{}]", path, i), paths);
                }
            }

            if exp.len() != act.len() {
                paths.push(format!("{} (length {} vs {})", path, exp.len(), act.len()));
            }
        }
        _ => {
            if expected != actual {
                paths.push(path);
            }
        }
    }
}

fn mask_field_recursive(value: &mut Value, path_parts: &[&str], pattern: &Regex) {
    let Some((first, rest)) = path_parts.split_first() else {
        return;
    };

    match value {
        Value::Object(map) => {
            let Some(next_value) = map.get_mut(*first) else {
                return;
            };
            if !rest.is_empty() {
                mask_field_recursive(next_value, rest, pattern);
            } else if next_value.as_str().is_some_and(|s| pattern.is_match(s)) {
                *next_value = Value::String(MASK.to_string());
            }
        }
        Value::Array(arr) => {
            for item in arr {
                mask_field_recursive(item, path_parts, pattern);
            }
        }
        _ => {}
    }
}
