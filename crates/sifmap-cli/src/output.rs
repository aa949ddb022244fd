//! Output formatting and writing utilities
//!
//! Results are written as JSON, YAML or human-readable text. The report
//! types here are what the command handlers produce.

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, Write};
use tracing::{debug, trace};

/// Summary of a loaded rule document
#[derive(Debug, Clone, Serialize)]
pub struct ValidationSummary {
    pub file: String,
    pub scopes: Vec<ScopeSummary>,
    /// Declared (object type, path) entries in the type catalog
    pub catalog_entries: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScopeSummary {
    pub id: String,
    /// Distance from the top-level scope, 0 for top-level scopes
    pub depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zones: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub versions: Option<Vec<String>>,
    pub rule_sets: Vec<RuleSetSummary>,
    pub value_sets: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleSetSummary {
    pub object_type: String,
    pub rules: usize,
    /// Field rule keys, listed with `--detailed`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

/// Record produced by an inbound mapping pass
#[derive(Debug, Clone, Serialize)]
pub struct MappedRecord {
    pub object: String,
    pub scope: String,
    pub version: String,
    pub fields: BTreeMap<String, Option<String>>,
}

/// Data objects produced by an outbound mapping pass
#[derive(Debug, Clone, Serialize)]
pub struct MappedObjects {
    pub object: String,
    pub scope: String,
    pub version: String,
    pub xml: Vec<String>,
}

/// Result of a value set translation
#[derive(Debug, Clone, Serialize)]
pub struct LookupResult {
    pub valueset: String,
    pub direction: String,
    pub value: String,
    pub result: Option<String>,
}

/// Trait for formatting output with specialized support for the report types
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    fn format_validation_summary(&self, summary: &ValidationSummary) -> Result<String>;

    fn format_record(&self, record: &MappedRecord) -> Result<String>;

    fn format_objects(&self, objects: &MappedObjects) -> Result<String>;

    fn format_lookup(&self, lookup: &LookupResult) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty | OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        }
    }

    fn format_validation_summary(&self, summary: &ValidationSummary) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_validation_summary_human(summary)),
            _ => self.format(summary),
        }
    }

    fn format_record(&self, record: &MappedRecord) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_record_human(record)),
            _ => self.format(record),
        }
    }

    fn format_objects(&self, objects: &MappedObjects) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(objects.xml.join("\n")),
            _ => self.format(objects),
        }
    }

    fn format_lookup(&self, lookup: &LookupResult) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(lookup.result.clone().unwrap_or_else(|| "(null)".to_string())),
            _ => self.format(lookup),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    show_progress: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool, progress: bool) -> Self {
        Self {
            format,
            use_color,
            show_progress: progress && !quiet && io::stderr().is_terminal(),
            quiet,
            writer: Box::new(io::stdout()),
        }
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(format: OutputFormat, use_color: bool, quiet: bool, writer: Box<dyn Write>) -> Self {
        Self {
            format,
            use_color,
            // no progress bars with custom writers
            show_progress: false,
            quiet,
            writer,
        }
    }

    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn info(&mut self, message: &str) -> Result<()> {
        debug!("Output info: {}", message);

        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }
        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }
        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    pub fn warning(&mut self, message: &str) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }
        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }
        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    pub fn validation_summary(&mut self, summary: &ValidationSummary) -> Result<()> {
        let formatted = self.format.format_validation_summary(summary)?;
        trace!("Outputting summary: {} scope(s)", summary.scopes.len());
        self.writeln(formatted.trim_end())
    }

    pub fn record(&mut self, record: &MappedRecord) -> Result<()> {
        let formatted = self.format.format_record(record)?;
        self.writeln(formatted.trim_end())
    }

    pub fn objects(&mut self, objects: &MappedObjects) -> Result<()> {
        let formatted = self.format.format_objects(objects)?;
        self.writeln(formatted.trim_end())
    }

    pub fn lookup(&mut self, lookup: &LookupResult) -> Result<()> {
        let formatted = self.format.format_lookup(lookup)?;
        self.writeln(formatted.trim_end())
    }

    /// Progress bar on stderr, hidden when progress is off
    pub fn progress_bar(&self, length: u64, message: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(length);
        pb.set_style(default_progress_style());
        pb.set_message(message.to_string());
        pb
    }

    /// Write a table (for human format)
    pub fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.chars().count());
                }
            }
        }

        let header_row = headers
            .iter()
            .enumerate()
            .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
            .collect::<Vec<_>>()
            .join(" │ ");

        if self.use_color {
            self.writeln(header_row.trim_end().bold().to_string().as_str())?;
        } else {
            self.writeln(header_row.trim_end())?;
        }

        let separator = widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─");
        self.writeln(&separator)?;

        for row in rows {
            let row_str = row
                .iter()
                .enumerate()
                .map(|(i, cell)| match widths.get(i) {
                    Some(&width) => format!("{:width$}", cell, width = width),
                    None => cell.clone(),
                })
                .collect::<Vec<_>>()
                .join(" │ ");
            self.writeln(row_str.trim_end())?;
        }

        Ok(())
    }
}

pub fn default_progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

fn format_filter(values: &Option<Vec<String>>) -> String {
    match values {
        Some(values) => values.join(","),
        None => "*".to_string(),
    }
}

fn format_validation_summary_human(summary: &ValidationSummary) -> String {
    let mut output = String::new();

    let rules: usize = summary
        .scopes
        .iter()
        .flat_map(|s| s.rule_sets.iter())
        .map(|r| r.rules)
        .sum();
    output.push_str(&format!(
        "✅ {}: {} scope(s), {} field rule(s), {} catalog entr{}\n",
        summary.file,
        summary.scopes.len(),
        rules,
        summary.catalog_entries,
        if summary.catalog_entries == 1 { "y" } else { "ies" }
    ));

    for scope in &summary.scopes {
        let indent = "  ".repeat(scope.depth + 1);
        output.push_str(&format!(
            "\n{}{} [zones: {}] [sources: {}] [versions: {}]\n",
            indent,
            scope.id,
            format_filter(&scope.zones),
            format_filter(&scope.sources),
            format_filter(&scope.versions)
        ));
        for rule_set in &scope.rule_sets {
            output.push_str(&format!("{}  {}: {} rule(s)\n", indent, rule_set.object_type, rule_set.rules));
            for field in &rule_set.fields {
                output.push_str(&format!("{}    • {}\n", indent, field));
            }
        }
        if !scope.value_sets.is_empty() {
            output.push_str(&format!("{}  value sets: {}\n", indent, scope.value_sets.join(", ")));
        }
    }

    output
}

fn format_record_human(record: &MappedRecord) -> String {
    let mut output = format!(
        "{} (scope {}, SIF {})\n",
        record.object, record.scope, record.version
    );
    let width = record.fields.keys().map(|k| k.len()).max().unwrap_or(0);
    for (name, value) in &record.fields {
        output.push_str(&format!(
            "  {:width$} = {}\n",
            name,
            value.as_deref().unwrap_or("(null)"),
            width = width
        ));
    }
    output
}
