//! Validate command handler

use super::utils::load_mappings;
use crate::cli::ValidateArgs;
use crate::error::Result;
use crate::output::{OutputWriter, RuleSetSummary, ScopeSummary, ValidationSummary};
use sifmap_core::{Mappings, ScopeId};
use tracing::{info, instrument};

/// Handle the validate command
///
/// Loading the document is the validation: duplicate rules, scopes, value
/// sets and malformed filters all fail the load.
#[instrument(skip(output), fields(file = %args.mappings.display()))]
pub fn handle_validate(args: ValidateArgs, output: &mut OutputWriter) -> Result<()> {
    output.info(&format!("Validating rule document: {}", args.mappings.display()))?;

    let mappings = load_mappings(&args.mappings)?;
    let summary = summarize(&mappings, &args.mappings.display().to_string(), args.detailed);
    info!(scopes = summary.scopes.len(), "rule document is valid");

    output.validation_summary(&summary)?;

    if args.detailed {
        write_value_set_tables(&mappings, output)?;
    }
    Ok(())
}

/// One table per value set, human output only
fn write_value_set_tables(mappings: &Mappings, output: &mut OutputWriter) -> Result<()> {
    let nodes = mappings
        .top_level()
        .iter()
        .flat_map(|&top| std::iter::once(top).chain(mappings.descendants(top)));

    for node in nodes {
        let Some(scope) = mappings.scope(node) else {
            continue;
        };
        for value_set in scope.value_sets() {
            output.section(&format!(
                "{} ({})",
                value_set.title().unwrap_or(value_set.id()),
                scope.id().unwrap_or_default()
            ))?;
            let rows = value_set
                .entries()
                .iter()
                .map(|entry| {
                    vec![
                        entry.app.clone(),
                        entry.sif.clone(),
                        entry.title.clone().unwrap_or_default(),
                    ]
                })
                .collect();
            output.table(&["App", "SIF", "Title"], rows)?;
        }
    }
    Ok(())
}

/// Every named scope in pre-order with its filters and rule sets
pub(crate) fn summarize(mappings: &Mappings, file: &str, detailed: bool) -> ValidationSummary {
    let mut scopes = Vec::new();
    for &top in mappings.top_level() {
        scopes.push(summarize_scope(mappings, top, detailed));
        for node in mappings.descendants(top) {
            scopes.push(summarize_scope(mappings, node, detailed));
        }
    }

    ValidationSummary {
        file: file.to_string(),
        scopes,
        catalog_entries: mappings.catalog().declarations().len(),
    }
}

fn summarize_scope(mappings: &Mappings, node: ScopeId, detailed: bool) -> ScopeSummary {
    let depth = mappings.ancestry(node).count().saturating_sub(2);
    let Some(scope) = mappings.scope(node) else {
        return ScopeSummary {
            id: String::new(),
            depth,
            zones: None,
            sources: None,
            versions: None,
            rule_sets: Vec::new(),
            value_sets: Vec::new(),
        };
    };

    ScopeSummary {
        id: scope.id().unwrap_or_default().to_string(),
        depth,
        zones: scope.zones().map(<[String]>::to_vec),
        sources: scope.sources().map(<[String]>::to_vec),
        versions: scope
            .versions()
            .map(|versions| versions.iter().map(ToString::to_string).collect()),
        rule_sets: scope
            .object_mappings()
            .iter()
            .map(|mapping| RuleSetSummary {
                object_type: mapping.object_type().to_string(),
                rules: mapping.len(),
                fields: if detailed {
                    mapping.rules().iter().map(|rule| rule.key()).collect()
                } else {
                    Vec::new()
                },
            })
            .collect(),
        value_sets: scope.value_sets().iter().map(|set| set.id().to_string()).collect(),
    }
}
