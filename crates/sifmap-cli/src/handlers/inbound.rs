//! Inbound command handler

use super::utils::{load_mappings, resolve_selection, save_output};
use crate::cli::InboundArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::{MappedRecord, OutputWriter};
use sifmap_core::{Direction, Element, StringMapAdaptor};
use std::fs;
use tracing::{info, instrument};

/// Handle the inbound command
#[instrument(skip(args, config, output), fields(xml = %args.xml.display()))]
pub fn handle_inbound(args: InboundArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let mappings = load_mappings(&args.mappings)?;
    let selection = resolve_selection(&mappings, &args.selection, config)?;

    if !args.xml.exists() {
        return Err(Error::FileNotFound { path: args.xml });
    }
    let root = Element::from_xml(&fs::read_to_string(&args.xml)?)?;
    let object = args
        .object
        .unwrap_or_else(|| root.local_name().to_string());

    info!(
        object = %object,
        scope = %selection.scope,
        version = %selection.version,
        "mapping data object inbound"
    );

    let _timer = Timer::with_details("map_inbound", &object);
    let mut record = StringMapAdaptor::new();
    mappings
        .context(selection.node, &object, Direction::Inbound, selection.version)?
        .map_inbound(&root, &mut record)?;
    info!(fields = record.len(), "inbound mapping complete");

    let record = MappedRecord {
        object,
        scope: selection.scope,
        version: selection.version.to_string(),
        fields: record
            .fields()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value.map(str::to_string)))
            .collect(),
    };

    match args.save_to {
        Some(path) => {
            // the saved record is always JSON so it can feed `outbound`
            let content = serde_json::to_string_pretty(&record.fields)?;
            save_output(&path, &content)?;
            output.success(&format!("✓ Output saved to {}", path.display()))?;
        }
        None => output.record(&record)?,
    }

    Ok(())
}
