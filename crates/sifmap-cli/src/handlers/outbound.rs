//! Outbound command handler

use super::utils::{load_mappings, read_records, resolve_selection, save_output};
use crate::cli::OutboundArgs;
use crate::config::Config;
use crate::error::Result;
use crate::logging::timing::Timer;
use crate::output::{MappedObjects, OutputWriter};
use sifmap_core::Element;
use tracing::{debug, info, instrument};

/// Handle the outbound command
///
/// Every record in the input maps to one data object; the first failing
/// record aborts the run.
#[instrument(skip(args, config, output), fields(object = %args.object, record = %args.record.display()))]
pub fn handle_outbound(args: OutboundArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let mappings = load_mappings(&args.mappings)?;
    let selection = resolve_selection(&mappings, &args.selection, config)?;
    let records = read_records(&args.record)?;

    info!(
        records = records.len(),
        object = %args.object,
        scope = %selection.scope,
        version = %selection.version,
        "mapping records outbound"
    );

    let timer = Timer::with_details("map_outbound", &args.object);
    let progress = output.progress_bar(records.len() as u64, "Mapping records");
    let mut xml = Vec::new();
    for (index, record) in records.iter().enumerate() {
        let mut object = Element::new(args.object.as_str());
        mappings.map_outbound(selection.node, selection.version, &mut object, record)?;
        debug!(index, "mapped record");

        xml.extend(object.to_xml()?.lines().map(str::to_string));
        progress.inc(1);
    }
    progress.finish_and_clear();
    info!(
        objects = records.len(),
        elapsed_ms = timer.elapsed().as_millis() as u64,
        "outbound mapping complete"
    );

    let objects = MappedObjects {
        object: args.object,
        scope: selection.scope,
        version: selection.version.to_string(),
        xml,
    };

    match args.save_to {
        Some(path) => {
            let mut content = objects.xml.join("\n");
            content.push('\n');
            save_output(&path, &content)?;
            output.success(&format!("✓ Output saved to {}", path.display()))?;
        }
        None => output.objects(&objects)?,
    }

    Ok(())
}
