//! Lookup command handler

use super::utils::find_scope;
use super::utils::load_mappings;
use crate::cli::LookupArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::{LookupResult, OutputWriter};
use sifmap_core::{Direction, Mappings};
use tracing::{debug, instrument};

/// Handle the lookup command
#[instrument(skip(config, output))]
pub fn handle_lookup(args: LookupArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let mappings = load_mappings(&args.mappings)?;
    let result = lookup(&mappings, &args, config)?;
    output.lookup(&result)?;
    Ok(())
}

pub(crate) fn lookup(mappings: &Mappings, args: &LookupArgs, config: &Config) -> Result<LookupResult> {
    let scope = args.scope.as_deref().unwrap_or(&config.mapping.scope);
    let node = find_scope(mappings, scope)?;
    let value_set = mappings
        .value_set(node, &args.valueset, true)
        .ok_or_else(|| Error::ValueSetNotFound {
            id: args.valueset.clone(),
            scope: scope.to_string(),
        })?;

    let (direction, result) = if args.reverse {
        let result = value_set.translate_reverse(Some(args.value.as_str()), args.default.as_deref());
        (Direction::Inbound, result)
    } else {
        let result = value_set.translate(Some(args.value.as_str()), args.default.as_deref());
        (Direction::Outbound, result)
    };
    debug!(valueset = %args.valueset, %direction, ?result, "translated code");

    Ok(LookupResult {
        valueset: args.valueset.clone(),
        direction: direction.to_string(),
        value: args.value.clone(),
        result,
    })
}
