//! Configuration command handlers

use crate::cli::{ConfigAction, ConfigArgs, ConfigFormat, ConfigInitArgs, ConfigShowArgs};
use crate::config::{Config, PROJECT_CONFIG};
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use std::path::PathBuf;
use tracing::info;

/// Handle the config command
pub fn handle_config(args: ConfigArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    match args.action {
        ConfigAction::Init(init_args) => handle_config_init(init_args, output),
        ConfigAction::Show(show_args) => handle_config_show(show_args, config, output),
    }
}

fn handle_config_init(args: ConfigInitArgs, output: &mut OutputWriter) -> Result<()> {
    let mut created_any = false;

    // neither flag means both
    let init_user = args.user || !args.project;
    let init_project = args.project || !args.user;

    if init_user {
        let user_config_path = Config::user_config_path()
            .ok_or_else(|| Error::config("Unable to determine user config directory"))?;

        if user_config_path.exists() && !args.force {
            output.warning(&format!(
                "User config already exists at {}",
                user_config_path.display()
            ))?;
        } else {
            let path = Config::create_default_user_config()?;
            output.success(&format!("✓ Created user config at {}", path.display()))?;
            created_any = true;
        }
    }

    if init_project {
        if PathBuf::from(PROJECT_CONFIG).exists() && !args.force {
            output.warning(&format!("Project config already exists at {}", PROJECT_CONFIG))?;
        } else {
            let path = Config::create_default_project_config()?;
            output.success(&format!("✓ Created project config at {}", path.display()))?;
            created_any = true;
        }
    }

    if created_any {
        output.info("Configuration files created with default values.")?;
    }

    Ok(())
}

fn handle_config_show(args: ConfigShowArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    // stdout carries only the rendered file
    let project = Config::find_project_config();
    let user = Config::user_config_path().filter(|p| p.exists());
    info!(?project, ?user, "configuration sources");

    let content = render(config, args.format)?;
    output.writeln(content.trim_end())
}

/// The effective configuration in a file format
fn render(config: &Config, format: ConfigFormat) -> Result<String> {
    Ok(match format {
        ConfigFormat::Toml => toml::to_string_pretty(config)
            .map_err(|e| Error::config(format!("Failed to serialize as TOML: {}", e)))?,
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    })
}
