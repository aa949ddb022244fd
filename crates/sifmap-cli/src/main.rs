//! Sifmap CLI - Command-line interface for rule-driven SIF field mapping
//!
//! This is the main entry point for the `sifmap` binary, providing commands
//! for validating rule documents, mapping records to SIF data objects and
//! back, and translating codes through value sets.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;
use tracing_appender::non_blocking::WorkerGuard;

fn main() {
    let cli = Cli::parse_args();

    let config = match Config::load_with_file(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", error::format_error(&e, cli.use_color(true)));
            process::exit(e.exit_code());
        }
    };

    let use_color = cli.use_color(config.output.color);
    control::set_override(use_color);

    // held until exit so buffered file logs are flushed
    let guard = match init_logging(&cli, &config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            None
        }
    };

    let code = match run(cli, &config, use_color) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{}", error::format_error(&e, use_color));
            if e.should_show_help() {
                eprintln!("\nFor more information, try '--help'");
            }
            e.exit_code()
        }
    };

    drop(guard);
    process::exit(code);
}

/// Main application logic
#[instrument(skip(cli, config), fields(command = ?cli.command))]
fn run(cli: Cli, config: &Config, use_color: bool) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    let format = cli.output_format(&config.output.format);
    let mut output = OutputWriter::new(format, use_color, cli.quiet, config.output.progress);

    tracing::info!(
        command = ?cli.command,
        verbosity = cli.verbosity_level(),
        "Executing command"
    );

    match cli.command {
        Commands::Validate(args) => handlers::handle_validate(args, &mut output),
        Commands::Outbound(args) => handlers::handle_outbound(args, config, &mut output),
        Commands::Inbound(args) => handlers::handle_inbound(args, config, &mut output),
        Commands::Lookup(args) => handlers::handle_lookup(args, config, &mut output),
        Commands::Config(args) => handlers::handle_config(args, config, &mut output),
        Commands::Completions(args) => handlers::handle_completions(args),
    }
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: &Config) -> Result<Option<WorkerGuard>> {
    let verbosity = cli.verbosity_level();
    let mut logging_config = LoggingConfig::from_verbosity(verbosity);
    logging_config.apply_config(&config.logging, verbosity);
    logging_config.merge_with_env();

    // quiet mode logs errors only
    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}
