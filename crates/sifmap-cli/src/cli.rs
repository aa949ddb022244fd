//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Args, Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::path::PathBuf;

/// Sifmap - rule-driven mapping between flat records and SIF XML objects
///
/// Validates mapping rule documents and maps records outbound to SIF data
/// objects or data objects inbound to records.
#[derive(Parser, Debug)]
#[command(
    name = "sifmap",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "SIFMAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results (defaults to the configured format)
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a rule document and summarize its scopes, rule sets and value sets
    Validate(ValidateArgs),

    /// Map records to a SIF data object
    Outbound(OutboundArgs),

    /// Map a SIF data object to a record
    Inbound(InboundArgs),

    /// Translate a code through a value set
    Lookup(LookupArgs),

    /// Manage configuration files and settings
    Config(ConfigArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to the rule document (YAML or JSON)
    #[arg(value_name = "MAPPINGS")]
    pub mappings: PathBuf,

    /// List every field rule of every scope
    #[arg(long)]
    pub detailed: bool,
}

/// Which scope of the rule tree to map with
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Top-level scope to select from (defaults to the configured scope)
    #[arg(long)]
    pub scope: Option<String>,

    /// Zone identifier used to select a nested scope
    #[arg(long)]
    pub zone: Option<String>,

    /// Source identifier used to select a nested scope
    #[arg(long)]
    pub source: Option<String>,

    /// SIF version to map for, e.g. 1.5r1, 2.0, 3.0
    #[arg(long = "sif-version", value_name = "VERSION", env = "SIFMAP_VERSION")]
    pub sif_version: Option<String>,
}

/// Arguments for the outbound command
#[derive(Parser, Debug)]
pub struct OutboundArgs {
    /// Path to the rule document (YAML or JSON)
    #[arg(value_name = "MAPPINGS")]
    pub mappings: PathBuf,

    /// Object type to build, e.g. StudentPersonal
    #[arg(long)]
    pub object: String,

    /// JSON file holding one record object or an array of them
    #[arg(long, value_name = "FILE")]
    pub record: PathBuf,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Write the XML to a file instead of stdout
    #[arg(long = "save-to", value_name = "OUTPUT_FILE")]
    pub save_to: Option<PathBuf>,
}

/// Arguments for the inbound command
#[derive(Parser, Debug)]
pub struct InboundArgs {
    /// Path to the rule document (YAML or JSON)
    #[arg(value_name = "MAPPINGS")]
    pub mappings: PathBuf,

    /// XML file holding one data object
    #[arg(long, value_name = "FILE")]
    pub xml: PathBuf,

    /// Object type of the rules to apply (defaults to the root element name)
    #[arg(long)]
    pub object: Option<String>,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Write the record to a file instead of stdout
    #[arg(long = "save-to", value_name = "OUTPUT_FILE")]
    pub save_to: Option<PathBuf>,
}

/// Arguments for the lookup command
#[derive(Parser, Debug)]
pub struct LookupArgs {
    /// Path to the rule document (YAML or JSON)
    #[arg(value_name = "MAPPINGS")]
    pub mappings: PathBuf,

    /// Value set id
    #[arg(long)]
    pub valueset: String,

    /// Code to translate
    pub value: String,

    /// Translate a SIF code to the application code
    #[arg(long)]
    pub reverse: bool,

    /// Result when the code has no entry, ahead of the value set default
    #[arg(long)]
    pub default: Option<String>,

    /// Scope whose value sets are searched, inheriting from its ancestors
    #[arg(long)]
    pub scope: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Initialize default configuration files
    Init(ConfigInitArgs),

    /// Show current configuration values
    Show(ConfigShowArgs),
}

#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Initialize user config (<config dir>/sifmap/config.toml)
    #[arg(long)]
    pub user: bool,

    /// Initialize project config (.sifmap.toml)
    #[arg(long)]
    pub project: bool,

    /// Force overwrite existing config files
    #[arg(long)]
    pub force: bool,
}

#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Show configuration in specified format
    #[arg(short, long, value_enum, default_value = "toml")]
    pub format: ConfigFormat,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self, configured: bool) -> bool {
        !self.no_color && configured && std::io::stdout().is_terminal()
    }

    /// Output format from the flag, else from the configured name
    pub fn output_format(&self, configured: &str) -> OutputFormat {
        self.output
            .or_else(|| OutputFormat::from_str(configured, true).ok())
            .unwrap_or(OutputFormat::Human)
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}
