//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// Import IED definitions from SCL files into a target SCL document
#[derive(Parser)]
#[command(name = "iedimport")]
#[command(author, version, about = "IED import tool for SCL documents")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration directory
    #[arg(short, long, global = true, env = "IEDIMPORT_CONFIG_DIR")]
    pub config: Option<PathBuf>,

    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// List the devices found in input files
    #[command(about = "Show the import picklist without changing anything")]
    List {
        /// Target SCL document the devices are checked against
        #[arg(short, long)]
        target: PathBuf,

        /// Input files (.iid .cid .icd .scd .sed .ssd)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format for the picklist
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,

        /// Only show devices whose name or description contains this text
        #[arg(long)]
        filter: Option<String>,
    },

    /// Import devices into the target document
    #[command(about = "Import the selected devices into the target document")]
    Import {
        /// Target SCL document
        #[arg(short, long)]
        target: PathBuf,

        /// Input files (.iid .cid .icd .scd .sed .ssd)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Write the result here instead of replacing the target
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Select every device, including ones that replace existing devices
        #[arg(long, conflicts_with = "select")]
        all: bool,

        /// Select only the named devices (repeatable)
        #[arg(long, value_name = "NAME")]
        select: Vec<String>,

        /// Deselect the named devices (repeatable)
        #[arg(long, value_name = "NAME")]
        deselect: Vec<String>,

        /// Do not copy communication entries
        #[arg(long)]
        no_communication: bool,

        /// Pause between devices in milliseconds (overrides settings)
        #[arg(long, value_name = "MS")]
        spacing_ms: Option<u64>,

        /// Show what would be imported without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Manage the settings file
    #[command(subcommand, about = "Show or create the settings file")]
    Config(ConfigCommands),

    /// Generate shell completions
    #[command(about = "Generate shell completion scripts")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Settings file subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective settings as TOML
    Show,

    /// Write the default settings file
    Init {
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },
}

/// Output format options
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// Display as formatted table
    #[default]
    Table,
    /// Output as JSON
    Json,
}
