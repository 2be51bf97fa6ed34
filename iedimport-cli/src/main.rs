//! `IedImport` CLI - Command-line interface for importing IEDs
//!
//! Provides commands for listing the devices found in SCL files, importing
//! them into a target document, and managing the settings file.

mod cli;
mod commands;
mod error;
mod util;

use clap::Parser;
use cli::Cli;
use iedimport_core::tracing::{TracingConfig, TracingLevel, init_tracing};

fn main() {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    // Settings errors are reported by the command itself
    let settings = util::load_settings(config_path).unwrap_or_default();
    let mut tracing_config = settings.tracing_config(cli.verbose);
    if cli.quiet {
        tracing_config = TracingConfig::new().with_level(TracingLevel::Error);
    }
    if let Err(e) = init_tracing(&tracing_config) {
        eprintln!("Warning: logging disabled: {e}");
    }

    let result = commands::dispatch(config_path, cli.quiet, cli.command);

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(e.exit_code());
    }
}
