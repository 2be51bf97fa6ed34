//! Command handler modules for the CLI.

mod completions;
mod config;
mod import;
mod list;

use std::path::Path;

use crate::cli::Commands;
use crate::error::CliError;

/// Dispatch a CLI command to the appropriate handler.
pub fn dispatch(config_path: Option<&Path>, quiet: bool, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::List {
            target,
            files,
            format,
            filter,
        } => list::cmd_list(config_path, &target, &files, format, filter.as_deref()),
        Commands::Import {
            target,
            files,
            output,
            all,
            select,
            deselect,
            no_communication,
            spacing_ms,
            dry_run,
        } => import::cmd_import(
            config_path,
            &import::ImportParams {
                target: &target,
                files: &files,
                output: output.as_deref(),
                all,
                select: &select,
                deselect: &deselect,
                no_communication,
                spacing_ms,
                dry_run,
                quiet,
            },
        ),
        Commands::Config(subcmd) => config::cmd_config(config_path, subcmd),
        Commands::Completions { shell } => completions::cmd_completions(shell),
    }
}

/// Creates the runtime driving the asynchronous library calls
fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Io)
}
