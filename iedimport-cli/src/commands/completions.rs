//! Shell completion generation.

use std::io::Write;

use clap::CommandFactory;
use clap_complete::{Shell, generate};

use crate::cli::Cli;
use crate::error::CliError;

/// Writes the completion script for `shell` to stdout.
pub fn cmd_completions(shell: Shell) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_completions(shell, &mut out);
    out.flush()?;
    Ok(())
}

/// Generates completions for the `iedimport` command tree into `out`.
fn write_completions(shell: Shell, out: &mut impl Write) {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    tracing::debug!(%shell, bin = %bin_name, "Generating completions");
    generate(shell, &mut cmd, bin_name, out);
}
