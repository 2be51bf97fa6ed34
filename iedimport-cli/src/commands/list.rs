//! List devices command.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use iedimport_core::import::{ImportSession, SelectionList, SkippedFile};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::util::{load_settings, open_target};

/// One picklist row as printed
#[derive(Debug, Serialize)]
pub struct DeviceRow<'a> {
    index: usize,
    selected: bool,
    unique: bool,
    name: &'a str,
    primary: &'a str,
    secondary: &'a str,
    origin: &'a str,
}

/// One skipped file as printed
#[derive(Debug, Serialize)]
pub struct SkippedRow {
    path: String,
    reason: String,
}

#[derive(Serialize)]
struct ListOutput<'a> {
    devices: Vec<DeviceRow<'a>>,
    skipped: Vec<SkippedRow>,
    summary: String,
}

/// List devices command handler
pub fn cmd_list(
    config_path: Option<&Path>,
    target: &Path,
    files: &[PathBuf],
    format: OutputFormat,
    filter: Option<&str>,
) -> Result<(), CliError> {
    let settings = load_settings(config_path)?;
    let host = open_target(target)?;

    let runtime = super::runtime()?;
    let Some(session) =
        runtime.block_on(ImportSession::open(&host, &settings.loader(), files))?
    else {
        println!("No input files.");
        return Ok(());
    };

    let selection = session.selection();
    let rows = device_rows(selection, filter.unwrap_or_default());
    let skipped = skipped_rows(session.skipped());

    match format {
        OutputFormat::Table => {
            println!("{}", format_table(&rows));
            for row in &skipped {
                println!("skipped: {} ({})", row.path, row.reason);
            }
            println!("{}", selection.summary());
        }
        OutputFormat::Json => {
            let output = ListOutput {
                devices: rows,
                skipped,
                summary: selection.summary(),
            };
            let json = serde_json::to_string_pretty(&output)
                .map_err(|e| CliError::Output(format!("Failed to serialize: {e}")))?;
            println!("{json}");
        }
    }

    session.dismiss();
    Ok(())
}

/// Rows of `selection` matching `query`
pub fn device_rows<'a>(selection: &'a SelectionList, query: &str) -> Vec<DeviceRow<'a>> {
    selection
        .filter(query)
        .into_iter()
        .map(|index| {
            let item = &selection.items()[index];
            DeviceRow {
                index,
                selected: item.selected,
                unique: item.unique,
                name: item.headline(),
                primary: &item.description.primary,
                secondary: &item.description.secondary,
                origin: item.device.origin(),
            }
        })
        .collect()
}

fn skipped_rows(skipped: &[SkippedFile]) -> Vec<SkippedRow> {
    skipped
        .iter()
        .map(|file| SkippedRow {
            path: file.path.display().to_string(),
            reason: file.error.to_string(),
        })
        .collect()
}

/// Format picklist rows as a table string
#[must_use]
pub fn format_table(rows: &[DeviceRow<'_>]) -> String {
    if rows.is_empty() {
        return "No devices found.".to_string();
    }

    let mut output = String::new();

    let name_width = rows.iter().map(|r| r.name.len()).max().unwrap_or(4).max(4);
    let primary_width = rows
        .iter()
        .map(|r| r.primary.len())
        .max()
        .unwrap_or(11)
        .max(11);

    let _ = writeln!(
        output,
        "{:>3}  {:<3}  {:<name_width$}  {:<primary_width$}  DETAILS",
        "#", "SEL", "NAME", "DESCRIPTION"
    );
    let _ = writeln!(
        output,
        "{:->3}  {:-<3}  {:-<name_width$}  {:-<primary_width$}  -------",
        "", "", "", ""
    );

    for row in rows {
        let marker = match (row.selected, row.unique) {
            (true, _) => "[x]",
            (false, true) => "[ ]",
            (false, false) => "[!]",
        };
        let _ = writeln!(
            output,
            "{:>3}  {marker}  {:<name_width$}  {:<primary_width$}  {}",
            row.index, row.name, row.primary, row.secondary
        );
        let _ = writeln!(output, "     {:<3}  from {}", "", row.origin);
    }

    output.trim_end().to_string()
}
