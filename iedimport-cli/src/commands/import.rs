//! Import devices command.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use iedimport_core::edit::{DocumentHost, InMemoryHost};
use iedimport_core::import::{
    DeviceOutcome, EditSpacing, ImportOrchestrator, ImportReport, ImportSession, InsertOptions,
    SelectionList,
};
use iedimport_core::scl::IedName;
use tracing::debug;

use crate::error::CliError;
use crate::util::{load_settings, open_target, write_atomically};

/// Parameters for the import command
pub struct ImportParams<'a> {
    pub target: &'a Path,
    pub files: &'a [PathBuf],
    pub output: Option<&'a Path>,
    pub all: bool,
    pub select: &'a [String],
    pub deselect: &'a [String],
    pub no_communication: bool,
    pub spacing_ms: Option<u64>,
    pub dry_run: bool,
    pub quiet: bool,
}

/// Import command handler
pub fn cmd_import(config_path: Option<&Path>, params: &ImportParams<'_>) -> Result<(), CliError> {
    let settings = load_settings(config_path)?;
    let mut host = open_target(params.target)?;

    let runtime = super::runtime()?;
    let Some(mut session) =
        runtime.block_on(ImportSession::open(&host, &settings.loader(), params.files))?
    else {
        return Ok(());
    };

    if !params.quiet {
        for skipped in session.skipped() {
            eprintln!("Skipped {}: {}", skipped.path.display(), skipped.error);
        }
    }

    apply_overrides(session.selection_mut(), params)?;

    if session.selection().selected_count() == 0 {
        if !params.quiet {
            println!("No devices selected. {}", session.selection().summary());
        }
        session.dismiss();
        return Ok(());
    }

    if params.dry_run {
        if !params.quiet {
            print!("{}", format_plan(session.selection()));
        }
        session.dismiss();
        return Ok(());
    }

    let mut orchestrator = settings.orchestrator();
    if params.no_communication {
        orchestrator = orchestrator.with_options(InsertOptions {
            add_communication_section: false,
        });
    }
    if let Some(ms) = params.spacing_ms {
        orchestrator = orchestrator.with_spacing(EditSpacing::from_millis(ms));
    }

    let (report, xml) = runtime.block_on(confirm_and_render(session, &mut host, &orchestrator))?;

    let rejected = host.rejections().len();
    if rejected > 0 {
        return Err(CliError::Output(format!(
            "{rejected} edit event(s) were rejected by the target document; nothing was written"
        )));
    }

    let destination = params.output.unwrap_or(params.target);
    write_atomically(destination, &xml)?;
    debug!(path = %destination.display(), events = host.edit_count(), "Wrote target document");

    if !params.quiet {
        print!("{}", format_report(&report));
        println!("Wrote {}", destination.display());
    }
    Ok(())
}

/// Submits the selection to `host` and serializes the resulting document
async fn confirm_and_render(
    session: ImportSession,
    host: &mut InMemoryHost,
    orchestrator: &ImportOrchestrator,
) -> iedimport_core::Result<(ImportReport, String)> {
    let report = session.confirm(host, orchestrator).await?;
    let xml = host.document().to_xml_string()?;
    Ok((report, xml))
}

/// Applies `--all`, `--select` and `--deselect` to the default selection
fn apply_overrides(selection: &mut SelectionList, params: &ImportParams<'_>) -> Result<(), CliError> {
    if params.all {
        selection.select_all();
    }

    if !params.select.is_empty() {
        selection.select_none();
        for name in params.select {
            if selection.select_named(&IedName::new(name.as_str()), true) == 0 {
                return Err(CliError::UnknownDevice(name.clone()));
            }
        }
    }

    for name in params.deselect {
        if selection.select_named(&IedName::new(name.as_str()), false) == 0 {
            return Err(CliError::UnknownDevice(name.clone()));
        }
    }

    Ok(())
}

/// One line per selected device: whether it is added or replaces one
fn format_plan(selection: &SelectionList) -> String {
    let mut plan = String::new();
    for item in selection.items().iter().filter(|item| item.selected) {
        let action = if item.unique { "add" } else { "replace" };
        let _ = writeln!(
            plan,
            "{action:<8} {}  ({})",
            item.headline(),
            item.device.origin()
        );
    }
    let _ = writeln!(plan, "{}", selection.summary());
    plan
}

fn format_report(report: &ImportReport) -> String {
    let mut text = String::new();
    for outcome in &report.outcomes {
        let line = match outcome {
            DeviceOutcome::Imported {
                name,
                replaced: false,
                ..
            } => format!("added    {name}"),
            DeviceOutcome::Imported {
                name,
                replaced: true,
                removed_attachments,
            } => format!("replaced {name} ({removed_attachments} access point(s) removed)"),
            DeviceOutcome::Failed { name, reason } => format!("failed   {name}: {reason}"),
        };
        let _ = writeln!(text, "{line}");
    }
    let _ = writeln!(text, "{}", report.summary());
    text
}
