//! One import interaction: load, review, then confirm or dismiss.

use std::path::PathBuf;

use tracing::{Instrument, info, info_span};

use crate::edit::DocumentHost;
use crate::error::ImportResult;
use crate::tracing::span_names;

use super::insert::IedInserter;
use super::loader::{CandidateLoader, SkippedFile};
use super::orchestrator::{ImportOrchestrator, ImportReport};
use super::selection::SelectionList;

/// State between loading the picklist and confirming it.
///
/// Dropping a session (or calling [`dismiss`](Self::dismiss)) never touches
/// the target document. Once confirmed, the run goes through every selected
/// device; there is no cancellation mid-run.
#[derive(Debug)]
pub struct ImportSession {
    selection: SelectionList,
    skipped: Vec<SkippedFile>,
    edit_count_at_load: u64,
}

impl ImportSession {
    /// Loads `paths` and builds the picklist.
    ///
    /// Returns `Ok(None)` for an empty `paths` slice; nothing is read and no
    /// session is opened.
    ///
    /// # Errors
    ///
    /// Returns the loader error when its policy aborts on a bad file.
    pub async fn open<H: DocumentHost>(
        host: &H,
        loader: &CandidateLoader,
        paths: &[PathBuf],
    ) -> ImportResult<Option<Self>> {
        if paths.is_empty() {
            return Ok(None);
        }

        let span = info_span!(span_names::SESSION_OPEN, files = paths.len());
        let outcome = loader
            .load(paths, host.document())
            .instrument(span)
            .await?;

        let selection = SelectionList::from_batch(outcome.batch);
        info!(
            devices = selection.len(),
            selected = selection.selected_count(),
            skipped = outcome.skipped.len(),
            "Import session opened"
        );

        Ok(Some(Self {
            selection,
            skipped: outcome.skipped,
            edit_count_at_load: host.edit_count(),
        }))
    }

    /// The picklist
    #[must_use]
    pub const fn selection(&self) -> &SelectionList {
        &self.selection
    }

    /// The picklist, for changing selections
    pub const fn selection_mut(&mut self) -> &mut SelectionList {
        &mut self.selection
    }

    /// Files that contributed no candidates
    #[must_use]
    pub fn skipped(&self) -> &[SkippedFile] {
        &self.skipped
    }

    /// Host change counter when the picklist was built
    #[must_use]
    pub const fn edit_count_at_load(&self) -> u64 {
        self.edit_count_at_load
    }

    /// Imports the selected devices.
    ///
    /// Collision flags are not trusted at this point: the orchestrator looks
    /// up existing devices again in the current document.
    ///
    /// # Errors
    ///
    /// Returns an error if the orchestrator refuses the target document.
    pub async fn confirm<H, I>(
        self,
        host: &mut H,
        orchestrator: &ImportOrchestrator<I>,
    ) -> ImportResult<ImportReport>
    where
        H: DocumentHost,
        I: IedInserter,
    {
        let current = host.edit_count();
        if current != self.edit_count_at_load {
            info!(
                at_load = self.edit_count_at_load,
                current, "Target document changed since the picklist was built"
            );
        }

        let devices = self.selection.selected_devices();
        orchestrator.run(host, &devices).await
    }

    /// Closes the session without importing
    pub fn dismiss(self) {
        info!(devices = self.selection.len(), "Import session dismissed");
    }
}
