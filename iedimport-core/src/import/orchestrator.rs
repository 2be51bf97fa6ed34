//! Running an import against a host.

use std::time::Duration;

use tracing::{Instrument, debug, info, info_span, warn};

use crate::edit::{DocumentHost, Edit};
use crate::error::{ImportError, ImportResult};
use crate::scl::{CONNECTED_AP_TAG, IED_NAME_ATTRIBUTE, IedName, SCL_TAG};
use crate::tracing::span_names;

use super::candidate::{CandidateDevice, existing_top_level_ied};
use super::insert::{IedInserter, InsertOptions, SclInserter};

/// Default pause between two devices, in milliseconds
pub const DEFAULT_EDIT_SPACING_MS: u64 = 100;

/// Pause inserted between two devices of one run.
///
/// Hosts that coalesce edit events arriving in quick succession would
/// otherwise merge the events of consecutive devices into one undo step.
/// No pause follows the last device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditSpacing(Duration);

impl EditSpacing {
    /// Creates a spacing of the given duration
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self(duration)
    }

    /// Creates a spacing in milliseconds
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    /// No pause at all
    #[must_use]
    pub const fn none() -> Self {
        Self(Duration::ZERO)
    }

    /// The pause duration
    #[must_use]
    pub const fn duration(self) -> Duration {
        self.0
    }
}

impl Default for EditSpacing {
    fn default() -> Self {
        Self::from_millis(DEFAULT_EDIT_SPACING_MS)
    }
}

/// What happened to one device of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceOutcome {
    /// Insert event submitted
    Imported {
        /// Device name
        name: IedName,
        /// Whether an existing device of the same name was removed first
        replaced: bool,
        /// Number of `ConnectedAP` entries removed with the existing device
        removed_attachments: usize,
    },
    /// The inserter refused the device; no insertion was submitted
    Failed {
        /// Device name
        name: IedName,
        /// Inserter diagnostic
        reason: String,
    },
}

impl DeviceOutcome {
    /// Device name
    #[must_use]
    pub const fn name(&self) -> &IedName {
        match self {
            Self::Imported { name, .. } | Self::Failed { name, .. } => name,
        }
    }
}

/// Summary of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Per-device outcomes in processing order
    pub outcomes: Vec<DeviceOutcome>,
    /// Number of edit events submitted to the host
    pub events_submitted: usize,
}

impl ImportReport {
    /// Number of devices whose insert event was submitted
    #[must_use]
    pub fn imported_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, DeviceOutcome::Imported { .. }))
            .count()
    }

    /// Number of submitted devices that replaced an existing device
    #[must_use]
    pub fn replaced_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, DeviceOutcome::Imported { replaced: true, .. }))
            .count()
    }

    /// Number of devices the inserter refused
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.imported_count()
    }

    /// Returns a summary string of the run
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Imported: {}, Replaced: {}, Failed: {}, Events: {}",
            self.imported_count(),
            self.replaced_count(),
            self.failed_count(),
            self.events_submitted
        )
    }
}

/// Applies selected devices to a host, one device at a time.
///
/// For every device, an existing top-level IED of the same name is looked
/// up in the host's current document. When found, it and every
/// `ConnectedAP` referencing its name are removed in one event; the
/// insertion follows as a separate event. Emptied `SubNetwork` and
/// `Communication` containers are left in place.
///
/// Submitted events are not observed. A host that applies events later than
/// `submit` returns can make a later device miss an earlier one of the same
/// name.
#[derive(Debug, Clone)]
pub struct ImportOrchestrator<I = SclInserter> {
    inserter: I,
    options: InsertOptions,
    spacing: EditSpacing,
}

impl Default for ImportOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportOrchestrator {
    /// Creates an orchestrator with the bundled inserter and default settings
    #[must_use]
    pub fn new() -> Self {
        Self::with_inserter(SclInserter::new())
    }
}

impl<I: IedInserter> ImportOrchestrator<I> {
    /// Creates an orchestrator using a custom insertion primitive
    #[must_use]
    pub fn with_inserter(inserter: I) -> Self {
        Self {
            inserter,
            options: InsertOptions::default(),
            spacing: EditSpacing::default(),
        }
    }

    /// Sets the pause between devices
    #[must_use]
    pub const fn with_spacing(mut self, spacing: EditSpacing) -> Self {
        self.spacing = spacing;
        self
    }

    /// Sets the insertion options
    #[must_use]
    pub const fn with_options(mut self, options: InsertOptions) -> Self {
        self.options = options;
        self
    }

    /// The pause between devices
    #[must_use]
    pub const fn spacing(&self) -> EditSpacing {
        self.spacing
    }

    /// Imports `devices` in order.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::MissingScl` if the host document's root element
    /// is not `SCL`. Nothing is submitted in that case.
    pub async fn run<H: DocumentHost>(
        &self,
        host: &mut H,
        devices: &[CandidateDevice],
    ) -> ImportResult<ImportReport> {
        if host.document().root_element().local_name() != SCL_TAG {
            return Err(ImportError::MissingScl);
        }

        let span = info_span!(span_names::IMPORT_RUN, devices = devices.len());
        let report = self.run_devices(host, devices).instrument(span).await;

        info!(
            imported = report.imported_count(),
            replaced = report.replaced_count(),
            failed = report.failed_count(),
            events = report.events_submitted,
            "Import finished"
        );
        Ok(report)
    }

    async fn run_devices<H: DocumentHost>(
        &self,
        host: &mut H,
        devices: &[CandidateDevice],
    ) -> ImportReport {
        let mut report = ImportReport::default();

        for (index, device) in devices.iter().enumerate() {
            if index > 0 && !self.spacing.0.is_zero() {
                tokio::time::sleep(self.spacing.0).await;
            }

            let outcome = self.import_device(host, device, &mut report.events_submitted);
            report.outcomes.push(outcome);
        }

        report
    }

    fn import_device<H: DocumentHost>(
        &self,
        host: &mut H,
        device: &CandidateDevice,
        events: &mut usize,
    ) -> DeviceOutcome {
        let name = device.name();
        let span = info_span!(span_names::IMPORT_DEVICE, device = %name);
        let _guard = span.enter();

        let document = host.document();
        let scope = document.root();

        let mut removals = Vec::new();
        if let Some(existing) = existing_top_level_ied(document, &name) {
            removals.push(Edit::remove(existing.id()));
            removals.extend(
                document
                    .find_by_tag_and_attribute(
                        scope,
                        CONNECTED_AP_TAG,
                        IED_NAME_ATTRIBUTE,
                        name.as_deref(),
                    )
                    .iter()
                    .map(|ap| Edit::remove(ap.id())),
            );
        }

        let mut insertion = match self.inserter.insert(document, scope, device, self.options) {
            Ok(edits) => edits,
            Err(err) => return refused(name, &err),
        };

        let replaced = !removals.is_empty();
        let removed_attachments = removals.len().saturating_sub(1);

        if replaced {
            debug!(device = %name, removals = removals.len(), "Submitting removal event");
            host.submit(removals);
            *events += 1;

            // Rebuild against the document as the host now presents it
            let document = host.document();
            insertion = match self
                .inserter
                .insert(document, document.root(), device, self.options)
            {
                Ok(edits) => edits,
                Err(err) => return refused(name, &err),
            };
        }

        debug!(device = %name, edits = insertion.len(), "Submitting insertion event");
        host.submit(insertion);
        *events += 1;

        DeviceOutcome::Imported {
            name,
            replaced,
            removed_attachments,
        }
    }
}

fn refused(name: IedName, err: &impl std::fmt::Display) -> DeviceOutcome {
    warn!(device = %name, error = %err, "Inserter refused device");
    DeviceOutcome::Failed {
        name,
        reason: err.to_string(),
    }
}
