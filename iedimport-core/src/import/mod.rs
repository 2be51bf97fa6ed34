//! IED import into an open SCL document.
//!
//! The flow mirrors a picklist dialog:
//! - [`CandidateLoader`] reads input files and classifies each IED into a
//!   [`CandidateBatch`]
//! - [`SelectionList`] pre-selects the candidates that collide with nothing
//!   and lets the user change the selection
//! - [`ImportOrchestrator`] replaces same-named devices and inserts the
//!   selection through an [`IedInserter`], one device at a time
//!
//! [`ImportSession`] ties the steps together:
//!
//! ```ignore
//! let loader = CandidateLoader::new();
//! if let Some(mut session) = ImportSession::open(&host, &loader, &paths).await? {
//!     session.selection_mut().select_named(&IedName::new("Bay1"), true);
//!     let report = session.confirm(&mut host, &ImportOrchestrator::new()).await?;
//!     println!("{}", report.summary());
//! }
//! ```

mod candidate;
mod describe;
mod insert;
mod loader;
mod orchestrator;
mod selection;
mod session;

pub use candidate::{
    BatchEntry, CandidateBatch, CandidateDevice, existing_top_level_ied, is_unique_candidate,
};
pub use describe::{DESCRIPTION_SEPARATOR, DeviceDescription};
pub use insert::{IedInserter, InsertOptions, SclInserter};
pub use loader::{
    CandidateLoader, DEFAULT_EXTENSIONS, LoadOutcome, ParseFailurePolicy, SkippedFile,
};
pub use orchestrator::{
    DEFAULT_EDIT_SPACING_MS, DeviceOutcome, EditSpacing, ImportOrchestrator, ImportReport,
};
pub use selection::{SelectItem, SelectionList};
pub use session::ImportSession;
