//! `IedImport` Core Library
//!
//! This crate imports IED definitions from SCL files (`.iid .cid .icd .scd
//! .sed .ssd`) into an open target SCL document. It never mutates the target
//! itself: it emits edit events to a [`edit::DocumentHost`], which applies
//! them and owns undo/redo.
//!
//! # Crate Structure
//!
//! - [`scl`] - Navigable SCL element tree, fragments and typed IED identity
//! - [`edit`] - Edit requests, the host trait and an in-memory host
//! - [`import`] - Loading, classification, picklist, insertion and orchestration
//! - [`config`] - Import settings and persistence
//! - [`tracing`] - Structured logging setup
//! - [`error`] - Error types

// Enable missing_docs warning for public API documentation
#![warn(missing_docs)]

pub mod config;
pub mod edit;
pub mod error;
pub mod import;
pub mod scl;
pub mod tracing;

// =============================================================================
// Convenience re-exports
// =============================================================================

pub use config::{ConfigManager, ImportSettings};
pub use edit::{DocumentHost, Edit, InMemoryHost};
pub use error::{
    ConfigError, EditError, IedImportError, ImportError, InsertError, Result, SclError,
};
pub use import::{
    CandidateBatch, CandidateDevice, CandidateLoader, DeviceDescription, DeviceOutcome,
    EditSpacing, IedInserter, ImportOrchestrator, ImportReport, ImportSession, InsertOptions,
    ParseFailurePolicy, SclInserter, SelectionList, is_unique_candidate,
};
pub use scl::{ElementRef, Fragment, IedName, NodeId, SclDocument};
