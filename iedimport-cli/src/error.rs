//! CLI error types and exit codes.

use std::path::PathBuf;

use iedimport_core::error::{ConfigError, IedImportError, ImportError, SclError};

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - configuration, arguments, output, or IO
    pub const GENERAL_ERROR: i32 = 1;
    /// Input document error - a target or input file could not be read or
    /// is not a usable SCL document
    pub const DOCUMENT_ERROR: i32 = 2;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Target document error
    #[error("Target document {}: {reason}", .path.display())]
    Target {
        /// Target path
        path: PathBuf,
        /// Failure description
        reason: String,
    },

    /// Import error
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Selection refers to unknown devices
    #[error("No device named '{0}' in the loaded files")]
    UnknownDevice(String),

    /// Output error
    #[error("Output error: {0}")]
    Output(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<SclError> for CliError {
    fn from(err: SclError) -> Self {
        Self::Output(err.to_string())
    }
}

impl From<IedImportError> for CliError {
    fn from(err: IedImportError) -> Self {
        match err {
            IedImportError::Import(e) => Self::Import(e),
            IedImportError::Config(e) => Self::Config(e.to_string()),
            IedImportError::Scl(e) => Self::Output(e.to_string()),
            IedImportError::Edit(e) => Self::Output(e.to_string()),
            IedImportError::Insert(e) => Self::Output(e.to_string()),
            IedImportError::Io(e) => Self::Io(e),
        }
    }
}

impl CliError {
    /// Returns the appropriate exit code for this error type.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: General error (configuration, selection, output, IO)
    /// - 2: Input document error (unreadable or malformed target or input)
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Target { .. } | Self::Import(_) => exit_codes::DOCUMENT_ERROR,
            Self::Config(_) | Self::UnknownDevice(_) | Self::Output(_) | Self::Io(_) => {
                exit_codes::GENERAL_ERROR
            }
        }
    }
}
