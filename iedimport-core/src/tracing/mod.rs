//! Tracing setup for structured logging
//!
//! The library only emits `tracing` events and spans. Binaries call
//! [`init_tracing`] once at startup; the subscriber filters on the
//! `iedimport_core` and `iedimport` targets unless a custom directive is set.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Targets covered by the level-based directive
const FILTER_TARGETS: [&str; 2] = ["iedimport_core", "iedimport"];

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Errors raised while installing the subscriber
#[derive(Debug, Error)]
pub enum TracingError {
    /// The filter directive does not parse
    #[error("Invalid log filter '{directive}': {reason}")]
    Filter {
        /// Directive as given
        directive: String,
        /// Parser message
        reason: String,
    },

    /// A subscriber is already installed
    #[error("Logging is already initialized")]
    AlreadyInitialized,

    /// The log file cannot be opened
    #[error("Cannot open log file {}: {reason}", .path.display())]
    LogFile {
        /// Log file path
        path: PathBuf,
        /// OS error message
        reason: String,
    },

    /// The global default subscriber could not be set
    #[error("Failed to install subscriber: {0}")]
    Install(String),
}

/// Result type for tracing operations
pub type TracingResult<T> = Result<T, TracingError>;

/// Log verbosity, from least to most verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TracingLevel {
    /// Errors only
    Error,
    /// Errors and warnings
    #[default]
    Warn,
    /// Per-run summaries
    Info,
    /// Per-file and per-device messages
    Debug,
    /// Everything
    Trace,
}

impl TracingLevel {
    const ALL: [Self; 5] = [Self::Error, Self::Warn, Self::Info, Self::Debug, Self::Trace];

    /// Directive spelling of the level
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// The level `steps` positions more verbose, stopping at `Trace`.
    /// Each `-v` flag is one step.
    #[must_use]
    pub fn raised_by(self, steps: u8) -> Self {
        let index = (self as usize).saturating_add(usize::from(steps));
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }
}

impl std::str::FromStr for TracingLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        if lower == "warning" {
            return Ok(Self::Warn);
        }
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == lower)
            .ok_or_else(|| format!("unknown log level '{s}'"))
    }
}

impl std::fmt::Display for TracingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where formatted events are written
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TracingOutput {
    /// Standard output
    Stdout,
    /// Standard error, keeping stdout free for command output
    #[default]
    Stderr,
    /// A log file, appended to
    File(PathBuf),
}

/// Subscriber settings
#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Level applied to the crate targets
    pub level: TracingLevel,
    /// Event destination
    pub output: TracingOutput,
    /// `EnvFilter` directive replacing the level-based one
    pub filter: Option<String>,
}

impl TracingConfig {
    /// Warn level on stderr
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the level
    #[must_use]
    pub const fn with_level(mut self, level: TracingLevel) -> Self {
        self.level = level;
        self
    }

    /// Sets the destination
    #[must_use]
    pub fn with_output(mut self, output: TracingOutput) -> Self {
        self.output = output;
        self
    }

    /// Sets a custom directive
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// The directive the subscriber is built with
    #[must_use]
    pub fn filter_directive(&self) -> String {
        match &self.filter {
            Some(filter) => filter.clone(),
            None => FILTER_TARGETS
                .iter()
                .map(|target| format!("{target}={}", self.level))
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

/// Installs the global subscriber. Only the first call succeeds.
///
/// # Errors
///
/// Returns an error for an invalid directive, an unopenable log file, or a
/// second call.
pub fn init_tracing(config: &TracingConfig) -> TracingResult<()> {
    if INSTALLED.swap(true, Ordering::SeqCst) {
        return Err(TracingError::AlreadyInitialized);
    }

    let directive = config.filter_directive();
    let filter = EnvFilter::try_new(&directive).map_err(|e| TracingError::Filter {
        directive: directive.clone(),
        reason: e.to_string(),
    })?;

    let (writer, ansi) = match &config.output {
        TracingOutput::Stdout => (BoxMakeWriter::new(std::io::stdout), true),
        TracingOutput::Stderr => (BoxMakeWriter::new(std::io::stderr), true),
        TracingOutput::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| TracingError::LogFile {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
            (BoxMakeWriter::new(file), false)
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_ansi(ansi)
                .with_writer(writer),
        )
        .try_init()
        .map_err(|e| TracingError::Install(e.to_string()))?;

    tracing::debug!(%directive, "Logging initialized");
    Ok(())
}

/// Span names used across the import pipeline
pub mod span_names {
    /// Reading and classifying input files
    pub const IMPORT_LOAD: &str = "import.load";
    /// One orchestrator run
    pub const IMPORT_RUN: &str = "import.run";
    /// One device within a run
    pub const IMPORT_DEVICE: &str = "import.device";
    /// Building the picklist
    pub const SESSION_OPEN: &str = "session.open";
    /// Reading the settings file
    pub const CONFIG_LOAD: &str = "config.load";
    /// Writing the settings file
    pub const CONFIG_SAVE: &str = "config.save";
}
