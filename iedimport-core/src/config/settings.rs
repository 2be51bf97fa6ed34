//! Import settings stored as TOML.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::import::{
    CandidateLoader, DEFAULT_EDIT_SPACING_MS, DEFAULT_EXTENSIONS, EditSpacing, ImportOrchestrator,
    InsertOptions, ParseFailurePolicy,
};
use crate::tracing::{TracingConfig, TracingLevel, TracingOutput};

/// Upper bound accepted for `edit_spacing_ms`
pub const MAX_EDIT_SPACING_MS: u64 = 10_000;

/// User settings for loading and importing devices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportSettings {
    /// Pause between two imported devices, in milliseconds
    pub edit_spacing_ms: u64,
    /// Copy the devices' `ConnectedAP` entries into the target
    pub add_communication_section: bool,
    /// Handling of unreadable or malformed input files
    pub parse_failure: ParseFailurePolicy,
    /// Accepted input file extensions, without leading dot
    pub accepted_extensions: Vec<String>,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Logging section of [`ImportSettings`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    /// Base log level before `-v` flags are applied
    pub level: TracingLevel,
    /// Custom `EnvFilter` directive, overriding `level`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// Append log output to this file instead of stderr
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            edit_spacing_ms: DEFAULT_EDIT_SPACING_MS,
            add_communication_section: true,
            parse_failure: ParseFailurePolicy::default(),
            accepted_extensions: DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
            logging: LoggingSettings::default(),
        }
    }
}

impl ImportSettings {
    /// Parses settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid TOML, unknown keys or invalid values.
    pub fn from_toml(text: &str) -> ConfigResult<Self> {
        let settings: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serializes settings to TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` naming the first invalid field.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.edit_spacing_ms > MAX_EDIT_SPACING_MS {
            return Err(ConfigError::Validation {
                field: "edit_spacing_ms".to_string(),
                reason: format!("must not exceed {MAX_EDIT_SPACING_MS}"),
            });
        }
        if self.accepted_extensions.is_empty() {
            return Err(ConfigError::Validation {
                field: "accepted_extensions".to_string(),
                reason: "at least one extension is required".to_string(),
            });
        }
        if let Some(bad) = self
            .accepted_extensions
            .iter()
            .find(|ext| ext.is_empty() || ext.contains(['/', '\\', ' ']))
        {
            return Err(ConfigError::Validation {
                field: "accepted_extensions".to_string(),
                reason: format!("invalid extension '{bad}'"),
            });
        }
        Ok(())
    }

    /// Pause between devices
    #[must_use]
    pub const fn edit_spacing(&self) -> EditSpacing {
        EditSpacing::from_millis(self.edit_spacing_ms)
    }

    /// Insertion options
    #[must_use]
    pub const fn insert_options(&self) -> InsertOptions {
        InsertOptions {
            add_communication_section: self.add_communication_section,
        }
    }

    /// Loader configured from these settings
    #[must_use]
    pub fn loader(&self) -> CandidateLoader {
        CandidateLoader::new()
            .with_policy(self.parse_failure)
            .with_extensions(&self.accepted_extensions)
    }

    /// Orchestrator configured from these settings
    #[must_use]
    pub fn orchestrator(&self) -> ImportOrchestrator {
        ImportOrchestrator::new()
            .with_spacing(self.edit_spacing())
            .with_options(self.insert_options())
    }

    /// Tracing configuration with the level raised by `verbosity` steps
    #[must_use]
    pub fn tracing_config(&self, verbosity: u8) -> TracingConfig {
        let mut config = TracingConfig::new().with_level(self.logging.level.raised_by(verbosity));
        if let Some(path) = &self.logging.file {
            config = config.with_output(TracingOutput::File(path.clone()));
        }
        match &self.logging.filter {
            Some(filter) if verbosity == 0 => config.with_filter(filter.clone()),
            _ => config,
        }
    }
}
