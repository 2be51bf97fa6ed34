//! Loading and saving the settings file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info_span};

use crate::error::{ConfigError, ConfigResult};
use crate::tracing::span_names;

use super::settings::ImportSettings;

/// Directory name below the platform configuration directory
pub const CONFIG_DIR_NAME: &str = "iedimport";

/// Settings file name inside the configuration directory
pub const SETTINGS_FILE_NAME: &str = "settings.toml";

/// Manages the settings file of one configuration directory.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Creates a manager for the platform configuration directory
    /// (`$XDG_CONFIG_HOME/iedimport` on Linux).
    ///
    /// # Errors
    ///
    /// Returns an error if the platform has no configuration directory.
    pub fn new() -> ConfigResult<Self> {
        let base = dirs::config_dir().ok_or_else(|| ConfigError::Validation {
            field: "config_dir".to_string(),
            reason: "no configuration directory on this platform".to_string(),
        })?;
        Ok(Self::with_config_dir(base.join(CONFIG_DIR_NAME)))
    }

    /// Creates a manager for a custom configuration directory
    #[must_use]
    pub const fn with_config_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// The configuration directory
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Path of the settings file
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE_NAME)
    }

    /// Loads settings, returning defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_settings(&self) -> ConfigResult<ImportSettings> {
        let path = self.settings_path();
        let _span = info_span!(span_names::CONFIG_LOAD, path = %path.display()).entered();

        match fs::read_to_string(&path) {
            Ok(text) => ImportSettings::from_toml(&text),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("Settings file not found, using defaults");
                Ok(ImportSettings::default())
            }
            Err(err) => Err(ConfigError::Parse(format!(
                "Failed to read {}: {err}",
                path.display()
            ))),
        }
    }

    /// Loads settings from an explicit file, which must exist.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the file is missing, or a parse error.
    pub fn load_settings_from(path: &Path) -> ConfigResult<ImportSettings> {
        let _span = info_span!(span_names::CONFIG_LOAD, path = %path.display()).entered();
        let text = fs::read_to_string(path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::Parse(format!("Failed to read {}: {err}", path.display()))
            }
        })?;
        ImportSettings::from_toml(&text)
    }

    /// Saves settings, replacing the file atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid or the file cannot be written.
    pub fn save_settings(&self, settings: &ImportSettings) -> ConfigResult<()> {
        let path = self.settings_path();
        let _span = info_span!(span_names::CONFIG_SAVE, path = %path.display()).entered();

        settings.validate()?;
        let text = settings.to_toml()?;

        fs::create_dir_all(&self.config_dir)
            .map_err(|e| ConfigError::Write(format!("{}: {e}", self.config_dir.display())))?;

        let temp_path = path.with_extension("toml.tmp");
        fs::write(&temp_path, text)
            .map_err(|e| ConfigError::Write(format!("{}: {e}", temp_path.display())))?;
        fs::rename(&temp_path, &path)
            .map_err(|e| ConfigError::Write(format!("{}: {e}", path.display())))?;

        debug!("Settings saved");
        Ok(())
    }
}
