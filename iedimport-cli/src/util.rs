//! Shared utility functions used across command modules.

use std::path::Path;

use iedimport_core::config::{ConfigManager, ImportSettings};
use iedimport_core::edit::InMemoryHost;
use iedimport_core::scl::SclDocument;

use crate::error::CliError;

/// Creates a `ConfigManager` using the optional custom config directory
/// from CLI args.
pub fn create_config_manager(config_path: Option<&Path>) -> Result<ConfigManager, CliError> {
    match config_path {
        Some(path) => Ok(ConfigManager::with_config_dir(path.to_path_buf())),
        None => ConfigManager::new()
            .map_err(|e| CliError::Config(format!("Failed to initialize config: {e}"))),
    }
}

/// Loads the settings of the selected configuration directory
pub fn load_settings(config_path: Option<&Path>) -> Result<ImportSettings, CliError> {
    create_config_manager(config_path)?
        .load_settings()
        .map_err(|e| CliError::Config(format!("Failed to load settings: {e}")))
}

/// Reads and parses the target document into a host
pub fn open_target(path: &Path) -> Result<InMemoryHost, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| CliError::Target {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    let document = SclDocument::parse(text).map_err(|e| CliError::Target {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(InMemoryHost::new(document))
}

/// Writes `contents` next to `path` and renames it into place
pub fn write_atomically(path: &Path, contents: &str) -> Result<(), CliError> {
    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    std::fs::write(&temp_path, contents)
        .map_err(|e| CliError::Output(format!("{}: {e}", temp_path.display())))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| CliError::Output(format!("{}: {e}", path.display())))
}
