//! Configuration management for `IedImport`
//!
//! This module provides the `ConfigManager` for loading and saving
//! the import settings file in TOML format.

mod manager;
pub mod settings;

pub use manager::{CONFIG_DIR_NAME, ConfigManager, SETTINGS_FILE_NAME};
pub use settings::{ImportSettings, LoggingSettings, MAX_EDIT_SPACING_MS};
