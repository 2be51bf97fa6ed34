//! Settings file commands.

use std::path::Path;

use iedimport_core::config::ImportSettings;

use crate::cli::ConfigCommands;
use crate::error::CliError;
use crate::util::create_config_manager;

/// Settings command handler
pub fn cmd_config(config_path: Option<&Path>, subcmd: ConfigCommands) -> Result<(), CliError> {
    let manager = create_config_manager(config_path)?;

    match subcmd {
        ConfigCommands::Show => {
            let settings = manager.load_settings()?;
            print!("{}", settings.to_toml()?);
        }
        ConfigCommands::Init { force } => {
            let path = manager.settings_path();
            if path.exists() && !force {
                return Err(CliError::Config(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            manager.save_settings(&ImportSettings::default())?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}
