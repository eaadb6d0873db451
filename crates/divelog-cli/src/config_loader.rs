//! Configuration loading for CLI commands

use anyhow::{Context, Result};
use divelog_core::config::{CliConfigOverrides, LayeredConfig};
use std::path::Path;

/// Default configuration file name looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "divelog.toml";

/// Load defaults, then the config file, then `DIVELOG_*` variables, then overrides.
///
/// An explicitly given file must exist; the default file is optional.
pub fn load_config(path: Option<&Path>, overrides: CliConfigOverrides) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();

    match path {
        Some(path) => {
            config = config
                .load_from_file(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
        }
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            config = config
                .load_from_file(DEFAULT_CONFIG_FILE)
                .context("Failed to load divelog.toml")?;
        }
        None => {}
    }

    let mut config = config.load_from_env();
    config.update_from_cli(overrides);
    Ok(config)
}
