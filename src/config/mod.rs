//! Configuration loading
//!
//! Configuration is read once at startup from a TOML file and passed by value
//! to whatever needs it; there is no global config instance.
mod macros;
mod schemas;

pub use schemas::{Config, LoggingConfig, ServerConfig, WebSocketConfig};

use anyhow::{Context, Result};
use std::path::Path;

use crate::logger::{self, LogTag};

/// Default configuration file path
pub const CONFIG_FILE_PATH: &str = "data/config.toml";

/// Load configuration from a TOML file
///
/// A missing file is not an error: defaults are used. A file that exists but
/// cannot be read or parsed is. The result is not validated here, so
/// command-line overrides can still fix it; call `Config::validate` after
/// applying them.
pub fn load_config_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let config = if path.exists() {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        parse_config(&contents)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))?
    } else {
        logger::warning(
            LogTag::Config,
            &format!("Config file '{}' not found, using default values", path.display()),
        );
        Config::default()
    };

    Ok(config)
}

/// Parse configuration from TOML text
pub fn parse_config(contents: &str) -> Result<Config> {
    Ok(toml::from_str::<Config>(contents)?)
}
