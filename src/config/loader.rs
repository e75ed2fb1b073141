// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{DevrunError, Result};

/// File name looked up in the project root when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "Devrun.toml";

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] for the
/// semantic checks.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Load the effective configuration for a session.
///
/// - An explicit path must exist.
/// - Without one, `Devrun.toml` in `root` is used if present, otherwise the
///   built-in defaults apply.
pub fn load_for_root(root: &Path, explicit: Option<&Path>) -> Result<ConfigFile> {
    match explicit {
        Some(path) => {
            if !path.is_file() {
                return Err(DevrunError::ConfigError(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            load_and_validate(path)
        }
        None => {
            let path = default_config_path(root);
            if path.is_file() {
                debug!(path = %path.display(), "loading project config");
                load_and_validate(&path)
            } else {
                debug!(path = %path.display(), "no project config; using defaults");
                Ok(ConfigFile::default())
            }
        }
    }
}

pub fn default_config_path(root: &Path) -> PathBuf {
    root.join(DEFAULT_CONFIG_FILE)
}
