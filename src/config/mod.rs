// src/config/mod.rs

//! Configuration loading and validation for devrun.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk, falling back to defaults (`loader.rs`).
//! - Validate tool names and project-relative paths (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{
    default_config_path, load_and_validate, load_for_root, load_from_path, DEFAULT_CONFIG_FILE,
};
pub use model::{
    ConfigFile, PathsSection, RawConfigFile, SessionSection, ToolsSection, DEFAULT_ASSETS_PREFIX,
};
