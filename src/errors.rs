// src/errors.rs

//! Crate-wide error types.

use thiserror::Error;

use crate::exec::ExitOutcome;
use crate::types::Role;

#[derive(Error, Debug)]
pub enum DevrunError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to build back-end: build command {0}")]
    BuildFailed(ExitOutcome),

    #[error("Failed to launch {role}: {reason}")]
    LaunchFailed { role: Role, reason: String },

    #[error("Could not locate executable '{tool}': {reason}")]
    ResolutionFailed { tool: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, DevrunError>;
