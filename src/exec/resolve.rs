// src/exec/resolve.rs

//! Locating companion executables (`go`, `npm`, ...).
//!
//! The primary lookup is a `which`-style search of the composed `PATH`,
//! the same search the OS performs when a command is invoked by bare name.
//! On Windows, tools installed per-user by the Node.js installer are
//! frequently missing from `PATH`; their launcher scripts live under
//! `%APPDATA%\npm`, which is used as a fallback on that platform only.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::EnvMap;
use crate::errors::{DevrunError, Result};
use crate::fs::FileSystem;
use crate::types::Platform;

/// Per-user application data root on Windows.
pub const FALLBACK_ROOT_VAR: &str = "APPDATA";

/// Directory below [`FALLBACK_ROOT_VAR`] holding per-user tool launchers.
pub const FALLBACK_SUBDIR: &str = "npm";

#[derive(Debug)]
pub struct ExecutableResolver<'a> {
    platform: Platform,
    cwd: &'a Path,
    fs: &'a dyn FileSystem,
}

impl<'a> ExecutableResolver<'a> {
    /// `cwd` anchors tool names that carry a directory component.
    pub fn new(platform: Platform, cwd: &'a Path, fs: &'a dyn FileSystem) -> Self {
        Self { platform, cwd, fs }
    }

    /// Resolve `tool` to an invocable path using the variables in `env`.
    pub fn resolve(&self, tool: &str, env: &EnvMap) -> Result<PathBuf> {
        if let Some(path) = self.search_path(tool, env) {
            debug!(tool, path = %path.display(), "resolved on PATH");
            return Ok(path);
        }

        match self.platform {
            Platform::Windows => {
                let path = self.fallback(tool, env)?;
                info!(tool, path = %path.display(), "resolved through per-user install location");
                Ok(path)
            }
            Platform::Unix => Err(DevrunError::ResolutionFailed {
                tool: tool.to_string(),
                reason: "not found on PATH".to_string(),
            }),
        }
    }

    fn search_path(&self, tool: &str, env: &EnvMap) -> Option<PathBuf> {
        let path_var = self.lookup(env, "PATH").filter(|v| !v.is_empty());
        if path_var.is_none() && Path::new(tool).components().count() < 2 {
            return None;
        }
        match which::which_in(tool, path_var, self.cwd) {
            Ok(path) => Some(path),
            Err(e) => {
                debug!(tool, error = %e, "PATH lookup failed");
                None
            }
        }
    }

    fn fallback(&self, tool: &str, env: &EnvMap) -> Result<PathBuf> {
        let root = self
            .lookup(env, FALLBACK_ROOT_VAR)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| DevrunError::ResolutionFailed {
                tool: tool.to_string(),
                reason: format!("not found on PATH and %{FALLBACK_ROOT_VAR}% is not set"),
            })?;

        let path = fallback_location(Path::new(root), tool);
        if self.fs.is_file(&path) {
            Ok(path)
        } else {
            Err(DevrunError::ResolutionFailed {
                tool: tool.to_string(),
                reason: format!("not found on PATH or at {}", path.display()),
            })
        }
    }

    /// Environment names are case-insensitive on Windows (`Path` vs `PATH`).
    fn lookup<'e>(&self, env: &'e EnvMap, key: &str) -> Option<&'e str> {
        match self.platform {
            Platform::Windows => env
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v.as_str()),
            Platform::Unix => env.get(key).map(String::as_str),
        }
    }
}

/// `<root>\npm\<tool>.cmd`
pub fn fallback_location(root: &Path, tool: &str) -> PathBuf {
    root.join(FALLBACK_SUBDIR).join(format!("{tool}.cmd"))
}
