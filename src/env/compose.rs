// src/env/compose.rs

//! Per-child environment and working directory composition.

use std::path::{Path, PathBuf};

use crate::config::{PathsSection, SessionSection};
use crate::env::overlay::{ComposedEnvironment, EnvMap, EnvironmentOverlay};

pub const DEBUG_VAR: &str = "DEBUG";
pub const METADATA_PATH_VAR: &str = "METADATA_PATH";
pub const STATIC_PATH_VAR: &str = "STATIC_PATH";
pub const ASSETS_PREFIX_VAR: &str = "ASSETS_PREFIX";

/// Absolute locations of everything a session touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub root: PathBuf,
    pub backend_dir: PathBuf,
    pub frontend_dir: PathBuf,
    pub output_dir: PathBuf,
    pub metadata_dir: PathBuf,
}

impl ProjectLayout {
    /// Resolve the configured relative paths against `root`.
    ///
    /// `root` is made absolute against `cwd` when it is relative.
    pub fn new(root: &Path, cwd: &Path, paths: &PathsSection) -> Self {
        let root = if root.is_absolute() {
            root.to_path_buf()
        } else {
            cwd.join(root)
        };
        Self {
            backend_dir: root.join(&paths.backend),
            frontend_dir: root.join(&paths.frontend),
            output_dir: root.join(&paths.output),
            metadata_dir: root.join(&paths.metadata),
            root,
        }
    }
}

/// Environment plus working directory for one child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEnv {
    pub cwd: PathBuf,
    pub env: ComposedEnvironment,
}

/// The composed invocation context of every process in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEnvironments {
    pub build: ProcessEnv,
    pub backend: ProcessEnv,
    pub frontend: ProcessEnv,
}

/// Overlay applied to the back-end service.
pub fn backend_overlay(layout: &ProjectLayout, session: &SessionSection) -> EnvironmentOverlay {
    EnvironmentOverlay::new()
        .set(DEBUG_VAR, "true")
        .set(METADATA_PATH_VAR, path_value(&layout.metadata_dir))
        .set(STATIC_PATH_VAR, path_value(&layout.output_dir))
        .default_value(ASSETS_PREFIX_VAR, session.assets_prefix.as_str())
}

/// Overlay applied to the front-end watcher.
pub fn frontend_overlay(session: &SessionSection) -> EnvironmentOverlay {
    EnvironmentOverlay::new().default_value(ASSETS_PREFIX_VAR, session.assets_prefix.as_str())
}

/// Compose the environments of the build step and both children.
pub fn compose_session(
    base: &EnvMap,
    layout: &ProjectLayout,
    session: &SessionSection,
) -> SessionEnvironments {
    SessionEnvironments {
        build: ProcessEnv {
            cwd: layout.backend_dir.clone(),
            env: ComposedEnvironment::from(base.clone()),
        },
        backend: ProcessEnv {
            cwd: layout.backend_dir.clone(),
            env: backend_overlay(layout, session).apply(base),
        },
        frontend: ProcessEnv {
            cwd: layout.frontend_dir.clone(),
            env: frontend_overlay(session).apply(base),
        },
    }
}

fn path_value(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
