// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::types::{parse_duration, BackendLaunch, Role};

/// Default value injected for `ASSETS_PREFIX` when the environment lacks it.
pub const DEFAULT_ASSETS_PREFIX: &str = "http://localhost:8000/";

const DEFAULT_STOP_GRACE: Duration = Duration::from_secs(5);

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [tools]
/// backend_compiler = "go"
/// asset_tool = "npm"
///
/// [paths]
/// output = "frontend/dist"
///
/// [session]
/// foreground = "backend"
/// backend_launch = "source"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub tools: ToolsSection,

    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub session: SessionSection,
}

/// Validated configuration.
///
/// Only constructible through `TryFrom<RawConfigFile>` (or
/// [`ConfigFile::default`]), so holders can rely on the invariants checked
/// in `validate.rs`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub tools: ToolsSection,
    pub paths: PathsSection,
    pub session: SessionSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        tools: ToolsSection,
        paths: PathsSection,
        session: SessionSection,
    ) -> Self {
        Self {
            tools,
            paths,
            session,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        let raw = RawConfigFile::default();
        Self::new_unchecked(raw.tools, raw.paths, raw.session)
    }
}

/// `[tools]` section: names of the companion executables.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsSection {
    /// Back-end toolchain; invoked as `<compiler> build .` and, for source
    /// launches, `<compiler> run .`.
    #[serde(default = "default_backend_compiler")]
    pub backend_compiler: String,

    /// Front-end asset tool; invoked as `<asset_tool> run watch`.
    #[serde(default = "default_asset_tool")]
    pub asset_tool: String,

    /// Name of the binary the build step leaves in the back-end directory.
    #[serde(default = "default_backend_binary")]
    pub backend_binary: String,
}

fn default_backend_compiler() -> String {
    "go".to_string()
}

fn default_asset_tool() -> String {
    "npm".to_string()
}

fn default_backend_binary() -> String {
    "backend".to_string()
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            backend_compiler: default_backend_compiler(),
            asset_tool: default_asset_tool(),
            backend_binary: default_backend_binary(),
        }
    }
}

/// `[paths]` section. Every entry is relative to the project root.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsSection {
    #[serde(default = "default_backend_dir")]
    pub backend: String,

    #[serde(default = "default_frontend_dir")]
    pub frontend: String,

    /// Front-end build output, served by the back-end as static files.
    #[serde(default = "default_output_dir")]
    pub output: String,

    /// Map metadata directory handed to the back-end.
    #[serde(default = "default_metadata_dir")]
    pub metadata: String,
}

fn default_backend_dir() -> String {
    "backend".to_string()
}

fn default_frontend_dir() -> String {
    "frontend".to_string()
}

fn default_output_dir() -> String {
    "frontend/dist".to_string()
}

fn default_metadata_dir() -> String {
    "mapmeta".to_string()
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            backend: default_backend_dir(),
            frontend: default_frontend_dir(),
            output: default_output_dir(),
            metadata: default_metadata_dir(),
        }
    }
}

/// `[session]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSection {
    /// Process whose exit decides the overall result.
    #[serde(default)]
    pub foreground: Role,

    #[serde(default)]
    pub backend_launch: BackendLaunch,

    /// Value used for `ASSETS_PREFIX` when the environment does not set it.
    #[serde(default = "default_assets_prefix")]
    pub assets_prefix: String,

    /// How long a child may take to stop after being asked before it is
    /// killed (e.g. `"5s"`, `"500ms"`).
    #[serde(default = "default_stop_grace")]
    pub stop_grace: String,
}

impl SessionSection {
    /// Parsed `stop_grace`; validation guarantees it parses.
    pub fn stop_grace(&self) -> Duration {
        parse_duration(&self.stop_grace).unwrap_or(DEFAULT_STOP_GRACE)
    }
}

fn default_stop_grace() -> String {
    "5s".to_string()
}

fn default_assets_prefix() -> String {
    DEFAULT_ASSETS_PREFIX.to_string()
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            foreground: Role::default(),
            backend_launch: BackendLaunch::default(),
            assets_prefix: default_assets_prefix(),
            stop_grace: default_stop_grace(),
        }
    }
}
