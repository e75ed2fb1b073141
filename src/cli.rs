// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::{BackendLaunch, Role};

/// Command-line arguments for `devrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "devrun",
    version,
    about = "Build the back-end, then run it alongside the front-end asset watcher.",
    long_about = None
)]
pub struct CliArgs {
    /// Project root containing the back-end and front-end sources.
    ///
    /// Default: the current working directory.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Path to the config file (TOML).
    ///
    /// Default: `Devrun.toml` in the project root; a missing default file
    /// means built-in defaults.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Which process is waited on; the other one runs in the background.
    #[arg(long, value_enum, value_name = "ROLE")]
    pub foreground: Option<RoleArg>,

    /// How to start the back-end after building it.
    #[arg(long, value_enum, value_name = "MODE")]
    pub backend_launch: Option<LaunchArg>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DEVRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve tools and print the launch plan without running anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum RoleArg {
    Backend,
    Frontend,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Backend => Role::Backend,
            RoleArg::Frontend => Role::Frontend,
        }
    }
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LaunchArg {
    Prebuilt,
    Source,
}

impl From<LaunchArg> for BackendLaunch {
    fn from(arg: LaunchArg) -> Self {
        match arg {
            LaunchArg::Prebuilt => BackendLaunch::Prebuilt,
            LaunchArg::Source => BackendLaunch::Source,
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
