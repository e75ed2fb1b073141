// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod env;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod types;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::cli::CliArgs;
use crate::config::{load_for_root, ConfigFile};
use crate::engine::{CtrlCInterrupts, Orchestrator, SessionPlan};
use crate::env::{base_environment, ProjectLayout};
use crate::errors::Result;
use crate::exec::{ExecutableResolver, RealProcessLauncher};
use crate::fs::RealFileSystem;
use crate::types::Platform;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (+ CLI overrides)
/// - environment composition and executable resolution
/// - the orchestrator with the real process launcher
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let root = args.root.clone().unwrap_or_else(|| PathBuf::from("."));
    let root = if root.is_absolute() { root } else { cwd.join(root) };

    let mut cfg = load_for_root(&root, args.config.as_deref())?;
    apply_overrides(&mut cfg, &args);

    let layout = ProjectLayout::new(&root, &cwd, &cfg.paths);
    let base = base_environment();
    let fs = Arc::new(RealFileSystem);
    let resolver = ExecutableResolver::new(Platform::current(), &cwd, fs.as_ref());
    let plan = SessionPlan::prepare(&cfg, &layout, &base, &resolver)?;

    if args.dry_run {
        print!("{}", plan.describe());
        return Ok(());
    }

    info!(root = %layout.root.display(), foreground = %plan.foreground, "starting session");

    let orchestrator = Orchestrator::new(RealProcessLauncher::new(), CtrlCInterrupts::new(), fs);
    let report = orchestrator.run(&plan).await?;
    report.into_result()
}

/// CLI flags win over the config file.
fn apply_overrides(cfg: &mut ConfigFile, args: &CliArgs) {
    if let Some(role) = args.foreground {
        cfg.session.foreground = role.into();
    }
    if let Some(launch) = args.backend_launch {
        cfg.session.backend_launch = launch.into();
    }
}
