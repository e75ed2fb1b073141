// src/engine/plan.rs

//! Turning configuration + environment into concrete invocations.

use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::config::ConfigFile;
use crate::env::{
    compose_session, EnvMap, ProjectLayout, ASSETS_PREFIX_VAR, DEBUG_VAR, METADATA_PATH_VAR,
    STATIC_PATH_VAR,
};
use crate::errors::Result;
use crate::exec::{CommandSpec, ExecutableResolver};
use crate::types::{BackendLaunch, Role};

/// Variables shown by `--dry-run`.
const OVERLAY_VARS: [&str; 4] = [DEBUG_VAR, METADATA_PATH_VAR, STATIC_PATH_VAR, ASSETS_PREFIX_VAR];

/// Everything needed to run one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPlan {
    pub build: CommandSpec,
    pub backend: CommandSpec,
    pub frontend: CommandSpec,
    /// Created before the children start; the back-end serves it as
    /// `STATIC_PATH`.
    pub output_dir: PathBuf,
    pub foreground: Role,
    pub stop_grace: Duration,
}

impl SessionPlan {
    /// Compose environments and resolve executables for a session.
    ///
    /// Both companion tools are resolved up front, so a missing tool aborts
    /// before the build runs or anything is spawned.
    pub fn prepare(
        config: &ConfigFile,
        layout: &ProjectLayout,
        base: &EnvMap,
        resolver: &ExecutableResolver<'_>,
    ) -> Result<Self> {
        let compiler = resolver.resolve(&config.tools.backend_compiler, base)?;
        let asset_tool = resolver.resolve(&config.tools.asset_tool, base)?;
        debug!(
            compiler = %compiler.display(),
            asset_tool = %asset_tool.display(),
            "resolved tools"
        );

        let envs = compose_session(base, layout, &config.session);

        let build = CommandSpec::new("build", &compiler, ["build", "."], &envs.build);

        let backend = match config.session.backend_launch {
            BackendLaunch::Prebuilt => {
                let binary = format!(
                    "{}{}",
                    config.tools.backend_binary,
                    std::env::consts::EXE_SUFFIX
                );
                CommandSpec::new(
                    "back-end",
                    layout.backend_dir.join(binary),
                    [
                        "--debug".to_string(),
                        "--metadata-path".to_string(),
                        layout.metadata_dir.to_string_lossy().into_owned(),
                    ],
                    &envs.backend,
                )
            }
            BackendLaunch::Source => {
                CommandSpec::new("back-end", &compiler, ["run", "."], &envs.backend)
            }
        };

        let frontend = CommandSpec::new("front-end", &asset_tool, ["run", "watch"], &envs.frontend);

        Ok(Self {
            build,
            backend,
            frontend,
            output_dir: layout.output_dir.clone(),
            foreground: config.session.foreground,
            stop_grace: config.session.stop_grace(),
        })
    }

    pub fn spec_for(&self, role: Role) -> &CommandSpec {
        match role {
            Role::Backend => &self.backend,
            Role::Frontend => &self.frontend,
        }
    }

    /// Human-readable plan for `--dry-run`.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        out.push_str("devrun dry-run\n");
        out.push_str(&format!("  foreground: {}\n", self.foreground));
        out.push_str(&format!("  background: {}\n", self.foreground.other()));
        out.push_str(&format!("  output dir: {}\n", self.output_dir.display()));
        out.push_str(&format!("  stop grace: {:?}\n", self.stop_grace));
        for spec in [&self.build, &self.backend, &self.frontend] {
            out.push_str(&format!("\n{}:\n", spec.label));
            out.push_str(&format!("    cmd: {spec}\n"));
            out.push_str(&format!("    cwd: {}\n", spec.cwd.display()));
            for key in OVERLAY_VARS {
                if let Some(value) = spec.env.get(key) {
                    out.push_str(&format!("    env: {key}={value}\n"));
                }
            }
        }
        out
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::path::Path;

    use tempfile::TempDir;

    use crate::config::{PathsSection, DEFAULT_ASSETS_PREFIX};
    use crate::errors::DevrunError;
    use crate::exec::resolve::tests::{install_tool, path_of};
    use crate::fs::mock::MockFileSystem;
    use crate::types::Platform;

    fn layout() -> ProjectLayout {
        ProjectLayout::new(Path::new("/proj"), Path::new("/"), &PathsSection::default())
    }

    /// A `PATH` directory holding the given tools.
    fn toolbox(tools: &[&str]) -> (TempDir, EnvMap) {
        let dir = tempfile::tempdir().unwrap();
        for tool in tools {
            install_tool(dir.path(), tool, true);
        }
        let base = EnvMap::from([("PATH".to_string(), path_of(&[dir.path()]))]);
        (dir, base)
    }

    #[test]
    fn prebuilt_backend_gets_flags_and_environment() {
        let (bin, base) = toolbox(&["go", "npm"]);
        let fs = MockFileSystem::new();
        let resolver = ExecutableResolver::new(Platform::Unix, Path::new("/"), &fs);
        let plan = SessionPlan::prepare(&ConfigFile::default(), &layout(), &base, &resolver)
            .unwrap();

        assert_eq!(
            plan.build.to_string(),
            format!("{} build .", bin.path().join("go").display())
        );
        assert_eq!(plan.build.cwd, PathBuf::from("/proj/backend"));
        assert_eq!(
            plan.backend.to_string(),
            "/proj/backend/backend --debug --metadata-path /proj/mapmeta"
        );
        assert_eq!(plan.backend.env.get(DEBUG_VAR), Some("true"));
        assert_eq!(
            plan.frontend.to_string(),
            format!("{} run watch", bin.path().join("npm").display())
        );
        assert_eq!(plan.frontend.cwd, PathBuf::from("/proj/frontend"));
        assert_eq!(plan.frontend.env.get(ASSETS_PREFIX_VAR), Some(DEFAULT_ASSETS_PREFIX));
        assert_eq!(plan.output_dir, PathBuf::from("/proj/frontend/dist"));
        assert_eq!(plan.foreground, Role::Frontend);
        assert_eq!(plan.spec_for(Role::Backend), &plan.backend);
    }

    #[test]
    fn source_backend_runs_through_compiler() {
        let (bin, base) = toolbox(&["go", "npm"]);
        let fs = MockFileSystem::new();
        let resolver = ExecutableResolver::new(Platform::Unix, Path::new("/"), &fs);
        let mut cfg = ConfigFile::default();
        cfg.session.backend_launch = BackendLaunch::Source;
        cfg.session.foreground = Role::Backend;

        let plan = SessionPlan::prepare(&cfg, &layout(), &base, &resolver).unwrap();
        assert_eq!(
            plan.backend.to_string(),
            format!("{} run .", bin.path().join("go").display())
        );
        assert_eq!(plan.backend.cwd, PathBuf::from("/proj/backend"));
        assert_eq!(plan.foreground, Role::Backend);
        let described = plan.describe();
        assert!(described.contains("foreground: back-end"));
        assert!(described.contains("env: DEBUG=true"));
        assert!(described.contains(&format!("env: ASSETS_PREFIX={DEFAULT_ASSETS_PREFIX}")));
    }

    #[test]
    fn missing_asset_tool_fails_preparation() {
        let (_bin, base) = toolbox(&["go"]);
        let fs = MockFileSystem::new();
        let resolver = ExecutableResolver::new(Platform::Unix, Path::new("/"), &fs);

        let err = SessionPlan::prepare(&ConfigFile::default(), &layout(), &base, &resolver)
            .unwrap_err();
        match err {
            DevrunError::ResolutionFailed { tool, .. } => assert_eq!(tool, "npm"),
            other => panic!("expected ResolutionFailed, got {other:?}"),
        }
    }
}
