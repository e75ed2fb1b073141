#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use devrun::engine::SessionPlan;
use devrun::env::{ComposedEnvironment, EnvMap, ProcessEnv};
use devrun::exec::CommandSpec;
use devrun::types::Role;

/// Builder for `SessionPlan` to simplify test setup.
///
/// Commands default to harmless placeholders; use [`SessionPlanBuilder::shell`]
/// to run real `/bin/sh` scripts.
pub struct SessionPlanBuilder {
    root: PathBuf,
    env: EnvMap,
    build: (String, Vec<String>),
    backend: (String, Vec<String>),
    frontend: (String, Vec<String>),
    foreground: Role,
    stop_grace: Duration,
}

impl SessionPlanBuilder {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            env: EnvMap::new(),
            build: ("go".to_string(), vec!["build".to_string(), ".".to_string()]),
            backend: ("go".to_string(), vec!["run".to_string(), ".".to_string()]),
            frontend: (
                "npm".to_string(),
                vec!["run".to_string(), "watch".to_string()],
            ),
            foreground: Role::Frontend,
            stop_grace: Duration::from_secs(2),
        }
    }

    pub fn foreground(mut self, role: Role) -> Self {
        self.foreground = role;
        self
    }

    pub fn stop_grace(mut self, grace: Duration) -> Self {
        self.stop_grace = grace;
        self
    }

    pub fn env(mut self, env: EnvMap) -> Self {
        self.env = env;
        self
    }

    /// Run `script` through `/bin/sh -c` for the given step.
    pub fn shell(mut self, step: Step, script: &str) -> Self {
        let cmd = (
            "/bin/sh".to_string(),
            vec!["-c".to_string(), script.to_string()],
        );
        match step {
            Step::Build => self.build = cmd,
            Step::Backend => self.backend = cmd,
            Step::Frontend => self.frontend = cmd,
        }
        self
    }

    pub fn build(self) -> SessionPlan {
        let process_env = ProcessEnv {
            cwd: self.root.clone(),
            env: ComposedEnvironment::from(self.env.clone()),
        };
        let spec = |label: &str, (program, args): (String, Vec<String>)| {
            CommandSpec::new(label, program, args, &process_env)
        };
        SessionPlan {
            build: spec("build", self.build),
            backend: spec(&Role::Backend.to_string(), self.backend),
            frontend: spec(&Role::Frontend.to_string(), self.frontend),
            output_dir: self.root.join("frontend").join("dist"),
            foreground: self.foreground,
            stop_grace: self.stop_grace,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Step {
    Build,
    Backend,
    Frontend,
}
