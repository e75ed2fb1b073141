// src/exec/command.rs

//! Description of a process to launch, and its translation into a
//! `tokio::process::Command`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use crate::env::{ComposedEnvironment, ProcessEnv};

/// Fully resolved invocation of one child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Short name used in logs ("build", "back-end", "front-end").
    pub label: String,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub env: ComposedEnvironment,
}

impl CommandSpec {
    pub fn new(
        label: impl Into<String>,
        program: impl Into<PathBuf>,
        args: impl IntoIterator<Item = impl Into<String>>,
        process_env: &ProcessEnv,
    ) -> Self {
        Self {
            label: label.into(),
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: process_env.cwd.clone(),
            env: process_env.env.clone(),
        }
    }

    /// Build the tokio command.
    ///
    /// The child gets exactly the composed environment and inherits the
    /// terminal's stdio so its output reaches the developer directly.
    pub fn to_command(&self) -> Command {
        let mut cmd = if needs_command_interpreter(&self.program) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(&self.program);
            c
        } else {
            Command::new(&self.program)
        };

        cmd.args(&self.args)
            .current_dir(&self.cwd)
            .env_clear()
            .envs(self.env.iter())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        cmd
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Batch launchers can only be started through `cmd /C`.
fn needs_command_interpreter(program: &Path) -> bool {
    cfg!(windows)
        && program
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("cmd") || e.eq_ignore_ascii_case("bat"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::EnvMap;

    #[test]
    fn display_joins_program_and_args() {
        let env = ProcessEnv {
            cwd: PathBuf::from("backend"),
            env: ComposedEnvironment::from(EnvMap::new()),
        };
        let spec = CommandSpec::new("build", "go", ["build", "."], &env);
        assert_eq!(spec.to_string(), "go build .");
        assert_eq!(spec.cwd, PathBuf::from("backend"));
    }
}
