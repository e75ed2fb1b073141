// src/exec/backend.rs

//! Pluggable process backend.
//!
//! The orchestrator talks to a [`ProcessLauncher`] and the [`ManagedChild`]
//! handles it returns instead of `tokio::process` directly. Production code
//! uses [`RealProcessLauncher`]; tests provide fakes whose exit outcomes they
//! control.

use std::future::Future;
use std::io;
use std::pin::Pin;

use tokio::process::Child;
use tracing::debug;

use crate::errors::Result;
use crate::exec::command::CommandSpec;
use crate::exec::outcome::ExitOutcome;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Result of asking a child to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminateOutcome {
    /// The stop request was delivered.
    Requested,
    /// The platform cannot deliver the request, so the process was ended
    /// outright instead. Its exit status says nothing about how it handles
    /// a stop.
    Forced,
    /// The process had already exited; nothing to do.
    AlreadyExited,
}

/// A running child process owned by the orchestrator.
pub trait ManagedChild: Send {
    fn id(&self) -> Option<u32>;

    /// Wait for the process to exit. Cancel-safe: dropping the future and
    /// calling `wait` again is fine.
    fn wait(&mut self) -> BoxFuture<'_, Result<ExitOutcome>>;

    /// Ask the process to terminate (SIGTERM on unix).
    fn terminate(&mut self) -> Result<TerminateOutcome>;

    /// Deliver the interrupt signal (SIGINT on unix).
    fn interrupt(&mut self) -> Result<TerminateOutcome>;

    /// Forcefully kill the process.
    fn kill(&mut self) -> Result<TerminateOutcome>;
}

/// Trait abstracting how processes are started.
pub trait ProcessLauncher: Send {
    /// Start a long-running process without waiting for it.
    fn spawn(&mut self, spec: &CommandSpec) -> Result<Box<dyn ManagedChild>>;

    /// Start a process and wait for it to finish.
    fn run_to_completion(&mut self, spec: &CommandSpec) -> BoxFuture<'_, Result<ExitOutcome>>;
}

/// Launcher backed by `tokio::process`.
#[derive(Debug, Default)]
pub struct RealProcessLauncher;

impl RealProcessLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessLauncher for RealProcessLauncher {
    fn spawn(&mut self, spec: &CommandSpec) -> Result<Box<dyn ManagedChild>> {
        let child = spec.to_command().spawn()?;
        debug!(label = %spec.label, pid = ?child.id(), cmd = %spec, "spawned process");
        Ok(Box::new(RealChild { child }))
    }

    fn run_to_completion(&mut self, spec: &CommandSpec) -> BoxFuture<'_, Result<ExitOutcome>> {
        let mut cmd = spec.to_command();
        let label = spec.label.clone();
        Box::pin(async move {
            let status = cmd.status().await?;
            let outcome = ExitOutcome::from_status(status);
            debug!(label = %label, %outcome, "process finished");
            Ok(outcome)
        })
    }
}

/// `tokio::process::Child` behind the [`ManagedChild`] interface.
#[derive(Debug)]
pub struct RealChild {
    child: Child,
}

impl RealChild {
    /// Reap the child if it already exited, so a stale pid is never signalled.
    fn has_exited(&mut self) -> Result<bool> {
        Ok(self.child.try_wait()?.is_some())
    }

    #[cfg(not(unix))]
    fn force_stop(&mut self) -> Result<TerminateOutcome> {
        Ok(match self.kill()? {
            TerminateOutcome::Requested => TerminateOutcome::Forced,
            other => other,
        })
    }

    #[cfg(unix)]
    fn signal(&mut self, signal: nix::sys::signal::Signal) -> Result<TerminateOutcome> {
        use nix::errno::Errno;
        use nix::sys::signal::kill;
        use nix::unistd::Pid;

        if self.has_exited()? {
            return Ok(TerminateOutcome::AlreadyExited);
        }
        let Some(pid) = self.child.id() else {
            return Ok(TerminateOutcome::AlreadyExited);
        };
        match kill(Pid::from_raw(pid as i32), signal) {
            Ok(()) => Ok(TerminateOutcome::Requested),
            Err(Errno::ESRCH) => Ok(TerminateOutcome::AlreadyExited),
            Err(e) => Err(io::Error::from(e).into()),
        }
    }
}

impl ManagedChild for RealChild {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn wait(&mut self) -> BoxFuture<'_, Result<ExitOutcome>> {
        Box::pin(async move {
            let status = self.child.wait().await?;
            Ok(ExitOutcome::from_status(status))
        })
    }

    #[cfg(unix)]
    fn terminate(&mut self) -> Result<TerminateOutcome> {
        self.signal(nix::sys::signal::Signal::SIGTERM)
    }

    #[cfg(unix)]
    fn interrupt(&mut self) -> Result<TerminateOutcome> {
        self.signal(nix::sys::signal::Signal::SIGINT)
    }

    // No signals on this platform: every stop request is a kill.
    #[cfg(not(unix))]
    fn terminate(&mut self) -> Result<TerminateOutcome> {
        self.force_stop()
    }

    #[cfg(not(unix))]
    fn interrupt(&mut self) -> Result<TerminateOutcome> {
        self.force_stop()
    }

    fn kill(&mut self) -> Result<TerminateOutcome> {
        if self.has_exited()? {
            return Ok(TerminateOutcome::AlreadyExited);
        }
        match self.child.start_kill() {
            Ok(()) => Ok(TerminateOutcome::Requested),
            Err(e) if e.kind() == io::ErrorKind::InvalidInput => Ok(TerminateOutcome::AlreadyExited),
            Err(e) => Err(e.into()),
        }
    }
}
